//! CLI administration tool for product-pipeline.
//!
//! Inspects and manipulates the broker queues and the store without going
//! through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Declare both exchange/queue/binding triples
//! cargo run --bin admin -- queue declare
//!
//! # Drop every ready message from a queue
//! cargo run --bin admin -- queue purge products
//!
//! # Publish a message directly, bypassing the HTTP producer
//! cargo run --bin admin -- publish product --name Widget --stock 10
//! cargo run --bin admin -- publish like --actor 1 --target 2
//!
//! # Drop the cached product list from Redis
//! cargo run --bin admin -- cache clear
//!
//! # Row counts and queue depths
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server; see `product_pipeline::config`.

use product_pipeline::application::services::PRODUCTS_CACHE_KEY;
use product_pipeline::config::{Config, load_from_env, mask_connection_string};
use product_pipeline::domain::messages::{CreateProduct, LikeEvent, encode};
use product_pipeline::infrastructure::broker::{
    AmqpPublisher, BrokerConnection, LIKE_EVENTS, MessagePublisher, PRODUCT_CREATE, Topology,
    declare, queue_depth,
};
use product_pipeline::infrastructure::cache::{CacheService, RedisCache};
use product_pipeline::infrastructure::persistence::connect_pool;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use dialoguer::Confirm;
use lapin::options::QueuePurgeOptions;
use sqlx::PgPool;
use std::sync::Arc;
use validator::Validate;

/// CLI tool for managing product-pipeline.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage broker queues
    Queue {
        #[command(subcommand)]
        action: QueueAction,
    },

    /// Publish a message to a queue
    Publish {
        #[command(subcommand)]
        message: PublishMessage,
    },

    /// Manage the shared read cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Show row counts and queue depths
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum QueueAction {
    /// Declare exchanges, queues and bindings (idempotent)
    Declare,

    /// Remove all ready messages from a queue
    Purge {
        queue: QueueName,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum QueueName {
    Products,
    Likes,
}

impl QueueName {
    fn topology(self) -> Topology {
        match self {
            QueueName::Products => PRODUCT_CREATE,
            QueueName::Likes => LIKE_EVENTS,
        }
    }
}

#[derive(Subcommand)]
enum PublishMessage {
    /// Queue a product creation request
    Product {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        stock: i32,
    },

    /// Queue a like action
    Like {
        #[arg(short, long)]
        actor: i64,

        #[arg(short, long)]
        target: i64,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Remove the cached product list so the next read goes to the store
    Clear,
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_from_env()?;

    match cli.command {
        Commands::Queue { action } => handle_queue_action(action, &config).await?,
        Commands::Publish { message } => handle_publish(message, &config).await?,
        Commands::Cache { action } => handle_cache_action(action, &config).await?,
        Commands::Stats => handle_stats(&config).await?,
        Commands::Db { action } => handle_db_action(action, &config).await?,
    }

    Ok(())
}

async fn connect_broker(config: &Config) -> Result<Arc<BrokerConnection>> {
    let broker = BrokerConnection::connect(&config.amqp_url, config.dependency_timeout())
        .await
        .with_context(|| {
            format!(
                "Failed to connect to broker at {}",
                mask_connection_string(&config.amqp_url)
            )
        })?;
    Ok(Arc::new(broker))
}

async fn connect_db(config: &Config) -> Result<PgPool> {
    connect_pool(config)
        .await
        .context("Failed to connect to database")
}

async fn handle_queue_action(action: QueueAction, config: &Config) -> Result<()> {
    let broker = connect_broker(config).await?;
    let channel = broker.create_channel().await?;

    match action {
        QueueAction::Declare => {
            println!("{}", "📦 Declaring topology".bright_blue().bold());
            println!();

            for topology in Topology::ALL {
                declare(&channel, &topology).await?;
                println!(
                    "  {} {} → {} ({})",
                    "✓".green(),
                    topology.exchange.cyan(),
                    topology.queue.cyan(),
                    topology.routing_key.bright_black()
                );
            }
            println!();
        }
        QueueAction::Purge { queue, yes } => {
            let topology = queue.topology();
            declare(&channel, &topology).await?;
            let (ready, _) = queue_depth(&channel, &topology).await?;

            println!("{}", "🧹 Purge Queue".bright_blue().bold());
            println!();
            println!("  Queue:    {}", topology.queue.cyan());
            println!("  Messages: {}", ready.to_string().bright_yellow());
            println!();

            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt("Discard all ready messages?")
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "❌ Cancelled".red());
                    return Ok(());
                }
            }

            let purged = channel
                .queue_purge(topology.queue, QueuePurgeOptions::default())
                .await?;

            println!(
                "{}",
                format!("✅ Purged {} messages", purged).green().bold()
            );
        }
    }

    broker.close().await;
    Ok(())
}

async fn handle_publish(message: PublishMessage, config: &Config) -> Result<()> {
    let (topology, payload) = match message {
        PublishMessage::Product { name, stock } => {
            let msg = CreateProduct { name, stock };
            msg.validate()?;
            (PRODUCT_CREATE, encode(&msg)?)
        }
        PublishMessage::Like { actor, target } => {
            let msg = LikeEvent {
                actor_id: actor,
                target_id: target,
            };
            msg.validate()?;
            (LIKE_EVENTS, encode(&msg)?)
        }
    };

    let broker = connect_broker(config).await?;
    let publisher = AmqpPublisher::new(broker.clone(), config.dependency_timeout());
    publisher.publish(&topology, payload.clone()).await?;

    println!("{}", "✅ Message published".green().bold());
    println!("  Queue:   {}", topology.queue.cyan());
    println!(
        "  Payload: {}",
        String::from_utf8_lossy(&payload).bright_white()
    );

    broker.close().await;
    Ok(())
}

async fn handle_cache_action(action: CacheAction, config: &Config) -> Result<()> {
    match action {
        CacheAction::Clear => {
            let Some(redis_url) = &config.redis_url else {
                println!(
                    "{}",
                    "⚠️  REDIS_URL not set: each server process holds its own cache".yellow()
                );
                return Ok(());
            };

            let cache = RedisCache::connect(redis_url, config.dependency_timeout())
                .await
                .context("Failed to connect to Redis")?;
            cache.invalidate(PRODUCTS_CACHE_KEY).await?;

            println!(
                "{}",
                format!("✅ Cleared {}", PRODUCTS_CACHE_KEY).green().bold()
            );
        }
    }

    Ok(())
}

/// Displays row counts from the store and ready / consumer counts per queue.
async fn handle_stats(config: &Config) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let pool = connect_db(config).await?;

    let products_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&pool)
        .await?;

    let likes_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM post_likes")
        .fetch_one(&pool)
        .await?;

    println!(
        "  Products: {}",
        products_count.to_string().bright_green().bold()
    );
    println!(
        "  Likes:    {}",
        likes_count.to_string().bright_green().bold()
    );
    println!();

    let broker = connect_broker(config).await?;
    let channel = broker.create_channel().await?;

    println!(
        "  {:<24} {:<10} {:<10}",
        "Queue".bright_white().bold(),
        "Ready".bright_white().bold(),
        "Consumers".bright_white().bold()
    );
    println!("  {}", "─".repeat(46).bright_black());

    for topology in Topology::ALL {
        match queue_depth(&channel, &topology).await {
            Ok((ready, consumers)) => println!(
                "  {:<24} {:<10} {:<10}",
                topology.queue.cyan(),
                ready,
                consumers
            ),
            Err(_) => {
                println!(
                    "  {:<24} {}",
                    topology.queue.cyan(),
                    "not declared".yellow()
                );
                // a failed passive declare closes the channel
                break;
            }
        }
    }
    println!();

    broker.close().await;
    Ok(())
}

async fn handle_db_action(action: DbAction, config: &Config) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            let pool = connect_db(config).await?;
            sqlx::query("SELECT 1").fetch_one(&pool).await?;

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(&pool)
                .await?;

            println!("{}", "✅ Database connection OK".green().bold());
            println!("  PostgreSQL: {}", version.bright_white());
        }
    }

    Ok(())
}
