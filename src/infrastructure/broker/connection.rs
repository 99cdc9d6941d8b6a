//! Shared AMQP connection.

use std::time::Duration;

use lapin::{Channel, Connection, ConnectionProperties};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::mask_connection_string;
use crate::error::AppError;
use crate::utils::with_deadline;

/// The process-wide broker connection.
///
/// Channels are opened from it on demand. If the connection is found closed
/// (broker restart, network drop) it is dialled again before the next channel
/// is handed out, so publishers and consumers recover on their next attempt.
pub struct BrokerConnection {
    url: String,
    op_timeout: Duration,
    conn: Mutex<Connection>,
}

impl BrokerConnection {
    /// Connects to the broker.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Dependency`] if the broker cannot be reached within
    /// `op_timeout`.
    pub async fn connect(url: &str, op_timeout: Duration) -> Result<Self, AppError> {
        let conn = Self::dial(url, op_timeout).await?;
        info!("Connected to RabbitMQ at {}", mask_connection_string(url));

        Ok(Self {
            url: url.to_string(),
            op_timeout,
            conn: Mutex::new(conn),
        })
    }

    async fn dial(url: &str, op_timeout: Duration) -> Result<Connection, AppError> {
        with_deadline(op_timeout, "broker.connect", async {
            Connection::connect(url, ConnectionProperties::default())
                .await
                .map_err(AppError::from)
        })
        .await
    }

    /// Opens a new channel, reconnecting first if the connection is closed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Dependency`] if reconnecting or opening the channel
    /// fails or times out.
    pub async fn create_channel(&self) -> Result<Channel, AppError> {
        let mut conn = self.conn.lock().await;

        if !conn.status().connected() {
            warn!("Broker connection lost, reconnecting");
            *conn = Self::dial(&self.url, self.op_timeout).await?;
            info!("Reconnected to RabbitMQ");
        }

        with_deadline(self.op_timeout, "broker.create_channel", async {
            conn.create_channel().await.map_err(AppError::from)
        })
        .await
    }

    /// Deadline applied to every broker operation.
    pub fn op_timeout(&self) -> Duration {
        self.op_timeout
    }

    pub async fn is_connected(&self) -> bool {
        self.conn.lock().await.status().connected()
    }

    /// Closes the connection. Unacknowledged deliveries return to their queues.
    pub async fn close(&self) {
        let conn = self.conn.lock().await;
        if conn.status().connected()
            && let Err(e) = conn.close(200, "shutdown").await
        {
            warn!(error = %e, "Failed to close broker connection cleanly");
        }
    }
}
