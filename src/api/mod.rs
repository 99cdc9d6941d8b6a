//! REST API layer for HTTP request/response handling.
//!
//! Write endpoints validate and enqueue; they never touch the store. Read
//! endpoints go through the application services.
//!
//! # Modules
//!
//! - [`dto`] - response bodies
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - request tracing
//! - [`routes`] - route configuration

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
