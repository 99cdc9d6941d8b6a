//! Small helpers shared across layers.
//!
//! - [`deadline`] - timeouts for broker, store and cache round-trips

pub mod deadline;

pub use deadline::with_deadline;
