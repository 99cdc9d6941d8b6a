//! DTO for asynchronous write acknowledgements.

use serde::{Deserialize, Serialize};

/// Body of a `202 Accepted` response.
///
/// The request has been queued, not persisted. Clients observe the result
/// through the read endpoints once the worker has processed it.
#[derive(Debug, Serialize, Deserialize)]
pub struct AcceptedResponse {
    pub status: String,
    pub message: String,
}

impl AcceptedResponse {
    pub fn queued(message: impl Into<String>) -> Self {
        Self {
            status: "accepted".to_string(),
            message: message.into(),
        }
    }
}
