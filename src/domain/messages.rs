//! Queue message payloads.
//!
//! These are the bodies the producer publishes and the worker consumes.
//! They carry no identity; the broker's delivery tag is the only handle on a
//! message. Both sides parse with [`decode`] so a payload accepted at the
//! ingress is always accepted by the worker.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use validator::{Validate, ValidationError};

use crate::domain::entities::{NewLike, NewProduct};
use crate::error::AppError;

/// Request to create a product: `{"name": string, "stock": int}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CreateProduct {
    #[validate(custom(function = "not_blank"))]
    pub name: String,

    #[validate(range(min = 0, message = "stock must not be negative"))]
    pub stock: i32,
}

impl From<CreateProduct> for NewProduct {
    fn from(msg: CreateProduct) -> Self {
        NewProduct {
            name: msg.name,
            stock: msg.stock,
        }
    }
}

/// A like action: `{"actor_id": int, "target_id": int}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct LikeEvent {
    #[validate(range(min = 1, message = "actor_id must be positive"))]
    pub actor_id: i64,

    #[validate(range(min = 1, message = "target_id must be positive"))]
    pub target_id: i64,
}

impl From<LikeEvent> for NewLike {
    fn from(msg: LikeEvent) -> Self {
        NewLike {
            actor_id: msg.actor_id,
            target_id: msg.target_id,
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("name must not be empty".into());
        return Err(err);
    }
    Ok(())
}

/// Parses and validates a JSON payload.
///
/// Unknown fields (including a stray `id`) are ignored.
pub fn decode<T>(payload: &[u8]) -> Result<T, AppError>
where
    T: DeserializeOwned + Validate,
{
    let value: T = serde_json::from_slice(payload)?;
    value.validate()?;
    Ok(value)
}

/// Serializes a payload for publishing.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, AppError> {
    serde_json::to_vec(value).map_err(|e| {
        AppError::internal(
            "Failed to serialize message",
            serde_json::json!({ "reason": e.to_string() }),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_product() {
        let msg: CreateProduct = decode(br#"{"name":"Widget","stock":10}"#).unwrap();
        assert_eq!(msg.name, "Widget");
        assert_eq!(msg.stock, 10);
    }

    #[test]
    fn test_decode_ignores_client_supplied_id() {
        let msg: CreateProduct = decode(br#"{"id":99,"name":"Widget","stock":0}"#).unwrap();
        assert_eq!(encode(&msg).unwrap(), br#"{"name":"Widget","stock":0}"#.to_vec());
    }

    #[test]
    fn test_decode_rejects_blank_name() {
        let err = decode::<CreateProduct>(br#"{"name":"   ","stock":1}"#).unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn test_decode_rejects_negative_stock() {
        let err = decode::<CreateProduct>(br#"{"name":"a","stock":-1}"#).unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn test_decode_rejects_wrong_types_and_missing_fields() {
        assert!(decode::<CreateProduct>(br#"{"name":"a","stock":"ten"}"#).is_err());
        assert!(decode::<CreateProduct>(br#"{"name":"a"}"#).is_err());
        assert!(decode::<CreateProduct>(b"not-json").is_err());
    }

    #[test]
    fn test_decode_like_event() {
        let msg: LikeEvent = decode(br#"{"actor_id":1,"target_id":2}"#).unwrap();
        assert_eq!(NewLike::from(msg), NewLike { actor_id: 1, target_id: 2 });

        assert!(decode::<LikeEvent>(br#"{"actor_id":0,"target_id":2}"#).is_err());
    }
}
