//! Signup API handlers.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::server::AppState;
use crate::signup::ValidationError;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: &'static str,
    pub id: i64,
}

/// GET /hi
pub async fn hi() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "hi there!",
    })
}

/// POST /signup
///
/// The body is read as raw JSON so that wrongly typed fields reach
/// validation instead of failing deserialization. Body rejections (such as
/// the size limit) are answered in the same JSON error shape.
pub async fn signup(
    State(state): State<AppState>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<SignupResponse>> {
    let body = body?;
    let fields = parse_object(&body)?;
    let username = fields.get("username").unwrap_or(&Value::Null);
    let password = fields.get("password").unwrap_or(&Value::Null);

    let id = state.signup.signup(username, password).await?;

    Ok(Json(SignupResponse {
        message: "signup successful!",
        id,
    }))
}

/// An empty body counts as an empty object; anything but an object is a type error.
fn parse_object(body: &[u8]) -> std::result::Result<Map<String, Value>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(ValidationError::InvalidType.into()),
        Err(e) => {
            tracing::debug!(error = %e, "Unparseable signup body");
            Err(ValidationError::InvalidType.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object() {
        let fields = parse_object(br#"{"username": "alice"}"#).unwrap();
        assert_eq!(fields["username"], "alice");
    }

    #[test]
    fn test_parse_empty_body() {
        assert!(parse_object(b"").unwrap().is_empty());
        assert!(parse_object(b"  \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        assert!(matches!(
            parse_object(b"[1, 2]"),
            Err(AppError::Validation(ValidationError::InvalidType))
        ));
        assert!(matches!(
            parse_object(b"username=alice"),
            Err(AppError::Validation(ValidationError::InvalidType))
        ));
    }
}
