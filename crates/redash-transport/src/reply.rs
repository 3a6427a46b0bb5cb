// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Boundary decoding of Redash replies
//!
//! [`Reply::classify`] turns a status code and a raw body into either a
//! [`Reply`] or an [`ApiError`]. The rules, in order:
//!
//! 1. An empty or `null` body is [`Reply::Empty`] on success, a status error otherwise.
//! 2. A JSON object whose only key is `message` is Redash's error shape:
//!    `"Internal Server Error"` maps to [`ApiError::ServerError`] and the
//!    "requested URL was not found" text maps to [`ApiError::NotFound`],
//!    whatever the status code says.
//! 3. Any other JSON body is [`Reply::Json`] on success, a status error otherwise.
//! 4. A non-JSON body on success is [`ApiError::MalformedResponse`].
//!
//! Status errors: 404 is `NotFound`, 401/403 is `Authentication`, everything
//! else (500 included) is `Status`. Only the literal message of rule 2 yields
//! `ServerError`, so a real server failure is never mistaken for a missing resource.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::ApiError;

/// Message Redash returns for unhandled server failures
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

/// Prefix of the message Redash returns for unknown routes and ids
pub const URL_NOT_FOUND: &str = "The requested URL was not found on the server.";

const MAX_EXCERPT_CHARS: usize = 200;

/// A successful reply from Redash
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Empty or literal `null` body
    Empty,
    /// JSON payload
    Json(Value),
}

impl Reply {
    /// Decode a raw reply
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] the status code and body stand for
    pub fn classify(status: u16, body: &str) -> Result<Self, ApiError> {
        let success = (200..300).contains(&status);
        let body = body.trim();

        if body.is_empty() || body == "null" {
            return if success {
                Ok(Reply::Empty)
            } else {
                Err(status_error(status, "empty response body".to_string()))
            };
        }

        let Ok(value) = serde_json::from_str::<Value>(body) else {
            return if success {
                Err(ApiError::malformed(format!(
                    "expected JSON, got: {}",
                    excerpt(body)
                )))
            } else {
                Err(status_error(status, excerpt(body)))
            };
        };

        if let Some(message) = error_message(&value) {
            if message == INTERNAL_SERVER_ERROR {
                return Err(ApiError::ServerError {
                    message: message.to_string(),
                });
            }
            if message.starts_with(URL_NOT_FOUND) {
                return Err(ApiError::NotFound {
                    message: message.to_string(),
                });
            }
            if !success {
                return Err(status_error(status, message.to_string()));
            }
        }

        if success {
            Ok(Reply::Json(value))
        } else {
            Err(status_error(status, excerpt(body)))
        }
    }

    /// Whether the reply carried no body
    pub fn is_empty(&self) -> bool {
        matches!(self, Reply::Empty)
    }

    /// Decode the JSON payload into a typed record
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MalformedResponse`] for an empty reply or a payload
    /// that does not match `T`
    pub fn into_entity<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        match self {
            Reply::Empty => Err(ApiError::malformed("expected a JSON body, got none")),
            Reply::Json(value) => {
                serde_json::from_value(value).map_err(|e| ApiError::malformed(e.to_string()))
            }
        }
    }

    /// Read the `id` field of a create response
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MalformedResponse`] if there is no integer `id`
    pub fn id(&self) -> Result<u64, ApiError> {
        match self {
            Reply::Json(value) => value
                .get("id")
                .and_then(Value::as_u64)
                .ok_or_else(|| ApiError::malformed("response has no integer `id` field")),
            Reply::Empty => Err(ApiError::malformed("expected a created entity, got none")),
        }
    }
}

fn error_message(value: &Value) -> Option<&str> {
    value
        .as_object()
        .filter(|object| object.len() == 1)
        .and_then(|object| object.get("message"))
        .and_then(Value::as_str)
}

fn status_error(status: u16, message: String) -> ApiError {
    match status {
        404 => ApiError::NotFound { message },
        401 | 403 => ApiError::Authentication { message },
        _ => ApiError::Status { status, message },
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(MAX_EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use redash_types::{DataSource, Group};
    use serde_json::json;

    use super::*;

    const URL_NOT_FOUND_BODY: &str = r#"{"message": "The requested URL was not found on the server.  If you entered the URL manually please check your spelling and try again."}"#;

    #[test]
    fn empty_and_null_bodies_are_empty_replies() {
        assert_eq!(Reply::classify(200, ""), Ok(Reply::Empty));
        assert_eq!(Reply::classify(204, "  \n"), Ok(Reply::Empty));
        assert_eq!(Reply::classify(200, "null"), Ok(Reply::Empty));
        assert!(Reply::classify(200, "null").unwrap().is_empty());
    }

    #[test]
    fn empty_body_on_failure_uses_status() {
        assert!(matches!(
            Reply::classify(404, ""),
            Err(ApiError::NotFound { .. })
        ));
        assert!(matches!(
            Reply::classify(403, "null"),
            Err(ApiError::Authentication { .. })
        ));
        assert!(matches!(
            Reply::classify(502, ""),
            Err(ApiError::Status { status: 502, .. })
        ));
    }

    #[test]
    fn internal_server_error_message_is_server_error() {
        let body = r#"{"message": "Internal Server Error"}"#;

        for status in [200, 500] {
            match Reply::classify(status, body) {
                Err(ApiError::ServerError { message }) => {
                    assert_eq!(message, INTERNAL_SERVER_ERROR);
                }
                other => panic!("Expected ServerError, got: {other:?}"),
            }
        }
    }

    #[test]
    fn other_server_failures_are_status_errors() {
        let bodies = [
            "",
            "<html>database is locked</html>",
            r#"{"message": "psycopg2.OperationalError"}"#,
        ];

        for body in bodies {
            match Reply::classify(500, body) {
                Err(error @ ApiError::Status { status: 500, .. }) => {
                    assert!(!error.is_missing_resource(), "{body}");
                }
                other => panic!("Expected Status error for {body:?}, got: {other:?}"),
            }
        }
    }

    #[test]
    fn url_not_found_message_is_not_found() {
        for status in [200, 404] {
            match Reply::classify(status, URL_NOT_FOUND_BODY) {
                Err(ApiError::NotFound { message }) => assert!(message.starts_with(URL_NOT_FOUND)),
                other => panic!("Expected NotFound, got: {other:?}"),
            }
        }
    }

    #[test]
    fn other_messages_follow_status() {
        let body = r#"{"message": "Couldn't find resource. Please login and try again."}"#;

        match Reply::classify(404, body) {
            Err(ApiError::NotFound { message }) => assert!(message.starts_with("Couldn't find")),
            other => panic!("Expected NotFound, got: {other:?}"),
        }
        match Reply::classify(400, body) {
            Err(ApiError::Status { status, .. }) => assert_eq!(status, 400),
            other => panic!("Expected Status, got: {other:?}"),
        }
        assert!(matches!(Reply::classify(200, body), Ok(Reply::Json(_))));
    }

    #[test]
    fn message_next_to_other_fields_is_a_payload() {
        let body = r#"{"message": "success", "ok": true}"#;
        assert_eq!(
            Reply::classify(200, body),
            Ok(Reply::Json(json!({"message": "success", "ok": true})))
        );
    }

    #[test]
    fn non_json_success_is_malformed() {
        match Reply::classify(200, "<html>login</html>") {
            Err(ApiError::MalformedResponse { message }) => assert!(message.contains("<html>")),
            other => panic!("Expected MalformedResponse, got: {other:?}"),
        }
    }

    #[test]
    fn non_json_failure_keeps_an_excerpt() {
        let body = "x".repeat(1000);
        match Reply::classify(503, &body) {
            Err(ApiError::Status { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message.len(), MAX_EXCERPT_CHARS);
            }
            other => panic!("Expected Status, got: {other:?}"),
        }
    }

    #[test]
    fn into_entity_decodes_records() {
        let reply = Reply::classify(200, r#"{"id": 4, "name": "analysts", "type": "regular"}"#)
            .unwrap();
        let group: Group = reply.into_entity().unwrap();
        assert_eq!(group.id, 4);
        assert_eq!(group.name, "analysts");
    }

    #[test]
    fn into_entity_rejects_wrong_shapes() {
        let reply = Reply::classify(200, r#"{"unexpected": true}"#).unwrap();
        assert!(matches!(
            reply.into_entity::<DataSource>(),
            Err(ApiError::MalformedResponse { .. })
        ));
        assert!(matches!(
            Reply::Empty.into_entity::<Group>(),
            Err(ApiError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn id_reads_integer_field() {
        let reply = Reply::classify(200, r#"{"id": 12, "name": "qw"}"#).unwrap();
        assert_eq!(reply.id(), Ok(12));

        let reply = Reply::classify(200, r#"{"id": "12"}"#).unwrap();
        assert!(matches!(reply.id(), Err(ApiError::MalformedResponse { .. })));
        assert!(matches!(
            Reply::Empty.id(),
            Err(ApiError::MalformedResponse { .. })
        ));
    }
}
