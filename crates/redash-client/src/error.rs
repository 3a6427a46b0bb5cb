// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for Redash client operations
//!
//! Callers get two kinds of failure from every operation: a state error
//! ([`RedashError::AlreadyExists`] / [`RedashError::NotFound`]) they are expected
//! to handle, and a [`RedashError::Transport`] error that means the server could
//! not be reached or answered with something unexpected.

use redash_transport::ApiError;
use redash_types::{EntityId, EntityKind};
use thiserror::Error;

/// Result type alias for Redash client operations
pub type RedashResult<T> = Result<T, RedashError>;

/// Errors returned by [`crate::RedashClient`]
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum RedashError {
    /// An entity with the same name is already present
    #[error("{kind} with name '{name}' already exists")]
    AlreadyExists { kind: EntityKind, name: String },

    /// The referenced entity does not exist
    #[error("{kind} {key} does not exist")]
    NotFound { kind: EntityKind, key: String },

    /// The request failed or the server answered unexpectedly
    #[error(transparent)]
    Transport(#[from] ApiError),

    /// The client configuration is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RedashError {
    /// Returns true if the referenced entity does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, RedashError::NotFound { .. })
    }

    /// Returns true if a create was rejected because the name is taken
    pub fn is_already_exists(&self) -> bool {
        matches!(self, RedashError::AlreadyExists { .. })
    }

    /// Returns true for network, status and response-shape failures
    pub fn is_transport(&self) -> bool {
        matches!(self, RedashError::Transport(_))
    }

    pub(crate) fn already_exists(kind: EntityKind, name: &str) -> Self {
        RedashError::AlreadyExists {
            kind,
            name: name.to_string(),
        }
    }

    pub(crate) fn missing_id(kind: EntityKind, id: EntityId) -> Self {
        RedashError::NotFound {
            kind,
            key: format!("with id {id}"),
        }
    }

    pub(crate) fn missing_name(kind: EntityKind, name: &str) -> Self {
        RedashError::NotFound {
            kind,
            key: format!("with name '{name}'"),
        }
    }
}
