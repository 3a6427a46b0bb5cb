// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Typed client for the Redash REST API
//!
//! This crate manages Redash data sources, users and user groups over HTTP,
//! mapping JSON replies onto the records of [`redash_types`].
//!
//! # Architecture
//!
//! - **Client**: [`client::RedashClient`] - one method per API operation
//! - **Configuration**: [`config::RedashConfig`] - server address, API key and timeout
//! - **Errors**: [`error::RedashError`] - `AlreadyExists` / `NotFound` versus `Transport`
//! - **Validation Utilities**: [`non_empty_string::NonEmptyString`] - ensures non-empty settings
//!
//! # Example
//!
//! ```no_run
//! use redash_client::{DataSource, RedashClient, RedashConfig};
//!
//! # async fn run() -> redash_client::RedashResult<()> {
//! let config = RedashConfig::from_url("http://redash.internal:5000", "api-key")?;
//! let client = RedashClient::new(config)?;
//!
//! let mut warehouse = DataSource::redshift("warehouse")
//!     .host("redshift.internal")
//!     .port(5439)
//!     .user("analyst")
//!     .password("secret")
//!     .dbname("events")
//!     .build();
//! let id = client.create_data_source(&mut warehouse).await?;
//!
//! let group = client.get_user_group("default").await?;
//! client.add_data_source_to_group(id, group.id).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod non_empty_string;

pub use client::RedashClient;
pub use config::{RedashConfig, Scheme, TimeoutSeconds};
pub use error::{RedashError, RedashResult};
pub use non_empty_string::NonEmptyString;
pub use redash_transport::{ApiClient, ApiError, HealthStatus};
pub use redash_types::{
    DataSource, DataSourceBuilder, DataSourceOptions, Entity, EntityId, EntityKind, Group,
    GroupType, GroupWithMembers, REDSHIFT, User,
};
