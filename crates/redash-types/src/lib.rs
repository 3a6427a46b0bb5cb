// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Entity records exchanged with the Redash REST API
//!
//! This crate holds the plain data types shared by the transport and client
//! crates: data sources, users and user groups, together with the helpers the
//! client uses to resolve entities by name.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod data_source;
pub mod group;
pub mod user;

pub use data_source::{DataSource, DataSourceBuilder, DataSourceOptions, REDSHIFT};
pub use group::{Group, GroupType, GroupWithMembers};
pub use user::User;

/// Identifier the server assigns to an entity; `0` until the entity is created
pub type EntityId = u64;

/// A server-side record addressed by a numeric id and a display name
pub trait Entity {
    /// Server-assigned id, `0` when not yet created
    fn id(&self) -> EntityId;

    /// Name of the entity, unique among entities of the same kind
    fn name(&self) -> &str;

    /// Whether the server has assigned an id to this entity
    fn is_persisted(&self) -> bool {
        self.id() != 0
    }
}

/// Kind of entity managed by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A configured database connection
    DataSource,
    /// A Redash user account
    User,
    /// A named collection of users and data sources
    UserGroup,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::DataSource => write!(f, "data source"),
            EntityKind::User => write!(f, "user"),
            EntityKind::UserGroup => write!(f, "user group"),
        }
    }
}

/// Linear scan for the first entity whose name matches exactly
pub fn find_by_name<'a, T: Entity>(entities: &'a [T], name: &str) -> Option<&'a T> {
    entities.iter().find(|entity| entity.name() == name)
}

/// Linear scan for an entity with the given id
pub fn contains_id<T: Entity>(entities: &[T], id: EntityId) -> bool {
    entities.iter().any(|entity| entity.id() == id)
}

#[allow(clippy::trivially_copy_pass_by_ref)]
pub(crate) fn is_unassigned(id: &EntityId) -> bool {
    *id == 0
}
