// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! User group records
//!
//! Redash installs two builtin groups (`admin` and `default`); every other group
//! is a regular group created through the API. Membership is not part of the
//! group record itself and is only loaded on demand into a [`GroupWithMembers`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DataSource, Entity, EntityId, User, contains_id, is_unassigned};

/// Origin of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupType {
    /// Installed with the server (`admin`, `default`)
    Builtin,
    /// Created by an administrator
    Regular,
    /// Any type this client does not know about
    #[serde(other)]
    Unknown,
}

/// A Redash user group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Server-assigned id, `0` until created
    #[serde(default, skip_serializing_if = "is_unassigned")]
    pub id: EntityId,
    /// Unique group name
    pub name: String,
    /// Group type as reported by the server
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<GroupType>,
    /// Permissions granted to members
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
    /// When the group was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Group {
    /// A new group that has not been created on the server yet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            kind: None,
            permissions: Vec::new(),
            created_at: None,
        }
    }

    /// Whether this is one of the groups installed with the server
    pub fn is_builtin(&self) -> bool {
        self.kind == Some(GroupType::Builtin)
    }
}

impl Entity for Group {
    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A group together with its current members and attached data sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupWithMembers {
    /// The group record
    pub group: Group,
    /// Users that are members of the group
    pub users: Vec<User>,
    /// Data sources attached to the group
    pub data_sources: Vec<DataSource>,
}

impl GroupWithMembers {
    /// Whether the user is a member of the group
    pub fn has_user(&self, user_id: EntityId) -> bool {
        contains_id(&self.users, user_id)
    }

    /// Whether the data source is attached to the group
    pub fn has_data_source(&self, data_source_id: EntityId) -> bool {
        contains_id(&self.data_sources, data_source_id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn new_group_serializes_name_only() {
        let value = serde_json::to_value(Group::new("analysts")).unwrap();
        assert_eq!(value, json!({"name": "analysts"}));
    }

    #[test]
    fn decodes_server_group() {
        let group: Group = serde_json::from_value(json!({
            "id": 1,
            "name": "admin",
            "type": "builtin",
            "permissions": ["admin", "super_admin"],
            "created_at": "2018-06-01T10:00:00+00:00"
        }))
        .unwrap();

        assert!(group.is_builtin());
        assert_eq!(group.permissions.len(), 2);
        assert!(group.is_persisted());
    }

    #[test]
    fn unknown_group_type_is_tolerated() {
        let group: Group =
            serde_json::from_value(json!({"id": 9, "name": "x", "type": "federated"})).unwrap();
        assert_eq!(group.kind, Some(GroupType::Unknown));
        assert!(!group.is_builtin());
    }

    #[test]
    fn membership_checks_scan_by_id() {
        let user: User = serde_json::from_value(json!({"id": 4, "name": "Analyst"})).unwrap();
        let mut data_source = DataSource::redshift("warehouse").build();
        data_source.id = 8;

        let members = GroupWithMembers {
            group: Group::new("analysts"),
            users: vec![user],
            data_sources: vec![data_source],
        };

        assert!(members.has_user(4));
        assert!(!members.has_user(8));
        assert!(members.has_data_source(8));
        assert!(!members.has_data_source(4));
    }
}
