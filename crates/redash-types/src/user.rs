// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! User records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{Entity, EntityId};

/// A Redash user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned id
    pub id: EntityId,
    /// Display name
    pub name: String,
    /// E-mail address, when the server reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Ids of the groups the user belongs to
    #[serde(default, deserialize_with = "group_ids")]
    pub groups: Vec<EntityId>,
    /// Authentication type, e.g. `password` or `google`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<String>,
    /// When the account was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Whether the account is disabled
    #[serde(default)]
    pub is_disabled: bool,
}

impl User {
    /// Whether the user is a member of the given group
    pub fn is_member_of(&self, group_id: EntityId) -> bool {
        self.groups.contains(&group_id)
    }
}

impl Entity for User {
    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// Older servers list group ids, newer ones list `{id, name}` objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum GroupRef {
    Id(EntityId),
    Summary { id: EntityId },
}

fn group_ids<'de, D>(deserializer: D) -> Result<Vec<EntityId>, D::Error>
where
    D: Deserializer<'de>,
{
    let refs = Option::<Vec<GroupRef>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(refs
        .into_iter()
        .map(|group| match group {
            GroupRef::Id(id) | GroupRef::Summary { id } => id,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_plain_group_ids() {
        let user: User = serde_json::from_value(json!({
            "id": 1,
            "name": "Admin",
            "email": "admin@example.com",
            "groups": [1, 2],
            "auth_type": "password",
            "created_at": "2018-06-01T10:00:00.000000+00:00",
            "is_disabled": false
        }))
        .unwrap();

        assert_eq!(user.groups, vec![1, 2]);
        assert!(user.is_member_of(2));
        assert_eq!(user.auth_type.as_deref(), Some("password"));
        assert!(user.created_at.is_some());
    }

    #[test]
    fn decodes_group_summaries() {
        let user: User = serde_json::from_value(json!({
            "id": 2,
            "name": "Analyst",
            "groups": [{"id": 2, "name": "default"}, {"id": 4, "name": "analysts"}]
        }))
        .unwrap();

        assert_eq!(user.groups, vec![2, 4]);
        assert!(!user.is_member_of(1));
        assert!(!user.is_disabled);
    }

    #[test]
    fn missing_or_null_groups_decode_empty() {
        let user: User = serde_json::from_value(json!({"id": 3, "name": "Viewer"})).unwrap();
        assert!(user.groups.is_empty());

        let user: User =
            serde_json::from_value(json!({"id": 3, "name": "Viewer", "groups": null})).unwrap();
        assert!(user.groups.is_empty());
    }
}
