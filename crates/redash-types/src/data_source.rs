// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Data source records
//!
//! A data source is a database connection configured on the Redash server. The
//! JSON shape follows Redash: connection settings live under `options`, and the
//! id-qualified endpoint additionally reports the groups the data source is
//! attached to as a map of group id to "view only" flag.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Entity, EntityId, is_unassigned};

/// Redash type name of Amazon Redshift data sources
pub const REDSHIFT: &str = "redshift";

/// Connection settings of a data source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceOptions {
    /// Database host name
    #[serde(default)]
    pub host: String,
    /// Database port, `0` when unknown
    #[serde(default)]
    pub port: u16,
    /// Database user
    #[serde(default)]
    pub user: String,
    /// Database password (Redash masks it in responses)
    #[serde(default)]
    pub password: String,
    /// Database name
    #[serde(default)]
    pub dbname: String,
}

/// A Redash data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    /// Server-assigned id, `0` until created
    #[serde(default, skip_serializing_if = "is_unassigned")]
    pub id: EntityId,
    /// Unique data source name
    pub name: String,
    /// Redash type name, e.g. [`REDSHIFT`]
    #[serde(rename = "type")]
    pub kind: String,
    /// Connection settings; listings omit them
    #[serde(default)]
    pub options: DataSourceOptions,
    /// Attached groups, group id to "view only" flag
    #[serde(default, skip_serializing)]
    pub groups: BTreeMap<EntityId, bool>,
}

impl DataSource {
    /// Start building a data source of the given Redash type
    pub fn builder(name: impl Into<String>, kind: impl Into<String>) -> DataSourceBuilder {
        DataSourceBuilder {
            name: name.into(),
            kind: kind.into(),
            options: DataSourceOptions::default(),
        }
    }

    /// Start building a Redshift data source
    pub fn redshift(name: impl Into<String>) -> DataSourceBuilder {
        Self::builder(name, REDSHIFT)
    }

    /// Whether every field an update needs is present and non-empty
    pub fn is_complete(&self) -> bool {
        let filled = |value: &str| !value.trim().is_empty();

        filled(&self.name)
            && filled(&self.options.host)
            && self.options.port != 0
            && filled(&self.options.user)
            && filled(&self.options.password)
            && filled(&self.options.dbname)
    }

    /// Whether the data source is attached to the given group
    pub fn is_attached_to(&self, group_id: EntityId) -> bool {
        self.groups.contains_key(&group_id)
    }
}

impl Entity for DataSource {
    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Builder for [`DataSource`]
#[derive(Debug, Clone)]
#[must_use]
pub struct DataSourceBuilder {
    name: String,
    kind: String,
    options: DataSourceOptions,
}

impl DataSourceBuilder {
    /// Set the database host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.options.host = host.into();
        self
    }

    /// Set the database port
    pub fn port(mut self, port: u16) -> Self {
        self.options.port = port;
        self
    }

    /// Set the database user
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.options.user = user.into();
        self
    }

    /// Set the database password
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.options.password = password.into();
        self
    }

    /// Set the database name
    pub fn dbname(mut self, dbname: impl Into<String>) -> Self {
        self.options.dbname = dbname.into();
        self
    }

    /// Finish building; the data source has no id until created
    pub fn build(self) -> DataSource {
        DataSource {
            id: 0,
            name: self.name,
            kind: self.kind,
            options: self.options,
            groups: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn warehouse() -> DataSource {
        DataSource::redshift("warehouse")
            .host("redshift.internal")
            .port(5439)
            .user("analyst")
            .password("secret")
            .dbname("events")
            .build()
    }

    #[test]
    fn builder_sets_every_option() {
        let data_source = warehouse();

        assert_eq!(data_source.id, 0);
        assert_eq!(data_source.kind, REDSHIFT);
        assert_eq!(data_source.options.host, "redshift.internal");
        assert_eq!(data_source.options.port, 5439);
        assert_eq!(data_source.options.user, "analyst");
        assert_eq!(data_source.options.password, "secret");
        assert_eq!(data_source.options.dbname, "events");
        assert!(data_source.groups.is_empty());
    }

    #[test]
    fn serializes_in_redash_shape() {
        let value = serde_json::to_value(warehouse()).unwrap();

        assert_eq!(
            value,
            json!({
                "name": "warehouse",
                "type": "redshift",
                "options": {
                    "host": "redshift.internal",
                    "port": 5439,
                    "user": "analyst",
                    "password": "secret",
                    "dbname": "events"
                }
            })
        );
    }

    #[test]
    fn assigned_id_is_serialized() {
        let mut data_source = warehouse();
        data_source.id = 7;

        let value = serde_json::to_value(&data_source).unwrap();
        assert_eq!(value["id"], json!(7));
    }

    #[test]
    fn listing_entry_without_options_decodes() {
        let data_source: DataSource = serde_json::from_value(json!({
            "id": 3,
            "name": "warehouse",
            "type": "redshift",
            "syntax": "sql",
            "paused": 0,
            "pause_reason": null,
            "view_only": false
        }))
        .unwrap();

        assert_eq!(data_source.id, 3);
        assert_eq!(data_source.options, DataSourceOptions::default());
        assert!(data_source.groups.is_empty());
    }

    #[test]
    fn group_map_keys_decode_as_ids() {
        let data_source: DataSource = serde_json::from_value(json!({
            "id": 3,
            "name": "warehouse",
            "type": "redshift",
            "options": {
                "host": "h",
                "port": 5439,
                "user": "u",
                "password": "--------",
                "dbname": "d"
            },
            "groups": {"2": false, "5": true}
        }))
        .unwrap();

        assert!(data_source.is_attached_to(2));
        assert!(data_source.is_attached_to(5));
        assert!(!data_source.is_attached_to(1));
        assert_eq!(data_source.groups.get(&5), Some(&true));
    }

    #[test]
    fn completeness_requires_every_connection_field() {
        assert!(warehouse().is_complete());

        let mut missing_port = warehouse();
        missing_port.options.port = 0;
        assert!(!missing_port.is_complete());

        let mut blank_host = warehouse();
        blank_host.options.host = "  ".to_string();
        assert!(!blank_host.is_complete());

        let mut no_password = warehouse();
        no_password.options.password.clear();
        assert!(!no_password.is_complete());

        let mut no_name = warehouse();
        no_name.name.clear();
        assert!(!no_name.is_complete());
    }
}
