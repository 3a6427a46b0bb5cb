// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Redash REST API client
//!
//! [`RedashClient`] manages data sources, users and user groups. Every request
//! goes to `{scheme}://{host}:{port}/api{resource}?api_key={key}` with JSON
//! headers, and every reply is decoded once by [`Reply::classify`].
//!
//! Name uniqueness and existence checks are done client-side by listing the
//! entities of a kind before acting, so they are not atomic with respect to
//! other writers.

use std::time::Instant;

use redash_transport::{ApiClient, ApiError, HealthStatus, Reply};
use redash_types::{
    DataSource, Entity, EntityId, EntityKind, Group, GroupWithMembers, User, find_by_name,
};
use reqwest::{
    Client, Method,
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use tokio::time::timeout;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    config::RedashConfig,
    error::{RedashError, RedashResult},
};

const ACCEPT_VALUE: &str = "application/json, text/plain, */*";
const CONTENT_TYPE_VALUE: &str = "application/json;charset=UTF-8";
const USER_AGENT: &str = concat!("redash-client/", env!("CARGO_PKG_VERSION"));
const API_KEY_PARAM: &str = "api_key";
const PING_PATH: &str = "ping";

const DATA_SOURCES: &str = "/data_sources";
const GROUPS: &str = "/groups";
const USERS: &str = "/users";
const MEMBERS: &str = "/members";

/// Body of `POST /groups/{id}/members`
#[derive(Debug, Serialize)]
struct UserMembership {
    user_id: EntityId,
}

/// Body of `POST /groups/{id}/data_sources`
#[derive(Debug, Serialize)]
struct DataSourceMembership {
    data_source_id: EntityId,
}

/// Client for the Redash REST API
#[derive(Debug, Clone)]
pub struct RedashClient {
    client: Client,
    config: RedashConfig,
    api_url: String,
    ping_url: Url,
}

impl RedashClient {
    /// Create a new Redash client
    ///
    /// # Errors
    ///
    /// Returns `RedashError::Config` if the configuration does not form a valid
    /// URL or the HTTP client cannot be created
    pub fn new(config: RedashConfig) -> RedashResult<Self> {
        let api_url = config.api_url()?.to_string();
        let ping_url = config
            .server_url()?
            .join(PING_PATH)
            .map_err(|e| RedashError::Config(format!("invalid ping URL: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_VALUE));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| RedashError::Config(format!("failed to build HTTP client: {e}")))?;

        debug!(api_url, "created Redash client");

        Ok(Self {
            client,
            config,
            api_url,
            ping_url,
        })
    }

    /// Configuration the client was built from
    pub fn config(&self) -> &RedashConfig {
        &self.config
    }

    /// Create a new data source
    ///
    /// On success the server-assigned id is written into `data_source` and returned.
    ///
    /// # Errors
    ///
    /// Returns `RedashError::AlreadyExists` if a data source with the same name is
    /// listed; no POST is issued in that case
    pub async fn create_data_source(&self, data_source: &mut DataSource) -> RedashResult<EntityId> {
        let existing = self.list_data_sources().await?;
        let id = self
            .create_entity(EntityKind::DataSource, DATA_SOURCES, &existing, &*data_source)
            .await?;
        data_source.id = id;
        Ok(id)
    }

    /// List all data sources; listings do not include connection options
    pub async fn list_data_sources(&self) -> RedashResult<Vec<DataSource>> {
        self.get_list(DATA_SOURCES).await
    }

    /// Get a data source, including its options and groups, by id
    ///
    /// # Errors
    ///
    /// Returns `RedashError::NotFound` if Redash reports the id as missing, either
    /// with a 404 or with its internal-server-error body
    pub async fn get_data_source_by_id(&self, id: EntityId) -> RedashResult<DataSource> {
        self.get_by_id(EntityKind::DataSource, &format!("{DATA_SOURCES}/{id}"), id)
            .await
    }

    /// Get a data source by exact name, re-fetched by id for the full record
    ///
    /// # Errors
    ///
    /// Returns `RedashError::NotFound` if no listed data source has that name
    pub async fn get_data_source(&self, name: &str) -> RedashResult<DataSource> {
        let data_sources = self.list_data_sources().await?;
        let id = find_by_name(&data_sources, name)
            .map(Entity::id)
            .ok_or_else(|| RedashError::missing_name(EntityKind::DataSource, name))?;
        self.get_data_source_by_id(id).await
    }

    /// Update an existing data source, found by its name
    ///
    /// Returns `Ok(false)` without contacting the server when any of name, host,
    /// port, user, password or database name is missing. On success the id of the
    /// stored data source is written into `data_source`.
    ///
    /// # Errors
    ///
    /// Returns `RedashError::NotFound` if no data source with that name exists
    pub async fn update_data_source(&self, data_source: &mut DataSource) -> RedashResult<bool> {
        if !data_source.is_complete() {
            debug!(
                name = data_source.name,
                "skipping update of incomplete data source"
            );
            return Ok(false);
        }

        let data_sources = self.list_data_sources().await?;
        let id = find_by_name(&data_sources, &data_source.name)
            .map(Entity::id)
            .ok_or_else(|| RedashError::missing_name(EntityKind::DataSource, &data_source.name))?;

        self.post(&format!("{DATA_SOURCES}/{id}"), &*data_source).await?;
        data_source.id = id;

        info!(id, name = data_source.name, "updated data source");
        Ok(true)
    }

    /// Delete a data source
    ///
    /// Returns `Ok(false)` if the data source does not exist.
    pub async fn delete_data_source(&self, id: EntityId) -> RedashResult<bool> {
        self.delete_entity(EntityKind::DataSource, &format!("{DATA_SOURCES}/{id}"), id)
            .await
    }

    /// Create a new user group
    ///
    /// On success the server-assigned id is written into `group` and returned.
    ///
    /// # Errors
    ///
    /// Returns `RedashError::AlreadyExists` if a group with the same name is listed
    pub async fn create_user_group(&self, group: &mut Group) -> RedashResult<EntityId> {
        let existing = self.list_user_groups().await?;
        let id = self
            .create_entity(EntityKind::UserGroup, GROUPS, &existing, &*group)
            .await?;
        group.id = id;
        Ok(id)
    }

    /// List all user groups, including the builtin `admin` and `default` groups
    pub async fn list_user_groups(&self) -> RedashResult<Vec<Group>> {
        self.get_list(GROUPS).await
    }

    /// Get a user group by id
    ///
    /// # Errors
    ///
    /// Returns `RedashError::NotFound` if the group does not exist
    pub async fn get_user_group_by_id(&self, id: EntityId) -> RedashResult<Group> {
        self.get_by_id(EntityKind::UserGroup, &format!("{GROUPS}/{id}"), id)
            .await
    }

    /// Get a user group by exact name
    ///
    /// # Errors
    ///
    /// Returns `RedashError::NotFound` if no listed group has that name
    pub async fn get_user_group(&self, name: &str) -> RedashResult<Group> {
        let groups = self.list_user_groups().await?;
        let id = find_by_name(&groups, name)
            .map(Entity::id)
            .ok_or_else(|| RedashError::missing_name(EntityKind::UserGroup, name))?;
        self.get_user_group_by_id(id).await
    }

    /// Get a user group together with its members and attached data sources
    ///
    /// # Errors
    ///
    /// Returns `RedashError::NotFound` if the group does not exist
    pub async fn get_user_group_with_members(
        &self,
        group_id: EntityId,
    ) -> RedashResult<GroupWithMembers> {
        let group = self.get_user_group_by_id(group_id).await?;
        let users = self
            .get_list(&format!("{GROUPS}/{group_id}{MEMBERS}"))
            .await?;
        let data_sources = self
            .get_list(&format!("{GROUPS}/{group_id}{DATA_SOURCES}"))
            .await?;

        Ok(GroupWithMembers {
            group,
            users,
            data_sources,
        })
    }

    /// Delete a user group
    ///
    /// Returns `Ok(false)` if the group does not exist.
    pub async fn delete_user_group(&self, id: EntityId) -> RedashResult<bool> {
        self.delete_entity(EntityKind::UserGroup, &format!("{GROUPS}/{id}"), id)
            .await
    }

    /// List all users
    pub async fn list_users(&self) -> RedashResult<Vec<User>> {
        self.get_list(USERS).await
    }

    /// Get a user by id
    ///
    /// # Errors
    ///
    /// Returns `RedashError::NotFound` if the user does not exist
    pub async fn get_user_by_id(&self, id: EntityId) -> RedashResult<User> {
        self.get_by_id(EntityKind::User, &format!("{USERS}/{id}"), id)
            .await
    }

    /// Get a user by exact name
    ///
    /// # Errors
    ///
    /// Returns `RedashError::NotFound` if no listed user has that name
    pub async fn get_user(&self, name: &str) -> RedashResult<User> {
        let users = self.list_users().await?;
        let id = find_by_name(&users, name)
            .map(Entity::id)
            .ok_or_else(|| RedashError::missing_name(EntityKind::User, name))?;
        self.get_user_by_id(id).await
    }

    /// Add a user to a group
    ///
    /// Returns `Ok(false)` if the user already is a member.
    ///
    /// # Errors
    ///
    /// Returns `RedashError::NotFound` if the user or the group does not exist;
    /// nothing is changed in that case
    pub async fn add_user_to_group(
        &self,
        user_id: EntityId,
        group_id: EntityId,
    ) -> RedashResult<bool> {
        self.get_user_by_id(user_id).await?;
        let members = self.get_user_group_with_members(group_id).await?;
        if members.has_user(user_id) {
            debug!(user_id, group_id, "user already is a member of the group");
            return Ok(false);
        }

        self.post(
            &format!("{GROUPS}/{group_id}{MEMBERS}"),
            &UserMembership { user_id },
        )
        .await?;

        info!(user_id, group_id, "added user to group");
        Ok(true)
    }

    /// Remove a user from a group
    ///
    /// Returns `Ok(false)` if the user is not a member.
    ///
    /// # Errors
    ///
    /// Returns `RedashError::NotFound` if the user or the group does not exist
    pub async fn remove_user_from_group(
        &self,
        user_id: EntityId,
        group_id: EntityId,
    ) -> RedashResult<bool> {
        self.get_user_by_id(user_id).await?;
        let members = self.get_user_group_with_members(group_id).await?;
        if !members.has_user(user_id) {
            debug!(user_id, group_id, "user is not a member of the group");
            return Ok(false);
        }

        self.delete(&format!("{GROUPS}/{group_id}{MEMBERS}/{user_id}"))
            .await?;

        info!(user_id, group_id, "removed user from group");
        Ok(true)
    }

    /// Attach a data source to a group
    ///
    /// Returns `Ok(false)` if the data source already is attached.
    ///
    /// # Errors
    ///
    /// Returns `RedashError::NotFound` if the data source or the group does not exist
    pub async fn add_data_source_to_group(
        &self,
        data_source_id: EntityId,
        group_id: EntityId,
    ) -> RedashResult<bool> {
        self.get_data_source_by_id(data_source_id).await?;
        let members = self.get_user_group_with_members(group_id).await?;
        if members.has_data_source(data_source_id) {
            debug!(
                data_source_id,
                group_id, "data source already is attached to the group"
            );
            return Ok(false);
        }

        self.post(
            &format!("{GROUPS}/{group_id}{DATA_SOURCES}"),
            &DataSourceMembership { data_source_id },
        )
        .await?;

        info!(data_source_id, group_id, "attached data source to group");
        Ok(true)
    }

    /// Detach a data source from a group
    ///
    /// Returns `Ok(false)` if the data source is not attached.
    ///
    /// # Errors
    ///
    /// Returns `RedashError::NotFound` if the data source or the group does not exist
    pub async fn remove_data_source_from_group(
        &self,
        data_source_id: EntityId,
        group_id: EntityId,
    ) -> RedashResult<bool> {
        self.get_data_source_by_id(data_source_id).await?;
        let members = self.get_user_group_with_members(group_id).await?;
        if !members.has_data_source(data_source_id) {
            debug!(
                data_source_id,
                group_id, "data source is not attached to the group"
            );
            return Ok(false);
        }

        self.delete(&format!("{GROUPS}/{group_id}{DATA_SOURCES}/{data_source_id}"))
            .await?;

        info!(data_source_id, group_id, "detached data source from group");
        Ok(true)
    }

    async fn create_entity<T>(
        &self,
        kind: EntityKind,
        collection: &str,
        existing: &[T],
        entity: &T,
    ) -> RedashResult<EntityId>
    where
        T: Entity + Serialize,
    {
        if find_by_name(existing, entity.name()).is_some() {
            debug!(%kind, name = entity.name(), "refusing to create duplicate");
            return Err(RedashError::already_exists(kind, entity.name()));
        }

        let id = self.post(collection, entity).await?.id()?;

        info!(%kind, id, name = entity.name(), "created entity");
        Ok(id)
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> RedashResult<Vec<T>> {
        Ok(self.get(path).await?.into_entity()?)
    }

    async fn get_by_id<T: DeserializeOwned>(
        &self,
        kind: EntityKind,
        path: &str,
        id: EntityId,
    ) -> RedashResult<T> {
        match self.get(path).await {
            Ok(reply) => Ok(reply.into_entity()?),
            Err(error) if error.is_missing_resource() => {
                debug!(%kind, id, %error, "entity not found");
                Err(RedashError::missing_id(kind, id))
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn delete_entity(
        &self,
        kind: EntityKind,
        path: &str,
        id: EntityId,
    ) -> RedashResult<bool> {
        match self.delete(path).await {
            Ok(_) => {
                info!(%kind, id, "deleted entity");
                Ok(true)
            }
            Err(error) if error.is_missing_resource() => {
                debug!(%kind, id, %error, "nothing to delete");
                Ok(false)
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn get(&self, path: &str) -> Result<Reply, ApiError> {
        self.send(Method::GET, path, None).await
    }

    async fn post<B>(&self, path: &str, body: &B) -> Result<Reply, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(body).map_err(|e| ApiError::Configuration {
            message: format!("failed to encode request body: {e}"),
        })?;
        self.send(Method::POST, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<Reply, ApiError> {
        self.send(Method::DELETE, path, None).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Reply, ApiError> {
        let url = format!("{}{path}", self.api_url);
        debug!(%method, path, "sending request to Redash");

        let mut request = self
            .client
            .request(method.clone(), &url)
            .query(&[(API_KEY_PARAM, self.config.api_key.as_str())]);
        if let Some(body) = body {
            request = request.body(body);
        }

        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let text = response.text().await?;
            Ok::<_, reqwest::Error>((status, text))
        };

        let (status, text) = timeout(self.config.timeout_seconds.value(), exchange)
            .await
            .map_err(|_| ApiError::Timeout {
                timeout_seconds: self.config.timeout_seconds.seconds(),
            })?
            .map_err(transport_error)?;

        Reply::classify(status.as_u16(), &text).inspect_err(|error| {
            if !error.is_missing_resource() {
                warn!(%method, path, status = status.as_u16(), %error, "Redash request failed");
            }
        })
    }
}

/// Drops the request URL, which carries the API key, before formatting
fn transport_error(error: reqwest::Error) -> ApiError {
    ApiError::Http {
        message: error.without_url().to_string(),
    }
}

impl ApiClient for RedashClient {
    async fn health_check(&self) -> Result<HealthStatus, ApiError> {
        debug!(url = %self.ping_url, "performing health check on Redash");

        // `/ping` is unauthenticated, so the API key stays off this URL
        let request = self.client.get(self.ping_url.clone());

        let start_time = Instant::now();
        let response = timeout(self.config.timeout_seconds.value(), request.send())
            .await
            .map_err(|_| ApiError::Timeout {
                timeout_seconds: self.config.timeout_seconds.seconds(),
            })?
            .map_err(transport_error)?;

        let response_time = start_time.elapsed();
        let status = HealthStatus::from_ping_status(response.status().as_u16());

        match &status {
            HealthStatus::Up => info!("Redash health check passed in {:?}", response_time),
            HealthStatus::Degraded { reason } | HealthStatus::Down { reason } => {
                warn!(%reason, "Redash health check failed");
            }
        }
        Ok(status)
    }

    fn name(&self) -> &'static str {
        "redash"
    }
}
