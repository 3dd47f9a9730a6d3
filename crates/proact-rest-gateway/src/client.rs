//! REST client for the Proact managed backend.
//!
//! The backend exposes PostgREST-style tables (`profiles`, `missions`,
//! `weekly_points`). The client authenticates with an API key plus a
//! per-user bearer token and never logs raw response bodies, only a
//! length/digest summary.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::RwLock;

use async_trait::async_trait;
use proact_core::{MissionEntity, MissionId, MissionStatus, UserId, UserProfile};
use progress_sync_engine::{MissionStore, MissionStoreError};
use serde::Deserialize;
use session_nav_resolver::{ProfileStore, ProfileStoreError};

use crate::error::{GatewayError, GatewayResult};

fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

/// Configuration for the backend gateway.
#[derive(Debug, Clone)]
pub struct RestGatewayConfig {
    /// The backend project API URL (e.g. `https://xyz.proact.eco`).
    pub api_url: String,
    /// The public API key sent with every request.
    pub api_key: String,
}

/// A wire record in the `missions` table.
///
/// Rows are flat; the step hierarchy is expressed via `parent_id` and
/// reassembled client-side up to the requested depth.
#[derive(Debug, Clone, Deserialize)]
struct MissionRow {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    reward_points: i64,
    #[serde(default)]
    co2_in_kg: i64,
    status: MissionStatus,
    #[serde(default)]
    parent_id: Option<String>,
}

impl MissionRow {
    fn into_entity(self) -> MissionEntity {
        MissionEntity {
            id: MissionId::from_string(self.id),
            title: self.title,
            description: self.description,
            reward_points: self.reward_points,
            co2_in_kg: self.co2_in_kg,
            status: self.status,
            steps: Vec::new(),
        }
    }
}

/// A wire record in the `weekly_points` table.
#[derive(Debug, Deserialize)]
struct WeeklyPointsRow {
    points: i64,
}

/// REST client for profile, mission, and weekly point operations.
pub struct ProactRestClient {
    http_client: reqwest::Client,
    config: RestGatewayConfig,
    /// Bearer token for the signed-in user; set after authentication,
    /// cleared on sign-out.
    access_token: RwLock<Option<String>>,
}

impl ProactRestClient {
    /// Creates a new client.
    pub fn new(config: RestGatewayConfig) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            config,
            access_token: RwLock::new(None),
        }
    }

    /// Sets the bearer token used for subsequent requests.
    ///
    /// Must be called after authentication; until then every call fails
    /// with a configuration error.
    pub fn set_access_token(&self, token: impl Into<String>) {
        let mut guard = self.access_token.write().expect("lock poisoned");
        *guard = Some(token.into());
    }

    /// Clears the bearer token. Call on sign-out.
    pub fn clear_access_token(&self) {
        let mut guard = self.access_token.write().expect("lock poisoned");
        *guard = None;
    }

    /// Build the REST API URL for a table.
    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.api_url, table)
    }

    fn bearer(&self) -> GatewayResult<String> {
        self.access_token
            .read()
            .expect("lock poisoned")
            .clone()
            .ok_or_else(|| GatewayError::Config("no access token set".to_string()))
    }

    /// Maps a non-success response to a typed error with a body summary.
    async fn ensure_success(
        context: &'static str,
        response: reqwest::Response,
    ) -> GatewayResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let body_summary = summarize_response_body(&body);
        tracing::error!(status = %status, body_summary = %body_summary, context, "backend request failed");
        Err(GatewayError::Backend {
            status: status.as_u16(),
            message: body_summary,
        })
    }

    /// Fetches the profile row for a user.
    ///
    /// Returns `Ok(None)` when no row exists yet (authenticated but profile
    /// record not created).
    pub async fn fetch_profile(&self, user: &UserId) -> GatewayResult<Option<UserProfile>> {
        let token = self.bearer()?;
        let url = format!(
            "{}?id=eq.{}&select=id,email,onboarded&limit=1",
            self.rest_url("profiles"),
            user
        );

        tracing::debug!(user = %user, "fetching profile");

        let response = self
            .http_client
            .get(&url)
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json")
            .send()
            .await?;
        let response = Self::ensure_success("fetch_profile", response).await?;

        let profiles: Vec<UserProfile> = response.json().await?;
        Ok(profiles.into_iter().next())
    }

    /// Fetches active missions, resolving steps up to `depth` layers.
    ///
    /// `depth` counts resolved layers including the top-level missions, so
    /// the default of 2 fetches missions plus one layer of steps. Each
    /// layer is one query; traversal stops early when a layer is empty.
    /// `depth` 0 fetches nothing.
    pub async fn fetch_active_missions(
        &self,
        user: &UserId,
        depth: u32,
    ) -> GatewayResult<Vec<MissionEntity>> {
        if depth == 0 {
            return Ok(Vec::new());
        }
        let token = self.bearer()?;

        let root_filter = format!(
            "user_id=eq.{}&parent_id=is.null&status=in.(not_started,in_progress)",
            user
        );
        let roots = self.fetch_mission_layer(&root_filter, &token).await?;

        let mut children_by_parent: HashMap<String, Vec<MissionRow>> = HashMap::new();
        let mut frontier: Vec<String> = roots.iter().map(|row| row.id.clone()).collect();
        for _ in 1..depth {
            if frontier.is_empty() {
                break;
            }
            let filter = format!("parent_id=in.({})", frontier.join(","));
            let rows = self.fetch_mission_layer(&filter, &token).await?;
            frontier = rows.iter().map(|row| row.id.clone()).collect();
            for row in rows {
                if let Some(parent) = row.parent_id.clone() {
                    children_by_parent.entry(parent).or_default().push(row);
                }
            }
        }

        let missions = assemble_missions(roots, &mut children_by_parent);
        tracing::debug!(user = %user, depth, missions = missions.len(), "fetched active missions");
        Ok(missions)
    }

    async fn fetch_mission_layer(
        &self,
        filter: &str,
        token: &str,
    ) -> GatewayResult<Vec<MissionRow>> {
        let url = format!(
            "{}?{}&select=id,title,description,reward_points,co2_in_kg,status,parent_id",
            self.rest_url("missions"),
            filter
        );

        let response = self
            .http_client
            .get(&url)
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json")
            .send()
            .await?;
        let response = Self::ensure_success("fetch_missions", response).await?;

        Ok(response.json().await?)
    }

    /// Marks a mission done in the backend.
    pub async fn mark_mission_done(&self, id: &MissionId) -> GatewayResult<()> {
        let token = self.bearer()?;
        let url = format!("{}?id=eq.{}", self.rest_url("missions"), id);
        let body = serde_json::json!({
            "status": "done",
            "completed_at": chrono::Utc::now().to_rfc3339(),
        });

        tracing::debug!(mission = %id, "marking mission done");

        let response = self
            .http_client
            .patch(&url)
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=minimal")
            .json(&body)
            .send()
            .await?;
        Self::ensure_success("mark_mission_done", response).await?;
        Ok(())
    }

    /// Fetches the authoritative weekly point total for a user.
    ///
    /// A user with no row yet (first week) has zero points.
    pub async fn fetch_weekly_points(&self, user: &UserId) -> GatewayResult<i64> {
        let token = self.bearer()?;
        let url = format!(
            "{}?user_id=eq.{}&select=points&limit=1",
            self.rest_url("weekly_points"),
            user
        );

        let response = self
            .http_client
            .get(&url)
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json")
            .send()
            .await?;
        let response = Self::ensure_success("fetch_weekly_points", response).await?;

        let rows: Vec<WeeklyPointsRow> = response.json().await?;
        Ok(rows.into_iter().next().map(|row| row.points).unwrap_or(0))
    }
}

/// Attaches child rows to their parents, recursively, consuming the map.
fn assemble_missions(
    rows: Vec<MissionRow>,
    children_by_parent: &mut HashMap<String, Vec<MissionRow>>,
) -> Vec<MissionEntity> {
    rows.into_iter()
        .map(|row| {
            let child_rows = children_by_parent.remove(&row.id).unwrap_or_default();
            let mut entity = row.into_entity();
            entity.steps = assemble_missions(child_rows, children_by_parent);
            entity
        })
        .collect()
}

impl std::fmt::Debug for ProactRestClient {
    /// Opaque debug output; the access token is never printed.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProactRestClient")
            .field("api_url", &self.config.api_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ProfileStore for ProactRestClient {
    async fn get_current_profile(
        &self,
        user: &UserId,
    ) -> Result<Option<UserProfile>, ProfileStoreError> {
        self.fetch_profile(user).await.map_err(Into::into)
    }
}

#[async_trait]
impl MissionStore for ProactRestClient {
    async fn get_active_missions(
        &self,
        user: &UserId,
        depth: u32,
    ) -> Result<Vec<MissionEntity>, MissionStoreError> {
        self.fetch_active_missions(user, depth)
            .await
            .map_err(Into::into)
    }

    async fn complete_mission(&self, id: &MissionId) -> Result<(), MissionStoreError> {
        self.mark_mission_done(id).await.map_err(Into::into)
    }

    async fn get_weekly_points(&self, user: &UserId) -> Result<i64, MissionStoreError> {
        self.fetch_weekly_points(user).await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ProactRestClient {
        ProactRestClient::new(RestGatewayConfig {
            api_url: "https://test.proact.eco".to_string(),
            api_key: "anon-key".to_string(),
        })
    }

    fn row(id: &str, parent: Option<&str>) -> MissionRow {
        MissionRow {
            id: id.to_string(),
            title: format!("Mission {id}"),
            description: String::new(),
            reward_points: 10,
            co2_in_kg: 0,
            status: MissionStatus::NotStarted,
            parent_id: parent.map(str::to_string),
        }
    }

    #[test]
    fn rest_url_builds_table_paths() {
        let client = client();
        assert_eq!(
            client.rest_url("missions"),
            "https://test.proact.eco/rest/v1/missions"
        );
    }

    #[test]
    fn bearer_requires_access_token() {
        let client = client();
        assert!(matches!(client.bearer(), Err(GatewayError::Config(_))));

        client.set_access_token("jwt");
        assert_eq!(client.bearer().unwrap(), "jwt");

        client.clear_access_token();
        assert!(client.bearer().is_err());
    }

    #[test]
    fn summarize_never_echoes_the_body() {
        let summary = summarize_response_body("secret token inside");
        assert!(!summary.contains("secret"));
        assert!(summary.starts_with("len=19,digest="));
    }

    #[test]
    fn summarize_is_stable_per_body() {
        assert_eq!(
            summarize_response_body("same body"),
            summarize_response_body("same body")
        );
        assert_ne!(
            summarize_response_body("body a"),
            summarize_response_body("body b")
        );
    }

    #[test]
    fn assemble_attaches_two_layers_of_steps() {
        let roots = vec![row("m-1", None), row("m-2", None)];
        let mut children: HashMap<String, Vec<MissionRow>> = HashMap::new();
        children.insert("m-1".to_string(), vec![row("s-1", Some("m-1"))]);
        children.insert("s-1".to_string(), vec![row("s-1-1", Some("s-1"))]);

        let missions = assemble_missions(roots, &mut children);

        assert_eq!(missions.len(), 2);
        assert_eq!(missions[0].steps.len(), 1);
        assert_eq!(missions[0].steps[0].id.as_str(), "s-1");
        assert_eq!(missions[0].steps[0].steps[0].id.as_str(), "s-1-1");
        assert!(missions[1].steps.is_empty());
        assert!(children.is_empty());
    }

    #[test]
    fn assemble_ignores_orphan_children() {
        let roots = vec![row("m-1", None)];
        let mut children: HashMap<String, Vec<MissionRow>> = HashMap::new();
        children.insert("m-gone".to_string(), vec![row("s-x", Some("m-gone"))]);

        let missions = assemble_missions(roots, &mut children);

        assert_eq!(missions.len(), 1);
        assert!(missions[0].steps.is_empty());
    }

    #[test]
    fn mission_row_maps_to_entity() {
        let entity = row("m-1", None).into_entity();
        assert_eq!(entity.id.as_str(), "m-1");
        assert_eq!(entity.reward_points, 10);
        assert_eq!(entity.status, MissionStatus::NotStarted);
        assert!(entity.steps.is_empty());
    }

    #[test]
    fn mission_row_deserializes_wire_status() {
        let json = r#"{
            "id": "m-1",
            "title": "Bike to work",
            "reward_points": 25,
            "status": "in_progress",
            "parent_id": null
        }"#;
        let row: MissionRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.status, MissionStatus::InProgress);
        assert!(row.parent_id.is_none());
    }

    #[test]
    fn client_debug_hides_credentials() {
        let client = client();
        client.set_access_token("super-secret-jwt");
        let debug = format!("{:?}", client);
        assert!(debug.contains("ProactRestClient"));
        assert!(!debug.contains("super-secret-jwt"));
        assert!(!debug.contains("anon-key"));
    }

    #[tokio::test]
    async fn fetch_without_token_fails_with_config_error() {
        let client = client();
        let result = client.fetch_weekly_points(&UserId::from_string("user-1")).await;
        assert!(matches!(result, Err(GatewayError::Config(_))));
    }

    #[tokio::test]
    async fn depth_zero_fetches_nothing() {
        let client = client();
        // No token is set, so any network attempt would fail; depth 0 must
        // return before reaching for credentials.
        let missions = client
            .fetch_active_missions(&UserId::from_string("user-1"), 0)
            .await
            .unwrap();
        assert!(missions.is_empty());
    }
}
