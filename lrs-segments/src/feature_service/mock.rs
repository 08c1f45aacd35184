//! Fixture-backed transports for running without a live service.
//!
//! [`FixtureTransport`] serves saved query responses from JSON files and
//! [`StaticTransport`] answers every request with the same body.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use super::client::Transport;
use super::error::FeatureServiceError;
use super::types::QueryRequest;

/// Transport that serves saved responses from a directory.
///
/// Expects files named `{key}.json`, where `key` is the request's
/// [`QueryRequest::key`]. For route segment queries that is the bare route
/// id (`002.json`) without a direction, or the id plus direction
/// (`002i.json`) otherwise.
#[derive(Clone)]
pub struct FixtureTransport {
    responses: Arc<RwLock<HashMap<String, String>>>,
}

impl FixtureTransport {
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, FeatureServiceError> {
        let responses = load_dir(data_dir.as_ref())?;
        Ok(Self {
            responses: Arc::new(RwLock::new(responses)),
        })
    }

    /// Request keys that have a saved response.
    pub async fn available_keys(&self) -> Vec<String> {
        let responses = self.responses.read().await;
        let mut keys: Vec<String> = responses.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Reload fixtures from disk.
    pub async fn reload(&self, data_dir: impl AsRef<Path>) -> Result<(), FeatureServiceError> {
        let fresh = load_dir(data_dir.as_ref())?;
        *self.responses.write().await = fresh;
        Ok(())
    }
}

fn fixture_error(message: String) -> FeatureServiceError {
    FeatureServiceError::Fixture { message }
}

fn load_dir(data_dir: &Path) -> Result<HashMap<String, String>, FeatureServiceError> {
    let mut responses = HashMap::new();

    let entries = std::fs::read_dir(data_dir).map_err(|e| {
        fixture_error(format!("failed to read fixture directory {data_dir:?}: {e}"))
    })?;

    for entry in entries {
        let entry =
            entry.map_err(|e| fixture_error(format!("failed to read directory entry: {e}")))?;

        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }

        let key = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| fixture_error(format!("invalid filename: {path:?}")))?;

        let body = std::fs::read_to_string(&path)
            .map_err(|e| fixture_error(format!("failed to read {path:?}: {e}")))?;

        responses.insert(key.to_string(), body);
    }

    if responses.is_empty() {
        return Err(fixture_error(format!(
            "no fixture files found in {data_dir:?}"
        )));
    }

    debug!(dir = ?data_dir, count = responses.len(), "loaded fixtures");

    Ok(responses)
}

impl Transport for FixtureTransport {
    async fn fetch<R: QueryRequest + Sync>(
        &self,
        request: &R,
    ) -> Result<String, FeatureServiceError> {
        let key = request.key();
        let responses = self.responses.read().await;

        responses.get(&key).cloned().ok_or_else(|| {
            let mut available: Vec<&str> = responses.keys().map(String::as_str).collect();
            available.sort_unstable();
            fixture_error(format!("no fixture for {key}. Available: {available:?}"))
        })
    }
}

/// Transport that returns the same body for every request.
#[derive(Debug, Clone)]
pub struct StaticTransport {
    body: String,
}

impl StaticTransport {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

impl Transport for StaticTransport {
    async fn fetch<R: QueryRequest + Sync>(
        &self,
        _request: &R,
    ) -> Result<String, FeatureServiceError> {
        Ok(self.body.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_service::LayerQueryRequest;

    fn request(route_key: &str) -> LayerQueryRequest {
        LayerQueryRequest::new(vec![], 3857, route_key)
    }

    #[tokio::test]
    async fn load_bundled_fixtures() {
        let transport = FixtureTransport::new("data/fixtures").unwrap();
        let routes = transport.available_keys().await;
        assert!(routes.contains(&"002".to_string()));
        assert!(routes.contains(&"002i".to_string()));
    }

    #[tokio::test]
    async fn serves_by_route_key() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("005.json"), r#"{"layers": []}"#).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let transport = FixtureTransport::new(dir.path()).unwrap();
        assert_eq!(transport.available_keys().await, vec!["005".to_string()]);

        let body = transport.fetch(&request("005")).await.unwrap();
        assert_eq!(body, r#"{"layers": []}"#);
    }

    #[tokio::test]
    async fn unknown_route_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("005.json"), "{}").unwrap();

        let transport = FixtureTransport::new(dir.path()).unwrap();
        let err = transport.fetch(&request("101")).await.unwrap_err();
        match err {
            FeatureServiceError::Fixture { message } => {
                assert!(message.contains("101"));
                assert!(message.contains("005"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            FixtureTransport::new(dir.path()),
            Err(FeatureServiceError::Fixture { .. })
        ));
        assert!(FixtureTransport::new(dir.path().join("missing")).is_err());
    }

    #[tokio::test]
    async fn reload_picks_up_new_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("005.json"), "{}").unwrap();
        let transport = FixtureTransport::new(dir.path()).unwrap();

        std::fs::write(dir.path().join("090.json"), "{}").unwrap();
        transport.reload(dir.path()).await.unwrap();

        assert_eq!(
            transport.available_keys().await,
            vec!["005".to_string(), "090".to_string()]
        );
    }
}
