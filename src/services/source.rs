use crate::models::Profile;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the profile backend
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Remote collection of marketplace profiles
pub trait ProfileSource: Send + Sync {
    /// Fetch the whole collection in one call
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<Profile>, SourceError>> + Send;

    /// Fetch a single profile by id
    fn fetch_one(&self, id: &str) -> impl Future<Output = Result<Profile, SourceError>> + Send;
}

/// REST profile backend client
///
/// Expects `GET {base}{path}` to return `{ "profiles": [...] }` and
/// `GET {base}{path}/{id}` to return `{ "profile": {...} }` or the bare object.
pub struct RestProfileSource {
    base_url: String,
    profiles_path: String,
    api_key: Option<String>,
    client: Client,
}

impl RestProfileSource {
    pub fn new(
        base_url: String,
        profiles_path: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            profiles_path,
            api_key,
            client,
        })
    }

    fn collection_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.profiles_path.trim_matches('/')
        )
    }

    async fn get_json(&self, url: &str) -> Result<Value, SourceError> {
        let mut request = self.client.get(url);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(SourceError::NotFound(url.to_string())),
            status => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unable to read body".to_string());
                tracing::warn!("Profile backend returned {} for {}: {}", status, url, body);
                Err(SourceError::ApiError(format!("{} returned {}", url, status)))
            }
        }
    }
}

impl ProfileSource for RestProfileSource {
    async fn fetch_all(&self) -> Result<Vec<Profile>, SourceError> {
        let url = self.collection_url();
        tracing::debug!("Fetching all profiles from: {}", url);

        let json = self.get_json(&url).await?;

        let documents = json
            .get("profiles")
            .and_then(|p| p.as_array())
            .ok_or_else(|| SourceError::InvalidResponse("Missing profiles array".into()))?;

        let profiles: Vec<Profile> = documents
            .iter()
            .filter_map(|doc| match serde_json::from_value(doc.clone()) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    tracing::warn!("Skipping malformed profile record: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!("Fetched {} profiles ({} records)", profiles.len(), documents.len());

        Ok(profiles)
    }

    async fn fetch_one(&self, id: &str) -> Result<Profile, SourceError> {
        let url = format!("{}/{}", self.collection_url(), urlencoding::encode(id));
        tracing::debug!("Fetching profile: {}", id);

        let json = self.get_json(&url).await?;
        let data = json.get("profile").unwrap_or(&json);

        serde_json::from_value(data.clone())
            .map_err(|e| SourceError::InvalidResponse(format!("Failed to parse profile: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_url_joins_cleanly() {
        let source = RestProfileSource::new(
            "https://api.test/v1/".to_string(),
            "/profiles".to_string(),
            None,
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(source.collection_url(), "https://api.test/v1/profiles");
    }

    #[tokio::test]
    async fn test_fetch_all_skips_malformed_records() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/profiles")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"profiles": [
                    {"_id": "1", "userType": "escort", "age": 22},
                    {"_id": "2", "userType": "unknown"},
                    {"_id": "3", "userType": "spa"}
                ]}"#,
            )
            .create_async()
            .await;

        let source = RestProfileSource::new(server.url(), "profiles".to_string(), None, Duration::from_secs(5)).unwrap();
        let profiles = source.fetch_all().await.unwrap();

        mock.assert_async().await;
        let ids: Vec<&str> = profiles.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[tokio::test]
    async fn test_fetch_one_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/profiles/missing")
            .with_status(404)
            .create_async()
            .await;

        let source = RestProfileSource::new(server.url(), "profiles".to_string(), None, Duration::from_secs(5)).unwrap();
        let result = source.fetch_one("missing").await;

        assert!(matches!(result, Err(SourceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_fetch_all_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/profiles")
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let source = RestProfileSource::new(server.url(), "profiles".to_string(), None, Duration::from_secs(5)).unwrap();

        assert!(matches!(source.fetch_all().await, Err(SourceError::ApiError(_))));
    }
}
