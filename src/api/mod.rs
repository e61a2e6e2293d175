mod envelope;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::models::*;
use envelope::decode_body;

// ─── Error types ────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Semantic error reported by the server in an `{ error }` payload.
    #[error("{message}")]
    Api { error: String, message: String },
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// Transport-class failures: the request never produced a usable answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Status { .. } | Self::Other(_))
    }
}

// ─── Client ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ScheduleClient {
    client: Client,
    base_url: Url,
}

impl ScheduleClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid schedule API URL: {base_url}"))?;
        // Url::join drops the last segment unless the path ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(concat!("schedule-tui/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn host(&self) -> Option<(String, u16)> {
        let host = self.base_url.host_str()?.to_string();
        let port = self.base_url.port_or_known_default()?;
        Some((host, port))
    }

    fn api_url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.join("ystu/schedule/").map_err(|e| {
            ApiError::Other(anyhow::anyhow!("Bad API base URL: {e}"))
        })?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Other(anyhow::anyhow!("API URL cannot be a base")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_items<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        debug!(%url, "GET");
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        decode_body(status, &body)
    }

    // ── Directory ───────────────────────────────────────────────────────

    pub async fn institutes(&self, extramural: bool) -> Result<Vec<Institute>, ApiError> {
        let mut url = self.api_url(&["institutes"])?;
        url.query_pairs_mut()
            .append_pair("extramural", if extramural { "true" } else { "false" });
        self.get_items(url).await
    }

    pub async fn teachers(&self) -> Result<Vec<Teacher>, ApiError> {
        let url = self.api_url(&["teachers"])?;
        self.get_items(url).await
    }

    // ── Lessons ─────────────────────────────────────────────────────────

    pub async fn group_lessons(
        &self,
        name: &str,
        extramural: bool,
    ) -> Result<Vec<Lesson>, ApiError> {
        let mut url = self.api_url(&["group", name])?;
        if extramural {
            url.query_pairs_mut().append_pair("extramural", "true");
        }
        let weeks: Vec<ScheduleWeek> = self.get_items(url).await?;
        Ok(flatten_weeks(weeks))
    }

    pub async fn teacher_lessons(&self, id: u64) -> Result<Vec<TeacherLesson>, ApiError> {
        let url = self.api_url(&["teacher", &id.to_string()])?;
        self.get_items(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_keep_base_path_and_escape_names() {
        let client = ScheduleClient::new("https://example.org/api").unwrap();
        let url = client.api_url(&["group", "ЭИС-46"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.org/api/ystu/schedule/group/%D0%AD%D0%98%D0%A1-46"
        );
    }

    #[test]
    fn host_uses_default_port() {
        let client = ScheduleClient::new("https://example.org").unwrap();
        assert_eq!(client.host(), Some(("example.org".to_string(), 443)));
    }

    #[test]
    fn api_errors_are_not_transport() {
        let api = ApiError::Api { error: "Not Found".into(), message: "nope".into() };
        assert!(!api.is_transport());
        let status = ApiError::Status { status: 500, message: String::new() };
        assert!(status.is_transport());
    }
}
