// SPDX-License-Identifier: MPL-2.0
//! HTTP client for the remote analysis service.

use super::{AnalysisRequest, AnalysisResponse, AnalysisResult};
use crate::config::Config;
use crate::error::AnalysisError;
use std::time::Duration;

const USER_AGENT: &str = concat!("EyeFatigue/", env!("CARGO_PKG_VERSION"));

/// Posts analysis requests to a single endpoint.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    endpoint: String,
}

impl AnalysisClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, AnalysisError> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AnalysisError> {
        Self::new(config.endpoint(), config.timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one request and validates the answer.
    ///
    /// A non-success status is reported as [`AnalysisError::Status`], carrying
    /// the `error` field of the body when the service provided one.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        tracing::info!(
            endpoint = %self.endpoint,
            condition = %request.condition,
            screen_time = request.screen_time,
            image_len = request.image.len(),
            "submitting analysis"
        );

        let response = self.http.post(&self.endpoint).json(request).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = error_message(&body);
            tracing::warn!(status = status.as_u16(), "analysis service rejected request");
            return Err(AnalysisError::Status {
                code: status.as_u16(),
                message,
            });
        }

        let parsed = serde_json::from_slice::<AnalysisResponse>(&body)
            .map_err(|e| AnalysisError::Malformed(e.to_string()))?;
        let result = parsed.into_result(request);
        match &result {
            Ok(r) => tracing::info!(level = %r.fatigue_level, demo = r.demo_mode, "analysis complete"),
            Err(e) => tracing::warn!(error = %e, "analysis failed"),
        }
        result
    }
}

/// The `error` field of an error body, whatever else the body holds.
fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()?
        .get("error")?
        .as_str()
        .map(str::trim)
        .filter(|msg| !msg.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_keeps_endpoint() {
        let client =
            AnalysisClient::new("http://localhost:9/analyze", Duration::from_secs(5)).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9/analyze");
    }

    #[test]
    fn from_config_uses_configured_endpoint() {
        let mut config = Config::default();
        config.analysis.endpoint = Some("http://example.test/api".into());
        let client = AnalysisClient::from_config(&config).unwrap();
        assert_eq!(client.endpoint(), "http://example.test/api");
    }

    #[test]
    fn error_message_reads_error_field_only() {
        assert_eq!(
            error_message(br#"{"error": " Model not loaded "}"#),
            Some("Model not loaded".into())
        );
        assert_eq!(error_message(br#"{"error": ""}"#), None);
        assert_eq!(error_message(b"<html>502</html>"), None);
    }
}
