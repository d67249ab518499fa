//! Posts finished games to an HTTP webhook.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument};

use matchquiz_core::config::WebhookConfig;
use matchquiz_core::report::GameReport;

use crate::error::ReportError;
use crate::sink::ResultSink;

/// The JSON body the score collector expects.
#[derive(Debug, Serialize)]
struct ScorePayload<'a> {
    email: &'a str,
    element_id: &'a str,
    game_name: &'a str,
    location: &'a str,
    score: f64,
}

/// Webhook result sink.
pub struct WebhookSink {
    config: WebhookConfig,
    client: reqwest::Client,
}

impl WebhookSink {
    pub fn new(config: WebhookConfig) -> Result<Self, ReportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ReportError::Network(e.to_string()))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl ResultSink for WebhookSink {
    fn name(&self) -> &str {
        "webhook"
    }

    #[instrument(skip(self, report), fields(report = %report.id))]
    async fn deliver(&self, report: &GameReport) -> Result<(), ReportError> {
        let body = ScorePayload {
            email: &report.player.email,
            element_id: &self.config.element_id,
            game_name: &self.config.game_name,
            location: &self.config.location,
            score: report.score.total_score,
        };
        debug!(score = body.score, "posting result");

        let response = self
            .client
            .post(&self.config.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ReportError::Timeout(self.config.timeout_secs)
                } else {
                    ReportError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let message = response.text().await.unwrap_or_default();
            return Err(ReportError::Rejected { status, message });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::tests::sample_report;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(url: String) -> WebhookConfig {
        WebhookConfig {
            url,
            game_name: "Ads Memory".into(),
            element_id: "03".into(),
            location: "surat".into(),
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn posts_score_payload() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({
                "email": "ravi@example.com",
                "element_id": "03",
                "game_name": "Ads Memory",
                "location": "surat",
                "score": 7.3
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("Accepted"))
            .expect(1)
            .mount(&server)
            .await;

        let sink = WebhookSink::new(config(format!("{}/hook", server.uri()))).unwrap();
        sink.deliver(&sample_report()).await.unwrap();
    }

    #[tokio::test]
    async fn error_status_is_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("scenario is off"))
            .mount(&server)
            .await;

        let sink = WebhookSink::new(config(server.uri())).unwrap();
        let err = sink.deliver(&sample_report()).await.unwrap_err();
        match err {
            ReportError::Rejected { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "scenario is off");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        // Nothing listens on port 9 locally.
        let sink = WebhookSink::new(config("http://127.0.0.1:9/hook".into())).unwrap();
        let err = sink.deliver(&sample_report()).await.unwrap_err();
        assert!(matches!(err, ReportError::Network(_) | ReportError::Timeout(_)));
    }
}
