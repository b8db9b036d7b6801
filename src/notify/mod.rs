//! Webhook notifications for status transitions.
//!
//! Payloads use the chat-embed shape most incident channels accept. A
//! delivery failure is logged by the caller and never retried.

use crate::core::{NetpulseError, Result, Status};
use crate::engine::Transition;
use chrono::Utc;
use serde_json::{json, Value};
use std::time::Duration;

const COLOR_UP: u32 = 0x2E_CC_71;
const COLOR_DOWN: u32 = 0xE7_4C_3C;

/// Posts transition embeds to one webhook URL.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    /// Create a notifier for `url`.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Target URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Deliver one transition.
    pub async fn notify(&self, transition: &Transition) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&embed_payload(transition))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetpulseError::Webhook {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    /// Deliver transitions on a background task, logging failures.
    pub fn spawn_notify(&self, transitions: Vec<Transition>) {
        if transitions.is_empty() {
            return;
        }
        let notifier = self.clone();
        tokio::spawn(async move {
            for transition in &transitions {
                if let Err(e) = notifier.notify(transition).await {
                    tracing::warn!(category = e.category(), "Webhook delivery failed: {}", e);
                }
            }
        });
    }
}

/// Build the embed body for one transition.
pub fn embed_payload(transition: &Transition) -> Value {
    let record = &transition.record;
    let color = match transition.to {
        Status::Up => COLOR_UP,
        Status::Down => COLOR_DOWN,
    };
    let latency = record
        .latency_ms
        .map_or_else(|| "N/A".to_string(), |ms| format!("{:.2}ms", ms));

    json!({
        "username": "NetPulse Engine",
        "embeds": [{
            "title": "Protocol Status Transition",
            "color": color,
            "fields": [
                { "name": "Cluster", "value": record.server_name, "inline": true },
                { "name": "Node IP", "value": record.target(), "inline": true },
                { "name": "Transition", "value": format!("{:?} \u{2192} {:?}", transition.from, transition.to), "inline": true },
                { "name": "Metric", "value": record.check_type, "inline": true },
                { "name": "Sync Latency", "value": latency, "inline": true },
                { "name": "Reason", "value": record.message, "inline": false }
            ],
            "timestamp": Utc::now().to_rfc3339(),
            "footer": { "text": "NetPulse Infrastructure Intelligence" }
        }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CheckRecord;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn down() -> Transition {
        Transition {
            record: CheckRecord {
                server_name: "edge1".into(),
                target_address: Some("10.0.0.5".into()),
                check_type: "Ping".into(),
                message: "Request timed out".into(),
                ..Default::default()
            },
            from: Status::Up,
            to: Status::Down,
        }
    }

    #[test]
    fn test_embed_fields() {
        let payload = embed_payload(&down());
        let embed = &payload["embeds"][0];
        assert_eq!(embed["color"], COLOR_DOWN);
        assert_eq!(embed["fields"][1]["value"], "10.0.0.5");
        assert_eq!(embed["fields"][2]["value"], "Up \u{2192} Down");
        assert_eq!(embed["fields"][4]["value"], "N/A");
    }

    #[tokio::test]
    async fn test_posts_embed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "username": "NetPulse Engine" })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(server.uri()).unwrap();
        notifier.notify(&down()).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_delivery() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(server.uri()).unwrap();
        let err = notifier.notify(&down()).await.unwrap_err();
        assert!(matches!(err, NetpulseError::Webhook { status: 429 }));
    }
}
