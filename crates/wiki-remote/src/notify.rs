//! Chat webhook notifications

use serde_json::json;

use crate::http::{Body, HttpClient};
use crate::service::Notifier;

/// Posts a text message to a webhook after each run
pub struct WebhookNotifier {
    http: HttpClient,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(),
            url: url.into(),
        }
    }
}

/// Message text for a run outcome
pub fn message(error: Option<&dyn std::error::Error>) -> String {
    match error {
        Some(e) => format!("Wiki sync failed\nError: {e}"),
        None => "Wiki sync succeeded".to_string(),
    }
}

/// Webhook payload for a message
pub fn payload(content: &str) -> serde_json::Value {
    json!({ "tag": "text", "text": { "content": content } })
}

impl Notifier for WebhookNotifier {
    fn notify(&self, error: Option<&dyn std::error::Error>) {
        let body = payload(&message(error));
        let request = self.http.request("POST", &self.url);
        match self.http.send(request, Body::Json(body)) {
            Ok(_) => tracing::debug!("Notification delivered"),
            Err(e) => tracing::warn!("Notification delivery failed: {}", e),
        }
    }
}
