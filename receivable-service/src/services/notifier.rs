//! Notification dispatch for receivable-service.
//!
//! Email sending is fire-and-forget: the export pipeline hands the event off
//! and never awaits an acknowledgement. Delivery failures are logged by the
//! spawned task, not surfaced.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub base64: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailDispatch {
    pub subject: String,
    pub to: String,
    pub template: String,
    pub context: serde_json::Value,
    pub attachments: Vec<Attachment>,
}

pub trait Notifier: Send + Sync {
    /// Dispatch an event without awaiting the outcome.
    fn send(&self, event: &str, dispatch: EmailDispatch);
}

/// Posts events to the notification service from a detached task.
#[derive(Clone)]
pub struct HttpNotifier {
    client: reqwest::Client,
    base_url: String,
}

impl HttpNotifier {
    pub fn new(base_url: &str) -> Self {
        tracing::info!(endpoint = %base_url, "Notifier configured");
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Notifier for HttpNotifier {
    fn send(&self, event: &str, dispatch: EmailDispatch) {
        let client = self.client.clone();
        let url = format!("{}/events/{}", self.base_url, event);
        let to = dispatch.to.clone();

        tokio::spawn(async move {
            let result = client
                .post(&url)
                .json(&dispatch)
                .send()
                .await
                .and_then(|r| r.error_for_status());

            match result {
                Ok(_) => {
                    tracing::info!(to = %to, url = %url, "Notification event dispatched");
                }
                Err(e) => {
                    tracing::error!(to = %to, url = %url, error = %e, "Notification dispatch failed");
                }
            }
        });
    }
}

/// Notifier double recording every dispatched event.
#[derive(Default)]
pub struct MockNotifier {
    pub sent: std::sync::Mutex<Vec<(String, EmailDispatch)>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Notifier for MockNotifier {
    fn send(&self, event: &str, dispatch: EmailDispatch) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((event.to_string(), dispatch));
        }
    }
}
