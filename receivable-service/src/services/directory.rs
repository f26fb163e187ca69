//! User directory client for receivable-service.
//!
//! Resolves a user id to contact/display info for export notifications.
//! Single attempt, no retries; the engine wraps any failure.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::instrument;

/// The sentinel id the directory returns for an unknown user.
pub const UNKNOWN_USER_ID: i64 = 0;

#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[async_trait]
pub trait DirectoryClient: Send + Sync {
    async fn lookup(&self, user_id: i64) -> Result<DirectoryUser, anyhow::Error>;
}

/// JSON client against the directory service's user endpoint.
#[derive(Clone)]
pub struct HttpDirectoryClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDirectoryClient {
    pub fn new(base_url: &str) -> Self {
        tracing::info!(endpoint = %base_url, "Directory client configured");
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl DirectoryClient for HttpDirectoryClient {
    #[instrument(skip(self))]
    async fn lookup(&self, user_id: i64) -> Result<DirectoryUser, anyhow::Error> {
        let url = format!("{}/users/{}", self.base_url, user_id);
        let user = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Directory request failed: {}", e))?
            .error_for_status()
            .map_err(|e| anyhow::anyhow!("Directory returned error status: {}", e))?
            .json::<DirectoryUser>()
            .await
            .map_err(|e| anyhow::anyhow!("Directory response unreadable: {}", e))?;
        Ok(user)
    }
}

/// Directory double: known users resolve, unknown ids resolve to the
/// sentinel user, and `fail` simulates an unreachable directory.
#[derive(Default)]
pub struct MockDirectory {
    pub users: HashMap<i64, DirectoryUser>,
    pub fail: bool,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, id: i64, name: &str, email: &str) -> Self {
        self.users.insert(
            id,
            DirectoryUser {
                id,
                name: name.to_string(),
                email: email.to_string(),
            },
        );
        self
    }

    pub fn failing() -> Self {
        Self {
            users: HashMap::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl DirectoryClient for MockDirectory {
    async fn lookup(&self, user_id: i64) -> Result<DirectoryUser, anyhow::Error> {
        if self.fail {
            return Err(anyhow::anyhow!("mock directory unreachable"));
        }
        Ok(self.users.get(&user_id).cloned().unwrap_or(DirectoryUser {
            id: UNKNOWN_USER_ID,
            name: String::new(),
            email: String::new(),
        }))
    }
}
