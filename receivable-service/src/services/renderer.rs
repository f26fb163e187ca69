//! Report rendering collaborator for receivable-service.
//!
//! The engine hands over a title and a tabular layout and gets back the path
//! of a rendered PDF. Rendering itself is opaque to this service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use tracing::instrument;

/// Horizontal alignment override for a column, keyed by column index.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColumnStyle {
    Left,
    Right,
    Center,
}

/// Column headers, per-column styles, and pre-formatted row cells.
#[derive(Debug, Clone, Serialize)]
pub struct ReportLayout {
    pub columns: Vec<String>,
    pub column_styles: HashMap<usize, ColumnStyle>,
    pub rows: Vec<Vec<String>>,
}

#[async_trait]
pub trait ReportRenderer: Send + Sync {
    async fn render(
        &self,
        title: &str,
        requesting_user_id: i64,
        layout: &ReportLayout,
    ) -> Result<PathBuf, anyhow::Error>;
}

/// JSON client against the document service's render endpoint.
#[derive(Clone)]
pub struct HttpRenderer {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct RenderRequest<'a> {
    title: &'a str,
    requesting_user_id: i64,
    #[serde(flatten)]
    layout: &'a ReportLayout,
}

#[derive(Deserialize)]
struct RenderResponse {
    file_path: String,
}

impl HttpRenderer {
    pub fn new(base_url: &str) -> Self {
        tracing::info!(endpoint = %base_url, "Report renderer configured");
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ReportRenderer for HttpRenderer {
    #[instrument(skip(self, layout), fields(rows = layout.rows.len()))]
    async fn render(
        &self,
        title: &str,
        requesting_user_id: i64,
        layout: &ReportLayout,
    ) -> Result<PathBuf, anyhow::Error> {
        let url = format!("{}/reports/render", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&RenderRequest {
                title,
                requesting_user_id,
                layout,
            })
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Render request failed: {}", e))?
            .error_for_status()
            .map_err(|e| anyhow::anyhow!("Renderer returned error status: {}", e))?
            .json::<RenderResponse>()
            .await
            .map_err(|e| anyhow::anyhow!("Render response unreadable: {}", e))?;

        Ok(PathBuf::from(response.file_path))
    }
}

/// Renderer double: records every layout it was handed and writes a scratch
/// file so the export's file-read step has real bytes to pick up.
#[derive(Default)]
pub struct MockRenderer {
    pub rendered: std::sync::Mutex<Vec<ReportLayout>>,
    pub fail: bool,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            rendered: std::sync::Mutex::new(Vec::new()),
            fail: true,
        }
    }
}

#[async_trait]
impl ReportRenderer for MockRenderer {
    async fn render(
        &self,
        title: &str,
        _requesting_user_id: i64,
        layout: &ReportLayout,
    ) -> Result<PathBuf, anyhow::Error> {
        if self.fail {
            return Err(anyhow::anyhow!("mock renderer failure"));
        }

        self.rendered
            .lock()
            .map_err(|e| anyhow::anyhow!("Mock renderer mutex poisoned: {}", e))?
            .push(layout.clone());

        let path =
            std::env::temp_dir().join(format!("report-{}.pdf", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path)?;
        writeln!(file, "{}", title)?;
        for row in &layout.rows {
            writeln!(file, "{}", row.join(" | "))?;
        }
        Ok(path)
    }
}
