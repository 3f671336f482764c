//! Google Docs collaborators — the Template Source (Drive plain-text
//! export) and the Document Sink (Docs create/batchUpdate).
//!
//! Auth is out of scope here: the client consumes a ready bearer token and
//! surfaces API failures unhandled; the pipeline never retries them.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::info;

const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3/files";
const DOCS_API_BASE: &str = "https://docs.googleapis.com/v1/documents";

/// Index range covering the whole document body for `replace_all`.
/// The Docs API clamps the end index to the actual body length.
const FULL_RANGE_END_INDEX: u32 = 99_999;

#[derive(Debug, Error)]
pub enum DocsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Docs API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Docs API response carried no document id")]
    MissingDocumentId,
}

/// Returns the plain text of a stored template for a given identifier.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    async fn fetch(&self, template_id: &str) -> Result<String, DocsError>;
}

/// Creates and mutates remote documents; returns shareable URLs.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    async fn create(&self, title: &str) -> Result<String, DocsError>;
    async fn insert(&self, doc_id: &str, text: &str) -> Result<(), DocsError>;
    async fn replace_all(&self, doc_id: &str, text: &str) -> Result<(), DocsError>;
    fn url_for(&self, doc_id: &str) -> String;
}

#[derive(Debug, Deserialize)]
struct CreateDocResponse {
    #[serde(rename = "documentId")]
    document_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Google Drive + Docs client implementing both collaborator traits.
#[derive(Clone)]
pub struct GoogleDocsClient {
    client: Client,
    access_token: String,
}

impl GoogleDocsClient {
    pub fn new(access_token: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            access_token,
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, DocsError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        Err(DocsError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn batch_update(&self, doc_id: &str, requests: Value) -> Result<(), DocsError> {
        let url = format!("{DOCS_API_BASE}/{doc_id}:batchUpdate");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&json!({ "requests": requests }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

/// The batchUpdate request list that inserts text at the document start.
fn insert_text_requests(text: &str) -> Value {
    json!([
        {
            "insertText": {
                "location": { "index": 1 },
                "text": text
            }
        }
    ])
}

/// The batchUpdate request list that clears the document body and inserts
/// replacement text.
fn replace_all_requests(text: &str) -> Value {
    json!([
        {
            "deleteContentRange": {
                "range": { "startIndex": 1, "endIndex": FULL_RANGE_END_INDEX }
            }
        },
        {
            "insertText": {
                "location": { "index": 1 },
                "text": text
            }
        }
    ])
}

#[async_trait]
impl TemplateSource for GoogleDocsClient {
    async fn fetch(&self, template_id: &str) -> Result<String, DocsError> {
        let url = format!("{DRIVE_API_BASE}/{template_id}/export");
        let response = self
            .client
            .get(&url)
            .query(&[("mimeType", "text/plain")])
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let response = Self::check(response).await?;
        let text = response.text().await?;
        info!("Fetched template {template_id} ({} bytes)", text.len());
        Ok(text)
    }
}

#[async_trait]
impl DocumentSink for GoogleDocsClient {
    async fn create(&self, title: &str) -> Result<String, DocsError> {
        let response = self
            .client
            .post(DOCS_API_BASE)
            .bearer_auth(&self.access_token)
            .json(&json!({ "title": title }))
            .send()
            .await?;
        let response = Self::check(response).await?;
        let created: CreateDocResponse = response.json().await?;
        created.document_id.ok_or(DocsError::MissingDocumentId)
    }

    async fn insert(&self, doc_id: &str, text: &str) -> Result<(), DocsError> {
        self.batch_update(doc_id, insert_text_requests(text)).await
    }

    async fn replace_all(&self, doc_id: &str, text: &str) -> Result<(), DocsError> {
        self.batch_update(doc_id, replace_all_requests(text)).await
    }

    fn url_for(&self, doc_id: &str) -> String {
        format!("https://docs.google.com/document/d/{doc_id}/edit")
    }
}
