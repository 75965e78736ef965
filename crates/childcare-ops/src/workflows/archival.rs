use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde::Deserialize;
use tokio::runtime::Runtime;
use tracing::info;

use crate::config::ArchiveConfig;

const API_KEY_HEADER: &str = "x-api-key";
const API_TIMEOUT: Duration = Duration::from_secs(60);

/// Document payload handed to the archival store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveDocument {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Filing identifiers required by the archival store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveClassification {
    pub master_id: String,
    pub class_id: String,
    pub virtual_archive_id: String,
}

/// Outcome of a submission: the remote status code is passed through rather
/// than mapped to an error, with the archive reference when one was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReceipt {
    pub status: u16,
    pub reference: Option<String>,
}

impl ArchiveReceipt {
    pub fn accepted(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Capability boundary for long-term document archival. The income review
/// job does not depend on this.
pub trait DocumentArchive: Send + Sync {
    fn put_document(
        &self,
        document: &ArchiveDocument,
        metadata_xml: &str,
        classification: &ArchiveClassification,
    ) -> Result<ArchiveReceipt, ArchiveError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("archive URL is invalid: {0}")]
    InvalidUrl(String),
    #[error("archive runtime unavailable: {0}")]
    Runtime(String),
    #[error("archive document rejected: {0}")]
    Document(String),
    #[error("archive request failed: {0}")]
    Transport(String),
}

#[derive(Debug, Deserialize)]
struct ArchiveResponseBody {
    #[serde(default)]
    reference: Option<String>,
}

/// HTTP adapter submitting documents as multipart uploads.
#[derive(Debug)]
pub struct ArchiveHttpClient {
    http: reqwest::Client,
    runtime: Runtime,
    base_url: Url,
    api_key: String,
}

impl ArchiveHttpClient {
    pub fn new(config: &ArchiveConfig) -> Result<Self, ArchiveError> {
        let base_url = parse_base_url(&config.url)?;

        let http = reqwest::Client::builder()
            .connect_timeout(API_TIMEOUT)
            .timeout(API_TIMEOUT)
            .build()
            .map_err(|err| ArchiveError::Transport(err.to_string()))?;

        let runtime = Runtime::new().map_err(|err| ArchiveError::Runtime(err.to_string()))?;

        Ok(Self {
            http,
            runtime,
            base_url,
            api_key: config.api_key.clone(),
        })
    }
}

impl DocumentArchive for ArchiveHttpClient {
    fn put_document(
        &self,
        document: &ArchiveDocument,
        metadata_xml: &str,
        classification: &ArchiveClassification,
    ) -> Result<ArchiveReceipt, ArchiveError> {
        let url = self
            .base_url
            .join("records")
            .map_err(|err| ArchiveError::InvalidUrl(err.to_string()))?;

        let content = Part::bytes(document.bytes.clone())
            .file_name(document.name.clone())
            .mime_str(&document.content_type)
            .map_err(|err| ArchiveError::Document(err.to_string()))?;

        let form = Form::new()
            .part("content", content)
            .text("metadata", metadata_xml.to_string())
            .text("masterId", classification.master_id.clone())
            .text("classId", classification.class_id.clone())
            .text("virtualArchiveId", classification.virtual_archive_id.clone());

        info!(%url, document = %document.name, "submitting document to archive");

        let response = self
            .runtime
            .block_on(async {
                self.http
                    .post(url)
                    .header(API_KEY_HEADER, &self.api_key)
                    .multipart(form)
                    .send()
                    .await
            })
            .map_err(|err| ArchiveError::Transport(err.to_string()))?;

        let status = response.status().as_u16();
        let reference = self
            .runtime
            .block_on(response.text())
            .ok()
            .and_then(|body| serde_json::from_str::<ArchiveResponseBody>(&body).ok())
            .and_then(|body| body.reference);

        Ok(ArchiveReceipt { status, reference })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ArchiveError> {
    let mut owned = raw.to_string();
    if !owned.ends_with('/') {
        owned.push('/');
    }
    Url::parse(&owned).map_err(|err| ArchiveError::InvalidUrl(format!("{raw}: {err}")))
}
