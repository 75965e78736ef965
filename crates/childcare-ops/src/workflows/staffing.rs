use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;
use tracing::info;

use crate::config::ShiftApiConfig;

const API_KEY_HEADER: &str = "x-api-key";
const API_TIMEOUT: Duration = Duration::from_secs(60);

/// Finite, inclusive date span rendered as ISO dates in query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftKind {
    Present,
    Training,
}

/// Planned shift as reported by the staff-shift system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkShift {
    pub employee_number: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub kind: ShiftKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StampingKind {
    Present,
    SickLeave,
    Training,
}

/// Realized working time entry pushed back to the staff-shift system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkStamping {
    pub employee_number: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub kind: StampingKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StampingBatch {
    pub stampings: Vec<WorkStamping>,
}

/// Capability boundary for the external staff-shift system. Both calls are
/// blocking request/response exchanges; callers own any retry policy.
pub trait ShiftProvider: Send + Sync {
    fn shifts(&self, period: SchedulePeriod) -> Result<Vec<WorkShift>, ShiftIntegrationError>;

    fn post_stampings(&self, batch: &StampingBatch) -> Result<(), ShiftIntegrationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ShiftIntegrationError {
    #[error("shift API URL is invalid: {0}")]
    InvalidUrl(String),
    #[error("shift API runtime unavailable: {0}")]
    Runtime(String),
    #[error("shift API request failed: {0}")]
    Transport(String),
    #[error("shift API returned status {0}")]
    Status(u16),
    #[error("shift API returned an unusable payload: {0}")]
    Payload(String),
}

/// HTTP adapter for the shift API: API-key auth, one-minute timeouts, no
/// internal retry.
#[derive(Debug)]
pub struct ShiftHttpClient {
    http: reqwest::Client,
    runtime: Runtime,
    base_url: Url,
    api_key: String,
}

impl ShiftHttpClient {
    /// Validates the configured URL up front so a broken deployment fails
    /// before the first network call.
    pub fn new(config: &ShiftApiConfig) -> Result<Self, ShiftIntegrationError> {
        let base_url = parse_base_url(&config.url)?;

        let http = reqwest::Client::builder()
            .connect_timeout(API_TIMEOUT)
            .timeout(API_TIMEOUT)
            .build()
            .map_err(|err| ShiftIntegrationError::Transport(err.to_string()))?;

        let runtime =
            Runtime::new().map_err(|err| ShiftIntegrationError::Runtime(err.to_string()))?;

        Ok(Self {
            http,
            runtime,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ShiftIntegrationError> {
        self.base_url
            .join(path)
            .map_err(|err| ShiftIntegrationError::InvalidUrl(err.to_string()))
    }
}

impl ShiftProvider for ShiftHttpClient {
    fn shifts(&self, period: SchedulePeriod) -> Result<Vec<WorkShift>, ShiftIntegrationError> {
        let mut url = self.endpoint("v1/shifts")?;
        url.query_pairs_mut()
            .append_pair("fromDate", &period.start.to_string())
            .append_pair("toDate", &period.end.to_string());

        info!(%url, "requesting shifts from staff-shift system");

        let response = self
            .runtime
            .block_on(async {
                self.http
                    .get(url)
                    .header(API_KEY_HEADER, &self.api_key)
                    .send()
                    .await
            })
            .map_err(|err| ShiftIntegrationError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShiftIntegrationError::Status(status.as_u16()));
        }

        let body = self
            .runtime
            .block_on(response.text())
            .map_err(|err| ShiftIntegrationError::Transport(err.to_string()))?;
        if body.trim().is_empty() {
            return Err(ShiftIntegrationError::Payload("empty response".to_string()));
        }

        let shifts: Vec<Option<WorkShift>> = serde_json::from_str(&body)
            .map_err(|err| ShiftIntegrationError::Payload(err.to_string()))?;

        // The upstream list is known to contain null entries at times; drop
        // them before use.
        Ok(shifts.into_iter().flatten().collect())
    }

    fn post_stampings(&self, batch: &StampingBatch) -> Result<(), ShiftIntegrationError> {
        let url = self.endpoint("v1/stampings")?;

        info!(%url, count = batch.stampings.len(), "posting stampings to staff-shift system");

        let response = self
            .runtime
            .block_on(async {
                self.http
                    .post(url)
                    .header(API_KEY_HEADER, &self.api_key)
                    .json(batch)
                    .send()
                    .await
            })
            .map_err(|err| ShiftIntegrationError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShiftIntegrationError::Status(status.as_u16()));
        }

        Ok(())
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ShiftIntegrationError> {
    let mut owned = raw.to_string();
    if !owned.ends_with('/') {
        owned.push('/');
    }
    Url::parse(&owned).map_err(|err| ShiftIntegrationError::InvalidUrl(format!("{raw}: {err}")))
}
