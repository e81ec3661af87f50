//! One-shot trigger boundary
//!
//! Maps an optional raw request body such as `{"site": "lancers"}` to one
//! harvest pass and a JSON response with an HTTP-style status. Every error
//! below this boundary is caught here and reported as a 500 response.

use crate::config::Config;
use crate::crawler::{run_harvest, HarvestSummary};
use crate::storage::{open_storage, purge_expired, PurgeReport};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::Path;

pub const STATUS_OK: u16 = 200;
pub const STATUS_ERROR: u16 = 500;

/// Body of a harvest request
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HarvestRequest {
    /// Restricts the pass to one site
    #[serde(default)]
    pub site: Option<String>,
}

impl HarvestRequest {
    /// Parses an optional raw body; an absent or blank body is the empty request
    pub fn parse(body: Option<&str>) -> Result<Self, serde_json::Error> {
        match body.map(str::trim).filter(|body| !body.is_empty()) {
            Some(body) => serde_json::from_str(body),
            None => Ok(Self::default()),
        }
    }
}

/// Body of a harvest response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarvestResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collected: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inserted: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HarvestResponse {
    fn harvested(summary: HarvestSummary) -> Self {
        Self {
            ok: true,
            collected: Some(summary.collected),
            inserted: Some(summary.inserted),
            message: None,
            error: None,
        }
    }

    fn nothing_fetched() -> Self {
        Self {
            ok: true,
            collected: None,
            inserted: None,
            message: Some("No items fetched".to_string()),
            error: None,
        }
    }

    fn failed(error: impl Display) -> Self {
        Self {
            ok: false,
            collected: None,
            inserted: None,
            message: None,
            error: Some(error.to_string()),
        }
    }
}

/// Body of a retention purge response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurgeResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub report: Option<PurgeReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A response body with its status code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerResponse<B> {
    pub status: u16,
    pub body: B,
}

impl<B: Serialize> TriggerResponse<B> {
    fn ok(body: B) -> Self {
        Self {
            status: STATUS_OK,
            body,
        }
    }

    fn error(body: B) -> Self {
        Self {
            status: STATUS_ERROR,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }

    /// The body as a JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.body)
            .unwrap_or_else(|e| format!(r#"{{"ok":false,"error":"{}"}}"#, e))
    }
}

/// Runs one harvest pass for a raw request body
pub async fn handle_harvest(
    config: &Config,
    body: Option<&str>,
) -> TriggerResponse<HarvestResponse> {
    let request = match HarvestRequest::parse(body) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!("Malformed request body: {}", e);
            return TriggerResponse::error(HarvestResponse::failed(format!(
                "Malformed request body: {}",
                e
            )));
        }
    };

    match run_harvest(config, request.site.as_deref()).await {
        Ok(summary) if summary.collected == 0 => {
            TriggerResponse::ok(HarvestResponse::nothing_fetched())
        }
        Ok(summary) => TriggerResponse::ok(HarvestResponse::harvested(summary)),
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            TriggerResponse::error(HarvestResponse::failed(e))
        }
    }
}

/// Deletes postings older than the configured retention window
pub fn handle_purge(config: &Config) -> TriggerResponse<PurgeResponse> {
    let result = open_storage(Path::new(&config.output.database_path))
        .and_then(|mut store| purge_expired(&mut store, config.retention.days_to_keep));

    match result {
        Ok(report) => TriggerResponse::ok(PurgeResponse {
            ok: true,
            report: Some(report),
            error: None,
        }),
        Err(e) => {
            tracing::error!("Purge failed: {}", e);
            TriggerResponse::error(PurgeResponse {
                ok: false,
                report: None,
                error: Some(e.to_string()),
            })
        }
    }
}
