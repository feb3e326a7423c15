use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;

use crate::error::AppError;

/// One image inside a folder listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ListingEntry {
    pub name: String,
    pub size: u64,
    pub content_type: String,
    pub last_modified: DateTime<Utc>,
    /// Public URL of the image. Filled in by the retrieval service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Direct children of `(owner, folder)`, ordered by name. Computed on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FolderListing {
    pub owner: String,
    pub folder: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub entries: Vec<ListingEntry>,
}

impl FolderListing {
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }
}

/// Body returned by both upload routes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Server time at which the upload completed (RFC 3339).
    #[schema(example = "2026-10-16T09:30:15.123Z")]
    pub time: String,
    /// Address the image can be fetched from.
    pub url: String,
}

impl UploadResponse {
    pub fn new(time: DateTime<Utc>, url: String) -> Self {
        Self {
            time: time.to_rfc3339_opts(SecondsFormat::Millis, true),
            url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub canonical_name: String,
    pub storage_backend: String,
}

/// Terminal state of one upload or retrieval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Validation failed before the store was touched, or the caller asked for
    /// something that does not exist.
    Rejected,
    Succeeded,
    Failed,
}

impl RequestOutcome {
    pub fn of<T>(result: &Result<T, AppError>) -> Self {
        match result {
            Ok(_) => RequestOutcome::Succeeded,
            Err(e) if e.is_client_error() => RequestOutcome::Rejected,
            Err(_) => RequestOutcome::Failed,
        }
    }
}

impl Display for RequestOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            RequestOutcome::Rejected => write!(f, "rejected"),
            RequestOutcome::Succeeded => write!(f, "succeeded"),
            RequestOutcome::Failed => write!(f, "failed"),
        }
    }
}
