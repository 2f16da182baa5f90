use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

use super::manifest::Manifest;

/// Request body for `CreateUpload`. The service takes no parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateUploadReq {}

/// One-time write destination returned by `CreateUpload`.
///
/// Consumed by value by the transfer stage; the URL is never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadTarget {
    #[serde(alias = "uploadId")]
    pub upload_id: String,
    #[serde(alias = "uploadUrl")]
    pub upload_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetStatusReq {
    #[serde(alias = "uploadId")]
    pub upload_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetArtifactReq {
    #[serde(alias = "uploadId")]
    pub upload_id: String,
    pub name: String,
}

/// Content of a single artifact as returned by `GetArtifact`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactContent {
    #[serde(default, with = "super::base64_bytes")]
    pub content: Vec<u8>,
}

/// Server-side ingestion state of an upload.
///
/// `InProgress` and `Error` are polled again; the rest end polling.
/// Unrecognised values map to `Unknown`, which is a terminal failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingStatus {
    #[default]
    Unknown,
    InProgress,
    Error,
    Done,
    AssetExists,
}

impl ProcessingStatus {
    pub fn from_name(name: &str) -> Self {
        match name {
            "IN_PROGRESS" => ProcessingStatus::InProgress,
            "ERROR" => ProcessingStatus::Error,
            "DONE" => ProcessingStatus::Done,
            "ASSET_EXISTS" => ProcessingStatus::AssetExists,
            _ => ProcessingStatus::Unknown,
        }
    }

    /// Enum number as used by the binary encoding of the service.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => ProcessingStatus::InProgress,
            2 => ProcessingStatus::Error,
            3 => ProcessingStatus::Done,
            4 => ProcessingStatus::AssetExists,
            _ => ProcessingStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Unknown => "UNKNOWN",
            ProcessingStatus::InProgress => "IN_PROGRESS",
            ProcessingStatus::Error => "ERROR",
            ProcessingStatus::Done => "DONE",
            ProcessingStatus::AssetExists => "ASSET_EXISTS",
        }
    }

    /// Whether polling stops at this status.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            ProcessingStatus::InProgress | ProcessingStatus::Error
        )
    }

    /// Terminal statuses that carry a manifest.
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessingStatus::Done | ProcessingStatus::AssetExists)
    }
}

impl Display for ProcessingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProcessingStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Name(String),
            Code(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Name(name) => ProcessingStatus::from_name(&name),
            Raw::Code(code) => ProcessingStatus::from_code(code),
        })
    }
}

/// Response of `GetStatus`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: ProcessingStatus,
    #[serde(default)]
    pub manifest: Option<Manifest>,
    #[serde(default)]
    pub message: String,
}
