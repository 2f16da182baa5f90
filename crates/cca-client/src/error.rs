//! Upload error types
//!
//! Every variant raised after `CreateUpload` succeeded carries the upload id
//! so callers can correlate with server-side state.

use std::time::Duration;
use thiserror::Error;

use cca_core::ProcessingStatus;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to create upload: {0}")]
    CreateUpload(#[source] anyhow::Error),

    #[error("failed to open upload source: {0}")]
    Source(#[source] std::io::Error),

    #[error("failed to create upload request for {upload_id}: {source}")]
    BuildRequest {
        upload_id: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to perform upload request for {upload_id}: {source}")]
    Transfer {
        upload_id: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("server responded with {status} for upload {upload_id}: {body}")]
    TransferRejected {
        upload_id: String,
        status: u16,
        body: String,
    },

    #[error("failed to check upload status for {upload_id}: {source}")]
    StatusCheck {
        upload_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("unknown status returned for upload {upload_id}: {message}")]
    UnknownStatus { upload_id: String, message: String },

    #[error("upload handling failed for {upload_id}: {message}")]
    ProcessingFailed { upload_id: String, message: String },

    #[error("upload {upload_id} reported {status} without a manifest")]
    MissingManifest {
        upload_id: String,
        status: ProcessingStatus,
    },

    #[error("upload cancelled")]
    Cancelled { upload_id: Option<String> },

    #[error("upload {upload_id} not processed after {elapsed:?}")]
    PollTimeout {
        upload_id: String,
        elapsed: Duration,
    },
}

impl UploadError {
    /// Upload id issued by the service, if the failure happened after creation.
    pub fn upload_id(&self) -> Option<&str> {
        match self {
            UploadError::CreateUpload(_) | UploadError::Source(_) => None,
            UploadError::Cancelled { upload_id } => upload_id.as_deref(),
            UploadError::BuildRequest { upload_id, .. }
            | UploadError::Transfer { upload_id, .. }
            | UploadError::TransferRejected { upload_id, .. }
            | UploadError::StatusCheck { upload_id, .. }
            | UploadError::UnknownStatus { upload_id, .. }
            | UploadError::ProcessingFailed { upload_id, .. }
            | UploadError::MissingManifest { upload_id, .. }
            | UploadError::PollTimeout { upload_id, .. } => Some(upload_id),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, UploadError::Cancelled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_failure_has_no_upload_id() {
        let err = UploadError::CreateUpload(anyhow::anyhow!("connection refused"));
        assert!(err.upload_id().is_none());
        assert!(err.to_string().contains("failed to create upload"));
    }

    #[test]
    fn later_failures_expose_upload_id() {
        let err = UploadError::TransferRejected {
            upload_id: "upload-123".to_string(),
            status: 403,
            body: "expired".to_string(),
        };
        assert_eq!(err.upload_id(), Some("upload-123"));
        assert!(err.to_string().contains("403"));

        let err = UploadError::UnknownStatus {
            upload_id: "upload-123".to_string(),
            message: String::new(),
        };
        assert_eq!(err.upload_id(), Some("upload-123"));
    }

    #[test]
    fn cancellation_keeps_optional_upload_id() {
        let before_create = UploadError::Cancelled { upload_id: None };
        assert!(before_create.is_cancelled());
        assert!(before_create.upload_id().is_none());

        let while_polling = UploadError::Cancelled {
            upload_id: Some("upload-123".to_string()),
        };
        assert_eq!(while_polling.upload_id(), Some("upload-123"));
    }
}
