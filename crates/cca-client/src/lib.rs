//! Client for the CCA files service.
//!
//! Uploads binary content, waits for the service to ingest it and returns the
//! resulting [`Manifest`]. The remote service is reached through the [`Files`]
//! capability; [`HttpFilesClient`] implements it over the service's JSON RPC
//! endpoints, and tests substitute in-process fakes.

pub mod artifact;
pub mod error;
pub mod files;
pub mod http;
pub mod upload;

pub use artifact::fetch_artifact;
pub use error::UploadError;
pub use files::Files;
pub use http::HttpFilesClient;
pub use upload::{upload, UploadOutcome, Uploader};

// Re-export the shared model so callers only need this crate.
pub use cca_core::{
    Artifact, ArtifactContent, ClientConfig, ErrorStatusPolicy, Manifest, PollConfig,
    ProcessingStatus, StatusResponse, UploadTarget,
};
pub use tokio_util::sync::CancellationToken;
