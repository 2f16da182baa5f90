//! CCA Core Library
//!
//! This crate provides the data model exchanged with the content-processing
//! service (upload targets, processing statuses, manifests and artifacts) and
//! the configuration shared by the client crates.

pub mod config;
pub mod models;

// Re-export commonly used types
pub use config::{ClientConfig, ErrorStatusPolicy, PollConfig};
pub use models::{
    Artifact, ArtifactContent, CreateUploadReq, GetArtifactReq, GetStatusReq, Manifest,
    ProcessingStatus, StatusResponse, UploadTarget,
};
