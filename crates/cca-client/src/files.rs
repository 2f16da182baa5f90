//! Remote files service capability
//!
//! The three operations the upload workflow needs from the service. Any
//! transport can provide them: the HTTP client in this crate, a generated RPC
//! stub, or an in-process fake.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use cca_core::{
    ArtifactContent, CreateUploadReq, GetArtifactReq, GetStatusReq, StatusResponse, UploadTarget,
};

#[async_trait]
pub trait Files: Send + Sync {
    /// Reserve a new upload and get its one-time write URL.
    async fn create_upload(&self, req: CreateUploadReq) -> Result<UploadTarget>;

    /// Current processing status of an upload, with the manifest once processed.
    async fn get_status(&self, req: GetStatusReq) -> Result<StatusResponse>;

    /// Fetch the content of a named artifact.
    async fn get_artifact(&self, req: GetArtifactReq) -> Result<ArtifactContent>;
}

#[async_trait]
impl<T: Files + ?Sized> Files for Arc<T> {
    async fn create_upload(&self, req: CreateUploadReq) -> Result<UploadTarget> {
        (**self).create_upload(req).await
    }

    async fn get_status(&self, req: GetStatusReq) -> Result<StatusResponse> {
        (**self).get_status(req).await
    }

    async fn get_artifact(&self, req: GetArtifactReq) -> Result<ArtifactContent> {
        (**self).get_artifact(req).await
    }
}
