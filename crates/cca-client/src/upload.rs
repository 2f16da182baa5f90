//! Upload orchestration
//!
//! Drives one upload through the service protocol:
//!
//! 1. `CreateUpload` reserves an upload id and a one-time write URL.
//! 2. The bytes are sent with a single `PUT` carrying an explicit `Content-Length`.
//! 3. `GetStatus` is polled until the service reports a terminal status.
//!
//! Every remote call and every wait between polls is raced against the
//! caller's [`CancellationToken`]. There is no internal retry of the create or
//! transfer steps; only non-terminal statuses are waited on.

use reqwest::header::CONTENT_LENGTH;
use reqwest::{Body, Client};
use std::path::Path;
use tokio::io::AsyncRead;
use tokio::time::{sleep, Instant};
use tokio_util::io::ReaderStream;
use tokio_util::sync::CancellationToken;

use crate::error::UploadError;
use crate::files::Files;
use cca_core::{
    CreateUploadReq, ErrorStatusPolicy, GetStatusReq, Manifest, PollConfig, ProcessingStatus,
    UploadTarget,
};

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Identifier to use for follow-up calls: the upload id, or the existing
    /// asset's UUID when the service deduplicated the content.
    pub id: String,
    /// Upload id issued by `CreateUpload`.
    pub upload_id: String,
    pub manifest: Manifest,
    /// The content already existed server-side and no new asset was created.
    pub deduplicated: bool,
}

/// Uploads byte streams and waits for them to be processed.
///
/// Holds no per-upload state, so one `Uploader` can serve concurrent uploads.
#[derive(Debug, Clone)]
pub struct Uploader {
    http: Client,
    config: PollConfig,
}

impl Uploader {
    pub fn new(http: Client, config: PollConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Upload exactly `size` bytes read from `data` and wait for the manifest.
    pub async fn upload<F, R>(
        &self,
        cancel: &CancellationToken,
        files: &F,
        data: R,
        size: u64,
    ) -> Result<UploadOutcome, UploadError>
    where
        F: Files + ?Sized,
        R: AsyncRead + Send + Sync + 'static,
    {
        let target = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(UploadError::Cancelled { upload_id: None }),
            res = files.create_upload(CreateUploadReq::default()) => {
                res.map_err(UploadError::CreateUpload)?
            }
        };

        let upload_id = target.upload_id.clone();
        tracing::info!(upload_id = %upload_id, size, "Upload created, sending content");

        self.transfer(cancel, target, data, size).await?;

        tracing::info!(upload_id = %upload_id, "Content sent, waiting for processing");

        self.wait_for_manifest(cancel, files, upload_id).await
    }

    /// Upload a local file, taking the size from its metadata.
    pub async fn upload_file<F>(
        &self,
        cancel: &CancellationToken,
        files: &F,
        path: impl AsRef<Path>,
    ) -> Result<UploadOutcome, UploadError>
    where
        F: Files + ?Sized,
    {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path)
            .await
            .map_err(UploadError::Source)?;
        let size = file.metadata().await.map_err(UploadError::Source)?.len();

        tracing::debug!(path = %path.display(), size, "Uploading file");

        self.upload(cancel, files, file, size).await
    }

    async fn transfer<R>(
        &self,
        cancel: &CancellationToken,
        target: UploadTarget,
        data: R,
        size: u64,
    ) -> Result<(), UploadError>
    where
        R: AsyncRead + Send + Sync + 'static,
    {
        let UploadTarget {
            upload_id,
            upload_url,
        } = target;

        let request = self
            .http
            .put(upload_url.as_str())
            .header(CONTENT_LENGTH, size)
            .body(Body::wrap_stream(ReaderStream::new(data)))
            .build();
        let request = match request {
            Ok(request) => request,
            Err(source) => return Err(UploadError::BuildRequest { upload_id, source }),
        };

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(UploadError::Cancelled { upload_id: Some(upload_id) })
            }
            res = self.http.execute(request) => match res {
                Ok(response) => response,
                Err(source) => return Err(UploadError::Transfer { upload_id, source }),
            },
        };

        let status = response.status();
        if !status.is_success() {
            let body = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(UploadError::Cancelled { upload_id: Some(upload_id) })
                }
                text = response.text() => text.unwrap_or_default(),
            };
            tracing::warn!(
                upload_id = %upload_id,
                status = status.as_u16(),
                "Upload target rejected content"
            );
            return Err(UploadError::TransferRejected {
                upload_id,
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    async fn wait_for_manifest<F>(
        &self,
        cancel: &CancellationToken,
        files: &F,
        upload_id: String,
    ) -> Result<UploadOutcome, UploadError>
    where
        F: Files + ?Sized,
    {
        let started = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            let res = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(UploadError::Cancelled { upload_id: Some(upload_id) })
                }
                res = files.get_status(GetStatusReq { upload_id: upload_id.clone() }) => res,
            };
            let res = match res {
                Ok(res) => res,
                Err(source) => return Err(UploadError::StatusCheck { upload_id, source }),
            };

            match res.status {
                ProcessingStatus::InProgress => {
                    tracing::debug!(
                        upload_id = %upload_id,
                        attempt = attempt + 1,
                        "Waiting for upload to be processed"
                    );
                }
                ProcessingStatus::Error => match self.config.error_policy {
                    ErrorStatusPolicy::Fail => {
                        return Err(UploadError::ProcessingFailed {
                            upload_id,
                            message: res.message,
                        });
                    }
                    ErrorStatusPolicy::Retry => {
                        tracing::warn!(
                            upload_id = %upload_id,
                            attempt = attempt + 1,
                            message = %res.message,
                            "Service reported processing error, polling again"
                        );
                    }
                },
                ProcessingStatus::Done => {
                    let manifest = res.manifest.ok_or_else(|| UploadError::MissingManifest {
                        upload_id: upload_id.clone(),
                        status: res.status,
                    })?;
                    tracing::info!(
                        upload_id = %upload_id,
                        asset_uuid = %manifest.uuid,
                        artifacts = manifest.artifacts.len(),
                        attempts = attempt + 1,
                        "Upload processed"
                    );
                    return Ok(UploadOutcome {
                        id: upload_id.clone(),
                        upload_id,
                        manifest,
                        deduplicated: false,
                    });
                }
                ProcessingStatus::AssetExists => {
                    let manifest = res.manifest.ok_or_else(|| UploadError::MissingManifest {
                        upload_id: upload_id.clone(),
                        status: res.status,
                    })?;
                    let id = if manifest.uuid.is_empty() {
                        tracing::warn!(
                            upload_id = %upload_id,
                            "Existing asset manifest has no UUID, keeping upload id"
                        );
                        upload_id.clone()
                    } else {
                        manifest.uuid.clone()
                    };
                    tracing::info!(
                        upload_id = %upload_id,
                        asset_uuid = %id,
                        "Content already exists, using existing asset"
                    );
                    return Ok(UploadOutcome {
                        id,
                        upload_id,
                        manifest,
                        deduplicated: true,
                    });
                }
                ProcessingStatus::Unknown => {
                    tracing::warn!(
                        upload_id = %upload_id,
                        message = %res.message,
                        "Unknown status returned for upload"
                    );
                    return Err(UploadError::UnknownStatus {
                        upload_id,
                        message: res.message,
                    });
                }
            }

            let mut delay = self.config.delay_for(attempt);
            if let Some(max) = self.config.max_duration {
                let elapsed = started.elapsed();
                if elapsed >= max {
                    return Err(UploadError::PollTimeout { upload_id, elapsed });
                }
                delay = delay.min(max - elapsed);
            }
            attempt = attempt.saturating_add(1);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(UploadError::Cancelled { upload_id: Some(upload_id) })
                }
                _ = sleep(delay) => {}
            }
        }
    }
}

/// Upload with the default poll policy: a fixed one second interval, no limit.
pub async fn upload<F, R>(
    cancel: &CancellationToken,
    files: &F,
    http: &Client,
    data: R,
    size: u64,
) -> Result<UploadOutcome, UploadError>
where
    F: Files + ?Sized,
    R: AsyncRead + Send + Sync + 'static,
{
    Uploader::new(http.clone(), PollConfig::default())
        .upload(cancel, files, data, size)
        .await
}
