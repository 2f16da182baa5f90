//! Artifact retrieval for processed uploads.

use anyhow::{Context, Result};

use crate::files::Files;
use crate::upload::UploadOutcome;
use cca_core::{GetArtifactReq, Manifest};

/// Content of the first artifact of `artifact_type` in `manifest`.
///
/// Inline content is returned as is; otherwise it is fetched with
/// `GetArtifact` under `id` (the upload id, or the asset UUID for
/// deduplicated uploads). `Ok(None)` when the manifest has no such artifact.
pub async fn fetch_artifact<F>(
    files: &F,
    id: &str,
    manifest: &Manifest,
    artifact_type: &str,
) -> Result<Option<Vec<u8>>>
where
    F: Files + ?Sized,
{
    let Some(artifact) = manifest.artifact(artifact_type) else {
        return Ok(None);
    };

    if !artifact.content.is_empty() {
        return Ok(Some(artifact.content.clone()));
    }

    let res = files
        .get_artifact(GetArtifactReq {
            upload_id: id.to_string(),
            name: artifact.name.clone(),
        })
        .await
        .with_context(|| format!("Failed to get artifact {}", artifact.name))?;

    Ok(Some(res.content))
}

impl UploadOutcome {
    /// Fetch an artifact of this upload's manifest. See [`fetch_artifact`].
    pub async fn fetch_artifact<F>(&self, files: &F, artifact_type: &str) -> Result<Option<Vec<u8>>>
    where
        F: Files + ?Sized,
    {
        fetch_artifact(files, &self.id, &self.manifest, artifact_type).await
    }
}
