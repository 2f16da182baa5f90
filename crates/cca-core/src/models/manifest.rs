use serde::{Deserialize, Serialize};

/// One derived representation of an uploaded asset (extracted metadata,
/// a rendition, ...). `name` is the key used to fetch its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(rename = "type", default)]
    pub r#type: String,
    #[serde(default)]
    pub name: String,
    /// Inline content, when the service chose to embed it.
    #[serde(
        default,
        with = "super::base64_bytes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub content: Vec<u8>,
}

/// Descriptive record of a fully processed asset.
///
/// Only ever produced from a successful terminal status. Artifact types are
/// not unique: lookups return the first match in manifest order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Asset UUID. Differs from the upload id when the content was deduplicated.
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

impl Manifest {
    /// First artifact whose type equals `artifact_type`, if any.
    pub fn artifact(&self, artifact_type: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.r#type == artifact_type)
    }

    /// All artifacts of the given type, in manifest order.
    pub fn artifacts_of<'a>(
        &'a self,
        artifact_type: &'a str,
    ) -> impl Iterator<Item = &'a Artifact> + 'a {
        self.artifacts
            .iter()
            .filter(move |a| a.r#type == artifact_type)
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}
