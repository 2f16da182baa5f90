//! Data models for the files service
//!
//! Wire types follow the service's JSON encoding: snake_case field names,
//! upper-snake enum names and `bytes` fields as standard base64.

mod manifest;
mod upload;

pub use manifest::{Artifact, Manifest};
pub use upload::{
    ArtifactContent, CreateUploadReq, GetArtifactReq, GetStatusReq, ProcessingStatus,
    StatusResponse, UploadTarget,
};

/// Serde adapter for `bytes` fields carried as base64 strings.
pub(crate) mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
