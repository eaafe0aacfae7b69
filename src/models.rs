//! Data models and structures
//!
//! Defines the upload payload handed to the pinning provider and the JSON
//! shapes exchanged with the provider and with relay clients.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single named file received by the relay.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub data: Bytes,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            data: data.into(),
        }
    }
}

/// Final path component, or the whole input when there is none (e.g. `..`).
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// Pinata API response model
#[derive(Debug, Clone, Deserialize)]
pub struct PinataResponse {
    #[serde(rename = "IpfsHash")]
    pub ipfs_hash: String,
}

/// Body returned by `POST /upload`: exactly one of `ipfs_url` or `error`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RelayResponse {
    Success { ipfs_url: String },
    Failure { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
}
