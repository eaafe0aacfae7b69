//! Pinning provider integration
//!
//! Forwards uploaded files to a third-party pinning service and turns the
//! returned content identifier into a public gateway URL.

pub mod client;
pub mod mock;

pub use client::PinataClient;
pub use mock::MockPinningClient;

use crate::models::FileUpload;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait PinningService: Send + Sync {
    /// Pin a file and return the provider-assigned content identifier.
    async fn pin_file(&self, upload: FileUpload) -> Result<String>;
}

pub fn gateway_url(gateway: &str, cid: &str) -> String {
    format!("{}/{}", gateway.trim_end_matches('/'), cid)
}
