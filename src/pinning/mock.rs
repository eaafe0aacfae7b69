use super::PinningService;
use crate::models::FileUpload;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// In-memory pinning service that records uploads and returns a fixed CID.
#[derive(Clone)]
pub struct MockPinningClient {
    cid: String,
    failure: Option<String>,
    uploads: Arc<Mutex<Vec<FileUpload>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockPinningClient {
    pub fn new() -> Self {
        Self {
            cid: "QmMockCid".to_string(),
            failure: None,
            uploads: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_cid(mut self, cid: String) -> Self {
        self.cid = cid;
        self
    }

    /// Make every call fail as if the provider returned this body with a non-200 status.
    pub fn with_upstream_failure(mut self, body: String) -> Self {
        self.failure = Some(body);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn get_uploads(&self) -> Vec<FileUpload> {
        self.uploads.lock().unwrap().clone()
    }
}

impl Default for MockPinningClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PinningService for MockPinningClient {
    async fn pin_file(&self, upload: FileUpload) -> Result<String> {
        *self.call_count.lock().unwrap() += 1;
        self.uploads.lock().unwrap().push(upload);

        match &self.failure {
            Some(body) => Err(Error::Upstream(body.clone())),
            None => Ok(self.cid.clone()),
        }
    }
}
