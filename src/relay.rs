//! Upload relay HTTP service
//!
//! Accepts one multipart file per request on `POST /upload`, forwards it to
//! the pinning provider and answers with the public gateway URL.

use crate::config::Config;
use crate::models::{base_name, FileUpload, HealthResponse, RelayResponse};
use crate::pinning::{gateway_url, PinataClient, PinningService};
use crate::{Error, Result};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

const FILE_FIELD: &str = "file";

/// Shared, read-only handler state. Nothing in here is mutated per request.
#[derive(Clone)]
pub struct RelayState {
    pub pinning: Arc<dyn PinningService>,
    pub gateway_url: String,
}

impl RelayState {
    pub fn new(pinning: Arc<dyn PinningService>, gateway_url: String) -> Self {
        Self {
            pinning,
            gateway_url,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(PinataClient::from_config(config)),
            config.gateway_url.clone(),
        )
    }
}

pub fn router(state: RelayState) -> Router {
    Router::new()
        .route(
            "/upload",
            post(upload).layer(DefaultBodyLimit::disable()),
        )
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn upload(
    State(state): State<RelayState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<RelayResponse>> {
    let multipart = multipart.map_err(|e| {
        debug!("Rejected non-multipart upload: {}", e);
        file_missing()
    })?;

    let upload = read_file_field(multipart).await?;
    info!(
        "Received {} ({} bytes), forwarding to pinning provider",
        upload.file_name,
        upload.data.len()
    );

    let cid = state.pinning.pin_file(upload).await?;
    let ipfs_url = gateway_url(&state.gateway_url, &cid);
    info!("Pinned as {}", ipfs_url);

    Ok(Json(RelayResponse::Success { ipfs_url }))
}

/// Pull the first field named `file` out of the form, skipping any others.
async fn read_file_field(mut multipart: Multipart) -> Result<FileUpload> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(file_missing()),
            Err(e) => {
                debug!("Failed to parse multipart body: {}", e);
                return Err(file_missing());
            }
        };

        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        // A `file` field without a filename is a plain value, not an upload.
        let file_name = match field.file_name().filter(|name| !name.is_empty()) {
            Some(name) => base_name(Path::new(name)),
            None => {
                debug!("Skipping value-only `file` field");
                continue;
            }
        };

        let data = field.bytes().await.map_err(|e| {
            warn!("Failed to read uploaded file {}: {}", file_name, e);
            Error::Internal("File open failed".to_string())
        })?;

        return Ok(FileUpload { file_name, data });
    }
}

fn file_missing() -> Error {
    Error::BadRequest("File missing".to_string())
}

/// A relay whose listener is already bound. Binding is the readiness signal:
/// once `bind` returns, connections are accepted (and queued until `serve`).
pub struct Relay {
    listener: TcpListener,
    router: Router,
}

impl Relay {
    pub async fn bind(addr: &str, state: RelayState) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            router: router(state),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn serve<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("Relay listening on http://{}", self.local_addr()?);
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("Relay stopped");
        Ok(())
    }
}
