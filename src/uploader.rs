//! Interactive uploader
//!
//! Reads file paths from an operator, sends each file to the relay and prints
//! the relay's raw response. Errors are reported and the prompt repeats; only
//! the `exit` command (or end of input) stops the loop.

use crate::config::Config;
use crate::models::base_name;
use crate::{Error, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_retry::strategy::FixedInterval;
use tokio_retry::Retry;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

pub const PROMPT: &str = "Enter the path of the image file (or 'exit' to quit): ";
pub const EXIT_COMMAND: &str = "exit";

pub struct Uploader {
    client: Client,
    relay_url: String,
}

impl Uploader {
    pub fn new(relay_url: String) -> Self {
        Self::new_with_client(relay_url, Client::new())
    }

    pub fn new_with_client(relay_url: String, client: Client) -> Self {
        Self {
            client,
            relay_url: relay_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.relay_url.clone())
    }

    /// Prompt until the operator types `exit`. Per-file failures never end the loop.
    pub async fn run<R, W>(&self, mut input: R, output: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        // Raw bytes: a path does not have to be valid UTF-8.
        let mut line = Vec::new();

        loop {
            write!(output, "{}", PROMPT)?;
            output.flush()?;

            line.clear();
            if input.read_until(b'\n', &mut line).await? == 0 {
                writeln!(output)?;
                debug!("Input closed, stopping uploader");
                break;
            }

            let raw = line.trim_ascii();
            if raw == EXIT_COMMAND.as_bytes() {
                writeln!(output, "Exiting CLI uploader.")?;
                break;
            }

            let path = path_from_bytes(raw);
            let file = match File::open(&path).await {
                Ok(file) => file,
                Err(e) => {
                    writeln!(output, "Error opening file: {}", e)?;
                    continue;
                }
            };

            match self.upload_file(file, &base_name(&path)).await {
                Ok(body) => writeln!(output, "Response from server: {}", body)?,
                Err(e) => writeln!(output, "Upload failed: {}", e)?,
            }
        }

        Ok(())
    }

    pub async fn upload_path(&self, path: &Path) -> Result<String> {
        let file = File::open(path).await?;
        self.upload_file(file, &base_name(path)).await
    }

    /// Stream an open file to the relay and return the response body as-is,
    /// whatever the status code. The handle is dropped with the request body.
    pub async fn upload_file(&self, file: File, file_name: &str) -> Result<String> {
        let length = file.metadata().await?.len();
        info!("Uploading {} ({} bytes)", file_name, length);

        let body = Body::wrap_stream(ReaderStream::new(file));
        let part = Part::stream_with_length(body, length).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/upload", self.relay_url))
            .multipart(form)
            .send()
            .await?;

        debug!("Relay answered with status {}", response.status());
        Ok(response.text().await?)
    }

    /// Poll the relay's health endpoint until it answers or the attempts run out.
    pub async fn wait_for_relay(&self, retries: usize, interval: Duration) -> Result<()> {
        let url = format!("{}/health", self.relay_url);
        let strategy = FixedInterval::new(interval).take(retries);
        let (client, url) = (&self.client, url.as_str());

        Retry::spawn(strategy, move || async move {
            match client.get(url).send().await {
                Ok(response) if response.status().is_success() => Ok(()),
                Ok(response) => {
                    debug!("Relay not ready (status {})", response.status());
                    Err(Error::Internal(format!(
                        "relay health check returned {}",
                        response.status()
                    )))
                }
                Err(e) => {
                    debug!("Relay not reachable yet: {}", e);
                    Err(Error::Http(e))
                }
            }
        })
        .await
        .map_err(|e| {
            warn!("Relay at {} is not reachable: {}", self.relay_url, e);
            e
        })
    }
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    PathBuf::from(OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}
