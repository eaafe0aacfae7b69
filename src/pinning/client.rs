use super::PinningService;
use crate::config::Config;
use crate::models::{FileUpload, PinataResponse};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};

const PIN_FILE_PATH: &str = "/pinning/pinFileToIPFS";

pub struct PinataClient {
    client: Client,
    api_key: String,
    secret_api_key: String,
    base_url: String,
}

impl PinataClient {
    pub fn new(api_key: String, secret_api_key: String, base_url: String) -> Self {
        Self::new_with_client(api_key, secret_api_key, base_url, Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        secret_api_key: String,
        base_url: String,
        client: Client,
    ) -> Self {
        Self {
            client,
            api_key,
            secret_api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.pinata_api_key.clone(),
            config.pinata_secret_api_key.clone(),
            config.pinata_api_url.clone(),
        )
    }
}

#[async_trait]
impl PinningService for PinataClient {
    async fn pin_file(&self, upload: FileUpload) -> Result<String> {
        tracing::debug!(
            "Pinning {} ({} bytes) to Pinata",
            upload.file_name,
            upload.data.len()
        );

        let length = upload.data.len() as u64;
        let part = Part::stream_with_length(upload.data, length).file_name(upload.file_name);
        let form = Form::new().part("file", part);

        let url = format!("{}{}", self.base_url, PIN_FILE_PATH);
        let response = self
            .client
            .post(&url)
            .header("pinata_api_key", &self.api_key)
            .header("pinata_secret_api_key", &self.secret_api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Pinata: {}", e);
                e
            })?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            tracing::error!("Pinata API error (status {}): {}", status, body);
            return Err(Error::Upstream(body));
        }

        let parsed: PinataResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Pinata response: {}\nBody: {}", e, body);
            Error::InvalidResponse(e.to_string())
        })?;

        Ok(parsed.ipfs_hash)
    }
}
