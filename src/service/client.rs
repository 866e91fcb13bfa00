/// HTTP client for the conversion / upload service.
///
/// Three calls, all independent:
/// - `convert`: POST one file (multipart field `file`), get back a preview URL
/// - `submit`: POST the whole batch, any 2xx is success
/// - `fetch_artifact`: GET the converted preview image for display
///
/// The client is cheap to clone; reqwest pools connections internally.

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::batch::{BatchField, BatchRequest};
use crate::config::AppConfig;
use crate::error::ServiceError;
use crate::state::data::FilePayload;

#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: reqwest::Client,
    convert_url: Url,
    upload_url: Url,
}

/// Body returned by the conversion endpoint
#[derive(Debug, Deserialize)]
struct ConvertResponse {
    #[serde(rename = "imageUrl")]
    image_url: Option<String>,
}

impl ServiceClient {
    pub fn new(config: &AppConfig) -> Result<Self, ServiceError> {
        let convert_url = parse_url(&config.convert_url)?;
        let upload_url = parse_url(&config.upload_url)?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("print-desk/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ServiceError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            convert_url,
            upload_url,
        })
    }

    /// Upload one file for conversion and return the absolute preview URL
    pub async fn convert(&self, payload: FilePayload) -> Result<String, ServiceError> {
        let form = Form::new().part("file", file_part(&payload)?);

        let response = self
            .http
            .post(self.convert_url.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let url = parse_convert_response(&self.convert_url, &body)?;
        tracing::info!("Converted {} -> {}", payload.name, url);
        Ok(url)
    }

    /// Send the whole batch in one multipart request
    pub async fn submit(&self, batch: BatchRequest) -> Result<(), ServiceError> {
        let count = batch.len();
        let form = build_form(&batch)?;

        let response = self
            .http
            .post(self.upload_url.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status(status.as_u16()));
        }

        tracing::info!("Uploaded batch of {} files ({})", count, status);
        Ok(())
    }

    /// Download the converted preview image
    pub async fn fetch_artifact(&self, url: String) -> Result<Vec<u8>, ServiceError> {
        let url = parse_url(&url)?;
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

fn parse_url(raw: &str) -> Result<Url, ServiceError> {
    Url::parse(raw).map_err(|e| ServiceError::InvalidUrl(format!("{}: {}", raw, e)))
}

fn file_part(payload: &FilePayload) -> Result<Part, ServiceError> {
    Part::bytes(payload.bytes.to_vec())
        .file_name(payload.name.clone())
        .mime_str(&payload.mime)
        .map_err(|e| ServiceError::InvalidResponse(format!("Bad MIME type {}: {}", payload.mime, e)))
}

fn build_form(batch: &BatchRequest) -> Result<Form, ServiceError> {
    let mut form = Form::new();
    for field in batch.fields() {
        form = match field {
            BatchField::File { name, payload } => form.part(name, file_part(&payload)?),
            BatchField::Text { name, value } => form.text(name, value),
        };
    }
    Ok(form)
}

/// Extract the preview URL from a conversion response body.
/// Relative URLs are resolved against the conversion endpoint.
pub fn parse_convert_response(endpoint: &Url, body: &str) -> Result<String, ServiceError> {
    let response: ConvertResponse =
        serde_json::from_str(body).map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;

    let raw = response
        .image_url
        .filter(|url| !url.trim().is_empty())
        .ok_or(ServiceError::MissingUrl)?;

    resolve_artifact_url(endpoint, raw.trim())
}

pub fn resolve_artifact_url(endpoint: &Url, returned: &str) -> Result<String, ServiceError> {
    endpoint
        .join(returned)
        .map(|url| url.to_string())
        .map_err(|e| ServiceError::InvalidUrl(format!("{}: {}", returned, e)))
}
