use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use shared::{
    domain::SelectedImage,
    protocol::{PredictOutcome, PredictResponse},
};
use tracing::{debug, info};
use url::Url;

pub mod config;
pub mod controller;
pub mod error;
pub mod presentation;
pub mod preview;
pub mod progress;
pub mod state;

pub use config::{load_settings, ClientSettings};
pub use controller::{ControllerSettings, NullRenderer, Renderer, ViewStateController};
pub use error::ClientError;
pub use state::ViewSnapshot;

/// Multipart field carrying the image bytes.
pub const UPLOAD_FIELD: &str = "file";

/// Where images are submitted.
///
/// A configured API base path wins and is addressed as `{base}/predict`;
/// otherwise the page-local `/upload` route of `server_url` is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionEndpoint {
    url: Url,
}

impl PredictionEndpoint {
    pub fn resolve(server_url: &str, api_base_url: Option<&str>) -> Result<Self, ClientError> {
        let raw = match api_base_url.map(str::trim).filter(|base| !base.is_empty()) {
            Some(base) => format!("{}/predict", base.trim_end_matches('/')),
            None => format!("{}/upload", server_url.trim().trim_end_matches('/')),
        };
        let url = Url::parse(&raw).map_err(|source| ClientError::InvalidEndpoint {
            url: raw.clone(),
            source,
        })?;
        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
pub trait PredictionClient: Send + Sync {
    /// Submits one image. `Ok` means a JSON body came back, whatever it says;
    /// `Err` means no usable response was obtained.
    async fn predict(&self, image: &SelectedImage) -> Result<PredictOutcome, ClientError>;
}

pub struct HttpPredictionClient {
    http: Client,
    endpoint: PredictionEndpoint,
}

impl HttpPredictionClient {
    pub fn new(endpoint: PredictionEndpoint) -> Self {
        Self {
            http: Client::new(),
            endpoint,
        }
    }

    pub fn with_client(http: Client, endpoint: PredictionEndpoint) -> Self {
        Self { http, endpoint }
    }

    pub fn endpoint(&self) -> &PredictionEndpoint {
        &self.endpoint
    }
}

#[async_trait]
impl PredictionClient for HttpPredictionClient {
    async fn predict(&self, image: &SelectedImage) -> Result<PredictOutcome, ClientError> {
        let part = Part::bytes(image.bytes().to_vec())
            .file_name(image.filename().to_string())
            .mime_str(image.media_type().mime())?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        info!(
            endpoint = %self.endpoint.url(),
            filename = image.filename(),
            size_bytes = image.size_bytes(),
            "submitting image for classification"
        );
        // Error statuses still carry a JSON body describing the failure.
        let response = self
            .http
            .post(self.endpoint.url().clone())
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;
        let parsed: PredictResponse = serde_json::from_slice(&body).map_err(ClientError::Decode)?;
        debug!(%status, success = parsed.success, "prediction response received");

        Ok(parsed.into_outcome())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
