//! Client for a Cloudinary-compatible image host.
use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use sha2::{Digest, Sha256};

use crate::configuration::ImageHostSettings;
use crate::retry::{RetryError, RetryPolicy, Transient, retry_with_backoff};

#[derive(Clone, Debug)]
pub struct ImageHostClient {
    http_client: Client,
    base_url: String,
    cloud_name: String,
    api_key: String,
    api_secret: Secret<String>,
    folder: String,
    retry_policy: RetryPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub url: String,
    pub public_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ImageHostError {
    #[error("Image host request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Image host rejected the request ({status}): {message}")]
    Rejected { status: StatusCode, message: String },
    #[error("Image '{0}' was not found on the image host")]
    NotFound(String),
    #[error("Unexpected image host response: {0}")]
    UnexpectedResponse(String),
}

impl Transient for ImageHostError {
    fn is_transient(&self) -> bool {
        match self {
            // Timeouts and connection failures land here
            ImageHostError::Transport(e) => !e.is_builder() && !e.is_decode(),
            ImageHostError::Rejected { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            ImageHostError::NotFound(_) | ImageHostError::UnexpectedResponse(_) => false,
        }
    }
}

#[derive(serde::Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(serde::Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(serde::Deserialize)]
struct ErrorResponse {
    error: ErrorMessage,
}

#[derive(serde::Deserialize)]
struct ErrorMessage {
    message: String,
}

impl ImageHostClient {
    pub fn new(settings: &ImageHostSettings) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(settings.timeout()).build()?;
        Ok(Self {
            http_client,
            base_url: settings.base_url.trim_end_matches('/').to_owned(),
            cloud_name: settings.cloud_name.clone(),
            api_key: settings.api_key.clone(),
            api_secret: settings.api_secret.clone(),
            folder: settings.folder.clone(),
            retry_policy: settings.retry_policy(),
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/v1_1/{}/image/{}",
            self.base_url, self.cloud_name, action
        )
    }

    /// Multipart form carrying the API key and a signature over `params`.
    fn signed_form(&self, params: &[(&str, String)]) -> Form {
        let signature = sign(params, &self.api_secret);
        params
            .iter()
            .fold(Form::new(), |form, (key, value)| {
                form.text(key.to_string(), value.clone())
            })
            .text("api_key", self.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
    }

    #[tracing::instrument(
        name = "Uploading image",
        skip(self, data),
        fields(size = data.len(), folder = %self.folder)
    )]
    pub async fn upload(
        &self,
        data: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<UploadedImage, RetryError<ImageHostError>> {
        retry_with_backoff(self.retry_policy, || {
            self.upload_once(data.clone(), filename, content_type)
        })
        .await
        .inspect(|image| tracing::info!(public_id = %image.public_id, "Image uploaded"))
        .inspect_err(|e| tracing::error!(error = %e, "Image upload failed"))
    }

    async fn upload_once(
        &self,
        data: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<UploadedImage, ImageHostError> {
        let params = [
            ("folder", self.folder.clone()),
            ("timestamp", Utc::now().timestamp().to_string()),
        ];
        let file = Part::bytes(data)
            .file_name(filename.to_owned())
            .mime_str(content_type)?;
        let form = self.signed_form(&params).part("file", file);

        let response = self
            .http_client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;
        let body: UploadResponse = check_status(response).await?.json().await?;

        Ok(UploadedImage {
            url: body.secure_url,
            public_id: body.public_id,
        })
    }

    #[tracing::instrument(name = "Destroying image", skip(self))]
    pub async fn destroy(&self, public_id: &str) -> Result<(), RetryError<ImageHostError>> {
        retry_with_backoff(self.retry_policy, || self.destroy_once(public_id))
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Image deletion failed"))
    }

    async fn destroy_once(&self, public_id: &str) -> Result<(), ImageHostError> {
        let params = [
            ("public_id", public_id.to_owned()),
            ("timestamp", Utc::now().timestamp().to_string()),
        ];

        let response = self
            .http_client
            .post(self.endpoint("destroy"))
            .multipart(self.signed_form(&params))
            .send()
            .await?;
        let body: DestroyResponse = check_status(response).await?.json().await?;

        match body.result.as_str() {
            "ok" => Ok(()),
            "not found" => Err(ImageHostError::NotFound(public_id.to_owned())),
            other => Err(ImageHostError::UnexpectedResponse(other.to_owned())),
        }
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ImageHostError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|body| body.error.message)
        .unwrap_or(text);
    Err(ImageHostError::Rejected { status, message })
}

/// SHA-256 hex digest of the `key=value` pairs sorted by key and joined
/// with `&`, immediately followed by the API secret.
pub fn sign(params: &[(&str, String)], api_secret: &Secret<String>) -> String {
    let mut sorted: Vec<_> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    let to_sign = sorted
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.expose_secret().as_bytes());
    hex::encode(hasher.finalize())
}

static PUBLIC_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/upload/(?:[a-z]{1,3}_[^/]+/)*(?:v\d+/)?(.+?)\.[A-Za-z0-9]+$")
        .expect("public id pattern is valid")
});

/// Pull the public id out of a delivery URL such as
/// `https://res.cloudinary.com/demo/image/upload/c_fill,w_300/v1712/newsletters/cover.jpg`.
pub fn public_id_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    PUBLIC_ID_PATTERN
        .captures(path)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_owned())
}
