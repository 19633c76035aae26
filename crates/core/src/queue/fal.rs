//! fal.ai queue client implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::QueueConfig;

use super::{JobStatus, QueueClient, QueueClientError, ResultDescriptor};

/// fal.ai queue client implementation.
///
/// Job creation goes to `{base_url}/{model_path}`; status, result and cancel
/// live under `{base_url}/{requests_path}/requests/{request_id}`. Every call
/// carries its own timeout; TLS uses standard certificate validation.
pub struct FalQueueClient {
    client: Client,
    config: QueueConfig,
    credential: String,
}

impl FalQueueClient {
    /// Create a new fal.ai queue client.
    pub fn new(config: QueueConfig, credential: impl Into<String>) -> Self {
        let client = Client::builder()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config,
            credential: credential.into(),
        }
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn submit_url(&self) -> String {
        format!("{}/{}", self.base_url(), self.config.model_path.trim_matches('/'))
    }

    fn status_url(&self, request_id: &str) -> String {
        format!(
            "{}/{}/requests/{}/status",
            self.base_url(),
            self.config.requests_path.trim_matches('/'),
            request_id
        )
    }

    fn result_url(&self, request_id: &str) -> String {
        format!(
            "{}/{}/requests/{}",
            self.base_url(),
            self.config.requests_path.trim_matches('/'),
            request_id
        )
    }

    fn cancel_url(&self, request_id: &str) -> String {
        format!(
            "{}/{}/requests/{}/cancel",
            self.base_url(),
            self.config.requests_path.trim_matches('/'),
            request_id
        )
    }

    fn auth_header(&self) -> String {
        format!("Key {}", self.credential)
    }

    /// One job-creation attempt, no retry.
    async fn try_submit(&self, prompt: &str) -> Result<String, QueueClientError> {
        let body = SubmitBody {
            prompt,
            image_size: &self.config.generation.image_size,
            num_images: self.config.generation.num_images,
            output_format: &self.config.generation.output_format,
            num_inference_steps: self.config.generation.num_inference_steps,
            guidance_scale: self.config.generation.guidance_scale,
        };

        let response = self
            .client
            .post(self.submit_url())
            .timeout(Duration::from_secs(self.config.submit_timeout_secs as u64))
            .header("Authorization", self.auth_header())
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        let parsed: SubmitResponse = read_json(response).await?;
        Ok(parsed.request_id)
    }
}

/// Job-creation request body.
#[derive(Debug, Serialize)]
struct SubmitBody<'a> {
    prompt: &'a str,
    image_size: &'a str,
    num_images: u32,
    output_format: &'a str,
    num_inference_steps: u32,
    guidance_scale: f64,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    request_id: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
struct ResultResponse {
    #[serde(default)]
    images: Vec<ImageEntry>,
}

#[derive(Debug, Deserialize)]
struct ImageEntry {
    url: String,
}

/// Map a reqwest send error to the client error taxonomy.
fn map_send_error(e: reqwest::Error) -> QueueClientError {
    if e.is_timeout() {
        QueueClientError::Timeout
    } else if e.is_connect() {
        QueueClientError::ConnectionFailed(e.to_string())
    } else {
        QueueClientError::ApiError(e.to_string())
    }
}

/// Check the HTTP status and decode a JSON body.
///
/// 4xx surfaces as a rejection (not retried), any other non-success as an
/// API error; a body that fails to decode is a malformed response.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, QueueClientError> {
    let status = response.status();

    if status.is_client_error() {
        let body = response.text().await.unwrap_or_default();
        return Err(QueueClientError::RequestRejected {
            status: status.as_u16(),
            message: body.chars().take(200).collect::<String>(),
        });
    }

    if !status.is_success() {
        return Err(QueueClientError::ApiError(format!("HTTP {}", status)));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| QueueClientError::MalformedResponse(e.to_string()))
}

#[async_trait]
impl QueueClient for FalQueueClient {
    fn name(&self) -> &str {
        "fal"
    }

    async fn submit(&self, prompt: &str) -> Result<String, QueueClientError> {
        let attempts = self.config.submit_attempts.max(1);
        let mut backoff = Duration::from_millis(self.config.submit_backoff_ms);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.try_submit(prompt).await {
                Ok(request_id) => {
                    debug!(request_id = %request_id, "Job submitted");
                    return Ok(request_id);
                }
                Err(e) if e.is_transient() && attempt < attempts => {
                    warn!(
                        "Job submission attempt {}/{} failed: {}, retrying in {:?}",
                        attempt, attempts, e, backoff
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn status(&self, request_id: &str) -> Result<JobStatus, QueueClientError> {
        let response = self
            .client
            .get(self.status_url(request_id))
            .timeout(Duration::from_secs(self.config.status_timeout_secs as u64))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(map_send_error)?;

        let parsed: StatusResponse = read_json(response).await?;
        Ok(JobStatus::from_remote(&parsed.status))
    }

    async fn result(&self, request_id: &str) -> Result<ResultDescriptor, QueueClientError> {
        let response = self
            .client
            .get(self.result_url(request_id))
            .timeout(Duration::from_secs(self.config.status_timeout_secs as u64))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(map_send_error)?;

        let parsed: ResultResponse = read_json(response).await?;
        let first = parsed.images.into_iter().next().ok_or_else(|| {
            QueueClientError::MalformedResponse("result contained no images".to_string())
        })?;

        Ok(ResultDescriptor {
            image_url: first.url,
        })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, QueueClientError> {
        let response = self
            .client
            .get(url)
            .timeout(Duration::from_secs(
                self.config.download_timeout_secs as u64,
            ))
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(QueueClientError::ApiError(format!("HTTP {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| QueueClientError::ApiError(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    async fn cancel(&self, request_id: &str) -> Result<(), QueueClientError> {
        let response = self
            .client
            .put(self.cancel_url(request_id))
            .timeout(Duration::from_secs(self.config.status_timeout_secs as u64))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(QueueClientError::ApiError(format!("HTTP {}", status)));
        }

        Ok(())
    }
}
