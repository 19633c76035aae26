//! Mock queue client for testing.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::queue::{JobStatus, QueueClient, QueueClientError, ResultDescriptor};

/// Mock implementation of the QueueClient trait.
///
/// Provides controllable behavior for testing:
/// - Record submission attempts for assertions
/// - Script per-job status sequences (including query failures)
/// - Serve configurable artifact bytes
/// - Simulate failures at every step
///
/// Request ids are deterministic (`req-0001`, `req-0002`, ...) counted per
/// submission attempt, so tests can script a job before the batch runs.
///
/// # Example
///
/// ```rust,ignore
/// let client = MockQueueClient::new();
///
/// // Second poll completes, first one is still queued
/// client.script_status_sequence("req-0001", vec![JobStatus::Queued]).await;
///
/// let request_id = client.submit("a portrait").await?;
/// assert_eq!(request_id, "req-0001");
/// assert_eq!(client.status_calls("req-0001").await, 0);
/// ```
#[derive(Debug)]
pub struct MockQueueClient {
    /// Prompts in submission-attempt order, failed attempts included.
    submitted: Arc<RwLock<Vec<String>>>,
    /// Errors keyed by 0-based submission attempt index.
    submit_errors: Arc<RwLock<HashMap<usize, QueueClientError>>>,
    /// Scripted status results per request id, served front to back; a dry
    /// script falls back to the default status.
    statuses: Arc<RwLock<HashMap<String, VecDeque<Result<JobStatus, QueueClientError>>>>>,
    default_status: Arc<RwLock<JobStatus>>,
    status_calls: Arc<RwLock<HashMap<String, u32>>>,
    result_urls: Arc<RwLock<HashMap<String, String>>>,
    result_errors: Arc<RwLock<HashMap<String, QueueClientError>>>,
    result_calls: Arc<RwLock<HashMap<String, u32>>>,
    artifacts: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    download_errors: Arc<RwLock<HashMap<String, QueueClientError>>>,
    download_calls: Arc<RwLock<HashMap<String, u32>>>,
    cancelled: Arc<RwLock<Vec<String>>>,
}

impl Default for MockQueueClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockQueueClient {
    /// Create a new mock queue client. Unscripted jobs report `Completed`
    /// on their first poll.
    pub fn new() -> Self {
        Self {
            submitted: Arc::new(RwLock::new(Vec::new())),
            submit_errors: Arc::new(RwLock::new(HashMap::new())),
            statuses: Arc::new(RwLock::new(HashMap::new())),
            default_status: Arc::new(RwLock::new(JobStatus::Completed)),
            status_calls: Arc::new(RwLock::new(HashMap::new())),
            result_urls: Arc::new(RwLock::new(HashMap::new())),
            result_errors: Arc::new(RwLock::new(HashMap::new())),
            result_calls: Arc::new(RwLock::new(HashMap::new())),
            artifacts: Arc::new(RwLock::new(HashMap::new())),
            download_errors: Arc::new(RwLock::new(HashMap::new())),
            download_calls: Arc::new(RwLock::new(HashMap::new())),
            cancelled: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// All submitted prompts, in attempt order.
    pub async fn submitted_prompts(&self) -> Vec<String> {
        self.submitted.read().await.clone()
    }

    /// Number of submission attempts made so far.
    pub async fn submission_attempts(&self) -> usize {
        self.submitted.read().await.len()
    }

    /// Make the submission attempt at `idx` (0-based) fail.
    pub async fn fail_submit(&self, idx: usize, error: QueueClientError) {
        self.submit_errors.write().await.insert(idx, error);
    }

    /// Script the statuses served for a request id, in order. When the
    /// script runs dry the default status takes over.
    pub async fn script_status_sequence(&self, request_id: &str, sequence: Vec<JobStatus>) {
        let mut statuses = self.statuses.write().await;
        let queue = statuses.entry(request_id.to_string()).or_default();
        queue.extend(sequence.into_iter().map(Ok));
    }

    /// Append a status query failure to a request id's script.
    pub async fn script_status_error(&self, request_id: &str, error: QueueClientError) {
        self.statuses
            .write()
            .await
            .entry(request_id.to_string())
            .or_default()
            .push_back(Err(error));
    }

    /// Status served once a job's script is exhausted. Setting this to a
    /// non-terminal value makes unscripted jobs poll forever.
    pub async fn set_default_status(&self, status: JobStatus) {
        *self.default_status.write().await = status;
    }

    /// Number of status queries made for a request id.
    pub async fn status_calls(&self, request_id: &str) -> u32 {
        self.status_calls
            .read()
            .await
            .get(request_id)
            .copied()
            .unwrap_or(0)
    }

    /// Override the artifact URL returned for a request id.
    pub async fn set_result_url(&self, request_id: &str, url: &str) {
        self.result_urls
            .write()
            .await
            .insert(request_id.to_string(), url.to_string());
    }

    /// Make the next result call for a request id fail.
    pub async fn fail_result(&self, request_id: &str, error: QueueClientError) {
        self.result_errors
            .write()
            .await
            .insert(request_id.to_string(), error);
    }

    /// Number of result calls made for a request id.
    pub async fn result_calls(&self, request_id: &str) -> u32 {
        self.result_calls
            .read()
            .await
            .get(request_id)
            .copied()
            .unwrap_or(0)
    }

    /// Serve specific bytes for an artifact URL.
    pub async fn set_artifact(&self, url: &str, bytes: Vec<u8>) {
        self.artifacts.write().await.insert(url.to_string(), bytes);
    }

    /// Make the next download of a URL fail.
    pub async fn fail_download(&self, url: &str, error: QueueClientError) {
        self.download_errors
            .write()
            .await
            .insert(url.to_string(), error);
    }

    /// Number of downloads of a specific URL.
    pub async fn download_calls(&self, url: &str) -> u32 {
        self.download_calls
            .read()
            .await
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    /// Total downloads across all URLs.
    pub async fn total_download_calls(&self) -> u32 {
        self.download_calls.read().await.values().sum()
    }

    /// Request ids that received a cancel call, in order.
    pub async fn cancelled(&self) -> Vec<String> {
        self.cancelled.read().await.clone()
    }

    /// Default artifact URL for a request id.
    pub fn default_result_url(request_id: &str) -> String {
        format!("https://cdn.mock/{}.png", request_id)
    }
}

#[async_trait]
impl QueueClient for MockQueueClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn submit(&self, prompt: &str) -> Result<String, QueueClientError> {
        let attempt_idx = {
            let mut submitted = self.submitted.write().await;
            submitted.push(prompt.to_string());
            submitted.len() - 1
        };

        if let Some(err) = self.submit_errors.write().await.remove(&attempt_idx) {
            return Err(err);
        }

        Ok(format!("req-{:04}", attempt_idx + 1))
    }

    async fn status(&self, request_id: &str) -> Result<JobStatus, QueueClientError> {
        *self
            .status_calls
            .write()
            .await
            .entry(request_id.to_string())
            .or_insert(0) += 1;

        let scripted = self
            .statuses
            .write()
            .await
            .get_mut(request_id)
            .and_then(|queue| queue.pop_front());

        match scripted {
            Some(result) => result,
            None => Ok(self.default_status.read().await.clone()),
        }
    }

    async fn result(&self, request_id: &str) -> Result<ResultDescriptor, QueueClientError> {
        *self
            .result_calls
            .write()
            .await
            .entry(request_id.to_string())
            .or_insert(0) += 1;

        if let Some(err) = self.result_errors.write().await.remove(request_id) {
            return Err(err);
        }

        let image_url = self
            .result_urls
            .read()
            .await
            .get(request_id)
            .cloned()
            .unwrap_or_else(|| Self::default_result_url(request_id));

        Ok(ResultDescriptor { image_url })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, QueueClientError> {
        *self
            .download_calls
            .write()
            .await
            .entry(url.to_string())
            .or_insert(0) += 1;

        if let Some(err) = self.download_errors.write().await.remove(url) {
            return Err(err);
        }

        let bytes = self
            .artifacts
            .read()
            .await
            .get(url)
            .cloned()
            .unwrap_or_else(|| format!("mock-image-bytes:{}", url).into_bytes());

        Ok(bytes)
    }

    async fn cancel(&self, request_id: &str) -> Result<(), QueueClientError> {
        self.cancelled.write().await.push(request_id.to_string());
        Ok(())
    }
}
