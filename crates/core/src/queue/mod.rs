//! Remote inference queue abstraction.
//!
//! This module provides a `QueueClient` trait for the queue-based image
//! generation API: job creation, status polling, result retrieval, artifact
//! download and best-effort cancellation.

mod fal;

pub use fal::FalQueueClient;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the remote queue.
#[derive(Debug, Error)]
pub enum QueueClientError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request rejected: HTTP {status}: {message}")]
    RequestRejected { status: u16, message: String },

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Request timeout")]
    Timeout,
}

impl QueueClientError {
    /// Whether a retry could plausibly succeed. Rejections (4xx) and
    /// malformed bodies will not get better on a second attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            QueueClientError::ConnectionFailed(_)
                | QueueClientError::Timeout
                | QueueClientError::ApiError(_)
        )
    }
}

/// Status of a remote job, collapsed to what the client acts on: only
/// `Completed` is terminal, every other value means keep polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Waiting in the remote queue.
    Queued,
    /// Being processed.
    InProgress,
    /// Output is ready to fetch.
    Completed,
    /// Any status token this client does not know.
    Other(String),
}

impl JobStatus {
    /// Parse the remote status vocabulary.
    pub fn from_remote(raw: &str) -> Self {
        match raw {
            "IN_QUEUE" => JobStatus::Queued,
            "IN_PROGRESS" => JobStatus::InProgress,
            "COMPLETED" => JobStatus::Completed,
            other => JobStatus::Other(other.to_string()),
        }
    }

    /// The single terminal success state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed)
    }

    /// String form for logging.
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Other(raw) => raw,
        }
    }
}

/// Where a completed job's output lives. Consumed immediately, never stored.
#[derive(Debug, Clone)]
pub struct ResultDescriptor {
    /// URL of the generated image.
    pub image_url: String,
}

/// Client for a queue-based inference API.
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Backend name (for logging).
    fn name(&self) -> &str;

    /// Create one generation job; returns the remote request id.
    async fn submit(&self, prompt: &str) -> Result<String, QueueClientError>;

    /// Query the current status of a job.
    async fn status(&self, request_id: &str) -> Result<JobStatus, QueueClientError>;

    /// Fetch the result descriptor of a completed job.
    async fn result(&self, request_id: &str) -> Result<ResultDescriptor, QueueClientError>;

    /// Download the artifact bytes. No credential is sent.
    async fn download(&self, url: &str) -> Result<Vec<u8>, QueueClientError>;

    /// Ask the remote queue to stop working on a job.
    async fn cancel(&self, request_id: &str) -> Result<(), QueueClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_remote() {
        assert_eq!(JobStatus::from_remote("IN_QUEUE"), JobStatus::Queued);
        assert_eq!(JobStatus::from_remote("IN_PROGRESS"), JobStatus::InProgress);
        assert_eq!(JobStatus::from_remote("COMPLETED"), JobStatus::Completed);
        assert_eq!(
            JobStatus::from_remote("CANCELLED"),
            JobStatus::Other("CANCELLED".to_string())
        );
    }

    #[test]
    fn test_only_completed_is_terminal() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::InProgress.is_terminal());
        assert!(!JobStatus::Other("FAILED".to_string()).is_terminal());
    }

    #[test]
    fn test_error_transience() {
        assert!(QueueClientError::Timeout.is_transient());
        assert!(QueueClientError::ConnectionFailed("refused".into()).is_transient());
        assert!(QueueClientError::ApiError("HTTP 503".into()).is_transient());
        assert!(!QueueClientError::RequestRejected {
            status: 422,
            message: "bad prompt".into()
        }
        .is_transient());
        assert!(!QueueClientError::MalformedResponse("missing request_id".into()).is_transient());
    }
}
