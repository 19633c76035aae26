//! Batch runner implementation.
//!
//! Drives work items through the two-phase batch:
//! - Submit: sequential, one job-creation call per item, fixed delay between
//!   submissions (the remote queue works on all jobs concurrently)
//! - Poll/retrieve: sequential, in submission order

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::artifact::write_artifact;
use crate::catalog::SubjectCatalog;
use crate::queue::QueueClient;

use super::config::BatchConfig;
use super::types::{BatchReport, ItemOutcome, ItemResult, JobHandle, PollOutcome, WorkItem};

/// The batch runner - submits every work item, then polls and retrieves each
/// job in submission order. Per-item failures never abort the batch.
pub struct BatchRunner {
    config: BatchConfig,
    client: Arc<dyn QueueClient>,
}

impl BatchRunner {
    /// Create a new batch runner.
    pub fn new(config: BatchConfig, client: Arc<dyn QueueClient>) -> Self {
        Self { config, client }
    }

    /// Run a batch for the given selection of subject identifiers. An empty
    /// selection runs every subject in the catalog.
    pub async fn run(&self, catalog: &SubjectCatalog, selection: &[String]) -> BatchReport {
        let start = Instant::now();

        let items = self.build_worklist(catalog, selection);
        info!(
            "Submitting {} generation jobs via {}",
            items.len(),
            self.client.name()
        );

        let mut results = Vec::with_capacity(items.len());
        let handles = self.submit_all(&items, &mut results).await;

        info!("{} jobs submitted, polling for results", handles.len());

        for handle in &handles {
            let outcome = self.retrieve(handle).await;
            match &outcome {
                ItemOutcome::Written { bytes } => info!(
                    "Subject [{}]: OK, {} bytes saved to {}",
                    handle.identifier,
                    bytes,
                    handle.output_path.display()
                ),
                ItemOutcome::TimedOut => warn!(
                    "Subject [{}]: timed out after {} polls",
                    handle.identifier, self.config.max_poll_attempts
                ),
                ItemOutcome::Failed { reason } => {
                    warn!("Subject [{}]: failed: {}", handle.identifier, reason)
                }
                ItemOutcome::SubmitFailed { .. } => {}
            }
            results.push(ItemResult {
                identifier: handle.identifier.clone(),
                outcome,
            });
        }

        let report = BatchReport {
            items: results,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            "Batch finished: {}/{} succeeded in {} ms",
            report.succeeded(),
            report.attempted(),
            report.duration_ms
        );
        report
    }

    /// Resolve the selection against the catalog. Unknown identifiers are
    /// skipped with a warning; they never become work items.
    fn build_worklist(&self, catalog: &SubjectCatalog, selection: &[String]) -> Vec<WorkItem> {
        let ids: Vec<String> = if selection.is_empty() {
            catalog.ids()
        } else {
            selection.to_vec()
        };

        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(spec) = catalog.get(&id) else {
                warn!("Unknown subject: {}, skipping", id);
                continue;
            };
            items.push(WorkItem {
                prompt: catalog.full_prompt(spec),
                output_path: catalog.output_path(
                    spec,
                    &self.config.output_root,
                    &self.config.file_name,
                ),
                identifier: id,
            });
        }
        items
    }

    /// Submit every work item in order, collecting handles for the poll
    /// phase. A failed submission records its outcome and drops the item.
    async fn submit_all(
        &self,
        items: &[WorkItem],
        results: &mut Vec<ItemResult>,
    ) -> Vec<JobHandle> {
        let mut handles = Vec::with_capacity(items.len());

        for (idx, item) in items.iter().enumerate() {
            if idx > 0 && self.config.submit_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.submit_delay_ms)).await;
            }

            info!("Subject [{}]: submitting", item.identifier);
            match self.client.submit(&item.prompt).await {
                Ok(request_id) => handles.push(JobHandle {
                    identifier: item.identifier.clone(),
                    request_id,
                    output_path: item.output_path.clone(),
                }),
                Err(e) => {
                    warn!("Subject [{}]: submission failed: {}", item.identifier, e);
                    results.push(ItemResult {
                        identifier: item.identifier.clone(),
                        outcome: ItemOutcome::SubmitFailed {
                            reason: e.to_string(),
                        },
                    });
                }
            }
        }

        handles
    }

    /// Poll one job to its terminal state, then fetch and persist the
    /// artifact. A local timeout sends a best-effort cancel upstream so the
    /// abandoned job stops consuming quota.
    async fn retrieve(&self, handle: &JobHandle) -> ItemOutcome {
        match self.poll(handle).await {
            PollOutcome::Complete => {}
            PollOutcome::TimedOut => {
                if let Err(e) = self.client.cancel(&handle.request_id).await {
                    warn!(
                        "Subject [{}]: cancel request failed: {}",
                        handle.identifier, e
                    );
                }
                return ItemOutcome::TimedOut;
            }
        }

        match self.fetch_and_store(handle).await {
            Ok(bytes) => ItemOutcome::Written { bytes },
            Err(reason) => ItemOutcome::Failed { reason },
        }
    }

    /// The polling loop: one status query per iteration, up to the
    /// configured ceiling. A failed query spends an attempt and polling
    /// continues; only the terminal status exits early.
    async fn poll(&self, handle: &JobHandle) -> PollOutcome {
        for attempt in 1..=self.config.max_poll_attempts {
            match self.client.status(&handle.request_id).await {
                Ok(status) if status.is_terminal() => {
                    debug!(
                        "Subject [{}]: completed after {} polls",
                        handle.identifier, attempt
                    );
                    return PollOutcome::Complete;
                }
                Ok(status) => debug!(
                    "Subject [{}]: status {} (attempt {}/{})",
                    handle.identifier,
                    status.as_str(),
                    attempt,
                    self.config.max_poll_attempts
                ),
                Err(e) => warn!(
                    "Subject [{}]: status query failed: {} (attempt {}/{})",
                    handle.identifier, e, attempt, self.config.max_poll_attempts
                ),
            }

            if attempt < self.config.max_poll_attempts && self.config.poll_interval_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.poll_interval_ms)).await;
            }
        }

        PollOutcome::TimedOut
    }

    /// One result call, one download, one write.
    async fn fetch_and_store(&self, handle: &JobHandle) -> Result<u64, String> {
        let descriptor = self
            .client
            .result(&handle.request_id)
            .await
            .map_err(|e| format!("result retrieval failed: {}", e))?;

        let bytes = self
            .client
            .download(&descriptor.image_url)
            .await
            .map_err(|e| format!("download failed: {}", e))?;

        write_artifact(&handle.output_path, &bytes)
            .await
            .map_err(|e| e.to_string())
    }
}
