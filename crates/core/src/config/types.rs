use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::batch::BatchConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Remote inference queue configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueConfig {
    /// Queue API base URL (e.g., "https://queue.fal.run")
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model path appended to the base URL for job creation
    #[serde(default = "default_model_path")]
    pub model_path: String,
    /// Queue path under which request status/result/cancel endpoints live
    #[serde(default = "default_requests_path")]
    pub requests_path: String,
    /// Job-creation request timeout in seconds (default: 120)
    #[serde(default = "default_submit_timeout")]
    pub submit_timeout_secs: u32,
    /// Status query timeout in seconds (default: 30)
    #[serde(default = "default_status_timeout")]
    pub status_timeout_secs: u32,
    /// Artifact download timeout in seconds (default: 60)
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u32,
    /// Total job-creation attempts; transient failures are retried with
    /// doubling backoff, 4xx rejections are not (default: 3)
    #[serde(default = "default_submit_attempts")]
    pub submit_attempts: u32,
    /// Initial backoff between job-creation attempts in milliseconds
    #[serde(default = "default_submit_backoff")]
    pub submit_backoff_ms: u64,
    /// Generation parameters sent with every job
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model_path: default_model_path(),
            requests_path: default_requests_path(),
            submit_timeout_secs: default_submit_timeout(),
            status_timeout_secs: default_status_timeout(),
            download_timeout_secs: default_download_timeout(),
            submit_attempts: default_submit_attempts(),
            submit_backoff_ms: default_submit_backoff(),
            generation: GenerationConfig::default(),
        }
    }
}

fn default_base_url() -> String {
    "https://queue.fal.run".to_string()
}

fn default_model_path() -> String {
    "fal-ai/flux-2-lora-gallery/realism".to_string()
}

fn default_requests_path() -> String {
    "fal-ai/flux-2-lora-gallery".to_string()
}

fn default_submit_timeout() -> u32 {
    120
}

fn default_status_timeout() -> u32 {
    30
}

fn default_download_timeout() -> u32 {
    60
}

fn default_submit_attempts() -> u32 {
    3
}

fn default_submit_backoff() -> u64 {
    1000
}

/// Fixed generation parameters carried in the job-creation body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    #[serde(default = "default_image_size")]
    pub image_size: String,
    #[serde(default = "default_num_images")]
    pub num_images: u32,
    #[serde(default = "default_output_format")]
    pub output_format: String,
    #[serde(default = "default_inference_steps")]
    pub num_inference_steps: u32,
    #[serde(default = "default_guidance_scale")]
    pub guidance_scale: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            image_size: default_image_size(),
            num_images: default_num_images(),
            output_format: default_output_format(),
            num_inference_steps: default_inference_steps(),
            guidance_scale: default_guidance_scale(),
        }
    }
}

fn default_image_size() -> String {
    "square".to_string()
}

fn default_num_images() -> u32 {
    1
}

fn default_output_format() -> String {
    "png".to_string()
}

fn default_inference_steps() -> u32 {
    40
}

fn default_guidance_scale() -> f64 {
    2.5
}

/// Subject catalog configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Stylistic prefix prepended to every subject prompt
    #[serde(default)]
    pub prompt_prefix: String,
    /// Known subjects keyed by identifier
    #[serde(default)]
    pub subjects: BTreeMap<String, SubjectEntry>,
}

/// One subject: prompt text plus the output directory it renders into
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubjectEntry {
    /// Directory under the output root that receives this subject's artifact
    pub dir: String,
    /// Subject-specific prompt appended to the prefix
    pub prompt: String,
}
