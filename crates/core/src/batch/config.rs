//! Batch runner configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the batch runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Delay between successive job submissions (milliseconds).
    /// Rate shaping so the batch does not burst the remote endpoint.
    #[serde(default = "default_submit_delay")]
    pub submit_delay_ms: u64,

    /// How long to wait between status polls for one job (milliseconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Maximum status-check iterations before a job is abandoned locally.
    /// With the default interval this bounds one job at roughly two minutes.
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,

    /// Root directory receiving one subdirectory per subject.
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,

    /// File name of the artifact written inside each subject directory.
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_submit_delay() -> u64 {
    500
}

fn default_poll_interval() -> u64 {
    2000
}

fn default_max_poll_attempts() -> u32 {
    60
}

fn default_output_root() -> PathBuf {
    PathBuf::from("portraits")
}

fn default_file_name() -> String {
    "portrait.png".to_string()
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            submit_delay_ms: default_submit_delay(),
            poll_interval_ms: default_poll_interval(),
            max_poll_attempts: default_max_poll_attempts(),
            output_root: default_output_root(),
            file_name: default_file_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BatchConfig::default();
        assert_eq!(config.submit_delay_ms, 500);
        assert_eq!(config.poll_interval_ms, 2000);
        assert_eq!(config.max_poll_attempts, 60);
        assert_eq!(config.output_root, PathBuf::from("portraits"));
        assert_eq!(config.file_name, "portrait.png");
    }

    #[test]
    fn test_deserialize_minimal() {
        let toml = r#"
            poll_interval_ms = 250
        "#;
        let config: BatchConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.max_poll_attempts, 60);
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
            submit_delay_ms = 100
            poll_interval_ms = 500
            max_poll_attempts = 20
            output_root = "/tmp/portraits"
            file_name = "photo.png"
        "#;
        let config: BatchConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.submit_delay_ms, 100);
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.max_poll_attempts, 20);
        assert_eq!(config.output_root, PathBuf::from("/tmp/portraits"));
        assert_eq!(config.file_name, "photo.png");
    }
}
