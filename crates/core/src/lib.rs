pub mod artifact;
pub mod batch;
pub mod catalog;
pub mod config;
pub mod credential;
pub mod queue;
pub mod testing;

pub use artifact::{write_artifact, ArtifactError};
pub use batch::{
    BatchConfig, BatchReport, BatchRunner, ItemOutcome, ItemResult, JobHandle, PollOutcome,
    WorkItem,
};
pub use catalog::{SubjectCatalog, SubjectSpec};
pub use config::{
    load_config, load_config_from_str, validate_config, CatalogConfig, Config, ConfigError,
    GenerationConfig, QueueConfig, SubjectEntry,
};
pub use credential::{resolve_credential, CredentialError, CREDENTIAL_ENV_VAR};
pub use queue::{FalQueueClient, JobStatus, QueueClient, QueueClientError, ResultDescriptor};
