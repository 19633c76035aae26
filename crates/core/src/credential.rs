//! Bearer credential discovery.
//!
//! Resolution order: explicit value (CLI flag), the `FAL_KEY` environment
//! variable, then a `FAL_KEY=...` line in a local env file. Absence is fatal
//! for the whole run and is detected before any network activity.

use std::path::Path;

use thiserror::Error;

/// Environment variable carrying the queue API credential.
pub const CREDENTIAL_ENV_VAR: &str = "FAL_KEY";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("no API credential found: pass --key, set FAL_KEY, or add a FAL_KEY= line to .env")]
    Missing,
}

/// Resolve the queue API credential.
///
/// `explicit` takes precedence; the env file is only read when the process
/// environment has no usable value. The env file is parsed without touching
/// the process environment.
pub fn resolve_credential(
    explicit: Option<String>,
    env_file: &Path,
) -> Result<String, CredentialError> {
    if let Some(key) = explicit {
        if !key.is_empty() {
            return Ok(key);
        }
    }

    if let Ok(key) = std::env::var(CREDENTIAL_ENV_VAR) {
        if !key.is_empty() {
            return Ok(key);
        }
    }

    if let Ok(entries) = dotenvy::from_path_iter(env_file) {
        for entry in entries.flatten() {
            let (name, value) = entry;
            if name == CREDENTIAL_ENV_VAR && !value.is_empty() {
                return Ok(value);
            }
        }
    }

    Err(CredentialError::Missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_explicit_key_wins() {
        let key = resolve_credential(
            Some("explicit-key".to_string()),
            Path::new("/nonexistent/.env"),
        )
        .unwrap();
        assert_eq!(key, "explicit-key");
    }

    #[test]
    fn test_env_file_fallback() {
        let mut env_file = NamedTempFile::new().unwrap();
        writeln!(env_file, "OTHER=abc").unwrap();
        writeln!(env_file, "FAL_KEY=file-key").unwrap();

        let key = resolve_credential(None, env_file.path()).unwrap();
        assert_eq!(key, "file-key");
    }

    #[test]
    fn test_empty_explicit_falls_through_to_file() {
        let mut env_file = NamedTempFile::new().unwrap();
        writeln!(env_file, "FAL_KEY=file-key").unwrap();

        let key = resolve_credential(Some(String::new()), env_file.path()).unwrap();
        assert_eq!(key, "file-key");
    }

    #[test]
    fn test_missing_everywhere() {
        let result = resolve_credential(None, Path::new("/nonexistent/.env"));
        assert!(matches!(result, Err(CredentialError::Missing)));
    }

    #[test]
    fn test_env_file_without_key() {
        let mut env_file = NamedTempFile::new().unwrap();
        writeln!(env_file, "OTHER=abc").unwrap();

        let result = resolve_credential(None, env_file.path());
        assert!(matches!(result, Err(CredentialError::Missing)));
    }
}
