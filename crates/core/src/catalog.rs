//! Subject catalog: the injected lookup from identifier to prompt text and
//! output location. The batch runner never hardcodes subjects; it only sees
//! whatever catalog the caller built.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::CatalogConfig;

/// One known subject.
#[derive(Debug, Clone)]
pub struct SubjectSpec {
    /// Directory under the output root receiving this subject's artifact.
    pub dir: String,
    /// Subject-specific prompt, appended to the catalog prefix on submission.
    pub prompt: String,
}

/// Lookup structure mapping subject identifiers to their descriptors.
///
/// Iteration order is the identifier sort order, which makes "run everything"
/// batches deterministic.
#[derive(Debug, Clone, Default)]
pub struct SubjectCatalog {
    prompt_prefix: String,
    subjects: BTreeMap<String, SubjectSpec>,
}

impl SubjectCatalog {
    pub fn new(prompt_prefix: impl Into<String>) -> Self {
        Self {
            prompt_prefix: prompt_prefix.into(),
            subjects: BTreeMap::new(),
        }
    }

    /// Build a catalog from its configuration section.
    pub fn from_config(config: &CatalogConfig) -> Self {
        let subjects = config
            .subjects
            .iter()
            .map(|(id, entry)| {
                (
                    id.clone(),
                    SubjectSpec {
                        dir: entry.dir.clone(),
                        prompt: entry.prompt.clone(),
                    },
                )
            })
            .collect();

        Self {
            prompt_prefix: config.prompt_prefix.clone(),
            subjects,
        }
    }

    /// Add a subject (builder-style, used by tests and embedders).
    pub fn with_subject(
        mut self,
        id: impl Into<String>,
        dir: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        self.subjects.insert(
            id.into(),
            SubjectSpec {
                dir: dir.into(),
                prompt: prompt.into(),
            },
        );
        self
    }

    /// Look up a subject by identifier.
    pub fn get(&self, id: &str) -> Option<&SubjectSpec> {
        self.subjects.get(id)
    }

    /// All known identifiers in sorted order.
    pub fn ids(&self) -> Vec<String> {
        self.subjects.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    /// The fully-assembled prompt submitted for a subject.
    pub fn full_prompt(&self, spec: &SubjectSpec) -> String {
        format!("{}{}", self.prompt_prefix, spec.prompt)
    }

    /// The artifact path for a subject under the given output root.
    pub fn output_path(&self, spec: &SubjectSpec, output_root: &Path, file_name: &str) -> PathBuf {
        output_root.join(&spec.dir).join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    fn sample_catalog() -> SubjectCatalog {
        SubjectCatalog::new("Portrait photograph. ")
            .with_subject("b-subject", "b-dir", "Subject B.")
            .with_subject("a-subject", "a-dir", "Subject A.")
    }

    #[test]
    fn test_ids_sorted() {
        let catalog = sample_catalog();
        assert_eq!(catalog.ids(), vec!["a-subject", "b-subject"]);
    }

    #[test]
    fn test_lookup_and_prompt_assembly() {
        let catalog = sample_catalog();
        let spec = catalog.get("a-subject").unwrap();
        assert_eq!(catalog.full_prompt(spec), "Portrait photograph. Subject A.");
        assert!(catalog.get("unknown").is_none());
    }

    #[test]
    fn test_output_path() {
        let catalog = sample_catalog();
        let spec = catalog.get("b-subject").unwrap();
        let path = catalog.output_path(spec, Path::new("/out"), "portrait.png");
        assert_eq!(path, PathBuf::from("/out/b-dir/portrait.png"));
    }

    #[test]
    fn test_from_config() {
        let toml = r#"
[catalog]
prompt_prefix = "Prefix. "

[catalog.subjects.default]
dir = "default"
prompt = "A cardiologist."
"#;
        let config = load_config_from_str(toml).unwrap();
        let catalog = SubjectCatalog::from_config(&config.catalog);
        assert_eq!(catalog.len(), 1);
        let spec = catalog.get("default").unwrap();
        assert_eq!(spec.dir, "default");
        assert_eq!(catalog.full_prompt(spec), "Prefix. A cardiologist.");
    }
}
