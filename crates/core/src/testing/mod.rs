//! Testing utilities and mock implementations for E2E tests.
//!
//! This module provides a mock implementation of the queue client trait,
//! allowing full batch lifecycle testing without the real inference API.

mod mock_queue_client;

pub use mock_queue_client::MockQueueClient;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::catalog::SubjectCatalog;

    /// A small catalog with two subjects and a recognizable prefix.
    pub fn catalog() -> SubjectCatalog {
        SubjectCatalog::new("Portrait photograph, studio lighting. ")
            .with_subject("cardiologist", "cardiologist", "A 45-year-old cardiologist.")
            .with_subject("pulmonologist", "pulmonologist", "A 50-year-old pulmonologist.")
    }

    /// A catalog with `n` subjects named `subject-00` .. `subject-(n-1)`.
    pub fn catalog_of(n: usize) -> SubjectCatalog {
        let mut catalog = SubjectCatalog::new("Prefix. ");
        for i in 0..n {
            let id = format!("subject-{:02}", i);
            catalog = catalog.with_subject(&id, &id, format!("Subject number {}.", i));
        }
        catalog
    }
}
