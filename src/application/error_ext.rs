//! Error conversion helpers for blob store access
//!
//! Provides extension traits for cleaner error handling with key context.

use std::io;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add storage key context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// blobs.set(&key, &encoded)
    ///     .with_storage_context("write tree", &key)?;
    /// ```
    fn with_storage_context(self, action: &str, key: &str) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_storage_context(self, action: &str, key: &str) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::Storage {
            context: format!("{}: {}", action, key),
            source: e,
        })
    }
}
