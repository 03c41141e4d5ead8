//! Service container for dependency injection
//!
//! Wires settings and the blob store into a `TreeStore`.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::{ApplicationError, TreeStore};
use crate::config::Settings;
use crate::infrastructure::traits::{BlobStore, FileBlobStore, RealFileSystem};
use crate::infrastructure::InfraResult;

/// Container holding the application's shared dependencies.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Persistent storage for the tree
    pub blobs: Arc<dyn BlobStore>,
}

impl ServiceContainer {
    /// Create a container backed by files in `settings.data_dir`.
    pub fn new(settings: Settings) -> Self {
        let blobs = Arc::new(FileBlobStore::new(
            settings.data_dir.clone(),
            Arc::new(RealFileSystem),
        ));
        Self::with_deps(settings, blobs)
    }

    /// Create a container with a custom blob store (for testing).
    pub fn with_deps(settings: Settings, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            settings: Arc::new(settings),
            blobs,
        }
    }

    /// Fresh store, not yet loaded.
    pub fn tree_store(&self) -> TreeStore {
        TreeStore::new(
            self.blobs.clone(),
            self.settings.storage_key.clone(),
            self.settings.max_history,
        )
    }

    /// Store with the persisted tree loaded.
    ///
    /// A corrupt stored tree is reported and the store starts empty, so the
    /// next commit replaces it.
    pub fn open_store(&self) -> InfraResult<TreeStore> {
        let mut store = self.tree_store();
        match store.load_from_storage() {
            Ok(()) => {}
            Err(ApplicationError::CorruptStorage { message }) => {
                warn!(
                    key = %self.settings.storage_key,
                    %message,
                    "stored tree is unreadable, starting with an empty tree"
                );
            }
            Err(e) => return Err(e.into()),
        }
        debug!(
            key = %self.settings.storage_key,
            nodes = store.tree().len(),
            "store opened"
        );
        Ok(store)
    }
}
