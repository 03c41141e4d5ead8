//! Application layer: the tree store and its codec
//!
//! This layer orchestrates domain transitions and depends on I/O boundary traits.

pub mod codec;
pub mod error;
pub mod error_ext;
pub mod store;

pub use codec::ImportError;
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use store::{CommitMode, TreeStore};
