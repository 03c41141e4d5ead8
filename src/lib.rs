//! bted: binary tree editor engine
//!
//! The domain layer holds the id-addressed tree, its pure transitions and
//! the snapshot history; the application layer wraps them in a `TreeStore`
//! that records history and persists every change to a blob store.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::{ApplicationError, ApplicationResult, ImportError, TreeStore};
pub use domain::{NodeId, SampleKind, Side, TreeStats};
