//! Core types for dirdigest.
//!
//! This crate provides the fundamental data structures used throughout
//! the dirdigest workspace: digests, tree nodes, the completed tree,
//! configuration, the ignore filter and the error taxonomy.

mod config;
mod error;
mod filter;
mod node;
mod tree;

pub use config::{Composition, DigestAlgorithm, DigestConfig, DigestConfigBuilder};
pub use error::DigestError;
pub use filter::{DEFAULT_IGNORE_PATTERNS, FilterPolicy};
pub use node::{Digest, NodeKind, NodeMetadata, PreOrder, TreeNode};
pub use tree::{DigestTree, TreeStats};
