//! Hashing and tree-building engine for dirdigest.
//!
//! # Overview
//!
//! `dirdigest-scan` walks a root path and produces a Merkle-style
//! [`DigestTree`]: every file is digested from its content, every directory
//! from the ordered digests of its children. Key features:
//!
//! - **Parallel traversal** of sibling subtrees on a rayon pool
//! - **Deterministic output** regardless of thread count or listing order
//! - **Fail-fast**: the first access or metadata error aborts the build
//! - **Configurable** digest algorithm, composition and ignore patterns
//!
//! # Example
//!
//! ```rust,no_run
//! use dirdigest_scan::{DigestConfig, TreeBuilder};
//!
//! let config = DigestConfig::new("/path/to/digest");
//! let tree = TreeBuilder::new(config)?.build()?;
//!
//! println!("Root digest: {}", tree.root_digest().unwrap());
//! println!("Total size: {} bytes", tree.total_size());
//! # Ok::<(), dirdigest_scan::DigestError>(())
//! ```

mod builder;
mod hasher;
mod progress;

pub use builder::TreeBuilder;
pub use hasher::Hasher;
pub use progress::BuildProgress;

// Re-export core types for convenience
pub use dirdigest_core::{
    Composition, Digest, DigestAlgorithm, DigestConfig, DigestError, DigestTree, FilterPolicy,
    NodeKind, NodeMetadata, TreeNode, TreeStats,
};
