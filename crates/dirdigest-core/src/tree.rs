//! Completed digest tree and build statistics.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::DigestConfig;
use crate::node::{Digest, TreeNode};

/// Summary statistics for a digested tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    /// Total size of all digested files in bytes.
    pub total_size: u64,
    /// Total number of files.
    pub total_files: u64,
    /// Total number of directories, including the root when it is one.
    pub total_dirs: u64,
    /// Total number of symlinks recorded as leaves.
    pub total_symlinks: u64,
    /// Entries excluded by the filter policy.
    pub ignored_entries: u64,
    /// Maximum depth reached (root = 0).
    pub max_depth: u32,
}

impl TreeStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Complete digest tree with build metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestTree {
    /// Root node of the tree.
    pub root: TreeNode,

    /// Root path that was digested.
    pub root_path: PathBuf,

    /// Duration of the build.
    pub build_duration: Duration,

    /// Configuration used.
    pub config: DigestConfig,

    /// Summary statistics.
    pub stats: TreeStats,
}

impl DigestTree {
    /// Create a new digest tree.
    pub fn new(
        root: TreeNode,
        root_path: PathBuf,
        config: DigestConfig,
        stats: TreeStats,
        build_duration: Duration,
    ) -> Self {
        Self {
            root,
            root_path,
            build_duration,
            config,
            stats,
        }
    }

    /// Digest of the root node.
    pub fn root_digest(&self) -> Option<&Digest> {
        self.root.digest()
    }

    /// Get the total size of the tree.
    pub fn total_size(&self) -> u64 {
        self.root.size()
    }

    /// Get the total number of files.
    pub fn total_files(&self) -> u64 {
        self.stats.total_files
    }

    /// Get the total number of directories.
    pub fn total_dirs(&self) -> u64 {
        self.stats.total_dirs
    }

    /// Average throughput of the build in bytes per second.
    pub fn bytes_per_second(&self) -> f64 {
        let secs = self.build_duration.as_secs_f64();
        if secs > 0.0 {
            self.total_size() as f64 / secs
        } else {
            0.0
        }
    }
}
