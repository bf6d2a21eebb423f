//! Parallel tree builder.
//!
//! Sibling subtrees are traversed and hashed concurrently on a rayon pool.
//! Each directory is a join barrier: its children are collected back into
//! sorted order, and only then is the directory digested.

use std::borrow::Cow;
use std::ffi::OsString;
use std::fs::{self, Metadata};
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tracing::{debug, error, info, instrument};

use dirdigest_core::{
    Digest, DigestConfig, DigestError, DigestTree, FilterPolicy, NodeMetadata, TreeNode, TreeStats,
};

use crate::hasher::Hasher;
use crate::progress::BuildCounters;

const MIB: f64 = 1024.0 * 1024.0;

/// Stack size for pool workers. Every directory level recurses on a
/// worker, and a PATH_MAX-deep tree is about 2000 levels.
const WORKER_STACK_SIZE: usize = 64 * 1024 * 1024;

/// Identity of a directory on disk, used to detect cycles through followed links.
type InodeKey = (u64, u64);

/// Chain of directories from the root down to the one being built.
struct Ancestry<'a> {
    key: Option<InodeKey>,
    parent: Option<&'a Ancestry<'a>>,
}

impl Ancestry<'_> {
    fn contains(&self, key: InodeKey) -> bool {
        let mut frame = Some(self);
        while let Some(f) = frame {
            if f.key == Some(key) {
                return true;
            }
            frame = f.parent;
        }
        false
    }
}

/// Builds a digest tree for a root path.
pub struct TreeBuilder {
    config: DigestConfig,
    filter: FilterPolicy,
    hasher: Hasher,
}

impl TreeBuilder {
    /// Create a builder, compiling the configured ignore patterns.
    pub fn new(config: DigestConfig) -> Result<Self, DigestError> {
        let filter = FilterPolicy::new(&config.ignore_patterns)?;
        let hasher = Hasher::new(config.algorithm, config.composition);
        Ok(Self {
            config,
            filter,
            hasher,
        })
    }

    /// Build the complete digest tree.
    ///
    /// Fails on the first stat, listing, read or metadata error anywhere in
    /// the tree; no partial tree is ever returned.
    #[instrument(skip(self), fields(root = %self.config.root.display()))]
    pub fn build(&self) -> Result<DigestTree, DigestError> {
        let start = Instant::now();
        let root_path = clean_root(&self.config.root);
        debug!(
            algorithm = %self.hasher.algorithm(),
            composition = %self.hasher.composition(),
            threads = self.config.threads,
            "Starting tree build"
        );

        let metadata = fs::metadata(&root_path).map_err(|e| DigestError::io(&root_path, e))?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .thread_name(|i| format!("dirdigest-{i}"))
            .stack_size(WORKER_STACK_SIZE)
            .build()
            .map_err(|e| DigestError::ThreadPool {
                message: e.to_string(),
            })?;

        let counters = BuildCounters::new();
        let root = match pool.install(|| self.build_node(&root_path, &metadata, 0, None, &counters)) {
            Ok(node) => node,
            Err(e) => {
                error!(error = %e, "Tree build failed");
                return Err(e);
            }
        };

        let progress = counters.snapshot();
        let stats = TreeStats::from(&progress);
        let duration = start.elapsed();
        debug!(
            nodes = progress.total_nodes(),
            files = stats.total_files,
            dirs = stats.total_dirs,
            root_digest = %root.digest().map(Digest::to_hex).unwrap_or_default(),
            duration_ms = duration.as_millis() as u64,
            files_per_s = %format!("{:.1}", progress.files_per_second()),
            "Tree build completed"
        );

        Ok(DigestTree::new(
            root,
            root_path,
            self.config.clone(),
            stats,
            duration,
        ))
    }

    /// Build the tree and return only the root digest.
    pub fn compute_root(&self) -> Result<Digest, DigestError> {
        let tree = self.build()?;
        tree.root_digest()
            .copied()
            .ok_or_else(|| DigestError::Undigested {
                path: tree.root_path.clone(),
            })
    }

    /// Stat an entry below the root, honouring the symlink policy.
    fn stat(&self, path: &Path) -> Result<Metadata, DigestError> {
        let result = if self.config.follow_symlinks {
            fs::metadata(path)
        } else {
            fs::symlink_metadata(path)
        };
        result.map_err(|e| DigestError::io(path, e))
    }

    fn build_node(
        &self,
        path: &Path,
        metadata: &Metadata,
        depth: u32,
        parent: Option<&Ancestry<'_>>,
        counters: &BuildCounters,
    ) -> Result<TreeNode, DigestError> {
        let file_type = metadata.file_type();
        if file_type.is_dir() {
            self.build_directory(path, metadata, depth, parent, counters)
        } else if file_type.is_file() {
            self.build_file(path, metadata, depth, counters)
        } else if file_type.is_symlink() {
            self.build_symlink(path, metadata, depth, counters)
        } else {
            Err(DigestError::UnsupportedFileType {
                path: path.to_path_buf(),
            })
        }
    }

    fn build_directory(
        &self,
        path: &Path,
        metadata: &Metadata,
        depth: u32,
        parent: Option<&Ancestry<'_>>,
        counters: &BuildCounters,
    ) -> Result<TreeNode, DigestError> {
        let key = inode_key(metadata);
        if self.config.follow_symlinks {
            if let (Some(key), Some(parent)) = (key, parent) {
                if parent.contains(key) {
                    return Err(DigestError::SymlinkCycle {
                        path: path.to_path_buf(),
                    });
                }
            }
        }
        let frame = Ancestry { key, parent };

        let node_metadata = node_metadata(path, metadata)?;
        let entries = self.read_entries(path, counters)?;

        // Fan out over siblings; the indexed collect restores sorted order
        // and waits for every child before this directory is digested.
        let children = entries
            .par_iter()
            .map(|child_path| {
                let child_metadata = self.stat(child_path)?;
                self.build_node(child_path, &child_metadata, depth + 1, Some(&frame), counters)
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug_assert!(children.iter().all(|c| c.digest().is_some()));
        let digest = self
            .hasher
            .compose(children.iter().filter_map(TreeNode::digest));

        let mut node = TreeNode::new_directory(path, node_metadata, children);
        node.metadata.digest = Some(digest);
        counters.record_dir(depth);

        if self.config.verbose {
            info!(
                path = %path.display(),
                digest = %digest,
                children = node.child_count(),
                size = node.size(),
                "Digested directory"
            );
        }

        Ok(node)
    }

    /// List a directory, drop filtered names and sort the rest ordinally.
    fn read_entries(&self, path: &Path, counters: &BuildCounters) -> Result<Vec<PathBuf>, DigestError> {
        let read_dir = fs::read_dir(path).map_err(|e| DigestError::io(path, e))?;

        let mut entries: Vec<(OsString, PathBuf)> = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| DigestError::io(path, e))?;
            let name = entry.file_name();

            if self.filter.should_ignore(&name.to_string_lossy()) {
                counters.record_ignored();
                if self.config.verbose {
                    info!(path = %entry.path().display(), "Ignoring entry");
                }
                continue;
            }

            entries.push((name, entry.path()));
        }

        // OsStr ordering compares the underlying bytes, independent of locale.
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(entries.into_iter().map(|(_, p)| p).collect())
    }

    fn build_file(
        &self,
        path: &Path,
        metadata: &Metadata,
        depth: u32,
        counters: &BuildCounters,
    ) -> Result<TreeNode, DigestError> {
        let mut node_metadata = node_metadata(path, metadata)?;

        let start = Instant::now();
        let (digest, _) = self.hasher.digest_file(path)?;
        node_metadata.digest = Some(digest);
        counters.record_file(node_metadata.size, depth);

        if self.config.verbose {
            let elapsed = start.elapsed().as_secs_f64();
            let size_mb = node_metadata.size as f64 / MIB;
            let rate = if elapsed > 0.0 { size_mb / elapsed } else { 0.0 };
            info!(
                path = %path.display(),
                digest = %digest,
                size_mb = %format!("{size_mb:.2}"),
                elapsed_s = %format!("{elapsed:.2}"),
                rate_mb_s = %format!("{rate:.2}"),
                "Digested file"
            );
        }

        Ok(TreeNode::new_file(path, node_metadata))
    }

    fn build_symlink(
        &self,
        path: &Path,
        metadata: &Metadata,
        depth: u32,
        counters: &BuildCounters,
    ) -> Result<TreeNode, DigestError> {
        let mut node_metadata = node_metadata(path, metadata)?;
        let target = fs::read_link(path).map_err(|e| DigestError::io(path, e))?;

        let digest = self.hasher.digest_bytes(&link_target_bytes(&target));
        node_metadata.digest = Some(digest);
        counters.record_symlink(node_metadata.size, depth);

        if self.config.verbose {
            info!(
                path = %path.display(),
                target = %target.display(),
                digest = %digest,
                "Recorded symlink"
            );
        }

        Ok(TreeNode::new_symlink(
            path,
            CompactString::new(target.to_string_lossy()),
            node_metadata,
        ))
    }
}

/// Drop `.` components so child paths read `go/a` rather than `./go/a`.
fn clean_root(root: &Path) -> PathBuf {
    let cleaned: PathBuf = root
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if cleaned.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        cleaned
    }
}

/// Capture name, size, modification time and mode for a visited entry.
fn node_metadata(path: &Path, metadata: &Metadata) -> Result<NodeMetadata, DigestError> {
    let modified = metadata
        .modified()
        .map_err(|source| DigestError::MissingModifiedTime {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(NodeMetadata::new(
        entry_name(path),
        metadata.len(),
        DateTime::<Utc>::from(modified),
        file_mode(metadata),
    ))
}

/// Base name of a path, or the whole path when it has none (`.`, `/`).
fn entry_name(path: &Path) -> CompactString {
    match path.file_name() {
        Some(name) => CompactString::new(name.to_string_lossy()),
        None => CompactString::new(path.to_string_lossy()),
    }
}

/// Get the permission and type bits from metadata.
#[cfg(unix)]
fn file_mode(metadata: &Metadata) -> u32 {
    metadata.mode()
}

#[cfg(not(unix))]
fn file_mode(metadata: &Metadata) -> u32 {
    let file_type = metadata.file_type();
    if file_type.is_dir() {
        0o040755
    } else if file_type.is_symlink() {
        0o120777
    } else if metadata.permissions().readonly() {
        0o100444
    } else {
        0o100644
    }
}

/// Get the (device, inode) pair from metadata.
#[cfg(unix)]
fn inode_key(metadata: &Metadata) -> Option<InodeKey> {
    Some((metadata.dev(), metadata.ino()))
}

#[cfg(not(unix))]
fn inode_key(_metadata: &Metadata) -> Option<InodeKey> {
    None
}

#[cfg(unix)]
fn link_target_bytes(target: &Path) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(target.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn link_target_bytes(target: &Path) -> Cow<'_, [u8]> {
    Cow::Owned(target.to_string_lossy().into_owned().into_bytes())
}
