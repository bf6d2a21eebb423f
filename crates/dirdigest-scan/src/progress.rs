//! Build progress counters.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dirdigest_core::TreeStats;

/// Progress information during or after a build.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildProgress {
    /// Number of files digested so far.
    pub files_digested: u64,
    /// Number of directories digested so far.
    pub dirs_digested: u64,
    /// Number of symlinks recorded so far.
    pub symlinks_recorded: u64,
    /// Total leaf bytes: file content plus symlink target lengths.
    pub bytes_digested: u64,
    /// Entries skipped by the filter policy.
    pub ignored_entries: u64,
    /// Deepest level visited (root = 0).
    pub max_depth: u32,
    /// Time elapsed since the build started.
    pub elapsed: Duration,
}

impl BuildProgress {
    /// Calculate rate in files per second.
    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.files_digested as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Calculate rate in bytes per second.
    pub fn bytes_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.bytes_digested as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Get total nodes visited (files + dirs + symlinks).
    pub fn total_nodes(&self) -> u64 {
        self.files_digested + self.dirs_digested + self.symlinks_recorded
    }
}

impl From<&BuildProgress> for TreeStats {
    fn from(progress: &BuildProgress) -> Self {
        TreeStats {
            total_size: progress.bytes_digested,
            total_files: progress.files_digested,
            total_dirs: progress.dirs_digested,
            total_symlinks: progress.symlinks_recorded,
            ignored_entries: progress.ignored_entries,
            max_depth: progress.max_depth,
        }
    }
}

/// Counters shared by all workers of one build.
///
/// Relaxed atomics are enough: counters are only read as a snapshot,
/// never used to order other memory operations.
#[derive(Debug)]
pub(crate) struct BuildCounters {
    start_time: Instant,
    files: AtomicU64,
    dirs: AtomicU64,
    symlinks: AtomicU64,
    bytes: AtomicU64,
    ignored: AtomicU64,
    max_depth: AtomicU32,
}

impl BuildCounters {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            files: AtomicU64::new(0),
            dirs: AtomicU64::new(0),
            symlinks: AtomicU64::new(0),
            bytes: AtomicU64::new(0),
            ignored: AtomicU64::new(0),
            max_depth: AtomicU32::new(0),
        }
    }

    pub fn record_file(&self, size: u64, depth: u32) {
        self.files.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(size, Ordering::Relaxed);
        self.record_depth(depth);
    }

    pub fn record_dir(&self, depth: u32) {
        self.dirs.fetch_add(1, Ordering::Relaxed);
        self.record_depth(depth);
    }

    pub fn record_symlink(&self, size: u64, depth: u32) {
        self.symlinks.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(size, Ordering::Relaxed);
        self.record_depth(depth);
    }

    pub fn record_ignored(&self) {
        self.ignored.fetch_add(1, Ordering::Relaxed);
    }

    fn record_depth(&self, depth: u32) {
        self.max_depth.fetch_max(depth, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> BuildProgress {
        BuildProgress {
            files_digested: self.files.load(Ordering::Relaxed),
            dirs_digested: self.dirs.load(Ordering::Relaxed),
            symlinks_recorded: self.symlinks.load(Ordering::Relaxed),
            bytes_digested: self.bytes.load(Ordering::Relaxed),
            ignored_entries: self.ignored.load(Ordering::Relaxed),
            max_depth: self.max_depth.load(Ordering::Relaxed),
            elapsed: self.start_time.elapsed(),
        }
    }
}

impl Default for BuildCounters {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_snapshot() {
        let counters = BuildCounters::new();
        counters.record_dir(0);
        counters.record_file(5, 1);
        counters.record_file(7, 3);
        counters.record_symlink(0, 2);
        counters.record_ignored();

        let progress = counters.snapshot();
        assert_eq!(progress.files_digested, 2);
        assert_eq!(progress.dirs_digested, 1);
        assert_eq!(progress.symlinks_recorded, 1);
        assert_eq!(progress.bytes_digested, 12);
        assert_eq!(progress.ignored_entries, 1);
        assert_eq!(progress.max_depth, 3);
        assert_eq!(progress.total_nodes(), 4);

        let stats = TreeStats::from(&progress);
        assert_eq!(stats.total_size, 12);
        assert_eq!(stats.total_dirs, 1);
    }

    #[test]
    fn test_rates_with_zero_elapsed() {
        let progress = BuildProgress {
            files_digested: 10,
            dirs_digested: 0,
            symlinks_recorded: 0,
            bytes_digested: 100,
            ignored_entries: 0,
            max_depth: 0,
            elapsed: Duration::ZERO,
        };
        assert_eq!(progress.bytes_per_second(), 0.0);
        assert_eq!(progress.files_per_second(), 0.0);

        let progress = BuildProgress {
            elapsed: Duration::from_secs(2),
            ..progress
        };
        assert!((progress.bytes_per_second() - 50.0).abs() < f64::EPSILON);
        assert!((progress.files_per_second() - 5.0).abs() < f64::EPSILON);
    }
}
