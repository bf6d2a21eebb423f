//! Entry-name filter applied before an entry is visited.

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::DigestError;

/// Housekeeping artifacts excluded by default (macOS Finder, Synology indexer).
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[".DS_Store", "@eaDir"];

/// Decides whether a directory entry is excluded from the tree.
///
/// Patterns are globs matched against the whole entry name, with no path
/// context. Matching is a pure membership test, so pattern order is
/// irrelevant.
#[derive(Debug, Clone)]
pub struct FilterPolicy {
    patterns: Vec<String>,
    set: GlobSet,
}

impl FilterPolicy {
    /// Compile a policy from glob patterns.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, DigestError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern).map_err(|source| DigestError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|source| DigestError::InvalidPattern {
            pattern: patterns
                .iter()
                .map(|p| p.as_ref())
                .collect::<Vec<_>>()
                .join(","),
            source,
        })?;

        Ok(Self {
            patterns: patterns.iter().map(|p| p.as_ref().to_string()).collect(),
            set,
        })
    }

    /// A policy that excludes nothing.
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }

    /// Check if an entry name must be excluded.
    pub fn should_ignore(&self, name: &str) -> bool {
        self.set.is_match(name)
    }

    /// The patterns this policy was compiled from.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Default for FilterPolicy {
    fn default() -> Self {
        // The built-in patterns are literal names and always compile.
        Self::new(DEFAULT_IGNORE_PATTERNS).unwrap_or_else(|_| Self::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_patterns() {
        let policy = FilterPolicy::default();
        assert!(policy.should_ignore(".DS_Store"));
        assert!(policy.should_ignore("@eaDir"));
        assert!(!policy.should_ignore("DS_Store"));
        assert!(!policy.should_ignore("photo.jpg"));
        assert_eq!(policy.patterns().len(), 2);
    }

    #[test]
    fn test_glob_patterns() {
        let policy = FilterPolicy::new(&["*.tmp", "Thumbs.db", "._*"]).unwrap();
        assert!(policy.should_ignore("download.tmp"));
        assert!(policy.should_ignore("Thumbs.db"));
        assert!(policy.should_ignore("._IMG_0001.JPG"));
        assert!(!policy.should_ignore("tmp"));
        assert!(!policy.should_ignore("notes.txt"));
    }

    #[test]
    fn test_whole_name_match() {
        let policy = FilterPolicy::new(&["@eaDir"]).unwrap();
        assert!(!policy.should_ignore("my@eaDir.bak"));
    }

    #[test]
    fn test_empty_policy() {
        let policy = FilterPolicy::empty();
        assert!(!policy.should_ignore(".DS_Store"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = FilterPolicy::new(&["[abc"]).unwrap_err();
        assert!(matches!(err, DigestError::InvalidPattern { .. }));
    }
}
