//! Digest values and tree node types.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Length in bytes of every digest produced by the supported algorithms.
pub const DIGEST_LEN: usize = 32;

/// Fixed-length cryptographic digest of a node.
///
/// The raw bytes are what gets composed into a parent digest. The hex
/// form only exists for display and serialization.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest(pub [u8; DIGEST_LEN]);

impl Digest {
    /// Create a digest from raw bytes.
    pub fn new(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Get the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a digest from its 64-character hex form.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; DIGEST_LEN];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }

    /// Abbreviated form `first..last` keeping `max_len` hex characters.
    pub fn to_short_hex(&self, max_len: usize) -> String {
        let full = self.to_hex();
        if full.len() <= max_len {
            return full;
        }
        let half = max_len / 2;
        format!("{}..{}", &full[..half], &full[full.len() - half..])
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Digest::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Type of file system node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Regular file, digested by content.
    File,
    /// Directory, digested by composing its children.
    Directory,
    /// Symbolic link recorded without being followed, digested by its target path.
    Symlink {
        /// Link target as stored in the link.
        target: CompactString,
    },
}

impl NodeKind {
    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, NodeKind::Directory)
    }

    /// Check if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, NodeKind::File)
    }

    /// Check if this is a symlink.
    pub fn is_symlink(&self) -> bool {
        matches!(self, NodeKind::Symlink { .. })
    }
}

/// Per-entry attributes captured when the entry is visited.
///
/// This is also the record shape of the flattened projection, where
/// `name` carries the full path instead of the base name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMetadata {
    /// Base name of the entry, or its full path once flattened.
    pub name: CompactString,

    /// Size in bytes. Sum of descendant file sizes for directories.
    pub size: u64,

    /// Last modification time.
    #[serde(rename = "modifiedTime")]
    pub modified: DateTime<Utc>,

    /// Permission and type bits.
    pub mode: u32,

    /// Digest, set exactly once after the node (and its children) are hashed.
    pub digest: Option<Digest>,
}

impl NodeMetadata {
    /// Metadata for a node that has not been digested yet.
    pub fn new(name: impl Into<CompactString>, size: u64, modified: DateTime<Utc>, mode: u32) -> Self {
        Self {
            name: name.into(),
            size,
            modified,
            mode,
            digest: None,
        }
    }
}

/// A single file system entry in the digest tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    /// Full path from the invocation root.
    pub path: PathBuf,

    /// Node type.
    pub kind: NodeKind,

    /// Attributes and digest.
    pub metadata: NodeMetadata,

    /// Children in ordinal name order. Empty for leaves.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a regular file leaf.
    pub fn new_file(path: impl Into<PathBuf>, metadata: NodeMetadata) -> Self {
        Self {
            path: path.into(),
            kind: NodeKind::File,
            metadata,
            children: Vec::new(),
        }
    }

    /// Create an unfollowed symlink leaf.
    pub fn new_symlink(
        path: impl Into<PathBuf>,
        target: impl Into<CompactString>,
        metadata: NodeMetadata,
    ) -> Self {
        Self {
            path: path.into(),
            kind: NodeKind::Symlink {
                target: target.into(),
            },
            metadata,
            children: Vec::new(),
        }
    }

    /// Create a directory node with the given (already sorted) children.
    ///
    /// The directory's own size is replaced by the sum of its children.
    pub fn new_directory(
        path: impl Into<PathBuf>,
        metadata: NodeMetadata,
        children: Vec<TreeNode>,
    ) -> Self {
        let mut node = Self {
            path: path.into(),
            kind: NodeKind::Directory,
            metadata,
            children,
        };
        node.aggregate_size();
        node
    }

    /// Check if this node is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Check if this node is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Check if this node is a symlink leaf.
    pub fn is_symlink(&self) -> bool {
        self.kind.is_symlink()
    }

    /// Base name of the node.
    pub fn name(&self) -> &str {
        self.metadata.name.as_str()
    }

    /// Full path of the node.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size in bytes (aggregate for directories).
    pub fn size(&self) -> u64 {
        self.metadata.size
    }

    /// Digest, if the node has been hashed.
    pub fn digest(&self) -> Option<&Digest> {
        self.metadata.digest.as_ref()
    }

    /// Get the number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Number of regular files in this subtree (1 for a file).
    pub fn file_count(&self) -> u64 {
        match self.kind {
            NodeKind::File => 1,
            NodeKind::Directory => self.children.iter().map(TreeNode::file_count).sum(),
            NodeKind::Symlink { .. } => 0,
        }
    }

    /// Number of directories below this node, not counting itself.
    pub fn dir_count(&self) -> u64 {
        self.children
            .iter()
            .filter(|c| c.is_dir())
            .map(|c| c.dir_count() + 1)
            .sum()
    }

    /// Recompute a directory's size as the sum of its children's sizes.
    ///
    /// Leaves keep the size reported by the filesystem.
    pub fn aggregate_size(&mut self) {
        if self.is_dir() {
            self.metadata.size = self.children.iter().map(TreeNode::size).sum();
        }
    }

    /// Depth-first pre-order traversal yielding `(depth, node)`, root at depth 0.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder {
            stack: vec![(0, self)],
        }
    }
}

/// Pre-order iterator over a [`TreeNode`] and its descendants.
pub struct PreOrder<'a> {
    stack: Vec<(usize, &'a TreeNode)>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = (usize, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        for child in node.children.iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, node))
    }
}
