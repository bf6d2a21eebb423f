//! Flattened path list.

use std::io::Write;

use compact_str::CompactString;
use dirdigest_core::{NodeMetadata, TreeNode};

/// One record per node in pre-order, `name` replaced by the full path.
///
/// Works on copies; the tree itself is left untouched.
pub fn flatten(root: &TreeNode) -> Vec<NodeMetadata> {
    root.iter()
        .map(|(_, node)| {
            let mut record = node.metadata.clone();
            record.name = CompactString::new(node.path().to_string_lossy());
            record
        })
        .collect()
}

/// Serialize records as an indented JSON array.
pub fn to_json_pretty(records: &[NodeMetadata]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}

/// Flatten a tree and write it as an indented JSON array.
pub fn write_json<W: Write>(out: &mut W, root: &TreeNode) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(&mut *out, &flatten(root))?;
    writeln!(out).map_err(serde_json::Error::io)
}
