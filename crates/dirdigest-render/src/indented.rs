//! Indented tree listing.

use std::io::{self, Write};

use dirdigest_core::TreeNode;

/// Hex characters kept by the abbreviated digest form.
pub const SHORT_DIGEST_LEN: usize = 16;

/// Options for the indented listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingOptions {
    /// Abbreviate digests to this many hex characters (`first..last`).
    pub short_digest: Option<usize>,
}

impl ListingOptions {
    /// Full digests.
    pub fn new() -> Self {
        Self::default()
    }

    /// Abbreviate digests to `first8..last8`.
    pub fn short() -> Self {
        Self {
            short_digest: Some(SHORT_DIGEST_LEN),
        }
    }
}

/// Format one listing line for a node at the given depth.
pub fn format_line(node: &TreeNode, depth: usize, options: &ListingOptions) -> String {
    let indent = "  ".repeat(depth);
    let digest = match (node.digest(), options.short_digest) {
        (Some(d), Some(len)) => d.to_short_hex(len),
        (Some(d), None) => d.to_hex(),
        (None, _) => String::new(),
    };
    format!("{indent}{} - {} bytes digest:{digest}", node.name(), node.size())
}

/// Write the listing, one line per node in pre-order.
pub fn write_indented<W: Write>(
    out: &mut W,
    root: &TreeNode,
    options: &ListingOptions,
) -> io::Result<()> {
    for (depth, node) in root.iter() {
        writeln!(out, "{}", format_line(node, depth, options))?;
    }
    Ok(())
}

/// Render the listing into a string.
pub fn render_indented(root: &TreeNode, options: &ListingOptions) -> String {
    root.iter()
        .map(|(depth, node)| format_line(node, depth, options) + "\n")
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dirdigest_core::{Digest, NodeMetadata};

    fn leaf(path: &str, name: &str, size: u64, byte: u8) -> TreeNode {
        let mut m = NodeMetadata::new(name, size, Utc::now(), 0o100644);
        m.digest = Some(Digest::new([byte; 32]));
        TreeNode::new_file(path, m)
    }

    #[test]
    fn test_line_format() {
        let node = leaf("/r/A.txt", "A.txt", 5, 0xab);
        assert_eq!(
            format_line(&node, 2, &ListingOptions::new()),
            format!("    A.txt - 5 bytes digest:{}", "ab".repeat(32))
        );
        assert_eq!(
            format_line(&node, 0, &ListingOptions::short()),
            "A.txt - 5 bytes digest:abababab..abababab"
        );
    }

    #[test]
    fn test_listing_is_pre_order() {
        let mut m = NodeMetadata::new("r", 0, Utc::now(), 0o040755);
        m.digest = Some(Digest::new([0; 32]));
        let sub = {
            let mut sm = NodeMetadata::new("sub", 0, Utc::now(), 0o040755);
            sm.digest = Some(Digest::new([1; 32]));
            TreeNode::new_directory("/r/sub", sm, vec![leaf("/r/sub/x", "x", 1, 2)])
        };
        let root = TreeNode::new_directory("/r", m, vec![sub, leaf("/r/y", "y", 2, 3)]);

        let text = render_indented(&root, &ListingOptions::short());
        let names: Vec<&str> = text
            .lines()
            .map(|l| l.split(" - ").next().unwrap())
            .collect();
        assert_eq!(names, vec!["r", "  sub", "    x", "  y"]);

        let mut buf = Vec::new();
        write_indented(&mut buf, &root, &ListingOptions::short()).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), text);
    }
}
