//! Output projections for dirdigest trees.
//!
//! Both projections are read-only views over a fully built tree:
//!
//! - [`render_indented`] / [`write_indented`]: one line per node in
//!   pre-order, `<indent><name> - <size> bytes digest:<hex>`.
//! - [`flatten`] / [`write_json`]: one record per node with `name`
//!   replaced by the node's full path, serialized as pretty JSON.

mod flatten;
mod indented;

pub use flatten::{flatten, to_json_pretty, write_json};
pub use indented::{ListingOptions, SHORT_DIGEST_LEN, format_line, render_indented, write_indented};
