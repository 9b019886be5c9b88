//! In-process full-text index.
//!
//! - `SearchIndex`: create / insert / search / save / load
//! - `prefix_tree`: per-property character trie over the node table
//! - `scoring`: TF-IDF scoring and top-k selection
//! - `snapshot`: the exportable index state
//! - `persistence`: the index's own (native) persistence formats

pub mod index;
pub mod persistence;
pub mod prefix_tree;
pub mod scoring;
pub mod snapshot;

pub use index::SearchIndex;
pub use persistence::NativeFormat;
pub use snapshot::{Node, Snapshot, SNAPSHOT_VERSION};
