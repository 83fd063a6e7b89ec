//! Exact nearest-neighbor index over unit vectors.
//!
//! Search is brute force over squared Euclidean distance. With unit-norm
//! inputs this ranks identically to cosine similarity, and for corpora of a
//! few thousand sections a linear scan is well under a millisecond.

mod flat;
mod storage;

pub use flat::FlatIndex;
pub use storage::{INDEX_MAGIC, INDEX_VERSION};
