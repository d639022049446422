//! Merging of independently ranked hit lists.
//!
//! Lexical and vector search score on unrelated scales, so the lists are
//! combined by rank position only. See [`rrf`].

pub mod rrf;

pub use rrf::{fuse, fuse_lists, rrf_contribution};
