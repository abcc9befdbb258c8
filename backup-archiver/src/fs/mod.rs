//! Filesystem helpers: artifact metadata and moves into the archive tree.

pub mod metadata;
pub mod mover;
