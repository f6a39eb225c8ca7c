//! Shared text rendering for the numlab demonstration binaries.
//!
//! Each binary computes through `numlab_core` and hands the numbers to the
//! formatters here; nothing in this crate does numerics of its own.

pub mod report;
