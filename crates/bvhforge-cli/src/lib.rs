//! bvhforge CLI library
//!
//! Command implementations and data-directory helpers for the `bvhforge`
//! binary. Kept as a library so the pieces are testable without spawning
//! the binary.

pub mod commands;
pub mod input;
