//! Command handlers
//!
//! Each handler takes the shared [`CliContext`](crate::cli::context::CliContext)
//! and an options struct, calls into the checkpoint engine and prints the
//! result as text or JSON.

pub mod checkpoints;
pub mod save;
