//! starmark-store — Persistence backends for user progress records.
//!
//! Implements the `ProgressStore` trait over an in-memory map (tests,
//! one-off pipelines) and a JSON directory tree (the CLI default).

pub mod json;
pub mod memory;

pub use json::{AuditIssue, JsonStore};
pub use memory::MemoryStore;
