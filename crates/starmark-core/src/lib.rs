//! starmark-core — Core rating engine, traits, and aggregation.
//!
//! This crate defines the fundamental data model, traits, and rating
//! logic that the entire starmark system builds on.

pub mod engine;
pub mod error;
pub mod grading;
pub mod identity;
pub mod matcher;
pub mod model;
pub mod performance;
pub mod rating;
pub mod roadmap;
pub mod traits;
pub mod validate;
