//! CLI command implementations

pub mod completions;
pub mod config;
pub mod infer;
pub mod repo;
pub mod repos;
pub mod search;
pub mod validate;
