//! Metcalf Core - Core library for the task matrix runner
//!
//! This crate provides the configuration model, loading and validation,
//! and the error types shared by the expansion and execution crates.

pub mod config;
pub mod error;

pub use config::{Config, TaskDefinition, TaskMap};
pub use error::{ConfigError, MetcalfError, Result};
