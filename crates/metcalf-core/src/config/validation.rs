//! Configuration validation
//!
//! Only checks the shape of the file; titles may be empty. Set references
//! are resolved, and reported, while tasks are expanded.

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_tasks(config)?;
    validate_command(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_tasks(config: &Config) -> Result<()> {
    let Some(tasks) = &config.tasks else {
        return Err(ConfigError::MissingField("tasks".to_string()).into());
    };
    debug!(count = tasks.len(), "validating tasks");

    for (id, task) in tasks.iter() {
        if let Some(command) = &task.command {
            if command.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("tasks.{}.command", id),
                    message: "command cannot be empty".to_string(),
                }
                .into());
            }
        }
    }

    Ok(())
}

fn validate_command(config: &Config) -> Result<()> {
    match config.command.as_deref() {
        Some(command) if !command.trim().is_empty() => Ok(()),
        _ => Err(ConfigError::MissingField("command".to_string()).into()),
    }
}
