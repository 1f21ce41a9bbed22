//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject empty programs and paths
//! - Check that the interpreter version floor parses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LauncherConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::{CommandConfig, LauncherConfig};
use crate::lifecycle::preflight::Version;

/// A single semantic problem in the launcher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: program must not be empty")]
    EmptyProgram { field: &'static str },

    #[error("{field}: path must not be empty")]
    EmptyPath { field: &'static str },

    #[error("interpreter.min_version: '{value}' is not MAJOR.MINOR[.PATCH]")]
    BadVersion { value: String },

    #[error("environment.required_keys: blank key at index {index}")]
    BlankRequiredKey { index: usize },

    #[error("environment.file and environment.template both point at '{path}'")]
    TemplateIsEnvFile { path: String },
}

/// Validate a parsed configuration, collecting every problem.
pub fn validate_config(config: &LauncherConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.interpreter.program.trim().is_empty() {
        errors.push(ValidationError::EmptyProgram { field: "interpreter.program" });
    }
    if let Some(min) = config.interpreter.min_version.as_deref().filter(|v| !v.is_empty()) {
        if Version::parse(min).is_none() {
            errors.push(ValidationError::BadVersion { value: min.to_string() });
        }
    }

    check_path(&mut errors, "dependencies.manifest", &config.dependencies.manifest);
    check_command(&mut errors, "dependencies.install", &config.dependencies.install);

    let env = &config.environment;
    check_path(&mut errors, "environment.file", &env.file);
    check_path(&mut errors, "environment.template", &env.template);
    if !env.file.is_empty() && env.file == env.template {
        errors.push(ValidationError::TemplateIsEnvFile { path: env.file.clone() });
    }
    for (index, key) in env.required_keys.iter().enumerate() {
        if key.trim().is_empty() {
            errors.push(ValidationError::BlankRequiredKey { index });
        }
    }

    check_command(&mut errors, "connection_test.command", &config.connection_test.command);

    check_command(&mut errors, "server.command", &config.server.command);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_command(errors: &mut Vec<ValidationError>, field: &'static str, cmd: &CommandConfig) {
    if cmd.program.trim().is_empty() {
        errors.push(ValidationError::EmptyProgram { field });
    }
}

fn check_path(errors: &mut Vec<ValidationError>, field: &'static str, path: &str) {
    if path.trim().is_empty() {
        errors.push(ValidationError::EmptyPath { field });
    }
}
