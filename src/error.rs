//! Bootstrap error taxonomy and exit codes.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::config::ConfigError;

/// Exit code for every launcher-side failure.
pub const FAILURE_EXIT_CODE: u8 = 1;

/// A local prerequisite that was not met.
#[derive(Debug, Error)]
pub enum Precondition {
    #[error("interpreter `{program}` not found on PATH")]
    Interpreter { program: String },

    #[error("interpreter `{program}` reports version {found}, need >= {required}")]
    InterpreterVersion {
        program: String,
        found: String,
        required: String,
    },

    #[error("dependency manifest {path} not found")]
    Manifest { path: PathBuf },

    #[error("dependency install failed ({status})")]
    DependencyInstall { status: ExitStatus },

    #[error("{path} not found and no template at {template}; create it manually")]
    EnvFile { path: PathBuf, template: PathBuf },

    #[error("{path} is missing values for: {}", .keys.join(", "))]
    EnvKeys { path: PathBuf, keys: Vec<String> },
}

/// Errors that abort a bootstrap run.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("precondition missing: {0}")]
    PreconditionMissing(#[from] Precondition),

    #[error("created {env_file} from {template}; edit it and run again")]
    SetupRequired { env_file: PathBuf, template: PathBuf },

    #[error("connection test failed ({status})")]
    ExternalCheckFailed { status: ExitStatus },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BootstrapError {
    /// Process exit code the launcher should terminate with.
    pub fn exit_code(&self) -> u8 {
        FAILURE_EXIT_CODE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_failure_exits_one() {
        let errors = [
            BootstrapError::from(Precondition::Interpreter { program: "python3".into() }),
            BootstrapError::SetupRequired {
                env_file: ".env".into(),
                template: "env.example".into(),
            },
            BootstrapError::Config(ConfigError::Validation(Vec::new())),
        ];
        for err in &errors {
            assert_eq!(err.exit_code(), 1, "{err}");
        }
    }

    #[test]
    fn test_env_keys_message_lists_keys() {
        let err = Precondition::EnvKeys {
            path: ".env".into(),
            keys: vec!["A".into(), "B".into()],
        };
        assert_eq!(err.to_string(), ".env is missing values for: A, B");
    }
}
