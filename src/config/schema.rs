//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the launcher.
//! All types derive Serde traits for deserialization from `launcher.toml`.
//! Defaults reproduce the stock MongoDB Atlas MCP server checkout, so an
//! empty (or missing) file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for the launcher.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct LauncherConfig {
    /// Runtime interpreter that must be present on `PATH`.
    pub interpreter: InterpreterConfig,

    /// Dependency manifest and installer.
    pub dependencies: DependencyConfig,

    /// Environment file and its template.
    pub environment: EnvironmentConfig,

    /// External connectivity check run before launch.
    pub connection_test: ConnectionTestConfig,

    /// Long-running server process.
    pub server: ServerConfig,

    /// Shutdown behaviour while the server runs.
    pub shutdown: ShutdownConfig,
}

/// A subprocess invocation.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CommandConfig {
    /// Program name (looked up on `PATH`) or path.
    pub program: String,

    /// Arguments passed verbatim.
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandConfig {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Render as a single shell-like line for logs.
    pub fn display_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Interpreter prerequisite.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Interpreter executable (e.g., "python3").
    pub program: String,

    /// Minimum acceptable version, "MAJOR.MINOR[.PATCH]". Empty disables the check.
    pub min_version: Option<String>,

    /// Arguments that make the interpreter print its version.
    pub version_args: Vec<String>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            min_version: Some("3.8".to_string()),
            version_args: vec!["--version".to_string()],
        }
    }
}

/// Dependency manifest and installer.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct DependencyConfig {
    /// Manifest file that must exist before installing.
    pub manifest: String,

    /// Installer invocation.
    pub install: CommandConfig,
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            manifest: "requirements.txt".to_string(),
            install: CommandConfig::new(
                "python3",
                ["-m", "pip", "install", "-r", "requirements.txt"],
            ),
        }
    }
}

/// Environment file handling.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Active environment file read by the launched processes.
    pub file: String,

    /// Template copied to `file` on first run.
    pub template: String,

    /// Keys that must be present and non-blank in `file`.
    pub required_keys: Vec<String>,

    /// Export the parsed file into every child's environment.
    pub export_to_children: bool,

    /// Lines printed after the template has been copied.
    pub setup_instructions: Vec<String>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            file: ".env".to_string(),
            template: "env.example".to_string(),
            required_keys: Vec::new(),
            export_to_children: false,
            setup_instructions: vec![
                "Edit the environment file with your MongoDB Atlas details:".to_string(),
                "  1. Replace 'username:password' with your Atlas credentials".to_string(),
                "  2. Replace 'cluster.mongodb.net' with your cluster URL".to_string(),
                "  3. Replace 'database' with your database name".to_string(),
                "Then run the launcher again.".to_string(),
            ],
        }
    }
}

/// Connectivity check.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConnectionTestConfig {
    /// Test invocation; exit status zero means the remote is reachable.
    pub command: CommandConfig,

    /// When set and this path does not exist, the test is skipped. An empty
    /// string is the same as unset.
    pub skip_if_missing: Option<String>,
}

impl Default for ConnectionTestConfig {
    fn default() -> Self {
        Self {
            command: CommandConfig::new("python3", ["test_atlas_connection.py"]),
            skip_if_missing: None,
        }
    }
}

/// Server process.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub command: CommandConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            command: CommandConfig::new("python3", ["mongo_mcp_server.py"]),
        }
    }
}

/// Shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Seconds to wait for the server after a signal before killing it.
    pub grace_period_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_period_secs: 10,
        }
    }
}
