//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! launcher.toml (optional)
//!     → loader.rs (parse & deserialize, or built-in defaults)
//!     → validation.rs (semantic checks)
//!     → LauncherConfig (validated, immutable)
//!
//! .env (operator-edited)
//!     → env_file.rs (parse, required keys, redaction)
//!     → EnvOverlay handed to child processes
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; a run never re-reads it
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod env_file;
pub mod loader;
pub mod schema;
pub mod validation;

pub use env_file::EnvOverlay;
pub use loader::{load_config, resolve_config, ConfigError};
pub use schema::CommandConfig;
pub use schema::LauncherConfig;
