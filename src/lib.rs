//! MongoDB Atlas MCP server launcher library.
//!
//! Checks the local environment, installs dependencies, gates on a
//! connection test and then runs the server in the foreground.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod process;

pub use config::LauncherConfig;
pub use error::{BootstrapError, Precondition};
pub use lifecycle::{Bootstrap, Shutdown};
