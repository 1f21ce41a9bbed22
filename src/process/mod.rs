//! Subprocess management.
//!
//! # Data Flow
//! ```text
//! CommandConfig + workdir (+ EnvOverlay)
//!     → command() (tokio Command, inherited stdio)
//!     → run_to_completion() for install / connection test
//!     → supervisor.rs for the foreground server
//! ```
//!
//! # Design Decisions
//! - Children inherit stdio; the operator sees installer and test output live
//! - Children stay in the launcher's process group so terminal Ctrl-C reaches them
//! - Exit statuses are returned, not judged; callers decide what failure means

pub mod supervisor;

use std::path::Path;
use std::process::ExitStatus;

use tokio::process::Command;

use crate::config::{CommandConfig, EnvOverlay};
use crate::error::BootstrapError;

pub use supervisor::{ServerExit, Supervisor};

/// Build a command that runs in `workdir`, exporting `overlay` if given.
pub fn command(config: &CommandConfig, workdir: &Path, overlay: Option<&EnvOverlay>) -> Command {
    let mut cmd = Command::new(&config.program);
    cmd.args(&config.args).current_dir(workdir);
    if let Some(overlay) = overlay {
        cmd.envs(overlay.iter());
    }
    cmd
}

/// Spawn `cmd` and wait for it to exit.
pub async fn run_to_completion(
    step: &'static str,
    config: &CommandConfig,
    mut cmd: Command,
) -> Result<ExitStatus, BootstrapError> {
    tracing::info!(step, command = %config.display_line(), "Running");

    let status = cmd.status().await.map_err(|source| BootstrapError::Spawn {
        program: config.program.clone(),
        source,
    })?;

    tracing::info!(step, status = %status, success = status.success(), "Finished");
    Ok(status)
}

/// Shell-style exit code: the process code, or `128 + N` for signal `N`.
pub fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
