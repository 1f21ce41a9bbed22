//! Foreground server supervision.
//!
//! # Responsibilities
//! - Spawn the server and wait for it to exit
//! - Forward shutdown signals to the server
//! - Enforce the shutdown grace period, then kill
//!
//! # Design Decisions
//! - SIGTERM is always forwarded
//! - SIGINT is forwarded only when the launcher is not the terminal's
//!   foreground process group; otherwise the terminal already delivered it
//!   to the server
//! - A second signal during the grace period kills immediately
//! - The server's exit code becomes the launcher's

use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::sync::broadcast;

use crate::config::CommandConfig;
use crate::error::BootstrapError;
use crate::lifecycle::shutdown::{Shutdown, ShutdownSignal};
use crate::process::exit_code_of;

/// How the server run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerExit {
    /// Shell-style exit code (`128 + N` for signal `N`).
    pub code: i32,
    /// Whether a shutdown signal arrived before the server exited.
    pub signalled: bool,
    /// Whether the grace period ran out and the server was killed.
    pub killed: bool,
}

impl ServerExit {
    /// Exit code for the launcher process itself.
    pub fn exit_code(&self) -> u8 {
        u8::try_from(self.code).unwrap_or(1)
    }
}

/// Runs the server in the foreground.
pub struct Supervisor {
    grace_period: Duration,
    forward_interrupt: bool,
}

impl Supervisor {
    /// Interrupt forwarding is decided from the controlling terminal.
    pub fn new(grace_period: Duration) -> Self {
        Self {
            grace_period,
            forward_interrupt: !in_terminal_foreground(),
        }
    }

    /// Override whether SIGINT is re-sent to the server.
    pub fn with_interrupt_forwarding(mut self, forward: bool) -> Self {
        self.forward_interrupt = forward;
        self
    }

    /// Spawn `cmd` and supervise it until it exits.
    pub async fn run(
        &self,
        config: &CommandConfig,
        mut cmd: Command,
        shutdown: &Shutdown,
    ) -> Result<ServerExit, BootstrapError> {
        let mut signals = shutdown.subscribe();
        let mut child = cmd.spawn().map_err(|source| BootstrapError::Spawn {
            program: config.program.clone(),
            source,
        })?;

        tracing::info!(
            command = %config.display_line(),
            pid = child.id(),
            "Server started; press Ctrl+C to stop"
        );

        let received = tokio::select! {
            status = child.wait() => {
                let status = status.map_err(|source| BootstrapError::Spawn {
                    program: config.program.clone(),
                    source,
                })?;
                return Ok(finished(status, false, false));
            }
            received = signals.recv() => received,
        };

        let signal = match received {
            Ok(signal) => signal,
            Err(broadcast::error::RecvError::Lagged(_)) => ShutdownSignal::Terminate,
            Err(broadcast::error::RecvError::Closed) => {
                // Coordinator dropped; nothing can ask us to stop any more.
                let status = child.wait().await.map_err(|source| BootstrapError::Spawn {
                    program: config.program.clone(),
                    source,
                })?;
                return Ok(finished(status, false, false));
            }
        };

        self.stop(config, &mut child, signal, &mut signals).await
    }

    async fn stop(
        &self,
        config: &CommandConfig,
        child: &mut Child,
        signal: ShutdownSignal,
        signals: &mut broadcast::Receiver<ShutdownSignal>,
    ) -> Result<ServerExit, BootstrapError> {
        if signal == ShutdownSignal::Terminate || self.forward_interrupt {
            forward(child, signal);
        }
        tracing::info!(
            signal = ?signal,
            grace_secs = self.grace_period.as_secs_f64(),
            "Waiting for server to stop"
        );

        let wait_err = |source: std::io::Error| BootstrapError::Spawn {
            program: config.program.clone(),
            source,
        };

        tokio::select! {
            status = child.wait() => {
                let status = status.map_err(wait_err)?;
                return Ok(finished(status, true, false));
            }
            _ = tokio::time::sleep(self.grace_period) => {
                tracing::warn!("Grace period expired, killing server");
            }
            again = signals.recv() => {
                tracing::warn!(signal = ?again.ok(), "Second signal received, killing server");
            }
        }

        if let Err(e) = child.start_kill() {
            tracing::error!(error = %e, "Failed to kill server");
        }
        let status = child.wait().await.map_err(wait_err)?;
        Ok(finished(status, true, true))
    }
}

fn finished(status: ExitStatus, signalled: bool, killed: bool) -> ServerExit {
    let exit = ServerExit {
        code: exit_code_of(status),
        signalled,
        killed,
    };
    tracing::info!(code = exit.code, signalled, killed, "Server exited");
    exit
}

#[cfg(unix)]
fn forward(child: &Child, signal: ShutdownSignal) {
    let Some(pid) = child.id() else {
        return;
    };
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return;
    };
    // SAFETY: kill(2) has no memory-safety preconditions; the pid belongs to
    // a child we have not reaped yet.
    let rc = unsafe { libc::kill(pid, signal.as_raw()) };
    if rc != 0 {
        tracing::warn!(
            pid,
            error = %std::io::Error::last_os_error(),
            "Failed to forward signal to server"
        );
    }
}

#[cfg(not(unix))]
fn forward(_child: &Child, _signal: ShutdownSignal) {}

/// Whether stdin is a terminal whose foreground group is ours.
///
/// Children inherit stdin and the process group, so in that case a Ctrl+C
/// reaches the server without help.
#[cfg(unix)]
fn in_terminal_foreground() -> bool {
    // SAFETY: isatty, tcgetpgrp and getpgrp only query process state.
    unsafe {
        libc::isatty(libc::STDIN_FILENO) == 1
            && libc::tcgetpgrp(libc::STDIN_FILENO) == libc::getpgrp()
    }
}

#[cfg(not(unix))]
fn in_terminal_foreground() -> bool {
    true
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::process::command;

    fn sh(script: &str) -> CommandConfig {
        CommandConfig::new("sh", ["-c", script])
    }

    #[tokio::test]
    async fn test_exit_code_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let config = sh("exit 3");
        let shutdown = Shutdown::new();

        let exit = Supervisor::new(Duration::from_secs(5))
            .run(&config, command(&config, dir.path(), None), &shutdown)
            .await
            .unwrap();
        assert_eq!(exit, ServerExit { code: 3, signalled: false, killed: false });
        assert_eq!(exit.exit_code(), 3);
    }

    #[tokio::test]
    async fn test_terminate_is_forwarded() {
        let dir = tempfile::tempdir().unwrap();
        let config = CommandConfig::new("sleep", ["30"]);
        let shutdown = Shutdown::new();

        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.trigger(ShutdownSignal::Terminate);
        });

        let exit = Supervisor::new(Duration::from_secs(10))
            .run(&config, command(&config, dir.path(), None), &shutdown)
            .await
            .unwrap();
        assert_eq!(exit.code, 128 + libc::SIGTERM);
        assert!(exit.signalled);
        assert!(!exit.killed);
    }

    #[tokio::test]
    async fn test_interrupt_is_forwarded() {
        let dir = tempfile::tempdir().unwrap();
        let config = sh("trap 'echo graceful > stopped; exit 0' INT; while :; do sleep 0.1; done");
        let shutdown = Shutdown::new();

        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            trigger.trigger(ShutdownSignal::Interrupt);
        });

        let exit = Supervisor::new(Duration::from_secs(10))
            .with_interrupt_forwarding(true)
            .run(&config, command(&config, dir.path(), None), &shutdown)
            .await
            .unwrap();
        assert_eq!(exit, ServerExit { code: 0, signalled: true, killed: false });
        assert_eq!(std::fs::read_to_string(dir.path().join("stopped")).unwrap(), "graceful\n");
    }

    #[tokio::test]
    async fn test_interrupt_left_to_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let config = CommandConfig::new("sleep", ["30"]);
        let shutdown = Shutdown::new();

        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.trigger(ShutdownSignal::Interrupt);
        });

        let exit = Supervisor::new(Duration::from_millis(300))
            .with_interrupt_forwarding(false)
            .run(&config, command(&config, dir.path(), None), &shutdown)
            .await
            .unwrap();
        assert!(exit.killed);
        assert_eq!(exit.code, 128 + libc::SIGKILL);
    }

    #[tokio::test]
    async fn test_grace_period_then_kill() {
        let dir = tempfile::tempdir().unwrap();
        let config = sh("trap '' INT TERM; while :; do sleep 0.1; done");
        let shutdown = Shutdown::new();

        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.trigger(ShutdownSignal::Terminate);
        });

        let exit = Supervisor::new(Duration::from_millis(300))
            .run(&config, command(&config, dir.path(), None), &shutdown)
            .await
            .unwrap();
        assert!(exit.killed);
        assert_eq!(exit.code, 128 + libc::SIGKILL);
    }

    #[tokio::test]
    async fn test_second_signal_kills_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let config = sh("trap '' INT TERM; while :; do sleep 0.1; done");
        let shutdown = Shutdown::new();

        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.trigger(ShutdownSignal::Terminate);
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.trigger(ShutdownSignal::Terminate);
        });

        let started = std::time::Instant::now();
        let exit = Supervisor::new(Duration::from_secs(60))
            .run(&config, command(&config, dir.path(), None), &shutdown)
            .await
            .unwrap();
        assert!(exit.killed);
        assert!(started.elapsed() < Duration::from_secs(30));
    }
}
