//! Startup orchestration.
//!
//! # Responsibilities
//! - Check the interpreter and the dependency manifest
//! - Install dependencies
//! - Materialize and inspect the environment file
//! - Gate on the connection test
//! - Launch the server in the foreground
//!
//! # Design Decisions
//! - Fail fast: any failed step is fatal, nothing is retried
//! - Steps run in order, never concurrently
//! - The server starts last and at most once per run

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{EnvOverlay, LauncherConfig};
use crate::error::{BootstrapError, Precondition};
use crate::lifecycle::environment::{ensure_env_file, inspect_env_file, EnvFileStatus};
use crate::lifecycle::preflight::{check_interpreter, check_manifest};
use crate::lifecycle::shutdown::Shutdown;
use crate::process::{self, ServerExit, Supervisor};

/// Everything the launch step needs from a successful preflight.
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    /// Resolved interpreter path.
    pub interpreter: PathBuf,
    /// Environment exported to the server, if configured.
    pub overlay: Option<EnvOverlay>,
    /// Whether the connection test actually ran.
    pub connection_tested: bool,
}

/// The bootstrap sequence for one working directory.
pub struct Bootstrap {
    config: LauncherConfig,
    workdir: PathBuf,
    search_path: Option<OsString>,
}

impl Bootstrap {
    /// Create a bootstrap that resolves programs against the process `PATH`.
    pub fn new(config: LauncherConfig, workdir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            workdir: workdir.into(),
            search_path: std::env::var_os("PATH"),
        }
    }

    /// Override the `PATH` used for the interpreter check.
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.workdir.join(path)
    }

    /// Steps 1 through 6. Returns once the server may be launched.
    pub async fn preflight(&self) -> Result<LaunchPlan, BootstrapError> {
        let config = &self.config;

        // 1. Interpreter
        let interpreter =
            check_interpreter(&config.interpreter, self.search_path.as_deref(), &self.workdir)
                .await?;

        // 2. Manifest
        check_manifest(&self.resolve(&config.dependencies.manifest))?;

        // 3. Install
        let install = &config.dependencies.install;
        let status = process::run_to_completion(
            "install",
            install,
            process::command(install, &self.workdir, None),
        )
        .await?;
        if !status.success() {
            return Err(Precondition::DependencyInstall { status }.into());
        }

        // 4. Environment file
        let env_file = self.resolve(&config.environment.file);
        let template = self.resolve(&config.environment.template);
        if let EnvFileStatus::Materialized { template } = ensure_env_file(&env_file, &template).await? {
            return Err(BootstrapError::SetupRequired { env_file, template });
        }
        let overlay = inspect_env_file(&env_file, &config.environment)?;

        // 5 + 6. Connection test gate
        let connection_tested = self.connection_test(overlay.as_ref()).await?;

        Ok(LaunchPlan {
            interpreter,
            overlay,
            connection_tested,
        })
    }

    async fn connection_test(&self, overlay: Option<&EnvOverlay>) -> Result<bool, BootstrapError> {
        let test = &self.config.connection_test;

        if let Some(script) = test.skip_if_missing.as_deref().filter(|s| !s.trim().is_empty()) {
            let script = self.resolve(script);
            if !script.exists() {
                tracing::warn!(
                    script = %script.display(),
                    "Connection test not found, skipping"
                );
                return Ok(false);
            }
        }

        let status = process::run_to_completion(
            "connection_test",
            &test.command,
            process::command(&test.command, &self.workdir, overlay),
        )
        .await?;
        if !status.success() {
            return Err(BootstrapError::ExternalCheckFailed { status });
        }
        tracing::info!("Connection test passed");
        Ok(true)
    }

    /// Step 7: run the server in the foreground until it exits.
    pub async fn launch(&self, plan: &LaunchPlan, shutdown: &Shutdown) -> Result<ServerExit, BootstrapError> {
        let server = &self.config.server.command;
        let supervisor = Supervisor::new(Duration::from_secs(self.config.shutdown.grace_period_secs));
        supervisor
            .run(
                server,
                process::command(server, &self.workdir, plan.overlay.as_ref()),
                shutdown,
            )
            .await
    }

    /// Preflight followed by launch.
    pub async fn run(&self, shutdown: &Shutdown) -> Result<ServerExit, BootstrapError> {
        let plan = self.preflight().await?;
        self.launch(&plan, shutdown).await
    }
}
