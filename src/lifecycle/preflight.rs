//! Local prerequisite checks.
//!
//! # Responsibilities
//! - Locate the interpreter on `PATH`
//! - Enforce an optional interpreter version floor
//! - Confirm the dependency manifest exists
//!
//! # Design Decisions
//! - Fail fast: every check returns a `Precondition` the operator can act on
//! - PATH lookup is explicit so tests can point it at a sandbox

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::config::schema::InterpreterConfig;
use crate::error::{BootstrapError, Precondition};

/// A dotted numeric version, compared component-wise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    /// Parse "MAJOR.MINOR" or "MAJOR.MINOR.PATCH".
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        let (major, minor, patch) = match parts.as_slice() {
            [major, minor] => (*major, *minor, "0"),
            [major, minor, patch] => (*major, *minor, *patch),
            _ => return None,
        };
        Some(Self {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
            patch: patch.parse().ok()?,
        })
    }

    /// First version-looking token in free-form `--version` output.
    ///
    /// Handles "Python 3.11.4", "v18.17.0" and pre-release suffixes such as
    /// "3.13.0rc1".
    pub fn find_in(output: &str) -> Option<Self> {
        output.split_whitespace().find_map(|token| {
            let token = token.trim_start_matches(|c: char| !c.is_ascii_digit());
            let end = token
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .unwrap_or(token.len());
            Self::parse(token[..end].trim_end_matches('.'))
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Resolve `program` against `search_path` (a `PATH`-style list).
///
/// A program containing a path separator is checked directly. Relative ones
/// are taken from `workdir`, where every child process runs.
pub fn find_on_path(program: &str, search_path: Option<&OsStr>, workdir: &Path) -> Option<PathBuf> {
    let as_path = Path::new(program);
    if as_path.components().count() > 1 {
        let candidate = workdir.join(as_path);
        return is_executable(&candidate).then_some(candidate);
    }

    std::env::split_paths(search_path?)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Step 1: interpreter present (and new enough, if configured).
pub async fn check_interpreter(
    config: &InterpreterConfig,
    search_path: Option<&OsStr>,
    workdir: &Path,
) -> Result<PathBuf, BootstrapError> {
    let resolved = find_on_path(&config.program, search_path, workdir).ok_or_else(|| {
        Precondition::Interpreter {
            program: config.program.clone(),
        }
    })?;
    tracing::info!(program = %config.program, path = %resolved.display(), "Interpreter found");

    let Some(required) = config.min_version.as_deref().filter(|v| !v.trim().is_empty()) else {
        return Ok(resolved);
    };
    // Validation guarantees the floor parses.
    let floor = Version::parse(required).ok_or_else(|| Precondition::InterpreterVersion {
        program: config.program.clone(),
        found: "unknown".to_string(),
        required: required.to_string(),
    })?;

    // Children resolve a relative program from inside `workdir` themselves.
    let program = if resolved.is_absolute() {
        resolved.as_os_str()
    } else {
        OsStr::new(&config.program)
    };
    let output = Command::new(program)
        .args(&config.version_args)
        .current_dir(workdir)
        .output()
        .await
        .map_err(|source| BootstrapError::Spawn {
            program: config.program.clone(),
            source,
        })?;
    // Older interpreters print their version on stderr.
    let text = format!(
        "{} {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );

    match Version::find_in(&text) {
        Some(found) if found >= floor => {
            tracing::info!(version = %found, minimum = %floor, "Interpreter version accepted");
            Ok(resolved)
        }
        found => Err(Precondition::InterpreterVersion {
            program: config.program.clone(),
            found: found.map_or_else(|| "unknown".to_string(), |v| v.to_string()),
            required: required.to_string(),
        }
        .into()),
    }
}

/// Step 2: dependency manifest present.
pub fn check_manifest(path: &Path) -> Result<(), BootstrapError> {
    if path.is_file() {
        tracing::info!(manifest = %path.display(), "Dependency manifest found");
        Ok(())
    } else {
        Err(Precondition::Manifest {
            path: path.to_path_buf(),
        }
        .into())
    }
}
