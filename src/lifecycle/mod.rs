//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     preflight.rs   interpreter on PATH → manifest present
//!     install        dependency installer must exit 0
//!     environment.rs .env present, or copied from template (then stop)
//!     gate           connection test must exit 0
//!     launch         server in the foreground (process::supervisor)
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast to supervisor → forward / wait / kill
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → ShutdownSignal events
//! ```
//!
//! # Design Decisions
//! - Ordered startup: checks first, server last
//! - Shutdown has timeout: forced kill after the grace period

pub mod environment;
pub mod preflight;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use startup::{Bootstrap, LaunchPlan};
