//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every bootstrap step:
//!     → tracing events with structured fields (step, command, status)
//!     → inside a `bootstrap` span carrying the run ID
//!     → logging.rs subscriber (stderr, pretty or JSON)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Secrets are redacted before they reach a log field (config::env_file)

pub mod logging;

pub use logging::{init_logging, LogFormat};
