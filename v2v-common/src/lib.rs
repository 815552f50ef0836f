//! # v2v Common
//!
//! Shared utilities for the v2v components.
//!
//! ## Logging
//!
//! ```rust,no_run
//! use v2v_common::{init_logging, LogFormat};
//!
//! init_logging("info", LogFormat::Pretty).unwrap();
//! tracing::info!(vm = "vm-123", "Building volumes");
//! ```

pub mod logging;

pub use logging::{init_logging, init_logging_json, init_logging_pretty, LogFormat};
