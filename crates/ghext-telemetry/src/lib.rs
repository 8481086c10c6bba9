//! Logging for `ghext`.
//!
//! Wraps `tracing-subscriber` so every binary configures output the same
//! way: a level plus per-target directives, one of four formats, and a
//! stderr or rolling-file target.
//!
//! # Example
//!
//! ```rust,no_run
//! use ghext_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), ghext_telemetry::TelemetryError> {
//! let config = LogConfig::new("debug")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("ghext_fetch=trace");
//!
//! setup_logging(&config)?;
//! tracing::info!("fetching");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, setup_logging};
