//! # Chronicle
//!
//! Async engine that retrieves configuration from network devices over SSH.
//!
//! Chronicle opens an interactive shell on a device, runs a vendor-specific
//! command script and returns the cleaned output of the last command. A
//! command is considered complete when the device goes quiet for the idle
//! timeout or when the total timeout elapses, so no prompt matching is
//! needed.
//!
//! ## Features
//!
//! - Async SSH sessions via russh, with known_hosts verification
//! - Dual idle/total command timers and caller cancellation
//! - Pattern-based command failure detection
//! - Statically linked driver modules selected by vendor and device name
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chronicle::channel::{CommandDescriptor, CommandScript};
//! use chronicle::transport::{ConnectionBuilder, EngineTimeouts};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), chronicle::Error> {
//!     let params = ConnectionBuilder::new("192.168.1.1")
//!         .username("admin")
//!         .password("secret")
//!         .build();
//!
//!     let script = CommandScript::new(vec![
//!         CommandDescriptor::new("terminal length 0", 1, 1, "Failed to set terminal length to 0"),
//!         CommandDescriptor::new("show running all", 4, 1, "Failed to get configuration"),
//!     ]);
//!
//!     let lines = chronicle::fetch_config(
//!         &params,
//!         EngineTimeouts::default(),
//!         &script,
//!         &CancellationToken::new(),
//!     )
//!     .await?;
//!
//!     for line in lines {
//!         println!("{line}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod driver;
pub mod error;
pub mod platform;
pub mod transport;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use channel::{CommandDescriptor, CommandScript, ErrorPatterns, OutputProcessor};
pub use driver::{Chronicle, ChronicleBuilder, ConfigFetcher, fetch_config};
pub use error::{Error, ErrorKind, Result};
pub use platform::{DeviceDriver, DriverRegistry, LoadedDriverHandle};
pub use transport::{ConnectionBuilder, ConnectionParameters, EngineTimeouts};
