//! Channel layer: command timing and output processing.
//!
//! This module drives one interactive shell channel. Devices never emit an
//! explicit end-of-output marker, so completion is inferred from traffic
//! silence (idle timeout) bounded by a hard cap (total timeout).

mod buffer;
mod executor;
mod output;

pub use buffer::CaptureBuffer;
pub use executor::ChannelExecutor;
pub use output::{CommandDescriptor, CommandScript, ErrorPatterns, OutputProcessor};

use std::future::Future;

use bytes::Bytes;

use crate::error::Result;

/// A chunk of data received on a shell channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamChunk {
    /// Primary output stream.
    Stdout(Bytes),

    /// Secondary (extended, stderr) stream.
    Stderr(Bytes),
}

/// An open interactive shell channel.
///
/// `read` must be cancel-safe: the executor races it against timers and
/// cancellation, and a dropped `read` future must not lose data.
pub trait ShellChannel: Send {
    /// Write raw bytes to the channel.
    fn write(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Wait for the next chunk of output.
    ///
    /// Returns `Ok(None)` once the remote side has closed the channel.
    fn read(&mut self) -> impl Future<Output = Result<Option<StreamChunk>>> + Send;

    /// Send EOF and close the channel. Best effort.
    fn close(self) -> impl Future<Output = ()> + Send;
}
