//! Command execution on one shell channel.
//!
//! A command is complete when the channel has been silent for the idle
//! timeout, or when the total timeout has elapsed regardless of traffic.
//! Waiting is readiness based: each iteration races the next channel read
//! against the nearer of the two deadlines and the caller's cancellation
//! token, so no CPU is spent between chunks.

use std::time::Duration;

use log::{debug, trace};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::buffer::CaptureBuffer;
use super::output::{CommandDescriptor, ErrorPatterns, OutputProcessor};
use super::ShellChannel;
use crate::error::{Error, Result};
use crate::transport::EngineTimeouts;

/// Timeouts are compared at millisecond granularity; the total deadline is
/// placed one tick past the cap so `elapsed > total` holds when it fires.
const TIMER_RESOLUTION: Duration = Duration::from_millis(1);

/// Why a collection loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Completion {
    Idle,
    Total,
    Cancelled,
}

/// Runs commands on an open channel.
pub struct ChannelExecutor<'a, C: ShellChannel> {
    channel: &'a mut C,
    timeouts: EngineTimeouts,
    cancel: CancellationToken,
    verbosity: u8,
}

impl<'a, C: ShellChannel> ChannelExecutor<'a, C> {
    /// Create an executor over `channel`.
    pub fn new(channel: &'a mut C, timeouts: EngineTimeouts) -> Self {
        Self {
            channel,
            timeouts,
            cancel: CancellationToken::new(),
            verbosity: 0,
        }
    }

    /// Stop waiting when `token` is cancelled, as if the total timeout elapsed.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Set session log verbosity.
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Consume login banners and MOTD until the channel goes quiet.
    ///
    /// Content is never inspected; only transport read errors fail.
    pub async fn flush_banner(&mut self) -> Result<()> {
        let mut discard = CaptureBuffer::discarding();
        let completion = self.collect(&mut discard).await?;
        debug!(
            "flushed {} banner bytes ({:?})",
            discard.received(),
            completion
        );
        Ok(())
    }

    /// Run one command and return its sanitized output lines.
    pub async fn execute(
        &mut self,
        descriptor: &CommandDescriptor,
        patterns: &ErrorPatterns,
    ) -> Result<Vec<String>> {
        let line = format!("{}\n", descriptor.command);
        self.channel.write(line.as_bytes()).await?;

        let start = Instant::now();
        let mut capture = CaptureBuffer::new();
        let completion = self.collect(&mut capture).await?;

        if self.verbosity >= 1 {
            debug!(
                "{:?} completed in {:?} ({:?}, {} bytes)",
                descriptor.command,
                start.elapsed(),
                completion,
                capture.len()
            );
        }

        if capture.has_stderr() {
            return Err(Error::command(
                "execute_command",
                format!(
                    "{} (stderr: {})",
                    descriptor.failure_message,
                    capture.stderr_lossy()
                ),
            ));
        }

        OutputProcessor::new(patterns).process(&capture.stdout_lossy(), descriptor)
    }

    /// Read into `capture` until idle, total timeout or cancellation.
    async fn collect(&mut self, capture: &mut CaptureBuffer) -> Result<Completion> {
        let idle = self.timeouts.idle;
        let total = self.timeouts.total;

        let start = Instant::now();
        let total_deadline = start + total + TIMER_RESOLUTION;
        let mut last_data = start;
        let mut closed = false;

        loop {
            let now = Instant::now();
            if now.duration_since(last_data) >= idle {
                return Ok(Completion::Idle);
            }
            if now.duration_since(start) > total {
                return Ok(Completion::Total);
            }

            let deadline = (last_data + idle).min(total_deadline);

            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    debug!("collection cancelled after {:?}", start.elapsed());
                    return Ok(Completion::Cancelled);
                }

                chunk = self.channel.read(), if !closed => {
                    match chunk? {
                        Some(chunk) => {
                            capture.extend(&chunk);
                            last_data = Instant::now();
                            if self.verbosity >= 2 {
                                trace!("chunk: {:?}, captured {} bytes", chunk, capture.len());
                            }
                        }
                        None => {
                            debug!("channel closed by remote");
                            closed = true;
                        }
                    }
                }

                _ = tokio::time::sleep_until(deadline) => {}
            }
        }
    }
}
