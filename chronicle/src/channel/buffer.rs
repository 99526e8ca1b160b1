//! Capture buffers for one command's output.

use bytes::BytesMut;

use super::StreamChunk;

/// Accumulates primary and secondary stream output for one command.
#[derive(Debug)]
pub struct CaptureBuffer {
    stdout: BytesMut,
    stderr: BytesMut,

    /// Bytes seen on both streams, retained or not.
    received: usize,

    /// When false, chunks are only counted.
    retain: bool,
}

impl CaptureBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            stdout: BytesMut::with_capacity(4096),
            stderr: BytesMut::new(),
            received: 0,
            retain: true,
        }
    }

    /// Create a buffer that counts chunks without keeping them.
    pub fn discarding() -> Self {
        Self {
            stdout: BytesMut::new(),
            stderr: BytesMut::new(),
            received: 0,
            retain: false,
        }
    }

    /// Append a received chunk to the matching stream.
    pub fn extend(&mut self, chunk: &StreamChunk) {
        let (StreamChunk::Stdout(data) | StreamChunk::Stderr(data)) = chunk;
        self.received += data.len();
        if !self.retain {
            return;
        }

        match chunk {
            StreamChunk::Stdout(data) => self.stdout.extend_from_slice(data),
            StreamChunk::Stderr(data) => self.stderr.extend_from_slice(data),
        }
    }

    /// Primary stream as text (lossy UTF-8 conversion).
    pub fn stdout_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    /// Secondary stream as text (lossy UTF-8 conversion).
    pub fn stderr_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }

    /// Whether anything arrived on the secondary stream.
    pub fn has_stderr(&self) -> bool {
        !self.stderr.is_empty()
    }

    /// Total bytes captured on both streams.
    pub fn len(&self) -> usize {
        self.stdout.len() + self.stderr.len()
    }

    /// Total bytes seen on both streams, including discarded ones.
    pub fn received(&self) -> usize {
        self.received
    }

    /// Check if nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear both streams.
    pub fn clear(&mut self) {
        self.stdout.clear();
        self.stderr.clear();
        self.received = 0;
    }
}

impl Default for CaptureBuffer {
    fn default() -> Self {
        Self::new()
    }
}
