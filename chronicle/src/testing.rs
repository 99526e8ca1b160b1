//! Scripted channel/session doubles for unit tests.
//!
//! A [`MockChannel`] replays queued chunks at fixed offsets: the banner from
//! construction time, and one response per written command from the time of
//! the write. Pair with `#[tokio::test(start_paused = true)]` for
//! deterministic timing.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use crate::channel::{ShellChannel, StreamChunk};
use crate::error::{Error, ErrorKind, Result};
use crate::transport::{ConnectionParameters, Connector, ShellSession};

/// A chunk delivered `Duration` after its reference point.
pub(crate) type Scripted = Vec<(Duration, StreamChunk)>;

/// Shared record of what the doubles observed.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockLog {
    inner: Arc<Mutex<LogInner>>,
}

#[derive(Debug, Default)]
struct LogInner {
    writes: Vec<String>,
    events: Vec<&'static str>,
}

impl MockLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn writes(&self) -> Vec<String> {
        self.inner.lock().unwrap().writes.clone()
    }

    pub(crate) fn events(&self) -> Vec<&'static str> {
        self.inner.lock().unwrap().events.clone()
    }

    fn write(&self, data: &[u8]) {
        let text = String::from_utf8_lossy(data).to_string();
        self.inner.lock().unwrap().writes.push(text);
    }

    fn event(&self, event: &'static str) {
        self.inner.lock().unwrap().events.push(event);
    }
}

/// Scripted shell channel.
pub(crate) struct MockChannel {
    log: MockLog,
    pending: VecDeque<(Instant, StreamChunk)>,
    responses: VecDeque<Scripted>,
    hang_up: bool,
    fail_reads: bool,
    fail_writes: bool,
}

impl MockChannel {
    pub(crate) fn new(log: MockLog) -> Self {
        Self {
            log,
            pending: VecDeque::new(),
            responses: VecDeque::new(),
            hang_up: false,
            fail_reads: false,
            fail_writes: false,
        }
    }

    /// Chunks sent right after the channel opens.
    pub(crate) fn with_banner(mut self, banner: Scripted) -> Self {
        let now = Instant::now();
        self.pending
            .extend(banner.into_iter().map(|(offset, chunk)| (now + offset, chunk)));
        self
    }

    /// Chunks sent in answer to the next unanswered write.
    pub(crate) fn respond(mut self, chunks: Scripted) -> Self {
        self.responses.push_back(chunks);
        self
    }

    /// Report the channel closed once queued output is drained.
    pub(crate) fn hang_up(mut self) -> Self {
        self.hang_up = true;
        self
    }

    pub(crate) fn fail_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub(crate) fn fail_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }
}

impl ShellChannel for MockChannel {
    async fn write(&mut self, data: &[u8]) -> Result<()> {
        if self.fail_writes {
            return Err(Error::session("channel_write", "write rejected"));
        }
        self.log.write(data);

        let now = Instant::now();
        if let Some(chunks) = self.responses.pop_front() {
            self.pending
                .extend(chunks.into_iter().map(|(offset, chunk)| (now + offset, chunk)));
        }
        Ok(())
    }

    async fn read(&mut self) -> Result<Option<StreamChunk>> {
        if self.fail_reads {
            return Err(Error::session("channel_read", "connection reset"));
        }

        let Some(due) = self.pending.front().map(|(due, _)| *due) else {
            if self.hang_up {
                return Ok(None);
            }
            return std::future::pending().await;
        };

        if due > Instant::now() {
            tokio::time::sleep_until(due).await;
        }
        Ok(self.pending.pop_front().map(|(_, chunk)| chunk))
    }

    async fn close(self) {
        self.log.event("channel_closed");
    }
}

/// Session handing out a single prepared channel.
pub(crate) struct MockSession {
    log: MockLog,
    channel: Option<MockChannel>,
    connected: bool,
}

impl MockSession {
    pub(crate) fn new(log: MockLog, channel: MockChannel) -> Self {
        Self {
            log,
            channel: Some(channel),
            connected: true,
        }
    }

    pub(crate) fn disconnected(mut self) -> Self {
        self.connected = false;
        self
    }
}

impl ShellSession for MockSession {
    type Channel = MockChannel;

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn open_channel(&mut self) -> Result<MockChannel> {
        if !self.connected {
            return Err(Error::new(ErrorKind::Unknown, "open_channel", "session died"));
        }
        self.log.event("channel_opened");
        self.channel
            .take()
            .ok_or_else(|| Error::session("open_channel", "channel already taken"))
    }

    async fn end(self) {
        self.log.event("session_ended");
    }
}

/// Connector returning a prepared session, or a prepared failure.
pub(crate) struct MockConnector {
    session: Mutex<Option<Result<MockSession>>>,
}

impl MockConnector {
    pub(crate) fn new(session: MockSession) -> Self {
        Self {
            session: Mutex::new(Some(Ok(session))),
        }
    }

    pub(crate) fn failing(error: Error) -> Self {
        Self {
            session: Mutex::new(Some(Err(error))),
        }
    }
}

impl Connector for MockConnector {
    type Session = MockSession;

    async fn connect(&self, _params: &ConnectionParameters) -> Result<MockSession> {
        let prepared = self.session.lock().unwrap().take();
        prepared.unwrap_or_else(|| Err(Error::session("connect", "mock connector exhausted")))
    }
}
