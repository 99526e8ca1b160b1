//! SSH session and channel implementation using russh.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use log::{debug, warn};
use russh::client::{self, Handle, Msg};
use russh::keys::{Algorithm, PublicKey};
use russh::{Channel, ChannelMsg, Disconnect, Preferred, kex};
use secrecy::ExposeSecret;
use tokio::net::TcpStream;

use super::config::ConnectionParameters;
use super::known_hosts::KnownHosts;
use super::{Connector, ShellSession};
use crate::channel::{ShellChannel, StreamChunk};
use crate::error::{Error, ErrorKind, Result};

/// Opens [`SshSession`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct SshConnector;

impl Connector for SshConnector {
    type Session = SshSession;

    async fn connect(&self, params: &ConnectionParameters) -> Result<SshSession> {
        SshSession::open(params).await
    }
}

/// An authenticated SSH session.
pub struct SshSession {
    /// The russh session handle.
    handle: Handle<SshHandler>,

    /// `host:port`, for diagnostics.
    addr: String,

    terminal_width: u32,
    terminal_height: u32,
    verbosity: u8,
}

impl SshSession {
    /// Connect, verify the host key and authenticate with a password.
    pub async fn open(params: &ConnectionParameters) -> Result<Self> {
        let addr = params.socket_addr();

        let stream = tokio::time::timeout(
            params.connect_timeout,
            TcpStream::connect((params.host.as_str(), params.port)),
        )
        .await
        .map_err(|_| {
            Error::new(
                ErrorKind::ConnectionFailed,
                "open_session",
                format!("{addr}: connect timed out after {:?}", params.connect_timeout),
            )
        })?
        .map_err(|e| {
            Error::new(ErrorKind::ConnectionFailed, "open_session", format!("{addr}: {e}"))
                .with_source(e)
        })?;

        let config = Arc::new(client::Config {
            preferred: preferred_algorithms(params),
            ..Default::default()
        });

        let diagnostic: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
        let handler = SshHandler {
            known_hosts: KnownHosts::new(
                params.host.clone(),
                params.port,
                params.known_hosts_path.clone(),
            ),
            diagnostic: diagnostic.clone(),
        };

        let mut handle = tokio::time::timeout(
            params.connect_timeout,
            client::connect_stream(config, stream, handler),
        )
        .await
        .map_err(|_| Error::session("open_session", format!("{addr}: SSH handshake timed out")))?
        .map_err(|e| {
            // A rejected host key surfaces from russh as a generic error;
            // prefer the diagnostic recorded by the handler.
            match diagnostic.lock().ok().and_then(|mut slot| slot.take()) {
                Some(diag) => Error::session("verify_known_host", format!("{addr}: {diag}")),
                None => Error::session("open_session", format!("{addr}: {e}")).with_source(e),
            }
        })?;

        let auth = handle
            .authenticate_password(params.username.as_str(), params.password.expose_secret())
            .await;

        match auth {
            Ok(result) if result.success() => {}
            Ok(_) => {
                disconnect(&handle).await;
                return Err(Error::session(
                    "authenticate",
                    format!("wrong password for user \"{}\"", params.username),
                ));
            }
            Err(e) => {
                disconnect(&handle).await;
                return Err(Error::session("authenticate", e.to_string()).with_source(e));
            }
        }

        debug!("session established to {addr} as {}", params.username);

        Ok(Self {
            handle,
            addr,
            terminal_width: params.terminal_width,
            terminal_height: params.terminal_height,
            verbosity: params.verbosity,
        })
    }

    /// Open a new PTY channel running a shell.
    pub async fn open_channel(&self) -> Result<SshChannel> {
        if self.handle.is_closed() {
            return Err(Error::new(
                ErrorKind::Unknown,
                "open_channel",
                format!("{}: SSH session died, could not create channel", self.addr),
            ));
        }

        let channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|e| Error::session("open_channel", e.to_string()).with_source(e))?;

        let mut channel = SshChannel {
            channel,
            pending: VecDeque::new(),
            finished: false,
        };

        if let Err(e) = channel
            .channel
            .request_pty(true, "xterm", self.terminal_width, self.terminal_height, 0, 0, &[])
            .await
        {
            channel.close().await;
            return Err(Error::session("request_pty", e.to_string()).with_source(e));
        }
        if let Err(e) = channel.await_reply("request_pty").await {
            channel.close().await;
            return Err(e);
        }

        if let Err(e) = channel.channel.request_shell(true).await {
            channel.close().await;
            return Err(Error::session("request_shell", e.to_string()).with_source(e));
        }
        if let Err(e) = channel.await_reply("request_shell").await {
            channel.close().await;
            return Err(e);
        }

        if self.verbosity >= 1 {
            debug!("shell channel open on {}", self.addr);
        }
        Ok(channel)
    }

    /// Disconnect the session.
    pub async fn end(self) {
        disconnect(&self.handle).await;
        debug!("session to {} ended", self.addr);
    }
}

impl ShellSession for SshSession {
    type Channel = SshChannel;

    fn is_connected(&self) -> bool {
        !self.handle.is_closed()
    }

    async fn open_channel(&mut self) -> Result<SshChannel> {
        SshSession::open_channel(self).await
    }

    async fn end(self) {
        SshSession::end(self).await
    }
}

async fn disconnect(handle: &Handle<SshHandler>) {
    if let Err(e) = handle
        .disconnect(Disconnect::ByApplication, "", "en")
        .await
    {
        debug!("disconnect failed: {e}");
    }
}

/// Map the configured algorithm names onto russh's preference lists.
///
/// Names russh does not implement are skipped; an empty result keeps
/// russh's defaults.
fn preferred_algorithms(params: &ConnectionParameters) -> Preferred {
    let defaults = Preferred::default();

    let kex: Vec<kex::Name> = params
        .kex_methods
        .iter()
        .filter_map(|name| match kex::Name::try_from(name.as_str()) {
            Ok(kex) => Some(kex),
            Err(_) => {
                warn!("unsupported key-exchange method {name:?} ignored");
                None
            }
        })
        .collect();

    let key: Vec<Algorithm> = params
        .hostkey_algorithms
        .iter()
        .filter_map(|name| match name.parse::<Algorithm>() {
            Ok(algorithm) => Some(algorithm),
            Err(_) => {
                warn!("unsupported host-key algorithm {name:?} ignored");
                None
            }
        })
        .collect();

    Preferred {
        kex: if kex.is_empty() { defaults.kex.clone() } else { Cow::Owned(kex) },
        key: if key.is_empty() { defaults.key.clone() } else { Cow::Owned(key) },
        ..defaults
    }
}

/// Interactive shell channel over SSH.
pub struct SshChannel {
    channel: Channel<Msg>,

    /// Output that arrived while waiting for request replies.
    pending: VecDeque<StreamChunk>,

    /// EOF or close received from the remote.
    finished: bool,
}

impl SshChannel {
    /// Wait for the server's answer to a PTY or shell request.
    async fn await_reply(&mut self, step: &'static str) -> Result<()> {
        loop {
            match self.channel.wait().await {
                Some(ChannelMsg::Success) => return Ok(()),
                Some(ChannelMsg::Failure) => {
                    return Err(Error::session(step, "request rejected by server"));
                }
                Some(ChannelMsg::Data { data }) => {
                    self.pending.push_back(StreamChunk::Stdout(Bytes::copy_from_slice(&data)));
                }
                Some(ChannelMsg::ExtendedData { data, ext: 1 }) => {
                    self.pending.push_back(StreamChunk::Stderr(Bytes::copy_from_slice(&data)));
                }
                Some(ChannelMsg::Eof | ChannelMsg::Close) | None => {
                    return Err(Error::session(step, "channel closed before reply"));
                }
                Some(_) => {}
            }
        }
    }
}

impl ShellChannel for SshChannel {
    async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.channel
            .data(data)
            .await
            .map_err(|e| Error::session("channel_write", e.to_string()).with_source(e))
    }

    async fn read(&mut self) -> Result<Option<StreamChunk>> {
        if let Some(chunk) = self.pending.pop_front() {
            return Ok(Some(chunk));
        }
        if self.finished {
            return Ok(None);
        }

        loop {
            match self.channel.wait().await {
                Some(ChannelMsg::Data { data }) => {
                    return Ok(Some(StreamChunk::Stdout(Bytes::copy_from_slice(&data))));
                }
                Some(ChannelMsg::ExtendedData { data, ext: 1 }) => {
                    return Ok(Some(StreamChunk::Stderr(Bytes::copy_from_slice(&data))));
                }
                Some(ChannelMsg::Eof | ChannelMsg::Close) => {
                    self.finished = true;
                    return Ok(None);
                }
                Some(_) => {}
                None => {
                    return Err(Error::session(
                        "channel_read",
                        "SSH read failed: session closed unexpectedly",
                    ));
                }
            }
        }
    }

    async fn close(self) {
        if let Err(e) = self.channel.eof().await {
            debug!("channel eof failed: {e}");
        }
        if let Err(e) = self.channel.close().await {
            debug!("channel close failed: {e}");
        }
    }
}

/// SSH client handler for russh.
struct SshHandler {
    known_hosts: KnownHosts,

    /// Stores the host-key diagnostic so open() can surface it
    /// instead of the generic russh error.
    diagnostic: Arc<Mutex<Option<String>>>,
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        match self.known_hosts.verify(server_public_key) {
            None => Ok(true),
            Some(diag) => {
                warn!("host key verification failed: {diag}");
                if let Ok(mut slot) = self.diagnostic.lock() {
                    *slot = Some(diag);
                }
                Ok(false)
            }
        }
    }
}
