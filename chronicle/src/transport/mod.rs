//! SSH transport layer wrapping russh.
//!
//! This module provides session establishment (connect, host identity
//! verification, password authentication) and interactive channel creation.
//! The [`Connector`] and [`ShellSession`] traits are the seam the fetch
//! orchestrator is written against.

mod builder;
pub mod config;
pub mod known_hosts;
mod ssh;

pub use builder::ConnectionBuilder;
pub use config::{ConnectionParameters, EngineTimeouts};
pub use known_hosts::{KnownHostState, KnownHosts};
pub use ssh::{SshChannel, SshConnector, SshSession};

use std::future::Future;

use crate::channel::ShellChannel;
use crate::error::Result;

/// An authenticated session able to open interactive channels.
pub trait ShellSession: Send {
    /// Channel type produced by this session.
    type Channel: ShellChannel;

    /// Whether the underlying transport is still connected.
    fn is_connected(&self) -> bool;

    /// Open a channel with a PTY and a shell.
    fn open_channel(&mut self) -> impl Future<Output = Result<Self::Channel>> + Send;

    /// Disconnect and release the session. Best effort.
    fn end(self) -> impl Future<Output = ()> + Send;
}

/// Establishes authenticated sessions.
pub trait Connector: Send + Sync {
    /// Session type produced by this connector.
    type Session: ShellSession;

    /// Connect, verify the host and authenticate.
    fn connect(
        &self,
        params: &ConnectionParameters,
    ) -> impl Future<Output = Result<Self::Session>> + Send;
}
