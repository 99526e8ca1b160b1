//! Configuration fetch orchestration.
//!
//! One fetch is: connect, open a shell channel, flush the login banner, run
//! the command script in order and keep the output of the last command. The
//! channel is closed and the session ended on every exit path.

use std::time::Instant;

use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::channel::{ChannelExecutor, CommandScript, ShellChannel};
use crate::error::{Error, ErrorKind, Result};
use crate::transport::{ConnectionParameters, Connector, EngineTimeouts, ShellSession, SshConnector};

/// Runs command scripts against devices reached through a [`Connector`].
#[derive(Debug, Clone, Default)]
pub struct ConfigFetcher<C> {
    connector: C,
}

impl ConfigFetcher<SshConnector> {
    /// Fetcher connecting over SSH.
    pub fn ssh() -> Self {
        Self::new(SshConnector)
    }
}

impl<C: Connector> ConfigFetcher<C> {
    /// Create a fetcher using `connector`.
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Run `script` on the device and return the output lines of its last
    /// command.
    ///
    /// Any failure aborts the remaining commands and discards partial output.
    /// Cancelling `cancel` ends the command in progress as if its total
    /// timeout elapsed, then fails the fetch with [`ErrorKind::Cancelled`].
    pub async fn fetch(
        &self,
        params: &ConnectionParameters,
        timeouts: EngineTimeouts,
        script: &CommandScript,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>> {
        timeouts.validate()?;
        if script.is_empty() {
            return Err(Error::factory("fetch_config", "command script is empty"));
        }
        check_cancelled(cancel, "connect")?;

        let started = Instant::now();
        let addr = params.socket_addr();
        info!("fetching configuration from {addr}");

        let mut session = self.connector.connect(params).await?;

        let result = if !session.is_connected() {
            Err(Error::new(
                ErrorKind::Unknown,
                "open_channel",
                format!("{addr}: SSH session died, could not create channel"),
            ))
        } else {
            match session.open_channel().await {
                Ok(mut channel) => {
                    let result = run_script(&mut channel, params, timeouts, script, cancel).await;
                    channel.close().await;
                    result
                }
                Err(e) => Err(e),
            }
        };

        session.end().await;

        match &result {
            Ok(lines) => info!(
                "fetched {} lines from {addr} in {:?}",
                lines.len(),
                started.elapsed()
            ),
            Err(e) => warn!("fetch from {addr} failed: {e}"),
        }
        result
    }
}

async fn run_script<Ch: ShellChannel>(
    channel: &mut Ch,
    params: &ConnectionParameters,
    timeouts: EngineTimeouts,
    script: &CommandScript,
    cancel: &CancellationToken,
) -> Result<Vec<String>> {
    let mut executor = ChannelExecutor::new(channel, timeouts)
        .with_cancellation(cancel.clone())
        .with_verbosity(params.verbosity);

    executor.flush_banner().await?;

    let mut output = Vec::new();
    for descriptor in script.commands() {
        check_cancelled(cancel, "execute_command")?;
        output = executor.execute(descriptor, script.patterns()).await?;
    }
    check_cancelled(cancel, "execute_command")?;

    debug!("script of {} commands completed", script.commands().len());
    Ok(output)
}

fn check_cancelled(cancel: &CancellationToken, operation: &'static str) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(Error::new(ErrorKind::Cancelled, operation, "fetch cancelled by caller"));
    }
    Ok(())
}

/// Fetch over SSH with a one-off [`ConfigFetcher`].
pub async fn fetch_config(
    params: &ConnectionParameters,
    timeouts: EngineTimeouts,
    script: &CommandScript,
    cancel: &CancellationToken,
) -> Result<Vec<String>> {
    ConfigFetcher::ssh().fetch(params, timeouts, script, cancel).await
}
