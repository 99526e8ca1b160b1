//! Connection parameters and engine timeouts.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

use crate::error::{Error, ErrorKind, Result};

/// Key-exchange methods offered when the inventory does not specify any.
pub const DEFAULT_KEX_METHODS: &str =
    "curve25519-sha256@libssh.org,ecdh-sha2-nistp384,ecdh-sha2-nistp256,diffie-hellman-group14-sha256";

/// Host-key algorithms accepted when the inventory does not specify any.
pub const DEFAULT_HOSTKEY_ALGORITHMS: &str =
    "ssh-ed25519,ecdsa-sha2-nistp521,ecdsa-sha2-nistp384,ecdsa-sha2-nistp256,rsa-sha2-512,rsa-sha2-256";

/// Default SSH port.
pub const DEFAULT_PORT: u16 = 22;

/// Default login user.
pub const DEFAULT_USER: &str = "chronicle-runner";

/// Parameters for reaching and authenticating against one device.
///
/// Deserializes from the `ssh` section of an inventory record:
///
/// ```json
/// { "host": "10.0.0.1", "port": 22, "user": "admin", "password": "secret",
///   "kexMethods": "curve25519-sha256", "hostkeyAlgorithms": "ssh-ed25519",
///   "verbosity": 0 }
/// ```
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionParameters {
    /// Target host (hostname or IP address).
    pub host: String,

    /// SSH port (default: 22).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Username for password authentication.
    #[serde(rename = "user", default = "default_user")]
    pub username: String,

    /// Password for `username`.
    #[serde(deserialize_with = "deserialize_secret")]
    pub password: SecretString,

    /// Key-exchange algorithms, most preferred first.
    #[serde(default = "default_kex_methods", deserialize_with = "deserialize_list")]
    pub kex_methods: Vec<String>,

    /// Host-key algorithms, most preferred first.
    #[serde(
        default = "default_hostkey_algorithms",
        deserialize_with = "deserialize_list"
    )]
    pub hostkey_algorithms: Vec<String>,

    /// Session log verbosity (0 = quiet, 1 = per command, 2 = per chunk).
    #[serde(default)]
    pub verbosity: u8,

    /// Path to the known_hosts file; `None` uses `~/.ssh/known_hosts`.
    #[serde(default)]
    pub known_hosts_path: Option<PathBuf>,

    /// Timeout for the TCP connect and SSH handshake.
    #[serde(default = "default_connect_timeout", with = "millis")]
    pub connect_timeout: Duration,

    /// Terminal width for PTY.
    #[serde(default = "default_terminal_width")]
    pub terminal_width: u32,

    /// Terminal height for PTY.
    #[serde(default = "default_terminal_height")]
    pub terminal_height: u32,
}

impl ConnectionParameters {
    /// Get the socket address for connection.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Clone for ConnectionParameters {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            password: SecretString::from(self.password.expose_secret().to_owned()),
            kex_methods: self.kex_methods.clone(),
            hostkey_algorithms: self.hostkey_algorithms.clone(),
            verbosity: self.verbosity,
            known_hosts_path: self.known_hosts_path.clone(),
            connect_timeout: self.connect_timeout,
            terminal_width: self.terminal_width,
            terminal_height: self.terminal_height,
        }
    }
}

/// Command timing limits shared by every fetch.
///
/// `idle` is the longest silence after which a command is considered
/// complete; `total` caps a single command regardless of traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineTimeouts {
    /// Maximum silence before a command is considered complete.
    #[serde(rename = "idleTimeoutMs", alias = "sshIdleTimeout", with = "millis")]
    pub idle: Duration,

    /// Hard cap on a single command's execution.
    #[serde(rename = "totalTimeoutMs", alias = "sshTotalTimeout", with = "millis")]
    pub total: Duration,
}

impl EngineTimeouts {
    /// Create timeouts from millisecond values.
    pub fn from_millis(idle_ms: u64, total_ms: u64) -> Self {
        Self {
            idle: Duration::from_millis(idle_ms),
            total: Duration::from_millis(total_ms),
        }
    }

    /// Reject zero durations.
    ///
    /// An idle window wider than the total cap is accepted: every command
    /// then runs until the cap.
    pub fn validate(&self) -> Result<()> {
        if self.idle.is_zero() || self.total.is_zero() {
            return Err(Error::new(
                ErrorKind::InvalidSettings,
                "validate_timeouts",
                format!("timeouts must be non-zero (idle {:?}, total {:?})", self.idle, self.total),
            ));
        }
        Ok(())
    }
}

impl Default for EngineTimeouts {
    fn default() -> Self {
        Self::from_millis(1000, 10_000)
    }
}

/// Split a comma-separated algorithm list, dropping blanks.
pub fn split_algorithm_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_user() -> String {
    DEFAULT_USER.to_string()
}

fn default_kex_methods() -> Vec<String> {
    split_algorithm_list(DEFAULT_KEX_METHODS)
}

fn default_hostkey_algorithms() -> Vec<String> {
    split_algorithm_list(DEFAULT_HOSTKEY_ALGORITHMS)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_terminal_width() -> u32 {
    511
}

fn default_terminal_height() -> u32 {
    24
}

fn deserialize_secret<'de, D>(deserializer: D) -> std::result::Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(SecretString::from(raw))
}

fn deserialize_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(split_algorithm_list(&raw))
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_parameters_from_inventory_json() {
        let params: ConnectionParameters = serde_json::from_str(
            r#"{
                "host": "10.0.0.1",
                "port": 2222,
                "user": "admin",
                "password": "hunter2",
                "kexMethods": "curve25519-sha256, ecdh-sha2-nistp256",
                "hostkeyAlgorithms": "ssh-ed25519",
                "verbosity": 1
            }"#,
        )
        .unwrap();

        assert_eq!(params.socket_addr(), "10.0.0.1:2222");
        assert_eq!(params.username, "admin");
        assert_eq!(params.password.expose_secret(), "hunter2");
        assert_eq!(params.kex_methods, vec!["curve25519-sha256", "ecdh-sha2-nistp256"]);
        assert_eq!(params.hostkey_algorithms, vec!["ssh-ed25519"]);
        assert_eq!(params.verbosity, 1);
        assert!(params.known_hosts_path.is_none());
    }

    #[test]
    fn test_parameters_defaults() {
        let params: ConnectionParameters =
            serde_json::from_str(r#"{"host": "router1", "password": "x"}"#).unwrap();

        assert_eq!(params.port, DEFAULT_PORT);
        assert_eq!(params.username, DEFAULT_USER);
        assert_eq!(params.kex_methods.len(), 4);
        assert_eq!(params.hostkey_algorithms[0], "ssh-ed25519");
        assert_eq!(params.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_password_not_in_debug() {
        let params: ConnectionParameters =
            serde_json::from_str(r#"{"host": "router1", "password": "hunter2"}"#).unwrap();
        assert!(!format!("{params:?}").contains("hunter2"));
    }

    #[test]
    fn test_timeouts_from_settings() {
        let timeouts: EngineTimeouts =
            serde_json::from_str(r#"{"sshIdleTimeout": 750, "sshTotalTimeout": 5000}"#).unwrap();
        assert_eq!(timeouts, EngineTimeouts::from_millis(750, 5000));

        let timeouts: EngineTimeouts =
            serde_json::from_str(r#"{"idleTimeoutMs": 200, "totalTimeoutMs": 900}"#).unwrap();
        assert_eq!(timeouts.idle, Duration::from_millis(200));
        assert_eq!(timeouts.total, Duration::from_millis(900));
    }

    #[test]
    fn test_timeouts_validation() {
        assert!(EngineTimeouts::default().validate().is_ok());

        let err = EngineTimeouts::from_millis(0, 100).validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSettings);

        let err = EngineTimeouts::from_millis(500, 0).validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSettings);

        assert!(EngineTimeouts::from_millis(2000, 1000).validate().is_ok());
    }

    #[test]
    fn test_split_algorithm_list() {
        assert_eq!(split_algorithm_list("a,b,,c "), vec!["a", "b", "c"]);
        assert!(split_algorithm_list("").is_empty());
    }
}
