//! Builder for connection parameters.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use super::config::{
    ConnectionParameters, DEFAULT_HOSTKEY_ALGORITHMS, DEFAULT_KEX_METHODS, DEFAULT_PORT,
    DEFAULT_USER, split_algorithm_list,
};

/// Builder for [`ConnectionParameters`].
///
/// # Example
///
/// ```rust
/// use chronicle::transport::ConnectionBuilder;
///
/// let params = ConnectionBuilder::new("192.168.1.1")
///     .username("admin")
///     .password("secret")
///     .kex_methods("curve25519-sha256,diffie-hellman-group14-sha256")
///     .build();
/// assert_eq!(params.kex_methods.len(), 2);
/// ```
pub struct ConnectionBuilder {
    host: String,
    port: u16,
    username: String,
    password: SecretString,
    kex_methods: Vec<String>,
    hostkey_algorithms: Vec<String>,
    verbosity: u8,
    known_hosts_path: Option<PathBuf>,
    connect_timeout: Duration,
    terminal_width: u32,
    terminal_height: u32,
}

impl ConnectionBuilder {
    /// Create a new builder for the specified host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            username: DEFAULT_USER.to_string(),
            password: SecretString::from(String::new()),
            kex_methods: split_algorithm_list(DEFAULT_KEX_METHODS),
            hostkey_algorithms: split_algorithm_list(DEFAULT_HOSTKEY_ALGORITHMS),
            verbosity: 0,
            known_hosts_path: None,
            connect_timeout: Duration::from_secs(10),
            terminal_width: 511,
            terminal_height: 24,
        }
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the username for authentication.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Set the password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = SecretString::from(password.into());
        self
    }

    /// Set the key-exchange preference list (comma separated).
    pub fn kex_methods(mut self, methods: &str) -> Self {
        self.kex_methods = split_algorithm_list(methods);
        self
    }

    /// Set the host-key algorithm preference list (comma separated).
    pub fn hostkey_algorithms(mut self, algorithms: &str) -> Self {
        self.hostkey_algorithms = split_algorithm_list(algorithms);
        self
    }

    /// Set the session log verbosity.
    pub fn verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Use a specific known_hosts file.
    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set terminal dimensions.
    pub fn terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// Build the parameters.
    pub fn build(self) -> ConnectionParameters {
        ConnectionParameters {
            host: self.host,
            port: self.port,
            username: self.username,
            password: self.password,
            kex_methods: self.kex_methods,
            hostkey_algorithms: self.hostkey_algorithms,
            verbosity: self.verbosity,
            known_hosts_path: self.known_hosts_path,
            connect_timeout: self.connect_timeout,
            terminal_width: self.terminal_width,
            terminal_height: self.terminal_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_builder_defaults() {
        let params = ConnectionBuilder::new("10.1.1.1").build();
        assert_eq!(params.port, 22);
        assert_eq!(params.username, "chronicle-runner");
        assert_eq!(params.terminal_width, 511);
        assert_eq!(params.kex_methods[0], "curve25519-sha256@libssh.org");
    }

    #[test]
    fn test_builder_overrides() {
        let params = ConnectionBuilder::new("10.1.1.1")
            .port(830)
            .username("netops")
            .password("pw")
            .hostkey_algorithms("rsa-sha2-512")
            .known_hosts_path("/tmp/known_hosts")
            .verbosity(2)
            .build();

        assert_eq!(params.socket_addr(), "10.1.1.1:830");
        assert_eq!(params.username, "netops");
        assert_eq!(params.password.expose_secret(), "pw");
        assert_eq!(params.hostkey_algorithms, vec!["rsa-sha2-512"]);
        assert_eq!(params.known_hosts_path, Some(PathBuf::from("/tmp/known_hosts")));
        assert_eq!(params.verbosity, 2);
    }
}
