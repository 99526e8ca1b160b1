//! Host identity verification against a known_hosts record.
//!
//! The lookup result is reduced to a [`KnownHostState`] and then resolved to
//! an optional diagnostic. An empty diagnostic means the session may proceed
//! to authentication; anything else aborts session establishment.

use std::path::{Path, PathBuf};

use log::{debug, info};
use russh::keys::{HashAlg, PublicKey};

/// Outcome of looking the server key up in known_hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnownHostState {
    /// Host is recorded with this key.
    Known,

    /// Host is recorded with a different key.
    Changed { line: usize },

    /// The known_hosts record itself does not exist.
    NotFound,

    /// Host is not recorded yet (first contact).
    Unknown,

    /// The lookup failed.
    Error(String),
}

/// Resolve a lookup state to a diagnostic.
///
/// `learn` is called only for first contact; its error becomes the diagnostic.
pub fn resolve_state<F>(state: KnownHostState, learn: F) -> Option<String>
where
    F: FnOnce() -> std::result::Result<(), String>,
{
    match state {
        KnownHostState::Known => None,
        KnownHostState::Changed { line } => Some(format!(
            "Host key for server changed (known_hosts line {line})"
        )),
        KnownHostState::NotFound => Some("The host key for this server was not found".to_string()),
        KnownHostState::Unknown => learn().err(),
        KnownHostState::Error(message) => Some(message),
    }
}

/// Known-hosts lookup for one host.
#[derive(Debug, Clone)]
pub struct KnownHosts {
    host: String,
    port: u16,
    path: Option<PathBuf>,
}

impl KnownHosts {
    /// Lookup for `host:port`, using `path` or the user's default file.
    pub fn new(host: impl Into<String>, port: u16, path: Option<PathBuf>) -> Self {
        Self {
            host: host.into(),
            port,
            path,
        }
    }

    /// Explicit known_hosts path, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Look the server key up.
    pub fn lookup(&self, pubkey: &PublicKey) -> KnownHostState {
        let result = match self.path {
            Some(ref path) if !path.exists() => return KnownHostState::NotFound,
            Some(ref path) => russh::keys::check_known_hosts_path(&self.host, self.port, pubkey, path),
            None => russh::keys::check_known_hosts(&self.host, self.port, pubkey),
        };

        match result {
            Ok(true) => KnownHostState::Known,
            Ok(false) => KnownHostState::Unknown,
            Err(russh::keys::Error::KeyChanged { line }) => KnownHostState::Changed { line },
            Err(e) => KnownHostState::Error(e.to_string()),
        }
    }

    /// Record the server key.
    pub fn learn(&self, pubkey: &PublicKey) -> std::result::Result<(), String> {
        let result = if let Some(ref path) = self.path {
            russh::keys::known_hosts::learn_known_hosts_path(&self.host, self.port, pubkey, path)
        } else {
            russh::keys::known_hosts::learn_known_hosts(&self.host, self.port, pubkey)
        };

        result.map_err(|e| e.to_string())?;
        info!(
            "learned host key for {}:{} ({})",
            self.host,
            self.port,
            pubkey.fingerprint(HashAlg::Sha256)
        );
        Ok(())
    }

    /// Verify the server key, returning a diagnostic on failure.
    pub fn verify(&self, pubkey: &PublicKey) -> Option<String> {
        let state = self.lookup(pubkey);
        debug!("known_hosts state for {}:{}: {:?}", self.host, self.port, state);
        resolve_state(state, || self.learn(pubkey))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn test_known_proceeds() {
        assert_eq!(resolve_state(KnownHostState::Known, || unreachable!()), None);
    }

    #[test]
    fn test_changed_fails() {
        let diag = resolve_state(KnownHostState::Changed { line: 7 }, || unreachable!()).unwrap();
        assert!(diag.contains("changed"));
        assert!(diag.contains('7'));
    }

    #[test]
    fn test_not_found_fails() {
        let diag = resolve_state(KnownHostState::NotFound, || unreachable!()).unwrap();
        assert!(diag.contains("not found"));
    }

    #[test]
    fn test_unknown_learns_and_proceeds() {
        let learned = Cell::new(false);
        let diag = resolve_state(KnownHostState::Unknown, || {
            learned.set(true);
            Ok(())
        });
        assert_eq!(diag, None);
        assert!(learned.get());
    }

    #[test]
    fn test_unknown_learn_failure_surfaces() {
        let diag = resolve_state(KnownHostState::Unknown, || Err("read-only file system".into()));
        assert_eq!(diag.as_deref(), Some("read-only file system"));
    }

    #[test]
    fn test_lookup_error_surfaces() {
        let diag = resolve_state(KnownHostState::Error("bad base64".into()), || unreachable!());
        assert_eq!(diag.as_deref(), Some("bad base64"));
    }

    #[test]
    fn test_learn_then_lookup_then_key_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("known_hosts");
        std::fs::write(&path, "").unwrap();

        let hosts = KnownHosts::new("router1", 2222, Some(path.clone()));
        let key = russh::keys::parse_public_key_base64(
            "AAAAC3NzaC1lZDI1NTE5AAAAIJdD7y3aLq454yWBdwLWbieU1ebz9/cu7/QEXn9OIeZJ",
        )
        .unwrap();
        let other = russh::keys::parse_public_key_base64(
            "AAAAC3NzaC1lZDI1NTE5AAAAIOv1MSTqBwpB2uTtkaIJnph81FvHMcSNfquPinyA9BLB",
        )
        .unwrap();

        assert_eq!(hosts.lookup(&key), KnownHostState::Unknown);
        assert_eq!(hosts.verify(&key), None);
        assert!(std::fs::read_to_string(&path).unwrap().contains("[router1]:2222"));

        assert_eq!(hosts.lookup(&key), KnownHostState::Known);
        assert_eq!(hosts.verify(&key), None);

        assert!(matches!(hosts.lookup(&other), KnownHostState::Changed { .. }));
        let diag = hosts.verify(&other).unwrap();
        assert!(diag.contains("changed"));

        // Other hosts in the same file are still first contact.
        let neighbour = KnownHosts::new("router2", 2222, Some(path));
        assert_eq!(neighbour.lookup(&other), KnownHostState::Unknown);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let hosts = KnownHosts::new(
            "router1",
            22,
            Some(PathBuf::from("/nonexistent/chronicle/known_hosts")),
        );
        let key = russh::keys::parse_public_key_base64(
            "AAAAC3NzaC1lZDI1NTE5AAAAIJdD7y3aLq454yWBdwLWbieU1ebz9/cu7/QEXn9OIeZJ",
        )
        .unwrap();
        assert_eq!(hosts.lookup(&key), KnownHostState::NotFound);
    }
}
