//! Data-defined device drivers.

use indexmap::IndexMap;

use super::identity::DriverIdentity;
use super::{DeviceDriver, ScriptKind};
use crate::channel::CommandScript;

/// A device driver defined entirely by its command scripts.
///
/// This is what the built-in vendor modules produce: an identity, the
/// mandatory "get configuration" script and any additional named scripts.
#[derive(Debug, Clone)]
pub struct DriverDefinition {
    /// Identity this driver was built for.
    pub identity: DriverIdentity,

    /// Script retrieving the device configuration.
    pub get_config: CommandScript,

    /// Additional named scripts.
    pub scripts: IndexMap<ScriptKind, CommandScript>,
}

impl DriverDefinition {
    /// Create a driver with its configuration retrieval script.
    pub fn new(identity: DriverIdentity, get_config: CommandScript) -> Self {
        Self {
            identity,
            get_config,
            scripts: IndexMap::new(),
        }
    }

    /// Add a named script.
    pub fn with_script(mut self, kind: ScriptKind, script: CommandScript) -> Self {
        self.scripts.insert(kind, script);
        self
    }
}

impl DeviceDriver for DriverDefinition {
    fn identity(&self) -> DriverIdentity {
        self.identity
    }

    fn get_config(&self) -> &CommandScript {
        &self.get_config
    }

    fn script(&self, kind: ScriptKind) -> Option<&CommandScript> {
        match kind {
            ScriptKind::GetConfig => Some(&self.get_config),
            other => self.scripts.get(&other),
        }
    }
}
