//! Device drivers for multi-vendor support.
//!
//! A driver maps a (vendor, device) identity to the command scripts used to
//! talk to it. Drivers are produced by driver modules held in a
//! [`DriverRegistry`].

mod definition;
pub mod identity;
mod registry;
pub mod vendors;

pub use definition::DriverDefinition;
pub use identity::{DeviceId, DriverIdentity, VendorId};
pub use registry::{
    DRIVER_ABI_VERSION, DriverFactory, DriverModule, DriverRegistry, LoadedDriverHandle,
    MODULE_EXTENSION,
};

use crate::channel::CommandScript;

/// Named command scripts a driver may provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ScriptKind {
    /// Retrieve the device configuration. Every driver has one.
    GetConfig,

    /// Push configuration to the device.
    ApplyConfig,

    /// Report interface state.
    InterfaceState,
}

/// Per-device command scripts.
pub trait DeviceDriver: Send + Sync {
    /// Identity this driver was built for.
    fn identity(&self) -> DriverIdentity;

    /// Script retrieving the device configuration.
    fn get_config(&self) -> &CommandScript;

    /// Look up a named script.
    fn script(&self, kind: ScriptKind) -> Option<&CommandScript> {
        match kind {
            ScriptKind::GetConfig => Some(self.get_config()),
            _ => None,
        }
    }
}
