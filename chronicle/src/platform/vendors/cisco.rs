//! Cisco driver modules.
//!
//! - `CATALYST_8000V`: IOS-XE virtual router. Paging is disabled before the
//!   running configuration is dumped.
//! - `LINUX_TEST`: a plain Linux shell posing as a Cisco device, used to
//!   exercise the engine against any SSH server.

use super::error_patterns;
use crate::channel::{CommandDescriptor, CommandScript};
use crate::error::Result;
use crate::platform::registry::{DRIVER_ABI_VERSION, DriverModule};
use crate::platform::{DeviceDriver, DeviceId, DriverDefinition, DriverIdentity, VendorId};

const CATALYST_8000V_IDENTITY: DriverIdentity =
    DriverIdentity::new(VendorId::CISCO, DeviceId::CATALYST_8000V);

const LINUX_TEST_IDENTITY: DriverIdentity =
    DriverIdentity::new(VendorId::CISCO, DeviceId::LINUX_TEST);

/// Shell errors on top of the common heuristics.
const LINUX_ERROR_PATTERNS: &[&str] = &[
    r"command not found",
    r"No such file or directory",
    r"Permission denied",
    r"Operation not permitted",
];

/// Catalyst 8000V module.
pub const CATALYST_8000V: DriverModule = DriverModule {
    abi_version: DRIVER_ABI_VERSION,
    name: "CATALYST_8000V",
    identity: CATALYST_8000V_IDENTITY,
    create: Some(create_catalyst_8000v),
    describe: describe_catalyst_8000v,
    on_unload: None,
};

/// Linux test shell module.
pub const LINUX_TEST: DriverModule = DriverModule {
    abi_version: DRIVER_ABI_VERSION,
    name: "LINUX_TEST",
    identity: LINUX_TEST_IDENTITY,
    create: Some(create_linux_test),
    describe: describe_linux_test,
    on_unload: None,
};

fn create_catalyst_8000v(device: DeviceId, vendor: VendorId) -> Result<Box<dyn DeviceDriver>> {
    CATALYST_8000V_IDENTITY.validate(device, vendor)?;

    // Echo + blank line before the config, prompt after.
    let script = CommandScript::new(vec![
        CommandDescriptor::new("terminal length 0", 1, 1, "Failed to set terminal length to 0"),
        CommandDescriptor::new("show running all", 4, 1, "Failed to get configuration"),
    ]);

    Ok(Box::new(DriverDefinition::new(CATALYST_8000V_IDENTITY, script)))
}

fn describe_catalyst_8000v() -> &'static str {
    "Vendor: Cisco\nDevice: CATALYST_8000V\nRetrieves the full running configuration"
}

fn create_linux_test(device: DeviceId, vendor: VendorId) -> Result<Box<dyn DeviceDriver>> {
    LINUX_TEST_IDENTITY.validate(device, vendor)?;

    let script = CommandScript::new(vec![CommandDescriptor::new(
        "cat ~/.bashrc",
        0,
        1,
        "Failed to open .bashrc",
    )])
    .with_patterns(error_patterns(LINUX_ERROR_PATTERNS)?);

    Ok(Box::new(DriverDefinition::new(LINUX_TEST_IDENTITY, script)))
}

fn describe_linux_test() -> &'static str {
    "Vendor: Cisco\nDevice: LINUX_TEST\nReads ~/.bashrc from a Linux shell"
}
