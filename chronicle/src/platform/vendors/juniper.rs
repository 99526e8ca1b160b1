//! Juniper driver modules.
//!
//! `VSRX` dumps the configuration in `set` form. `| no-more` disables the
//! pager for this command only, so no session setup is needed.

use super::error_patterns;
use crate::channel::{CommandDescriptor, CommandScript};
use crate::error::Result;
use crate::platform::registry::{DRIVER_ABI_VERSION, DriverModule};
use crate::platform::{DeviceDriver, DeviceId, DriverDefinition, DriverIdentity, VendorId};

const VSRX_IDENTITY: DriverIdentity = DriverIdentity::new(VendorId::JUNIPER, DeviceId::VSRX);

/// JUNOS CLI errors on top of the common heuristics.
const JUNOS_ERROR_PATTERNS: &[&str] = &[r"^\s*syntax error", r"^\s*missing argument"];

/// vSRX module.
pub const VSRX: DriverModule = DriverModule {
    abi_version: DRIVER_ABI_VERSION,
    name: "VSRX",
    identity: VSRX_IDENTITY,
    create: Some(create_vsrx),
    describe: describe_vsrx,
    on_unload: None,
};

fn create_vsrx(device: DeviceId, vendor: VendorId) -> Result<Box<dyn DeviceDriver>> {
    VSRX_IDENTITY.validate(device, vendor)?;

    // Echo before the config; blank line and prompt after.
    let script = CommandScript::new(vec![CommandDescriptor::new(
        "show configuration | display set | no-more",
        1,
        2,
        "Failed to get configuration",
    )])
    .with_patterns(error_patterns(JUNOS_ERROR_PATTERNS)?);

    Ok(Box::new(DriverDefinition::new(VSRX_IDENTITY, script)))
}

fn describe_vsrx() -> &'static str {
    "Vendor: Juniper\nDevice: VSRX\nRetrieves the configuration as set commands"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::OutputProcessor;
    use crate::error::ErrorKind;

    #[test]
    fn test_vsrx_script() {
        let driver = create_vsrx(DeviceId::VSRX, VendorId::JUNIPER).unwrap();
        let commands = driver.get_config().commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].command, "show configuration | display set | no-more");
        assert_eq!((commands[0].skip_head, commands[0].skip_tail), (1, 2));
    }

    #[test]
    fn test_vsrx_rejects_cisco_ids() {
        // Device id 1 is also ENCS_5100 under Cisco.
        let err = create_vsrx(DeviceId::VSRX, VendorId::CISCO).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidVendorId);
        assert_eq!(err.detail(), "Vendor ID does not match Juniper. (1 instead of 2)");

        let err = create_vsrx(DeviceId::CATALYST_8000V, VendorId::JUNIPER).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidDeviceId);
    }

    #[test]
    fn test_vsrx_syntax_error() {
        let driver = create_vsrx(DeviceId::VSRX, VendorId::JUNIPER).unwrap();
        let script = driver.get_config();
        let processor = OutputProcessor::new(script.patterns());

        let raw = "show configuration | display sett\n                                ^\nsyntax error.\n\nadmin@vsrx> ";
        let err = processor.process(raw, &script.commands()[0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CommandFailed);
        assert!(err.detail().contains("syntax error."));

        let raw = "show configuration | display set | no-more\nset system host-name vsrx\nset system root-authentication encrypted-password \"$6$x\"\n\nadmin@vsrx> ";
        let lines = processor.process(raw, &script.commands()[0]).unwrap();
        assert_eq!(
            lines,
            vec![
                "set system host-name vsrx",
                "set system root-authentication encrypted-password \"$6$x\"",
            ]
        );
    }
}
