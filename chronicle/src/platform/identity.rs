//! Vendor and device identifiers.
//!
//! Names coming from the inventory are mapped to numeric ids through fixed
//! lookup tables. The tables are pure data: every supported vendor/device is
//! listed here whether or not a driver module exists for it.

use std::fmt;

use crate::error::{Error, ErrorKind, Result};

/// Numeric vendor identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VendorId(pub u32);

impl VendorId {
    pub const CISCO: VendorId = VendorId(1);
    pub const JUNIPER: VendorId = VendorId(2);
}

impl fmt::Display for VendorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric device identifier, unique within a vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub u32);

impl DeviceId {
    // Cisco
    pub const ENCS_5100: DeviceId = DeviceId(1);
    pub const C1700: DeviceId = DeviceId(2);
    pub const C7200: DeviceId = DeviceId(3);
    pub const CATALYST_8000V: DeviceId = DeviceId(4);
    pub const CSR1000V: DeviceId = DeviceId(5);
    pub const LINUX_TEST: DeviceId = DeviceId(80);

    // Juniper
    pub const VSRX: DeviceId = DeviceId(1);
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A (vendor, device) pair selecting one driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DriverIdentity {
    pub vendor: VendorId,
    pub device: DeviceId,
}

impl DriverIdentity {
    /// Create a new identity.
    pub const fn new(vendor: VendorId, device: DeviceId) -> Self {
        Self { vendor, device }
    }

    /// Check requested ids against this identity, vendor first.
    pub fn validate(&self, device: DeviceId, vendor: VendorId) -> Result<()> {
        if vendor != self.vendor {
            return Err(Error::new(
                ErrorKind::InvalidVendorId,
                "create_driver",
                format!(
                    "Vendor ID does not match {}. ({} instead of {})",
                    vendor_name(self.vendor).unwrap_or("driver vendor"),
                    vendor,
                    self.vendor
                ),
            ));
        }
        if device != self.device {
            return Err(Error::new(
                ErrorKind::InvalidDeviceId,
                "create_driver",
                format!(
                    "Device ID does not match {}. ({} instead of {})",
                    device_name(self.vendor, self.device).unwrap_or("driver device"),
                    device,
                    self.device
                ),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for DriverIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (vendor_name(self.vendor), device_name(self.vendor, self.device)) {
            (Some(vendor), Some(device)) => write!(f, "{vendor}/{device}"),
            _ => write!(f, "{}/{}", self.vendor, self.device),
        }
    }
}

struct VendorEntry {
    name: &'static str,
    id: VendorId,
    devices: &'static [(&'static str, DeviceId)],
}

const CATALOG: &[VendorEntry] = &[
    VendorEntry {
        name: "Cisco",
        id: VendorId::CISCO,
        devices: &[
            ("ENCS_5100", DeviceId::ENCS_5100),
            ("C1700", DeviceId::C1700),
            ("C7200", DeviceId::C7200),
            ("CATALYST_8000V", DeviceId::CATALYST_8000V),
            ("CSR1000V", DeviceId::CSR1000V),
            ("LINUX_TEST", DeviceId::LINUX_TEST),
        ],
    },
    VendorEntry {
        name: "Juniper",
        id: VendorId::JUNIPER,
        devices: &[("VSRX", DeviceId::VSRX)],
    },
];

fn vendor_entry(id: VendorId) -> Option<&'static VendorEntry> {
    CATALOG.iter().find(|entry| entry.id == id)
}

/// Look up a vendor id by name (case-insensitive).
pub fn resolve_vendor(name: &str) -> Result<VendorId> {
    CATALOG
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(name))
        .map(|entry| entry.id)
        .ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidVendorId,
                "resolve_vendor",
                format!("No vendor ID found for {name:?}"),
            )
        })
}

/// Look up a device id by name within a vendor (case-insensitive).
pub fn resolve_device(vendor: VendorId, name: &str) -> Result<DeviceId> {
    vendor_entry(vendor)
        .and_then(|entry| {
            entry
                .devices
                .iter()
                .find(|(device, _)| device.eq_ignore_ascii_case(name))
        })
        .map(|(_, id)| *id)
        .ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidDeviceId,
                "resolve_device",
                format!("No device ID found for {name:?} (vendor {vendor})"),
            )
        })
}

/// Canonical vendor name.
pub fn vendor_name(vendor: VendorId) -> Option<&'static str> {
    vendor_entry(vendor).map(|entry| entry.name)
}

/// Canonical device name.
pub fn device_name(vendor: VendorId, device: DeviceId) -> Option<&'static str> {
    vendor_entry(vendor)?
        .devices
        .iter()
        .find(|(_, id)| *id == device)
        .map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_vendor() {
        assert_eq!(resolve_vendor("Cisco").unwrap(), VendorId::CISCO);
        assert_eq!(resolve_vendor("juniper").unwrap(), VendorId::JUNIPER);

        let err = resolve_vendor("Arista").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidVendorId);
    }

    #[test]
    fn test_resolve_device_is_per_vendor() {
        assert_eq!(
            resolve_device(VendorId::CISCO, "CATALYST_8000V").unwrap(),
            DeviceId::CATALYST_8000V
        );
        assert_eq!(resolve_device(VendorId::JUNIPER, "vsrx").unwrap(), DeviceId::VSRX);

        let err = resolve_device(VendorId::JUNIPER, "CATALYST_8000V").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDeviceId);

        let err = resolve_device(VendorId(99), "VSRX").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDeviceId);
    }

    #[test]
    fn test_names() {
        assert_eq!(vendor_name(VendorId::JUNIPER), Some("Juniper"));
        assert_eq!(device_name(VendorId::CISCO, DeviceId(80)), Some("LINUX_TEST"));
        assert_eq!(device_name(VendorId::JUNIPER, DeviceId(80)), None);
    }

    #[test]
    fn test_validate_checks_vendor_first() {
        let identity = DriverIdentity::new(VendorId::CISCO, DeviceId::CATALYST_8000V);
        assert!(identity.validate(DeviceId::CATALYST_8000V, VendorId::CISCO).is_ok());

        let err = identity.validate(DeviceId::VSRX, VendorId::JUNIPER).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidVendorId);
        assert_eq!(err.detail(), "Vendor ID does not match Cisco. (2 instead of 1)");

        let err = identity.validate(DeviceId::CSR1000V, VendorId::CISCO).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDeviceId);
        assert_eq!(err.detail(), "Device ID does not match CATALYST_8000V. (5 instead of 4)");
    }

    #[test]
    fn test_display() {
        let identity = DriverIdentity::new(VendorId::JUNIPER, DeviceId::VSRX);
        assert_eq!(identity.to_string(), "Juniper/VSRX");
        assert_eq!(DriverIdentity::new(VendorId(9), DeviceId(9)).to_string(), "9/9");
    }
}
