//! Device inventory and engine settings sources.
//!
//! Persistence is injected: the engine only sees these traits, never a
//! database connection.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{Error, ErrorKind, Result};
use crate::transport::{ConnectionParameters, EngineTimeouts};

/// Vendor and model of an inventoried device.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceModel {
    /// Vendor name, e.g. `Cisco`.
    pub vendor_name: String,

    /// Device name within the vendor, e.g. `CATALYST_8000V`.
    pub device_name: String,
}

/// One inventoried device.
///
/// ```json
/// { "nickname": "edge-1",
///   "device": { "vendorName": "Cisco", "deviceName": "CATALYST_8000V" },
///   "ssh": { "host": "10.0.0.1", "user": "admin", "password": "secret" } }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceRecord {
    /// Unique name the device is looked up by.
    pub nickname: String,

    /// Vendor and model.
    pub device: DeviceModel,

    /// How to reach the device.
    pub ssh: ConnectionParameters,
}

/// Source of device records.
pub trait DeviceInventory: Send + Sync {
    /// Look up a device by nickname.
    ///
    /// Fails with [`ErrorKind::DeviceNotFound`] for unknown nicknames.
    fn device(&self, nickname: &str) -> Result<DeviceRecord>;
}

/// Source of engine settings.
pub trait SettingsSource: Send + Sync {
    /// Current command timeouts.
    fn timeouts(&self) -> Result<EngineTimeouts>;
}

impl SettingsSource for EngineTimeouts {
    fn timeouts(&self) -> Result<EngineTimeouts> {
        Ok(*self)
    }
}

/// Inventory held in memory, keyed by nickname.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventory {
    devices: IndexMap<String, DeviceRecord>,
}

impl InMemoryInventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a record.
    pub fn insert(&mut self, record: DeviceRecord) {
        self.devices.insert(record.nickname.clone(), record);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_device(mut self, record: DeviceRecord) -> Self {
        self.insert(record);
        self
    }

    /// Remove a record.
    pub fn remove(&mut self, nickname: &str) -> Option<DeviceRecord> {
        self.devices.shift_remove(nickname)
    }

    /// Nicknames in insertion order.
    pub fn nicknames(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(String::as_str)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Check if the inventory is empty.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl FromIterator<DeviceRecord> for InMemoryInventory {
    fn from_iter<T: IntoIterator<Item = DeviceRecord>>(iter: T) -> Self {
        let mut inventory = Self::new();
        for record in iter {
            inventory.insert(record);
        }
        inventory
    }
}

impl DeviceInventory for InMemoryInventory {
    fn device(&self, nickname: &str) -> Result<DeviceRecord> {
        self.devices.get(nickname).cloned().ok_or_else(|| {
            Error::new(
                ErrorKind::DeviceNotFound,
                "get_device",
                format!("no device with nickname {nickname:?}"),
            )
        })
    }
}
