//! Configuration fetch orchestration.
//!
//! [`ConfigFetcher`] runs one command script against one device.
//! [`Chronicle`] ties it to an inventory, a settings source and the driver
//! registry so devices can be addressed by nickname.

mod builder;
mod engine;
mod fetch;
mod inventory;

pub use builder::ChronicleBuilder;
pub use engine::Chronicle;
pub use fetch::{ConfigFetcher, fetch_config};
pub use inventory::{DeviceInventory, DeviceModel, DeviceRecord, InMemoryInventory, SettingsSource};
