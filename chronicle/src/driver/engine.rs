//! Inventory-driven configuration retrieval.

use log::debug;
use tokio_util::sync::CancellationToken;

use super::fetch::ConfigFetcher;
use super::inventory::{DeviceInventory, SettingsSource};
use crate::error::{Error, Result};
use crate::platform::{DriverRegistry, ScriptKind};
use crate::transport::{Connector, SshConnector};

/// Fetches device configuration by inventory nickname.
///
/// Each call looks the device up, loads its driver, reads the current
/// timeouts and runs the driver's script. The driver is released when the
/// call returns. Calls share no mutable state and may run concurrently.
pub struct Chronicle<I, S, C = SshConnector> {
    inventory: I,
    settings: S,
    registry: DriverRegistry,
    fetcher: ConfigFetcher<C>,
}

impl<I: DeviceInventory, S: SettingsSource, C: Connector> Chronicle<I, S, C> {
    pub(crate) fn new(
        inventory: I,
        settings: S,
        registry: DriverRegistry,
        fetcher: ConfigFetcher<C>,
    ) -> Self {
        Self {
            inventory,
            settings,
            registry,
            fetcher,
        }
    }

    /// The device inventory.
    pub fn inventory(&self) -> &I {
        &self.inventory
    }

    /// The driver registry.
    pub fn registry(&self) -> &DriverRegistry {
        &self.registry
    }

    /// Fetch the configuration of the device named `nickname`.
    pub async fn get_config(&self, nickname: &str, cancel: &CancellationToken) -> Result<Vec<String>> {
        self.run_script(nickname, ScriptKind::GetConfig, cancel).await
    }

    /// Run one of the device driver's named scripts.
    pub async fn run_script(
        &self,
        nickname: &str,
        kind: ScriptKind,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>> {
        let record = self.inventory.device(nickname)?;
        let handle = self
            .registry
            .load(&record.device.vendor_name, &record.device.device_name)?;
        let timeouts = self.settings.timeouts()?;

        let script = handle.driver().script(kind).ok_or_else(|| {
            Error::factory(
                "run_script",
                format!("driver {} has no {kind:?} script", handle.driver().identity()),
            )
        })?;

        debug!(
            "running {kind:?} on {nickname} ({}) with {:?}",
            handle.driver().identity(),
            timeouts
        );
        self.fetcher.fetch(&record.ssh, timeouts, script, cancel).await
    }
}
