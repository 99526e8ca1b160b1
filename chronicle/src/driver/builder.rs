//! Builder for the [`Chronicle`] engine.

use super::engine::Chronicle;
use super::fetch::ConfigFetcher;
use super::inventory::{DeviceInventory, SettingsSource};
use crate::platform::DriverRegistry;
use crate::transport::{Connector, SshConnector};

/// Builder for constructing a [`Chronicle`] engine.
///
/// # Example
///
/// ```rust,no_run
/// use chronicle::driver::{ChronicleBuilder, InMemoryInventory};
/// use chronicle::transport::EngineTimeouts;
///
/// let engine = ChronicleBuilder::new(InMemoryInventory::new(), EngineTimeouts::default())
///     .build();
/// ```
pub struct ChronicleBuilder<I, S, C = SshConnector> {
    inventory: I,
    settings: S,
    registry: Option<DriverRegistry>,
    connector: C,
}

impl<I: DeviceInventory, S: SettingsSource> ChronicleBuilder<I, S> {
    /// Create a builder over an inventory and a settings source.
    pub fn new(inventory: I, settings: S) -> Self {
        Self {
            inventory,
            settings,
            registry: None,
            connector: SshConnector,
        }
    }
}

impl<I: DeviceInventory, S: SettingsSource, C: Connector> ChronicleBuilder<I, S, C> {
    /// Use a custom driver registry (default: the built-in drivers).
    pub fn registry(mut self, registry: DriverRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Reach devices through a different connector.
    pub fn connector<C2: Connector>(self, connector: C2) -> ChronicleBuilder<I, S, C2> {
        ChronicleBuilder {
            inventory: self.inventory,
            settings: self.settings,
            registry: self.registry,
            connector,
        }
    }

    /// Build the engine. Nothing is connected until a fetch runs.
    pub fn build(self) -> Chronicle<I, S, C> {
        Chronicle::new(
            self.inventory,
            self.settings,
            self.registry.unwrap_or_else(DriverRegistry::with_builtin_drivers),
            ConfigFetcher::new(self.connector),
        )
    }
}
