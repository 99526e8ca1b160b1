//! Registry of driver modules.
//!
//! Driver modules are statically linked into the crate. Each one exports a
//! [`DriverModule`] function table, and the registry selects it by module path
//! (`<Vendor>/<DEVICE>.cld`) the same way a dynamic loader would select a
//! shared object.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::debug;

use super::identity::{self, DeviceId, DriverIdentity, VendorId};
use super::{DeviceDriver, vendors};
use crate::error::{Error, Result};

/// ABI version every module must be built against.
pub const DRIVER_ABI_VERSION: u32 = 1;

/// File extension of driver modules.
pub const MODULE_EXTENSION: &str = "cld";

/// Factory entry point of a driver module.
pub type DriverFactory = fn(DeviceId, VendorId) -> Result<Box<dyn DeviceDriver>>;

/// Function table exported by a driver module.
#[derive(Clone, Copy)]
pub struct DriverModule {
    /// ABI version the module was built against.
    pub abi_version: u32,

    /// Module name, the file stem of its path.
    pub name: &'static str,

    /// Identity of the driver the module produces.
    pub identity: DriverIdentity,

    /// Factory entry point.
    pub create: Option<DriverFactory>,

    /// Human-readable module description.
    pub describe: fn() -> &'static str,

    /// Called after the last driver instance from this load is dropped.
    pub on_unload: Option<fn()>,
}

impl fmt::Debug for DriverModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverModule")
            .field("abi_version", &self.abi_version)
            .field("name", &self.name)
            .field("identity", &self.identity)
            .field("has_factory", &self.create.is_some())
            .finish()
    }
}

/// A loaded driver and the module that produced it.
///
/// The driver instance is always released before the module.
pub struct LoadedDriverHandle {
    // Field order is drop order.
    driver: Box<dyn DeviceDriver>,
    module: ModuleGuard,
}

impl LoadedDriverHandle {
    /// The driver instance.
    pub fn driver(&self) -> &dyn DeviceDriver {
        self.driver.as_ref()
    }

    /// The module the driver came from.
    pub fn module(&self) -> &DriverModule {
        &self.module.0
    }
}

impl fmt::Debug for LoadedDriverHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedDriverHandle")
            .field("identity", &self.driver.identity())
            .field("module", &self.module.0.name)
            .finish()
    }
}

struct ModuleGuard(DriverModule);

impl Drop for ModuleGuard {
    fn drop(&mut self) {
        if let Some(on_unload) = self.0.on_unload {
            on_unload();
        }
        debug!("driver module {} unloaded", self.0.name);
    }
}

/// Registry of available driver modules.
#[derive(Debug, Default)]
pub struct DriverRegistry {
    /// Modules keyed by lowercased `vendor/name`.
    modules: IndexMap<String, DriverModule>,
}

impl DriverRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            modules: IndexMap::new(),
        }
    }

    /// Create a registry holding the built-in driver modules.
    pub fn with_builtin_drivers() -> Self {
        let mut registry = Self::new();
        for module in vendors::builtin_modules() {
            registry.modules.insert(module_key_for(module), *module);
        }
        registry
    }

    /// Register a driver module.
    pub fn register(&mut self, module: DriverModule) -> Result<()> {
        let key = module_key_for(&module);
        if self.modules.contains_key(&key) {
            return Err(Error::factory(
                "register_driver",
                format!("driver module {key} is already registered"),
            ));
        }
        self.modules.insert(key, module);
        Ok(())
    }

    /// Iterate over registered modules in registration order.
    pub fn modules(&self) -> impl Iterator<Item = &DriverModule> {
        self.modules.values()
    }

    /// Look up a vendor id by name.
    pub fn resolve_vendor(&self, vendor_name: &str) -> Result<VendorId> {
        identity::resolve_vendor(vendor_name)
    }

    /// Look up a device id by name within a vendor.
    pub fn resolve_device(&self, vendor: VendorId, device_name: &str) -> Result<DeviceId> {
        identity::resolve_device(vendor, device_name)
    }

    /// Map vendor and device names to a driver identity.
    pub fn resolve(&self, vendor_name: &str, device_name: &str) -> Result<DriverIdentity> {
        let vendor = self.resolve_vendor(vendor_name)?;
        let device = self.resolve_device(vendor, device_name)?;
        Ok(DriverIdentity::new(vendor, device))
    }

    /// Module path for an identity, relative to the driver directory.
    pub fn module_path(&self, identity: DriverIdentity) -> Result<PathBuf> {
        let vendor = identity::vendor_name(identity.vendor).ok_or_else(|| {
            Error::factory("module_path", format!("no vendor named for id {}", identity.vendor))
        })?;
        let device = identity::device_name(identity.vendor, identity.device).ok_or_else(|| {
            Error::factory(
                "module_path",
                format!("no device named for id {} (vendor {vendor})", identity.device),
            )
        })?;
        Ok(Path::new(vendor).join(format!("{device}.{MODULE_EXTENSION}")))
    }

    /// Description exported by the module at `path`.
    pub fn describe(&self, path: impl AsRef<Path>) -> Result<&'static str> {
        let module = self.find(path.as_ref())?;
        Ok((module.describe)())
    }

    /// Load the module at `path` and create a driver for the given ids.
    ///
    /// The factory checks the ids against the identity it was built for,
    /// so a mismatch fails even when the path was resolved correctly.
    pub fn load_driver(
        &self,
        path: impl AsRef<Path>,
        device: DeviceId,
        vendor: VendorId,
    ) -> Result<LoadedDriverHandle> {
        let path = path.as_ref();
        let module = *self.find(path)?;

        if module.abi_version != DRIVER_ABI_VERSION {
            return Err(Error::factory(
                "load_driver",
                format!(
                    "{}: ABI version {} does not match {}",
                    path.display(),
                    module.abi_version,
                    DRIVER_ABI_VERSION
                ),
            ));
        }

        let create = module.create.ok_or_else(|| {
            Error::factory(
                "load_driver",
                format!("{}: module exports no factory", path.display()),
            )
        })?;

        // Guard first, so a failing factory still unloads the module.
        let guard = ModuleGuard(module);
        let driver = create(device, vendor)?;

        if driver.identity() != DriverIdentity::new(vendor, device) {
            return Err(Error::factory(
                "load_driver",
                "Device did not return valid operations",
            ));
        }

        debug!("driver module {} loaded for {}", module.name, driver.identity());
        Ok(LoadedDriverHandle {
            driver,
            module: guard,
        })
    }

    /// Resolve names and load the matching driver in one step.
    pub fn load(&self, vendor_name: &str, device_name: &str) -> Result<LoadedDriverHandle> {
        let identity = self.resolve(vendor_name, device_name)?;
        let path = self.module_path(identity)?;
        self.load_driver(path, identity.device, identity.vendor)
    }

    fn find(&self, path: &Path) -> Result<&DriverModule> {
        let key = module_key(path).ok_or_else(|| {
            Error::factory(
                "load_driver",
                format!("{}: not a driver module path", path.display()),
            )
        })?;
        self.modules.get(&key).ok_or_else(|| {
            Error::factory(
                "load_driver",
                format!("{}: no such driver module", path.display()),
            )
        })
    }
}

fn module_key_for(module: &DriverModule) -> String {
    let vendor = identity::vendor_name(module.identity.vendor).unwrap_or("unknown");
    format!("{vendor}/{}", module.name).to_ascii_lowercase()
}

fn module_key(path: &Path) -> Option<String> {
    if path.extension()?.to_str()? != MODULE_EXTENSION {
        return None;
    }
    let name = path.file_stem()?.to_str()?;
    let vendor = path.parent()?.file_name()?.to_str()?;
    Some(format!("{vendor}/{name}").to_ascii_lowercase())
}
