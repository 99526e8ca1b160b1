//! Built-in driver modules.

pub mod cisco;
pub mod juniper;

use super::DriverModule;
use crate::channel::ErrorPatterns;
use crate::error::{Error, Result};

static BUILTIN_MODULES: [DriverModule; 3] = [cisco::CATALYST_8000V, cisco::LINUX_TEST, juniper::VSRX];

/// All driver modules linked into the crate.
pub fn builtin_modules() -> &'static [DriverModule] {
    &BUILTIN_MODULES
}

/// The common heuristics followed by vendor-specific ones.
fn error_patterns(extra: &[&str]) -> Result<ErrorPatterns> {
    extra
        .iter()
        .try_fold(ErrorPatterns::common(), |patterns, pattern| patterns.with_pattern(pattern))
        .map_err(|e| Error::factory("create_driver", format!("invalid error pattern: {e}")).with_source(e))
}
