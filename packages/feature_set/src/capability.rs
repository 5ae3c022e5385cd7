//! Capability detection.
//!
//! A [`CapabilityProbe`] turns the detected host environment plus a set of
//! [`ProbeOverrides`] into a [`CapabilityRecord`]. Detection never fails; when a
//! signal is unavailable the conservative answer is used. Overrides are applied
//! after detection, so they always take precedence.

use std::sync::LazyLock;

use crate::options::FeatureOptions;

/// Environment features present on the host, before any overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DetectedEnvironment {
    pub is_64bit: bool,
    pub big_number_library_available: bool,
    pub gmp_library_available: bool,
    pub native_generator_available: bool,
}

impl DetectedEnvironment {
    /// 32-bit, no optional math library, no native generator.
    pub const CONSERVATIVE: Self = Self {
        is_64bit: false,
        big_number_library_available: false,
        gmp_library_available: false,
        native_generator_available: false,
    };

    /// Inspects the current build target.
    #[must_use]
    pub const fn host() -> Self {
        Self {
            is_64bit: cfg!(target_pointer_width = "64"),
            // The software big-integer path is always linked into this crate.
            big_number_library_available: true,
            // No GMP binding is linked.
            gmp_library_available: false,
            native_generator_available: cfg!(feature = "native-generator"),
        }
    }
}

impl Default for DetectedEnvironment {
    fn default() -> Self {
        Self::CONSERVATIVE
    }
}

/// Explicit flags that win over detection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProbeOverrides {
    pub force_32bit: bool,
    pub force_no_big_number: bool,
    pub force_no_gmp: bool,
    pub ignore_system_node: bool,
    pub enable_native_generator: bool,
}

impl From<&FeatureOptions> for ProbeOverrides {
    fn from(options: &FeatureOptions) -> Self {
        Self {
            force_32bit: options.force_32bit,
            force_no_big_number: options.force_no_big_number,
            force_no_gmp: options.force_no_gmp,
            ignore_system_node: options.ignore_system_node,
            enable_native_generator: options.enable_native_generator,
        }
    }
}

/// The flags driving strategy selection. Produced once per
/// [`crate::FeatureSet`] and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CapabilityRecord {
    pub is_64bit: bool,
    pub big_number_library_available: bool,
    pub gmp_library_available: bool,
    pub ignore_system_node: bool,
    pub native_generator_enabled: bool,
}

impl CapabilityRecord {
    /// Combines a detected environment with overrides. Overrides always win.
    #[must_use]
    pub const fn resolve(detected: DetectedEnvironment, overrides: ProbeOverrides) -> Self {
        Self {
            is_64bit: detected.is_64bit && !overrides.force_32bit,
            big_number_library_available: detected.big_number_library_available
                && !overrides.force_no_big_number,
            gmp_library_available: detected.gmp_library_available && !overrides.force_no_gmp,
            ignore_system_node: overrides.ignore_system_node,
            native_generator_enabled: detected.native_generator_available
                && overrides.enable_native_generator,
        }
    }
}

impl Default for CapabilityRecord {
    fn default() -> Self {
        Self::resolve(DetectedEnvironment::CONSERVATIVE, ProbeOverrides::default())
    }
}

pub trait CapabilityProbe: Send + Sync {
    fn probe(&self, overrides: &ProbeOverrides) -> CapabilityRecord;
}

static HOST_ENVIRONMENT: LazyLock<DetectedEnvironment> = LazyLock::new(|| {
    let detected = DetectedEnvironment::host();
    log::debug!("host environment: {detected:?}");
    detected
});

/// Probes the real host. Detection happens once per process.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostCapabilityProbe;

impl HostCapabilityProbe {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CapabilityProbe for HostCapabilityProbe {
    fn probe(&self, overrides: &ProbeOverrides) -> CapabilityRecord {
        CapabilityRecord::resolve(*HOST_ENVIRONMENT, *overrides)
    }
}

/// Reports a fixed environment. Overrides still apply.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedCapabilityProbe {
    detected: DetectedEnvironment,
}

impl FixedCapabilityProbe {
    #[must_use]
    pub const fn new(detected: DetectedEnvironment) -> Self {
        Self { detected }
    }

    /// A fully capable 64-bit environment.
    #[must_use]
    pub const fn capable() -> Self {
        Self::new(DetectedEnvironment {
            is_64bit: true,
            big_number_library_available: true,
            gmp_library_available: true,
            native_generator_available: true,
        })
    }

    /// A 32-bit environment with no optional libraries.
    #[must_use]
    pub const fn conservative() -> Self {
        Self::new(DetectedEnvironment::CONSERVATIVE)
    }
}

impl CapabilityProbe for FixedCapabilityProbe {
    fn probe(&self, overrides: &ProbeOverrides) -> CapabilityRecord {
        CapabilityRecord::resolve(self.detected, *overrides)
    }
}
