//! Construction-time options for a [`crate::FeatureSet`].

use switchy_env::{EnvProvider, standard::StandardEnv};

use crate::env::{FlagError, var_flag_or};

pub const USE_GUID_LAYOUT_VAR: &str = "UUID_USE_GUID_LAYOUT";
pub const FORCE_32BIT_VAR: &str = "UUID_FORCE_32BIT";
pub const FORCE_NO_BIG_NUMBER_VAR: &str = "UUID_FORCE_NO_BIG_NUMBER";
pub const FORCE_NO_GMP_VAR: &str = "UUID_FORCE_NO_GMP";
pub const IGNORE_SYSTEM_NODE_VAR: &str = "UUID_IGNORE_SYSTEM_NODE";
pub const ENABLE_NATIVE_GENERATOR_VAR: &str = "UUID_ENABLE_NATIVE_GENERATOR";

/// Flags controlling which strategy variants get assembled.
///
/// All flags default to `false`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct FeatureOptions {
    pub use_guid_layout: bool,
    pub force_32bit: bool,
    pub force_no_big_number: bool,
    pub force_no_gmp: bool,
    pub ignore_system_node: bool,
    pub enable_native_generator: bool,
}

impl FeatureOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            use_guid_layout: false,
            force_32bit: false,
            force_no_big_number: false,
            force_no_gmp: false,
            ignore_system_node: false,
            enable_native_generator: false,
        }
    }

    #[must_use]
    pub const fn with_guid_layout(mut self, value: bool) -> Self {
        self.use_guid_layout = value;
        self
    }

    #[must_use]
    pub const fn with_force_32bit(mut self, value: bool) -> Self {
        self.force_32bit = value;
        self
    }

    #[must_use]
    pub const fn with_force_no_big_number(mut self, value: bool) -> Self {
        self.force_no_big_number = value;
        self
    }

    #[must_use]
    pub const fn with_force_no_gmp(mut self, value: bool) -> Self {
        self.force_no_gmp = value;
        self
    }

    #[must_use]
    pub const fn with_ignore_system_node(mut self, value: bool) -> Self {
        self.ignore_system_node = value;
        self
    }

    #[must_use]
    pub const fn with_native_generator(mut self, value: bool) -> Self {
        self.enable_native_generator = value;
        self
    }

    /// Reads the options from the process environment.
    ///
    /// # Errors
    ///
    /// * If any of the option variables holds a value that is not a boolean flag
    pub fn from_env() -> Result<Self, FlagError> {
        Self::from_env_provider(&StandardEnv::new())
    }

    /// Reads the options from the given environment provider.
    ///
    /// Unset variables leave the corresponding flag `false`.
    ///
    /// # Errors
    ///
    /// * If any of the option variables holds a value that is not a boolean flag
    pub fn from_env_provider<E: EnvProvider + ?Sized>(env: &E) -> Result<Self, FlagError> {
        let options = Self {
            use_guid_layout: var_flag_or(env, USE_GUID_LAYOUT_VAR, false)?,
            force_32bit: var_flag_or(env, FORCE_32BIT_VAR, false)?,
            force_no_big_number: var_flag_or(env, FORCE_NO_BIG_NUMBER_VAR, false)?,
            force_no_gmp: var_flag_or(env, FORCE_NO_GMP_VAR, false)?,
            ignore_system_node: var_flag_or(env, IGNORE_SYSTEM_NODE_VAR, false)?,
            enable_native_generator: var_flag_or(env, ENABLE_NATIVE_GENERATOR_VAR, false)?,
        };

        log::debug!("from_env_provider: options={options:?}");

        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use switchy_env::simulator::SimulatorEnv;

    use super::*;

    fn empty_env() -> SimulatorEnv {
        let env = SimulatorEnv::new();
        env.clear();
        env
    }

    #[test_log::test]
    fn test_defaults_are_all_false() {
        assert_eq!(FeatureOptions::default(), FeatureOptions::new());
        assert!(!FeatureOptions::new().use_guid_layout);
        assert!(!FeatureOptions::new().enable_native_generator);
    }

    #[test_log::test]
    fn test_from_env_provider_reads_every_flag() {
        let env = empty_env();
        for (name, value) in [
            (USE_GUID_LAYOUT_VAR, "1"),
            (FORCE_32BIT_VAR, "true"),
            (FORCE_NO_BIG_NUMBER_VAR, "yes"),
            (FORCE_NO_GMP_VAR, "on"),
            (IGNORE_SYSTEM_NODE_VAR, "TRUE"),
            (ENABLE_NATIVE_GENERATOR_VAR, "1"),
        ] {
            env.set_var(name, value);
        }

        let options = FeatureOptions::from_env_provider(&env).unwrap();

        assert_eq!(
            options,
            FeatureOptions::new()
                .with_guid_layout(true)
                .with_force_32bit(true)
                .with_force_no_big_number(true)
                .with_force_no_gmp(true)
                .with_ignore_system_node(true)
                .with_native_generator(true)
        );
    }

    #[test_log::test]
    fn test_from_env_provider_unset_is_default() {
        let options = FeatureOptions::from_env_provider(&empty_env()).unwrap();

        assert_eq!(options, FeatureOptions::default());
    }

    #[test_log::test]
    fn test_from_env_provider_rejects_garbage() {
        let env = empty_env();
        env.set_var(FORCE_32BIT_VAR, "sometimes");

        assert_eq!(
            FeatureOptions::from_env_provider(&env),
            Err(FlagError::Invalid {
                name: FORCE_32BIT_VAR.to_string(),
                value: "sometimes".to_string(),
            })
        );
    }
}
