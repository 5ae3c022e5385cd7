//! Capability-aware assembly of the collaborators a UUID library needs.
//!
//! A UUID library depends on several interchangeable pieces: integer
//! arithmetic, time encoding, a node (host) identifier, a random source, the
//! byte layout builder, a string codec and a validator. Which implementation of
//! each is safe to use depends on the runtime: the word width, optional math
//! libraries and whether a native generator is available.
//!
//! [`FeatureSet`] probes the environment once, builds exactly one compatible
//! implementation per role in a fixed dependency order and exposes them.
//!
//! # Examples
//!
//! ```
//! use uuid_feature_set::{FeatureOptions, FeatureSet, uuid_factory::UuidFactory};
//!
//! let features = FeatureSet::new(FeatureOptions::new().with_ignore_system_node(true))?;
//! let factory = UuidFactory::new(features);
//!
//! let id = factory.uuid4()?;
//! assert!(factory.is_valid(&id.to_string()));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Features
//!
//! * `native-generator` - Enables the time generator backed by the `uuid` crate
//! * `serde` - Serde support for options, capability records and nodes

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::{fmt, sync::Arc};

pub mod builder;
pub mod calculator;
pub mod capability;
pub mod codec;
pub mod converter;
pub mod env;
pub mod factory;
pub mod fallback;
pub mod generator;
pub mod node;
pub mod options;
pub mod random;
pub mod strategy;
pub mod time;
pub mod types;
pub mod uuid_factory;
pub mod validator;

pub use capability::{CapabilityProbe, CapabilityRecord, HostCapabilityProbe, ProbeOverrides};
pub use factory::{ComponentFactory, Components, FactoryError};
pub use fallback::{ChainError, FallbackChain};
pub use options::FeatureOptions;
pub use strategy::{Strategy, VariantKind};

use crate::{
    builder::UuidBuilder,
    calculator::Calculator,
    codec::Codec,
    converter::{NumberConverter, TimeConverter},
    generator::{TimeGenerator, select_time_generator},
    node::{HardwareAddressSource, NodeProvider, SysfsAddressSource},
    random::{OsRandomGenerator, RandomGenerator},
    time::{SystemTimeProvider, TimeProvider},
    validator::Validator,
};

/// The assembled roles for one runtime.
///
/// Every role is fixed once built. The exceptions are the three setters;
/// only [`FeatureSet::set_time_provider`] rebuilds anything beyond the role it
/// replaces.
pub struct FeatureSet {
    options: FeatureOptions,
    capabilities: CapabilityRecord,
    components: Components,
}

impl FeatureSet {
    /// Probes the host and assembles the default collaborators.
    ///
    /// # Errors
    ///
    /// * If a required collaborator cannot be constructed
    pub fn new(options: FeatureOptions) -> Result<Self, FactoryError> {
        Self::builder().options(options).build()
    }

    #[must_use]
    pub fn builder() -> FeatureSetBuilder {
        FeatureSetBuilder::default()
    }

    #[must_use]
    pub const fn options(&self) -> &FeatureOptions {
        &self.options
    }

    #[must_use]
    pub const fn capabilities(&self) -> &CapabilityRecord {
        &self.capabilities
    }

    #[must_use]
    pub const fn components(&self) -> &Components {
        &self.components
    }

    #[must_use]
    pub const fn uuid_builder(&self) -> &Arc<dyn UuidBuilder> {
        &self.components.builder
    }

    #[must_use]
    pub const fn calculator(&self) -> &Arc<dyn Calculator> {
        &self.components.calculator
    }

    /// Wraps the same instance returned by [`FeatureSet::uuid_builder`].
    #[must_use]
    pub const fn codec(&self) -> &Arc<dyn Codec> {
        &self.components.codec
    }

    #[must_use]
    pub const fn node_provider(&self) -> &Arc<dyn NodeProvider> {
        &self.components.node_provider
    }

    #[must_use]
    pub const fn number_converter(&self) -> &Arc<dyn NumberConverter> {
        &self.components.number_converter
    }

    #[must_use]
    pub const fn random_generator(&self) -> &Arc<dyn RandomGenerator> {
        &self.components.random_generator
    }

    #[must_use]
    pub const fn time_converter(&self) -> &Arc<dyn TimeConverter> {
        &self.components.time_converter
    }

    #[must_use]
    pub const fn time_generator(&self) -> &Arc<dyn TimeGenerator> {
        &self.components.time_generator
    }

    #[must_use]
    pub const fn time_provider(&self) -> &Arc<dyn TimeProvider> {
        &self.components.time_provider
    }

    #[must_use]
    pub const fn validator(&self) -> &Arc<dyn Validator> {
        &self.components.validator
    }

    /// Replaces the calculator only.
    ///
    /// The number and time converters keep the calculator they were built
    /// with. To have every role share one calculator, pass it to
    /// [`FeatureSetBuilder::calculator`] instead.
    pub fn set_calculator(&mut self, calculator: Arc<dyn Calculator>) {
        log::warn!(
            "set_calculator: replacing {} with {}; converters keep the previous calculator",
            self.components.calculator.kind(),
            calculator.kind()
        );

        self.components.calculator = calculator;
    }

    /// Replaces the time provider and rebuilds the time generator from the
    /// current node provider and time converter.
    pub fn set_time_provider(&mut self, time_provider: Arc<dyn TimeProvider>) {
        self.components.time_generator = select_time_generator(
            &self.capabilities,
            &self.components.node_provider,
            &self.components.time_converter,
            &time_provider,
        );
        self.components.time_provider = time_provider;
    }

    pub fn set_validator(&mut self, validator: Arc<dyn Validator>) {
        log::debug!("set_validator: kind={}", validator.kind());

        self.components.validator = validator;
    }
}

impl fmt::Debug for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let components = &self.components;

        f.debug_struct("FeatureSet")
            .field("options", &self.options)
            .field("capabilities", &self.capabilities)
            .field("calculator", &components.calculator.kind())
            .field("number_converter", &components.number_converter.kind())
            .field("time_converter", &components.time_converter.kind())
            .field("builder", &components.builder.kind())
            .field("codec", &components.codec.kind())
            .field("node_provider", &components.node_provider.kind())
            .field("random_generator", &components.random_generator.kind())
            .field("time_generator", &components.time_generator.kind())
            .field("validator", &components.validator.kind())
            .finish_non_exhaustive()
    }
}

/// Configures how a [`FeatureSet`] is probed and which collaborators it starts
/// from.
pub struct FeatureSetBuilder {
    probe: Arc<dyn CapabilityProbe>,
    options: FeatureOptions,
    hardware_address_source: Arc<dyn HardwareAddressSource>,
    time_provider: Arc<dyn TimeProvider>,
    random_generator: Arc<dyn RandomGenerator>,
    calculator: Option<Arc<dyn Calculator>>,
}

impl Default for FeatureSetBuilder {
    fn default() -> Self {
        Self {
            probe: Arc::new(HostCapabilityProbe::new()),
            options: FeatureOptions::new(),
            hardware_address_source: Arc::new(SysfsAddressSource::new()),
            time_provider: Arc::new(SystemTimeProvider::new()),
            random_generator: Arc::new(OsRandomGenerator::new()),
            calculator: None,
        }
    }
}

impl FeatureSetBuilder {
    #[must_use]
    pub fn probe(mut self, probe: Arc<dyn CapabilityProbe>) -> Self {
        self.probe = probe;
        self
    }

    #[must_use]
    pub const fn options(mut self, options: FeatureOptions) -> Self {
        self.options = options;
        self
    }

    /// Where the system node provider looks for hardware addresses.
    #[must_use]
    pub fn hardware_address_source(mut self, source: Arc<dyn HardwareAddressSource>) -> Self {
        self.hardware_address_source = source;
        self
    }

    #[must_use]
    pub fn time_provider(mut self, time_provider: Arc<dyn TimeProvider>) -> Self {
        self.time_provider = time_provider;
        self
    }

    /// Secure random source. Building fails if it cannot produce bytes.
    #[must_use]
    pub fn random_generator(mut self, random_generator: Arc<dyn RandomGenerator>) -> Self {
        self.random_generator = random_generator;
        self
    }

    /// Used in place of the baseline calculator by every role built from it.
    #[must_use]
    pub fn calculator(mut self, calculator: Arc<dyn Calculator>) -> Self {
        self.calculator = Some(calculator);
        self
    }

    /// # Errors
    ///
    /// * If a required collaborator cannot be constructed
    /// * If the random source cannot produce bytes
    pub fn build(self) -> Result<FeatureSet, FactoryError> {
        let capabilities = self.probe.probe(&ProbeOverrides::from(&self.options));

        log::debug!(
            "build: options={:?} capabilities={capabilities:?}",
            self.options
        );

        let components = ComponentFactory::start(capabilities, self.options.use_guid_layout)
            .calculator(self.calculator)
            .number_converter()
            .time_converter()
            .builder()?
            .codec()
            .node_provider(self.hardware_address_source)?
            .random_generator(self.random_generator)?
            .time_generator(self.time_provider)
            .validator();

        Ok(FeatureSet {
            options: self.options,
            capabilities,
            components,
        })
    }
}
