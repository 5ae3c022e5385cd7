//! Dependency-ordered assembly of the strategy roles.
//!
//! [`ComponentFactory::start`] returns the first of a sequence of stage types.
//! Each stage exposes exactly one transition, which builds the next role from
//! the roles built before it, so the build order cannot be changed or skipped:
//!
//! 1. [`Calculator`]
//! 2. [`NumberConverter`]
//! 3. [`TimeConverter`]
//! 4. [`UuidBuilder`]
//! 5. [`Codec`], wrapping the builder from step 4
//! 6. [`NodeProvider`]
//! 7. [`RandomGenerator`]
//! 8. [`TimeGenerator`], see [`select_time_generator`]
//! 9. [`Validator`]

use std::sync::Arc;

use thiserror::Error;

use crate::{
    builder::{
        DefaultBuilder, DegradedDefaultBuilder, DegradedGuidBuilder, DegradedNonstandardBuilder,
        GuidBuilder, NonstandardBuilder, UuidBuilder,
    },
    calculator::{BaselineCalculator, Calculator},
    capability::CapabilityRecord,
    codec::{Codec, GuidStringCodec, StringCodec},
    converter::{
        GenericNumberConverter, GenericTimeConverter, NativeTimeConverter, NumberConverter,
        TimeConverter,
    },
    fallback::{EmptyChainError, FallbackChain},
    generator::{TimeGenerator, select_time_generator},
    node::{HardwareAddressSource, NodeProvider, RandomNodeProvider, SystemNodeProvider},
    random::{RandomError, RandomGenerator, select_random_generator},
    strategy::Strategy as _,
    time::TimeProvider,
    validator::{GenericValidator, Validator},
};

#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("Failed to assemble {role}: {source}")]
    EmptyChain {
        role: &'static str,
        source: EmptyChainError,
    },
    #[error(transparent)]
    NoSecureRandom(#[from] RandomError),
}

/// One active instance per role.
#[derive(Clone)]
pub struct Components {
    pub calculator: Arc<dyn Calculator>,
    pub number_converter: Arc<dyn NumberConverter>,
    pub time_converter: Arc<dyn TimeConverter>,
    pub builder: Arc<dyn UuidBuilder>,
    pub codec: Arc<dyn Codec>,
    pub node_provider: Arc<dyn NodeProvider>,
    pub random_generator: Arc<dyn RandomGenerator>,
    pub time_provider: Arc<dyn TimeProvider>,
    pub time_generator: Arc<dyn TimeGenerator>,
    pub validator: Arc<dyn Validator>,
}

/// Inputs shared by every stage.
#[derive(Debug, Clone, Copy)]
struct Context {
    capabilities: CapabilityRecord,
    use_guid_layout: bool,
}

pub struct ComponentFactory;

impl ComponentFactory {
    #[must_use]
    pub const fn start(capabilities: CapabilityRecord, use_guid_layout: bool) -> CalculatorStage {
        CalculatorStage {
            context: Context {
                capabilities,
                use_guid_layout,
            },
        }
    }
}

pub struct CalculatorStage {
    context: Context,
}

impl CalculatorStage {
    /// Uses `injected` when given, the baseline calculator otherwise.
    #[must_use]
    pub fn calculator(self, injected: Option<Arc<dyn Calculator>>) -> NumberConverterStage {
        let calculator = injected.unwrap_or_else(|| Arc::new(BaselineCalculator::new()));

        log::debug!(
            "calculator: big_number_library_available={} gmp_library_available={} kind={}",
            self.context.capabilities.big_number_library_available,
            self.context.capabilities.gmp_library_available,
            calculator.kind()
        );

        NumberConverterStage {
            context: self.context,
            calculator,
        }
    }
}

pub struct NumberConverterStage {
    context: Context,
    calculator: Arc<dyn Calculator>,
}

impl NumberConverterStage {
    #[must_use]
    pub fn number_converter(self) -> TimeConverterStage {
        let number_converter: Arc<dyn NumberConverter> =
            Arc::new(GenericNumberConverter::new(Arc::clone(&self.calculator)));

        log::debug!("number_converter: kind={}", number_converter.kind());

        TimeConverterStage {
            context: self.context,
            calculator: self.calculator,
            number_converter,
        }
    }
}

pub struct TimeConverterStage {
    context: Context,
    calculator: Arc<dyn Calculator>,
    number_converter: Arc<dyn NumberConverter>,
}

impl TimeConverterStage {
    #[must_use]
    pub fn time_converter(self) -> BuilderStage {
        let time_converter = select_time_converter(&self.context.capabilities, &self.calculator);

        BuilderStage {
            context: self.context,
            calculator: self.calculator,
            number_converter: self.number_converter,
            time_converter,
        }
    }
}

pub struct BuilderStage {
    context: Context,
    calculator: Arc<dyn Calculator>,
    number_converter: Arc<dyn NumberConverter>,
    time_converter: Arc<dyn TimeConverter>,
}

impl BuilderStage {
    /// # Errors
    ///
    /// * If the builder chain cannot be constructed
    pub fn builder(self) -> Result<CodecStage, FactoryError> {
        let builder = select_builder(&self.context.capabilities, self.context.use_guid_layout)?;

        Ok(CodecStage {
            context: self.context,
            calculator: self.calculator,
            number_converter: self.number_converter,
            time_converter: self.time_converter,
            builder,
        })
    }
}

pub struct CodecStage {
    context: Context,
    calculator: Arc<dyn Calculator>,
    number_converter: Arc<dyn NumberConverter>,
    time_converter: Arc<dyn TimeConverter>,
    builder: Arc<dyn UuidBuilder>,
}

impl CodecStage {
    #[must_use]
    pub fn codec(self) -> NodeProviderStage {
        let codec = select_codec(self.context.use_guid_layout, &self.builder);

        NodeProviderStage {
            context: self.context,
            calculator: self.calculator,
            number_converter: self.number_converter,
            time_converter: self.time_converter,
            builder: self.builder,
            codec,
        }
    }
}

pub struct NodeProviderStage {
    context: Context,
    calculator: Arc<dyn Calculator>,
    number_converter: Arc<dyn NumberConverter>,
    time_converter: Arc<dyn TimeConverter>,
    builder: Arc<dyn UuidBuilder>,
    codec: Arc<dyn Codec>,
}

impl NodeProviderStage {
    /// `source` is only consulted when system node discovery is not ignored,
    /// and only once a node is first requested.
    ///
    /// # Errors
    ///
    /// * If the provider chain cannot be constructed
    pub fn node_provider(
        self,
        source: Arc<dyn HardwareAddressSource>,
    ) -> Result<RandomGeneratorStage, FactoryError> {
        let node_provider = select_node_provider(&self.context.capabilities, source)?;

        Ok(RandomGeneratorStage {
            context: self.context,
            calculator: self.calculator,
            number_converter: self.number_converter,
            time_converter: self.time_converter,
            builder: self.builder,
            codec: self.codec,
            node_provider,
        })
    }
}

pub struct RandomGeneratorStage {
    context: Context,
    calculator: Arc<dyn Calculator>,
    number_converter: Arc<dyn NumberConverter>,
    time_converter: Arc<dyn TimeConverter>,
    builder: Arc<dyn UuidBuilder>,
    codec: Arc<dyn Codec>,
    node_provider: Arc<dyn NodeProvider>,
}

impl RandomGeneratorStage {
    /// Nothing is returned when `source` fails, so a failing source never
    /// yields partial [`Components`].
    ///
    /// # Errors
    ///
    /// * If `source` cannot produce secure random bytes
    pub fn random_generator(
        self,
        source: Arc<dyn RandomGenerator>,
    ) -> Result<TimeGeneratorStage, FactoryError> {
        let random_generator = select_random_generator(source)?;

        Ok(TimeGeneratorStage {
            context: self.context,
            calculator: self.calculator,
            number_converter: self.number_converter,
            time_converter: self.time_converter,
            builder: self.builder,
            codec: self.codec,
            node_provider: self.node_provider,
            random_generator,
        })
    }
}

pub struct TimeGeneratorStage {
    context: Context,
    calculator: Arc<dyn Calculator>,
    number_converter: Arc<dyn NumberConverter>,
    time_converter: Arc<dyn TimeConverter>,
    builder: Arc<dyn UuidBuilder>,
    codec: Arc<dyn Codec>,
    node_provider: Arc<dyn NodeProvider>,
    random_generator: Arc<dyn RandomGenerator>,
}

impl TimeGeneratorStage {
    #[must_use]
    pub fn time_generator(self, time_provider: Arc<dyn TimeProvider>) -> ValidatorStage {
        let time_generator = select_time_generator(
            &self.context.capabilities,
            &self.node_provider,
            &self.time_converter,
            &time_provider,
        );

        ValidatorStage {
            calculator: self.calculator,
            number_converter: self.number_converter,
            time_converter: self.time_converter,
            builder: self.builder,
            codec: self.codec,
            node_provider: self.node_provider,
            random_generator: self.random_generator,
            time_provider,
            time_generator,
        }
    }
}

pub struct ValidatorStage {
    calculator: Arc<dyn Calculator>,
    number_converter: Arc<dyn NumberConverter>,
    time_converter: Arc<dyn TimeConverter>,
    builder: Arc<dyn UuidBuilder>,
    codec: Arc<dyn Codec>,
    node_provider: Arc<dyn NodeProvider>,
    random_generator: Arc<dyn RandomGenerator>,
    time_provider: Arc<dyn TimeProvider>,
    time_generator: Arc<dyn TimeGenerator>,
}

impl ValidatorStage {
    #[must_use]
    pub fn validator(self) -> Components {
        let validator: Arc<dyn Validator> = Arc::new(GenericValidator::new());

        log::debug!("validator: kind={}", validator.kind());

        Components {
            calculator: self.calculator,
            number_converter: self.number_converter,
            time_converter: self.time_converter,
            builder: self.builder,
            codec: self.codec,
            node_provider: self.node_provider,
            random_generator: self.random_generator,
            time_provider: self.time_provider,
            time_generator: self.time_generator,
            validator,
        }
    }
}

/// Native-width converter on 64-bit hosts, backed by the generic one for
/// values outside the native range.
#[must_use]
pub fn select_time_converter(
    capabilities: &CapabilityRecord,
    calculator: &Arc<dyn Calculator>,
) -> Arc<dyn TimeConverter> {
    let generic = GenericTimeConverter::new(Arc::clone(calculator));

    let time_converter: Arc<dyn TimeConverter> = if capabilities.is_64bit {
        Arc::new(NativeTimeConverter::new(generic))
    } else {
        Arc::new(generic)
    };

    log::debug!(
        "select_time_converter: is_64bit={} kind={}",
        capabilities.is_64bit,
        time_converter.kind()
    );

    time_converter
}

/// # Errors
///
/// * If the builder chain cannot be constructed
pub fn select_builder(
    capabilities: &CapabilityRecord,
    use_guid_layout: bool,
) -> Result<Arc<dyn UuidBuilder>, FactoryError> {
    let chain_error = |source| FactoryError::EmptyChain {
        role: "UuidBuilder",
        source,
    };

    let builder: Arc<dyn UuidBuilder> = match (capabilities.is_64bit, use_guid_layout) {
        (true, true) => Arc::new(GuidBuilder::new()),
        (true, false) => Arc::new(
            FallbackChain::<dyn UuidBuilder>::new(vec![
                Arc::new(DefaultBuilder::new()),
                Arc::new(NonstandardBuilder::new()),
            ])
            .map_err(chain_error)?,
        ),
        (false, true) => Arc::new(DegradedGuidBuilder::new()),
        (false, false) => Arc::new(
            FallbackChain::<dyn UuidBuilder>::new(vec![
                Arc::new(DegradedDefaultBuilder::new()),
                Arc::new(DegradedNonstandardBuilder::new()),
            ])
            .map_err(chain_error)?,
        ),
    };

    log::debug!(
        "select_builder: is_64bit={} use_guid_layout={use_guid_layout} kind={}",
        capabilities.is_64bit,
        builder.kind()
    );

    Ok(builder)
}

/// The codec wraps `builder` itself, not a copy.
#[must_use]
pub fn select_codec(use_guid_layout: bool, builder: &Arc<dyn UuidBuilder>) -> Arc<dyn Codec> {
    let codec: Arc<dyn Codec> = if use_guid_layout {
        Arc::new(GuidStringCodec::new(Arc::clone(builder)))
    } else {
        Arc::new(StringCodec::new(Arc::clone(builder)))
    };

    log::debug!(
        "select_codec: use_guid_layout={use_guid_layout} kind={}",
        codec.kind()
    );

    codec
}

/// # Errors
///
/// * If the provider chain cannot be constructed
pub fn select_node_provider(
    capabilities: &CapabilityRecord,
    source: Arc<dyn HardwareAddressSource>,
) -> Result<Arc<dyn NodeProvider>, FactoryError> {
    let node_provider: Arc<dyn NodeProvider> = if capabilities.ignore_system_node {
        Arc::new(RandomNodeProvider::new())
    } else {
        Arc::new(
            FallbackChain::<dyn NodeProvider>::new(vec![
                Arc::new(SystemNodeProvider::new(source)),
                Arc::new(RandomNodeProvider::new()),
            ])
            .map_err(|source| FactoryError::EmptyChain {
                role: "NodeProvider",
                source,
            })?,
        )
    };

    log::debug!(
        "select_node_provider: ignore_system_node={} kind={}",
        capabilities.ignore_system_node,
        node_provider.kind()
    );

    Ok(node_provider)
}
