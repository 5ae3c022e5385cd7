//! Time-based (version 1) UUID generators.
//!
//! The time generator is derived from other roles: [`select_time_generator`]
//! is the single rule for building it, both at assembly and whenever the
//! time source is swapped on a [`crate::FeatureSet`].

use std::sync::Arc;

use rand::Rng as _;
use thiserror::Error;

use crate::{
    capability::CapabilityRecord,
    converter::{ConversionError, TimeConverter},
    node::{Node, NodeError, NodeProvider},
    strategy::{Strategy, VariantKind},
    time::TimeProvider,
};

/// Upper bound (exclusive) of the 14-bit clock sequence.
pub const CLOCK_SEQ_LIMIT: u16 = 0x4000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeGeneratorError {
    #[error(transparent)]
    Node(#[from] NodeError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error("Clock sequence {0} does not fit in 14 bits")]
    InvalidClockSequence(u16),
    #[error("Malformed timestamp '{0}'")]
    InvalidTimestamp(String),
}

pub trait TimeGenerator: Strategy {
    /// Returns the 16 bytes of a version 1 UUID in canonical order.
    ///
    /// # Errors
    ///
    /// * If `clock_seq` does not fit in 14 bits
    /// * If no node is given and none can be obtained
    /// * If the current time cannot be encoded as a UUID timestamp
    fn generate(
        &self,
        node: Option<Node>,
        clock_seq: Option<u16>,
    ) -> Result<[u8; 16], TimeGeneratorError>;
}

fn check_clock_seq(clock_seq: Option<u16>) -> Result<Option<u16>, TimeGeneratorError> {
    match clock_seq {
        Some(value) if value >= CLOCK_SEQ_LIMIT => {
            Err(TimeGeneratorError::InvalidClockSequence(value))
        }
        other => Ok(other),
    }
}

/// Writes the clock sequence and the RFC 4122 variant into bytes 8 and 9.
#[allow(clippy::cast_possible_truncation)]
const fn set_clock_seq(bytes: &mut [u8; 16], clock_seq: u16) {
    bytes[8] = ((clock_seq >> 8) as u8 & 0x3f) | 0x80;
    bytes[9] = clock_seq as u8;
}

/// Assembles a version 1 UUID from the [`NodeProvider`], [`TimeConverter`] and
/// [`TimeProvider`] it was built with.
pub struct DefaultTimeGenerator {
    node_provider: Arc<dyn NodeProvider>,
    time_converter: Arc<dyn TimeConverter>,
    time_provider: Arc<dyn TimeProvider>,
}

impl DefaultTimeGenerator {
    pub const KIND: VariantKind = VariantKind::Single("DefaultTimeGenerator");

    #[must_use]
    pub fn new(
        node_provider: Arc<dyn NodeProvider>,
        time_converter: Arc<dyn TimeConverter>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            node_provider,
            time_converter,
            time_provider,
        }
    }

    #[must_use]
    pub const fn node_provider(&self) -> &Arc<dyn NodeProvider> {
        &self.node_provider
    }

    #[must_use]
    pub const fn time_converter(&self) -> &Arc<dyn TimeConverter> {
        &self.time_converter
    }

    #[must_use]
    pub const fn time_provider(&self) -> &Arc<dyn TimeProvider> {
        &self.time_provider
    }
}

impl Strategy for DefaultTimeGenerator {
    fn kind(&self) -> VariantKind {
        Self::KIND
    }

    fn requires_64bit(&self) -> bool {
        self.time_converter.requires_64bit()
    }
}

impl TimeGenerator for DefaultTimeGenerator {
    fn generate(
        &self,
        node: Option<Node>,
        clock_seq: Option<u16>,
    ) -> Result<[u8; 16], TimeGeneratorError> {
        let clock_seq = check_clock_seq(clock_seq)?
            .unwrap_or_else(|| rand::rng().random_range(0..CLOCK_SEQ_LIMIT));
        let node = match node {
            Some(node) => node,
            None => self.node_provider.get_node()?,
        };

        let timestamp = self
            .time_converter
            .calculate_time(self.time_provider.current_time())?;
        let digits = timestamp.as_str();

        // 16 digits, the first always zero for a 60-bit value
        let field = |range: std::ops::Range<usize>| {
            digits
                .get(range)
                .and_then(|part| u32::from_str_radix(part, 16).ok())
                .ok_or_else(|| TimeGeneratorError::InvalidTimestamp(digits.to_string()))
        };
        let time_low = field(8..16)?;
        let time_mid = field(4..8)?;
        let time_hi = field(1..4)? | 0x1000;

        let mut bytes = [0_u8; 16];
        bytes[..4].copy_from_slice(&time_low.to_be_bytes());
        bytes[4..6].copy_from_slice(&time_mid.to_be_bytes()[2..]);
        bytes[6..8].copy_from_slice(&time_hi.to_be_bytes()[2..]);
        set_clock_seq(&mut bytes, clock_seq);
        bytes[10..].copy_from_slice(node.as_bytes());

        log::trace!("generate: timestamp={timestamp} clock_seq={clock_seq} node={node}");

        Ok(bytes)
    }
}

/// Delegates to [`uuid::Uuid::now_v1`], reading the clock itself. Never touches a
/// [`NodeProvider`], [`TimeConverter`] or [`TimeProvider`]; without an explicit
/// node it uses a random multicast node chosen when it was built.
#[cfg(feature = "native-generator")]
pub struct NativeTimeGenerator {
    node: Node,
}

#[cfg(feature = "native-generator")]
impl NativeTimeGenerator {
    pub const KIND: VariantKind = VariantKind::Single("NativeTimeGenerator");

    #[must_use]
    pub fn new() -> Self {
        Self {
            node: Node::from_bytes(rand::random::<[u8; 6]>()).with_multicast(),
        }
    }
}

#[cfg(feature = "native-generator")]
impl Default for NativeTimeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "native-generator")]
impl Strategy for NativeTimeGenerator {
    fn kind(&self) -> VariantKind {
        Self::KIND
    }
}

#[cfg(feature = "native-generator")]
impl TimeGenerator for NativeTimeGenerator {
    fn generate(
        &self,
        node: Option<Node>,
        clock_seq: Option<u16>,
    ) -> Result<[u8; 16], TimeGeneratorError> {
        let clock_seq = check_clock_seq(clock_seq)?;
        let node = node.unwrap_or(self.node);

        let mut bytes = *uuid::Uuid::now_v1(node.as_bytes()).as_bytes();
        if let Some(clock_seq) = clock_seq {
            set_clock_seq(&mut bytes, clock_seq);
        }

        Ok(bytes)
    }
}

/// Picks the time generator for `capabilities`.
///
/// The native generator is only chosen when it is enabled and compiled in;
/// otherwise the generator is assembled from the given roles.
#[must_use]
pub fn select_time_generator(
    capabilities: &CapabilityRecord,
    node_provider: &Arc<dyn NodeProvider>,
    time_converter: &Arc<dyn TimeConverter>,
    time_provider: &Arc<dyn TimeProvider>,
) -> Arc<dyn TimeGenerator> {
    #[cfg(feature = "native-generator")]
    if capabilities.native_generator_enabled {
        log::debug!(
            "select_time_generator: native_generator_enabled=true kind={}",
            NativeTimeGenerator::KIND
        );
        return Arc::new(NativeTimeGenerator::new());
    }

    let generator = DefaultTimeGenerator::new(
        Arc::clone(node_provider),
        Arc::clone(time_converter),
        Arc::clone(time_provider),
    );

    log::debug!(
        "select_time_generator: native_generator_enabled={} kind={}",
        capabilities.native_generator_enabled,
        generator.kind()
    );

    Arc::new(generator)
}
