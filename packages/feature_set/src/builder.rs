//! UUID builders.
//!
//! A builder turns 16 raw bytes into a [`Uuid`]. The default builders accept only
//! RFC 4122 layouts, the nonstandard ones accept any 16 bytes, and the Guid
//! builders read the first three fields little-endian and, besides RFC 4122
//! layouts, accept the nil and max values and Microsoft GUIDs. The `Degraded*` variants
//! assemble the value from 32- and 16-bit fields only.

use thiserror::Error;
use uuid::{Uuid, Variant};

use crate::{
    fallback::{ChainError, FallbackChain},
    strategy::{Strategy, VariantKind},
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("Expected 16 bytes, got {0}")]
    InvalidLength(usize),
    #[error("Variant {0:?} is not an RFC 4122 variant")]
    UnsupportedVariant(Variant),
    #[error("Version {0} is not an RFC 4122 version")]
    UnsupportedVersion(usize),
    #[error(transparent)]
    AllCandidatesFailed(#[from] ChainError),
}

pub trait UuidBuilder: Strategy {
    /// # Errors
    ///
    /// * If `bytes` is not exactly 16 bytes long
    /// * If the builder does not accept the layout the bytes describe
    fn build(&self, bytes: &[u8]) -> Result<Uuid, BuildError>;
}

fn to_array(bytes: &[u8]) -> Result<[u8; 16], BuildError> {
    bytes
        .try_into()
        .map_err(|_| BuildError::InvalidLength(bytes.len()))
}

fn require_rfc4122(uuid: Uuid) -> Result<Uuid, BuildError> {
    let variant = uuid.get_variant();
    if variant != Variant::RFC4122 {
        return Err(BuildError::UnsupportedVariant(variant));
    }

    let version = uuid.get_version_num();
    if !(1..=8).contains(&version) {
        return Err(BuildError::UnsupportedVersion(version));
    }

    Ok(uuid)
}

/// Guid layouts also carry the nil and max values and Microsoft-variant GUIDs.
fn require_guid(uuid: Uuid) -> Result<Uuid, BuildError> {
    if uuid.is_nil() || uuid.as_u128() == u128::MAX || uuid.get_variant() == Variant::Microsoft {
        return Ok(uuid);
    }

    require_rfc4122(uuid)
}

/// Canonical (big-endian) bytes to a [`Uuid`] through a single 128-bit value.
fn from_wide(bytes: [u8; 16]) -> Uuid {
    Uuid::from_u128(u128::from_be_bytes(bytes))
}

/// Canonical (big-endian) bytes to a [`Uuid`] through 32/16-bit fields.
fn from_narrow(bytes: [u8; 16]) -> Uuid {
    let d1 = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let d2 = u16::from_be_bytes([bytes[4], bytes[5]]);
    let d3 = u16::from_be_bytes([bytes[6], bytes[7]]);
    let mut d4 = [0_u8; 8];
    d4.copy_from_slice(&bytes[8..]);

    Uuid::from_fields(d1, d2, d3, &d4)
}

/// Swaps the first three fields between Guid and canonical byte order.
#[must_use]
pub fn swap_guid_fields(mut bytes: [u8; 16]) -> [u8; 16] {
    bytes.swap(0, 3);
    bytes.swap(1, 2);
    bytes.swap(4, 5);
    bytes.swap(6, 7);
    bytes
}

macro_rules! impl_strategy {
    ($type:ident, $requires_64bit:expr $(,)?) => {
        impl $type {
            pub const KIND: VariantKind = VariantKind::Single(stringify!($type));

            #[must_use]
            pub const fn new() -> Self {
                Self
            }
        }

        impl Strategy for $type {
            fn kind(&self) -> VariantKind {
                Self::KIND
            }

            fn requires_64bit(&self) -> bool {
                $requires_64bit
            }
        }
    };
}

/// RFC 4122 layouts only.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultBuilder;

impl_strategy!(DefaultBuilder, true);

impl UuidBuilder for DefaultBuilder {
    fn build(&self, bytes: &[u8]) -> Result<Uuid, BuildError> {
        require_rfc4122(from_wide(to_array(bytes)?))
    }
}

/// Any 16 bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonstandardBuilder;

impl_strategy!(NonstandardBuilder, true);

impl UuidBuilder for NonstandardBuilder {
    fn build(&self, bytes: &[u8]) -> Result<Uuid, BuildError> {
        Ok(from_wide(to_array(bytes)?))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GuidBuilder;

impl_strategy!(GuidBuilder, true);

impl UuidBuilder for GuidBuilder {
    fn build(&self, bytes: &[u8]) -> Result<Uuid, BuildError> {
        let canonical = swap_guid_fields(to_array(bytes)?);
        let mut high = [0_u8; 8];
        let mut low = [0_u8; 8];
        high.copy_from_slice(&canonical[..8]);
        low.copy_from_slice(&canonical[8..]);

        require_guid(Uuid::from_u64_pair(
            u64::from_be_bytes(high),
            u64::from_be_bytes(low),
        ))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DegradedDefaultBuilder;

impl_strategy!(DegradedDefaultBuilder, false);

impl UuidBuilder for DegradedDefaultBuilder {
    fn build(&self, bytes: &[u8]) -> Result<Uuid, BuildError> {
        require_rfc4122(from_narrow(to_array(bytes)?))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DegradedNonstandardBuilder;

impl_strategy!(DegradedNonstandardBuilder, false);

impl UuidBuilder for DegradedNonstandardBuilder {
    fn build(&self, bytes: &[u8]) -> Result<Uuid, BuildError> {
        Ok(from_narrow(to_array(bytes)?))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DegradedGuidBuilder;

impl_strategy!(DegradedGuidBuilder, false);

impl UuidBuilder for DegradedGuidBuilder {
    fn build(&self, bytes: &[u8]) -> Result<Uuid, BuildError> {
        require_guid(from_narrow(swap_guid_fields(to_array(bytes)?)))
    }
}

impl UuidBuilder for FallbackChain<dyn UuidBuilder> {
    fn build(&self, bytes: &[u8]) -> Result<Uuid, BuildError> {
        Ok(self.attempt(|builder| builder.build(bytes))?)
    }
}
