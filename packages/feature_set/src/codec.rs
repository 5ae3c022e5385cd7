//! String and byte codecs.
//!
//! A codec always decodes through the [`UuidBuilder`] it wraps, so the builder
//! selected for a feature set is the one every decoded UUID passes through.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::{
    builder::{BuildError, UuidBuilder, swap_guid_fields},
    strategy::{Strategy, VariantKind},
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("Invalid UUID string: '{0}'")]
    InvalidString(String),
    #[error(transparent)]
    Build(#[from] BuildError),
}

pub trait Codec: Strategy {
    /// Hyphenated lowercase form.
    fn encode(&self, uuid: &Uuid) -> String;

    fn encode_binary(&self, uuid: &Uuid) -> [u8; 16];

    /// Accepts the hyphenated, simple, braced and URN forms.
    ///
    /// # Errors
    ///
    /// * If `encoded` is not a UUID string
    /// * If the builder rejects the decoded bytes
    fn decode(&self, encoded: &str) -> Result<Uuid, CodecError>;

    /// # Errors
    ///
    /// * If the builder rejects `bytes`
    fn decode_bytes(&self, bytes: &[u8]) -> Result<Uuid, CodecError>;

    fn builder(&self) -> &Arc<dyn UuidBuilder>;
}

/// Parses the textual forms into canonical (big-endian) bytes.
fn parse_canonical(encoded: &str) -> Result<[u8; 16], CodecError> {
    let invalid = || CodecError::InvalidString(encoded.to_string());

    let trimmed = encoded.trim();
    let trimmed = trimmed
        .get(..9)
        .filter(|prefix| prefix.eq_ignore_ascii_case("urn:uuid:"))
        .map_or(trimmed, |_| &trimmed[9..]);
    let trimmed = trimmed
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(trimmed);

    let digits = match trimmed.len() {
        32 => trimmed.to_string(),
        36 => {
            let groups: Vec<&str> = trimmed.split('-').collect();
            let lengths: Vec<usize> = groups.iter().map(|g| g.len()).collect();
            if lengths != [8, 4, 4, 4, 12] {
                return Err(invalid());
            }
            groups.concat()
        }
        _ => return Err(invalid()),
    };

    let mut bytes = [0_u8; 16];
    hex::decode_to_slice(digits, &mut bytes).map_err(|_| invalid())?;

    Ok(bytes)
}

fn hyphenated(bytes: &[u8; 16]) -> String {
    let hex = hex::encode(bytes);
    format!(
        "{}-{}-{}-{}-{}",
        &hex[..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..]
    )
}

pub struct StringCodec {
    builder: Arc<dyn UuidBuilder>,
}

impl StringCodec {
    pub const KIND: VariantKind = VariantKind::Single("StringCodec");

    #[must_use]
    pub fn new(builder: Arc<dyn UuidBuilder>) -> Self {
        Self { builder }
    }
}

impl Strategy for StringCodec {
    fn kind(&self) -> VariantKind {
        Self::KIND
    }

    fn requires_64bit(&self) -> bool {
        self.builder.requires_64bit()
    }
}

impl Codec for StringCodec {
    fn encode(&self, uuid: &Uuid) -> String {
        hyphenated(uuid.as_bytes())
    }

    fn encode_binary(&self, uuid: &Uuid) -> [u8; 16] {
        *uuid.as_bytes()
    }

    fn decode(&self, encoded: &str) -> Result<Uuid, CodecError> {
        self.decode_bytes(&parse_canonical(encoded)?)
    }

    fn decode_bytes(&self, bytes: &[u8]) -> Result<Uuid, CodecError> {
        Ok(self.builder.build(bytes)?)
    }

    fn builder(&self) -> &Arc<dyn UuidBuilder> {
        &self.builder
    }
}

/// Binary form uses the Guid (mixed-endian) layout.
pub struct GuidStringCodec {
    builder: Arc<dyn UuidBuilder>,
}

impl GuidStringCodec {
    pub const KIND: VariantKind = VariantKind::Single("GuidStringCodec");

    #[must_use]
    pub fn new(builder: Arc<dyn UuidBuilder>) -> Self {
        Self { builder }
    }
}

impl Strategy for GuidStringCodec {
    fn kind(&self) -> VariantKind {
        Self::KIND
    }

    fn requires_64bit(&self) -> bool {
        self.builder.requires_64bit()
    }
}

impl Codec for GuidStringCodec {
    fn encode(&self, uuid: &Uuid) -> String {
        hyphenated(uuid.as_bytes())
    }

    fn encode_binary(&self, uuid: &Uuid) -> [u8; 16] {
        swap_guid_fields(*uuid.as_bytes())
    }

    fn decode(&self, encoded: &str) -> Result<Uuid, CodecError> {
        self.decode_bytes(&swap_guid_fields(parse_canonical(encoded)?))
    }

    fn decode_bytes(&self, bytes: &[u8]) -> Result<Uuid, CodecError> {
        Ok(self.builder.build(bytes)?)
    }

    fn builder(&self) -> &Arc<dyn UuidBuilder> {
        &self.builder
    }
}
