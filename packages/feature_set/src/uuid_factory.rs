//! Creates and parses UUIDs through the roles of a [`FeatureSet`].

use thiserror::Error;
use uuid::Uuid;

use crate::{
    FeatureSet,
    codec::CodecError,
    generator::TimeGeneratorError,
    node::Node,
    random::RandomError,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UuidFactoryError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    TimeGenerator(#[from] TimeGeneratorError),
    #[error(transparent)]
    Random(#[from] RandomError),
    #[error("Random generator returned {0} bytes, expected 16")]
    ShortRandom(usize),
}

pub struct UuidFactory {
    features: FeatureSet,
}

impl UuidFactory {
    #[must_use]
    pub const fn new(features: FeatureSet) -> Self {
        Self { features }
    }

    #[must_use]
    pub const fn features(&self) -> &FeatureSet {
        &self.features
    }

    /// The time source and validator can be swapped through this.
    pub const fn features_mut(&mut self) -> &mut FeatureSet {
        &mut self.features
    }

    #[must_use]
    pub fn into_features(self) -> FeatureSet {
        self.features
    }

    /// Time-based UUID. Without a `node` the feature set's node provider is
    /// asked; without a `clock_seq` a random one is used.
    ///
    /// # Errors
    ///
    /// * If the time generator fails
    /// * If the selected builder rejects the generated bytes
    pub fn uuid1(&self, node: Option<Node>, clock_seq: Option<u16>) -> Result<Uuid, UuidFactoryError> {
        let bytes = self.features.time_generator().generate(node, clock_seq)?;
        self.assemble(bytes)
    }

    /// Random UUID.
    ///
    /// # Errors
    ///
    /// * If the random generator fails
    /// * If the selected builder rejects the generated bytes
    pub fn uuid4(&self) -> Result<Uuid, UuidFactoryError> {
        let random = self.features.random_generator().generate(16)?;
        let mut bytes: [u8; 16] = random
            .as_slice()
            .try_into()
            .map_err(|_| UuidFactoryError::ShortRandom(random.len()))?;

        bytes[6] = (bytes[6] & 0x0f) | 0x40;
        bytes[8] = (bytes[8] & 0x3f) | 0x80;

        self.assemble(bytes)
    }

    /// # Errors
    ///
    /// * If `encoded` is not a UUID string
    /// * If the selected builder rejects the decoded bytes
    pub fn from_string(&self, encoded: &str) -> Result<Uuid, UuidFactoryError> {
        Ok(self.features.codec().decode(encoded)?)
    }

    /// `bytes` are read in the codec's binary layout.
    ///
    /// # Errors
    ///
    /// * If the selected builder rejects `bytes`
    pub fn from_bytes(&self, bytes: &[u8]) -> Result<Uuid, UuidFactoryError> {
        Ok(self.features.codec().decode_bytes(bytes)?)
    }

    #[must_use]
    pub fn is_valid(&self, uuid: &str) -> bool {
        self.features.validator().is_valid(uuid)
    }

    /// Canonical bytes through the codec's binary layout into the builder.
    fn assemble(&self, canonical: [u8; 16]) -> Result<Uuid, UuidFactoryError> {
        let codec = self.features.codec();
        let binary = codec.encode_binary(&Uuid::from_bytes(canonical));

        Ok(codec.decode_bytes(&binary)?)
    }
}
