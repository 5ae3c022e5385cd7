//! Random byte generators.

use std::sync::{Arc, Mutex, PoisonError};

use rand::{RngCore as _, SeedableRng as _, rngs::StdRng};
use thiserror::Error;

use crate::strategy::{Strategy, VariantKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RandomError {
    #[error("No secure random source available: {0}")]
    Unavailable(String),
}

pub trait RandomGenerator: Strategy {
    /// # Errors
    ///
    /// * If the underlying source cannot produce bytes
    fn generate(&self, length: usize) -> Result<Vec<u8>, RandomError>;
}

/// The operating system's secure random source.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandomGenerator;

impl OsRandomGenerator {
    pub const KIND: VariantKind = VariantKind::Single("OsRandomGenerator");

    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Strategy for OsRandomGenerator {
    fn kind(&self) -> VariantKind {
        Self::KIND
    }
}

impl RandomGenerator for OsRandomGenerator {
    fn generate(&self, length: usize) -> Result<Vec<u8>, RandomError> {
        let mut bytes = vec![0_u8; length];
        getrandom::fill(&mut bytes).map_err(|e| RandomError::Unavailable(e.to_string()))?;
        Ok(bytes)
    }
}

/// Reproducible byte stream from a fixed seed. Not for production identifiers.
pub struct SeededRandomGenerator(Mutex<StdRng>);

impl SeededRandomGenerator {
    pub const KIND: VariantKind = VariantKind::Single("SeededRandomGenerator");

    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self(Mutex::new(StdRng::seed_from_u64(seed)))
    }
}

impl Strategy for SeededRandomGenerator {
    fn kind(&self) -> VariantKind {
        Self::KIND
    }
}

impl RandomGenerator for SeededRandomGenerator {
    fn generate(&self, length: usize) -> Result<Vec<u8>, RandomError> {
        let mut bytes = vec![0_u8; length];
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fill_bytes(&mut bytes);
        Ok(bytes)
    }
}

/// Accepts `source` once it has produced a byte.
///
/// # Errors
///
/// * If `source` cannot produce bytes
pub fn select_random_generator(
    source: Arc<dyn RandomGenerator>,
) -> Result<Arc<dyn RandomGenerator>, RandomError> {
    if let Err(e) = source.generate(1) {
        log::error!("select_random_generator: kind={} unavailable: {e}", source.kind());
        return Err(e);
    }

    log::debug!("select_random_generator: kind={}", source.kind());

    Ok(source)
}
