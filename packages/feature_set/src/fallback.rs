//! Ordered fallback over interchangeable candidates.
//!
//! A [`FallbackChain`] holds one or more implementations of the same role and
//! tries them in order. A candidate failing is expected and only recorded; the
//! caller sees an error only when every candidate has failed, and that
//! [`ChainError`] lists each failure in the order the candidates were tried.

use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::strategy::{Strategy, VariantKind};

/// One failed attempt inside a [`FallbackChain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFailure {
    /// Zero-based position of the candidate in the chain
    pub position: usize,
    pub kind: VariantKind,
    pub message: String,
}

impl fmt::Display for CandidateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}: {}", self.position + 1, self.kind, self.message)
    }
}

/// Every candidate in a chain failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("All {} candidates failed: {}", .failures.len(), format_failures(.failures))]
pub struct ChainError {
    pub failures: Vec<CandidateFailure>,
}

fn format_failures(failures: &[CandidateFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("A fallback chain requires at least one candidate")]
pub struct EmptyChainError;

/// Non-empty, ordered list of candidates for one role.
pub struct FallbackChain<T: ?Sized> {
    candidates: Vec<Arc<T>>,
}

impl<T: ?Sized + Strategy> FallbackChain<T> {
    /// # Errors
    ///
    /// * If `candidates` is empty
    pub fn new(candidates: Vec<Arc<T>>) -> Result<Self, EmptyChainError> {
        if candidates.is_empty() {
            return Err(EmptyChainError);
        }

        Ok(Self { candidates })
    }

    #[must_use]
    pub fn candidates(&self) -> &[Arc<T>] {
        &self.candidates
    }

    /// Runs `op` against each candidate in order and returns the first success.
    ///
    /// # Errors
    ///
    /// * If `op` fails for every candidate
    pub fn attempt<R, E: fmt::Display>(
        &self,
        mut op: impl FnMut(&T) -> Result<R, E>,
    ) -> Result<R, ChainError> {
        let mut failures = Vec::with_capacity(self.candidates.len());

        for (position, candidate) in self.candidates.iter().enumerate() {
            match op(candidate.as_ref()) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    let kind = candidate.kind();
                    log::debug!("attempt: candidate {position} ({kind}) failed: {e}");
                    failures.push(CandidateFailure {
                        position,
                        kind,
                        message: e.to_string(),
                    });
                }
            }
        }

        Err(ChainError { failures })
    }
}

impl<T: ?Sized + Strategy> Strategy for FallbackChain<T> {
    fn kind(&self) -> VariantKind {
        VariantKind::chain(self.candidates.iter().map(|c| c.kind()))
    }

    fn requires_64bit(&self) -> bool {
        self.candidates.iter().any(|c| c.requires_64bit())
    }
}

impl<T: ?Sized + Strategy> fmt::Debug for FallbackChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackChain")
            .field("kind", &self.kind())
            .finish()
    }
}
