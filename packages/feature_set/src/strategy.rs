use std::fmt;

/// Identifies which concrete variant fills a role.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Single(&'static str),
    Chain(Vec<VariantKind>),
}

impl VariantKind {
    #[must_use]
    pub fn chain(kinds: impl IntoIterator<Item = Self>) -> Self {
        Self::Chain(kinds.into_iter().collect())
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(name) => f.write_str(name),
            Self::Chain(kinds) => {
                f.write_str("FallbackChain[")?;
                for (i, kind) in kinds.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{kind}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Common surface of every role implementation.
pub trait Strategy: Send + Sync {
    fn kind(&self) -> VariantKind;

    /// Whether this variant relies on native 64-bit integer arithmetic.
    fn requires_64bit(&self) -> bool {
        false
    }
}
