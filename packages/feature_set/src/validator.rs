use std::sync::LazyLock;

use regex::Regex;

use crate::strategy::{Strategy, VariantKind};

pub trait Validator: Strategy {
    fn is_valid(&self, uuid: &str) -> bool;
}

static HYPHENATED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(urn:uuid:)?\{?[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}\}?$")
        .expect("Invalid Regex")
});

/// Accepts the hyphenated form with an optional `urn:uuid:` prefix and braces.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericValidator;

impl GenericValidator {
    pub const KIND: VariantKind = VariantKind::Single("GenericValidator");

    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Strategy for GenericValidator {
    fn kind(&self) -> VariantKind {
        Self::KIND
    }
}

impl Validator for GenericValidator {
    fn is_valid(&self, uuid: &str) -> bool {
        if !HYPHENATED_REGEX.is_match(uuid) {
            return false;
        }

        // braces must come as a pair
        let body = uuid.get(9..).filter(|_| uuid[..9].eq_ignore_ascii_case("urn:uuid:"));
        let body = body.unwrap_or(uuid);

        body.starts_with('{') == body.ends_with('}')
    }
}
