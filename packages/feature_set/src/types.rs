//! Value types exchanged between the roles.

use std::{fmt, str::FromStr};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("Invalid hexadecimal value: '{0}'")]
    InvalidHexadecimal(String),
    #[error("Invalid integer value: '{0}'")]
    InvalidInteger(String),
}

/// Signed integer handled by a [`crate::calculator::Calculator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Integer(i128);

impl Integer {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(value: i128) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> i128 {
        self.0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        Self(i128::from(value))
    }
}

impl From<u64> for Integer {
    fn from(value: u64) -> Self {
        Self(i128::from(value))
    }
}

impl From<u32> for Integer {
    fn from(value: u32) -> Self {
        Self(i128::from(value))
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Integer {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i128>()
            .map(Self)
            .map_err(|_| ValueError::InvalidInteger(s.to_string()))
    }
}

/// Lowercase hexadecimal digits without a `0x` prefix. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hexadecimal(String);

impl Hexadecimal {
    /// Accepts an optional `0x` prefix and either case.
    ///
    /// # Errors
    ///
    /// * If the value is empty or contains a non-hex character
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValueError> {
        let raw = value.as_ref();
        let digits = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .unwrap_or(raw);

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ValueError::InvalidHexadecimal(raw.to_string()));
        }

        Ok(Self(digits.to_ascii_lowercase()))
    }

    #[must_use]
    pub fn from_u128(value: u128) -> Self {
        Self(format!("{value:x}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Left-pads with zeros up to `width` digits.
    #[must_use]
    pub fn padded(&self, width: usize) -> Self {
        Self(format!("{:0>width$}", self.0))
    }
}

impl fmt::Display for Hexadecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Hexadecimal {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Point in time relative to the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Time {
    pub seconds: i64,
    /// Always below 1,000,000
    pub microseconds: u32,
}

impl Time {
    /// Whole seconds in `microseconds` carry into `seconds`, saturating at
    /// `i64::MAX`.
    #[must_use]
    pub const fn new(seconds: i64, microseconds: u32) -> Self {
        Self {
            seconds: seconds.saturating_add((microseconds / 1_000_000) as i64),
            microseconds: microseconds % 1_000_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_hexadecimal_normalizes() {
        assert_eq!(Hexadecimal::new("0xABcd").unwrap().as_str(), "abcd");
        assert_eq!(Hexadecimal::new("ff").unwrap().to_string(), "ff");
    }

    #[test_log::test]
    fn test_hexadecimal_rejects_invalid() {
        assert!(Hexadecimal::new("").is_err());
        assert!(Hexadecimal::new("0x").is_err());
        assert!(Hexadecimal::new("xyz").is_err());
        assert!(Hexadecimal::new("12-34").is_err());
    }

    #[test_log::test]
    fn test_hexadecimal_padded() {
        assert_eq!(Hexadecimal::new("abc").unwrap().padded(6).as_str(), "000abc");
        assert_eq!(Hexadecimal::new("abcdef").unwrap().padded(4).as_str(), "abcdef");
    }

    #[test_log::test]
    fn test_integer_parse() {
        assert_eq!("-42".parse::<Integer>(), Ok(Integer::new(-42)));
        assert!("4x2".parse::<Integer>().is_err());
    }

    #[test_log::test]
    fn test_time_normalizes_microseconds() {
        assert_eq!(Time::new(10, 2_500_000), Time::new(12, 500_000));
    }

    #[test_log::test]
    fn test_time_carry_saturates() {
        assert_eq!(
            Time::new(i64::MAX, 1_000_000),
            Time {
                seconds: i64::MAX,
                microseconds: 0,
            }
        );
        assert_eq!(
            Time::new(i64::MAX - 1, u32::MAX),
            Time {
                seconds: i64::MAX,
                microseconds: u32::MAX % 1_000_000,
            }
        );
    }
}
