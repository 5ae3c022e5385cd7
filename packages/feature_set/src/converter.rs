//! Number and time converters.
//!
//! The [`TimeConverter`] maps a Unix [`Time`] onto the 60-bit count of
//! 100-nanosecond intervals since the Gregorian reform (1582-10-15) used by
//! time-based UUIDs, and back.

use std::sync::Arc;

use thiserror::Error;

use crate::{
    calculator::{Calculator, CalculatorError},
    strategy::{Strategy, VariantKind},
    types::{Hexadecimal, Integer, Time},
};

/// 100-nanosecond intervals between 1582-10-15 and 1970-01-01.
pub const GREGORIAN_OFFSET: i64 = 0x01b2_1dd2_1381_4000;

/// Largest value representable in the 60-bit UUID timestamp field.
pub const MAX_TIMESTAMP: i64 = 0x0fff_ffff_ffff_ffff;

const INTERVALS_PER_SECOND: i64 = 10_000_000;
const INTERVALS_PER_MICROSECOND: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error(transparent)]
    Calculator(#[from] CalculatorError),
    #[error("Timestamp out of range: {0}")]
    OutOfRange(String),
}

pub trait NumberConverter: Strategy {
    /// # Errors
    ///
    /// * If the value does not fit the calculator's integer range
    fn from_hex(&self, hex: &Hexadecimal) -> Result<Integer, ConversionError>;

    /// # Errors
    ///
    /// * If `number` is negative
    fn to_hex(&self, number: Integer) -> Result<Hexadecimal, ConversionError>;
}

pub trait TimeConverter: Strategy {
    /// Returns the Gregorian timestamp as 16 zero-padded hex digits.
    ///
    /// # Errors
    ///
    /// * If `time` is before the Gregorian epoch or past the 60-bit range
    fn calculate_time(&self, time: Time) -> Result<Hexadecimal, ConversionError>;

    /// # Errors
    ///
    /// * If the timestamp cannot be represented as a [`Time`]
    fn convert_time(&self, timestamp: &Hexadecimal) -> Result<Time, ConversionError>;
}

pub struct GenericNumberConverter {
    calculator: Arc<dyn Calculator>,
}

impl GenericNumberConverter {
    pub const KIND: VariantKind = VariantKind::Single("GenericNumberConverter");

    #[must_use]
    pub fn new(calculator: Arc<dyn Calculator>) -> Self {
        Self { calculator }
    }

    #[must_use]
    pub const fn calculator(&self) -> &Arc<dyn Calculator> {
        &self.calculator
    }
}

impl Strategy for GenericNumberConverter {
    fn kind(&self) -> VariantKind {
        Self::KIND
    }
}

impl NumberConverter for GenericNumberConverter {
    fn from_hex(&self, hex: &Hexadecimal) -> Result<Integer, ConversionError> {
        Ok(self.calculator.from_hexadecimal(hex)?)
    }

    fn to_hex(&self, number: Integer) -> Result<Hexadecimal, ConversionError> {
        Ok(self.calculator.to_hexadecimal(number)?)
    }
}

fn out_of_range(time: Time) -> ConversionError {
    ConversionError::OutOfRange(format!(
        "{}.{:06} is outside the 60-bit Gregorian range",
        time.seconds, time.microseconds
    ))
}

/// Performs every computation through the [`Calculator`].
pub struct GenericTimeConverter {
    calculator: Arc<dyn Calculator>,
}

impl GenericTimeConverter {
    pub const KIND: VariantKind = VariantKind::Single("GenericTimeConverter");

    #[must_use]
    pub fn new(calculator: Arc<dyn Calculator>) -> Self {
        Self { calculator }
    }

    #[must_use]
    pub const fn calculator(&self) -> &Arc<dyn Calculator> {
        &self.calculator
    }
}

impl Strategy for GenericTimeConverter {
    fn kind(&self) -> VariantKind {
        Self::KIND
    }
}

impl TimeConverter for GenericTimeConverter {
    fn calculate_time(&self, time: Time) -> Result<Hexadecimal, ConversionError> {
        let calc = &self.calculator;

        let seconds = calc.multiply(
            Integer::from(time.seconds),
            &[Integer::from(INTERVALS_PER_SECOND)],
        )?;
        let microseconds = calc.multiply(
            Integer::from(time.microseconds),
            &[Integer::from(INTERVALS_PER_MICROSECOND)],
        )?;
        let timestamp = calc.add(seconds, &[microseconds, Integer::from(GREGORIAN_OFFSET)])?;

        if timestamp.is_negative() || timestamp > Integer::from(MAX_TIMESTAMP) {
            return Err(out_of_range(time));
        }

        Ok(calc.to_hexadecimal(timestamp)?.padded(16))
    }

    fn convert_time(&self, timestamp: &Hexadecimal) -> Result<Time, ConversionError> {
        let calc = &self.calculator;

        let intervals = calc.subtract(
            calc.from_hexadecimal(timestamp)?,
            &[Integer::from(GREGORIAN_OFFSET)],
        )?;
        let seconds = calc.divide(intervals, &[Integer::from(INTERVALS_PER_SECOND)])?;
        let remainder = calc.subtract(
            intervals,
            &[calc.multiply(seconds, &[Integer::from(INTERVALS_PER_SECOND)])?],
        )?;
        let microseconds = calc.divide(remainder, &[Integer::from(INTERVALS_PER_MICROSECOND)])?;

        let seconds = i64::try_from(seconds.value())
            .map_err(|_| ConversionError::OutOfRange(timestamp.to_string()))?;
        let microseconds = u32::try_from(microseconds.value())
            .map_err(|_| ConversionError::OutOfRange(timestamp.to_string()))?;

        Ok(Time::new(seconds, microseconds))
    }
}

/// Uses native `i64` arithmetic, handing anything that would overflow to the
/// wrapped [`GenericTimeConverter`].
pub struct NativeTimeConverter {
    fallback: GenericTimeConverter,
}

impl NativeTimeConverter {
    pub const KIND: VariantKind = VariantKind::Single("NativeTimeConverter");

    #[must_use]
    pub const fn new(fallback: GenericTimeConverter) -> Self {
        Self { fallback }
    }

    #[must_use]
    pub const fn fallback(&self) -> &GenericTimeConverter {
        &self.fallback
    }
}

impl Strategy for NativeTimeConverter {
    fn kind(&self) -> VariantKind {
        Self::KIND
    }

    fn requires_64bit(&self) -> bool {
        true
    }
}

impl TimeConverter for NativeTimeConverter {
    fn calculate_time(&self, time: Time) -> Result<Hexadecimal, ConversionError> {
        let timestamp = time
            .seconds
            .checked_mul(INTERVALS_PER_SECOND)
            .and_then(|t| t.checked_add(i64::from(time.microseconds) * INTERVALS_PER_MICROSECOND))
            .and_then(|t| t.checked_add(GREGORIAN_OFFSET));

        let Some(timestamp) = timestamp else {
            log::trace!("calculate_time: native overflow, delegating time={time:?}");
            return self.fallback.calculate_time(time);
        };

        if !(0..=MAX_TIMESTAMP).contains(&timestamp) {
            return Err(out_of_range(time));
        }

        Ok(Hexadecimal::from_u128(timestamp.unsigned_abs().into()).padded(16))
    }

    fn convert_time(&self, timestamp: &Hexadecimal) -> Result<Time, ConversionError> {
        let Some(intervals) = i64::from_str_radix(timestamp.as_str(), 16)
            .ok()
            .and_then(|t| t.checked_sub(GREGORIAN_OFFSET))
        else {
            log::trace!("convert_time: native overflow, delegating timestamp={timestamp}");
            return self.fallback.convert_time(timestamp);
        };

        let seconds = intervals.div_euclid(INTERVALS_PER_SECOND);
        let microseconds = intervals.rem_euclid(INTERVALS_PER_SECOND) / INTERVALS_PER_MICROSECOND;

        let microseconds = u32::try_from(microseconds)
            .map_err(|_| ConversionError::OutOfRange(timestamp.to_string()))?;

        Ok(Time::new(seconds, microseconds))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::calculator::BaselineCalculator;

    fn generic() -> GenericTimeConverter {
        GenericTimeConverter::new(Arc::new(BaselineCalculator::new()))
    }

    fn native() -> NativeTimeConverter {
        NativeTimeConverter::new(generic())
    }

    // 2009-02-13T23:31:30.123456Z
    const SAMPLE: Time = Time::new(1_234_567_890, 123_456);
    const SAMPLE_HEX: &str = "1ddfa2670ec8b80";

    #[test_log::test]
    fn test_generic_calculate_time() {
        let hex = generic().calculate_time(SAMPLE).unwrap();

        assert_eq!(hex.as_str(), format!("0{SAMPLE_HEX}").as_str());
    }

    #[test_log::test]
    fn test_native_matches_generic() {
        for time in [
            SAMPLE,
            Time::new(0, 0),
            Time::new(1_700_000_000, 999_999),
            Time::new(-12_219_292_800, 0),
        ] {
            assert_eq!(
                native().calculate_time(time).unwrap(),
                generic().calculate_time(time).unwrap(),
                "time={time:?}"
            );
        }
    }

    #[test_log::test]
    fn test_unix_epoch_is_gregorian_offset() {
        let hex = native().calculate_time(Time::new(0, 0)).unwrap();

        assert_eq!(hex.as_str(), "01b21dd213814000");
    }

    #[test_log::test]
    fn test_convert_time_inverts_calculate_time() {
        let hex = Hexadecimal::new(SAMPLE_HEX).unwrap();

        assert_eq!(generic().convert_time(&hex).unwrap(), SAMPLE);
        assert_eq!(native().convert_time(&hex).unwrap(), SAMPLE);
    }

    #[test_log::test]
    fn test_before_gregorian_epoch_is_out_of_range() {
        let time = Time::new(-12_219_292_801, 0);

        assert!(matches!(
            generic().calculate_time(time),
            Err(ConversionError::OutOfRange(_))
        ));
        assert!(matches!(
            native().calculate_time(time),
            Err(ConversionError::OutOfRange(_))
        ));
    }

    #[test_log::test]
    fn test_native_delegates_on_overflow() {
        let time = Time::new(i64::MAX, 0);

        // the generic converter computes the value and then rejects the range
        assert!(matches!(
            native().calculate_time(time),
            Err(ConversionError::OutOfRange(_))
        ));

        let wide = Hexadecimal::new("ffffffffffffffffff").unwrap();
        assert_eq!(
            native().convert_time(&wide).is_ok(),
            generic().convert_time(&wide).is_ok()
        );
    }

    #[test_log::test]
    fn test_kinds() {
        assert_eq!(generic().kind(), GenericTimeConverter::KIND);
        assert!(!generic().requires_64bit());
        assert_eq!(native().kind(), NativeTimeConverter::KIND);
        assert!(native().requires_64bit());
    }

    #[test_log::test]
    fn test_number_converter() {
        let converter = GenericNumberConverter::new(Arc::new(BaselineCalculator::new()));

        assert_eq!(
            converter.from_hex(&Hexadecimal::new("7b").unwrap()),
            Ok(Integer::new(123))
        );
        assert_eq!(converter.to_hex(Integer::new(123)).unwrap().as_str(), "7b");
        assert_eq!(converter.kind(), GenericNumberConverter::KIND);
    }
}
