use std::cmp::Ordering;

use thiserror::Error;

use crate::{
    strategy::{Strategy, VariantKind},
    types::{Hexadecimal, Integer},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculatorError {
    #[error("Arithmetic overflow in {0}")]
    Overflow(&'static str),
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Cannot represent negative value {0} in hexadecimal")]
    NegativeHexadecimal(Integer),
}

/// Arithmetic over [`Integer`] values.
pub trait Calculator: Strategy {
    /// # Errors
    ///
    /// * If the result does not fit
    fn add(&self, augend: Integer, addends: &[Integer]) -> Result<Integer, CalculatorError>;

    /// # Errors
    ///
    /// * If the result does not fit
    fn subtract(
        &self,
        minuend: Integer,
        subtrahends: &[Integer],
    ) -> Result<Integer, CalculatorError>;

    /// # Errors
    ///
    /// * If the result does not fit
    fn multiply(
        &self,
        multiplicand: Integer,
        multipliers: &[Integer],
    ) -> Result<Integer, CalculatorError>;

    /// Floor division.
    ///
    /// # Errors
    ///
    /// * If any divisor is zero
    /// * If the result does not fit
    fn divide(&self, dividend: Integer, divisors: &[Integer]) -> Result<Integer, CalculatorError>;

    fn compare(&self, left: Integer, right: Integer) -> Ordering;

    /// # Errors
    ///
    /// * If `value` is negative
    fn to_hexadecimal(&self, value: Integer) -> Result<Hexadecimal, CalculatorError>;

    /// # Errors
    ///
    /// * If the value does not fit
    fn from_hexadecimal(&self, value: &Hexadecimal) -> Result<Integer, CalculatorError>;
}

/// Pure-software calculator with checked 128-bit arithmetic. Always available.
#[derive(Debug, Default, Clone, Copy)]
pub struct BaselineCalculator;

impl BaselineCalculator {
    pub const KIND: VariantKind = VariantKind::Single("BaselineCalculator");

    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn fold(
        start: Integer,
        operands: &[Integer],
        op: &'static str,
        f: impl Fn(i128, i128) -> Option<i128>,
    ) -> Result<Integer, CalculatorError> {
        operands
            .iter()
            .try_fold(start.value(), |acc, operand| f(acc, operand.value()))
            .map(Integer::new)
            .ok_or(CalculatorError::Overflow(op))
    }
}

impl Strategy for BaselineCalculator {
    fn kind(&self) -> VariantKind {
        Self::KIND
    }
}

impl Calculator for BaselineCalculator {
    fn add(&self, augend: Integer, addends: &[Integer]) -> Result<Integer, CalculatorError> {
        Self::fold(augend, addends, "add", i128::checked_add)
    }

    fn subtract(
        &self,
        minuend: Integer,
        subtrahends: &[Integer],
    ) -> Result<Integer, CalculatorError> {
        Self::fold(minuend, subtrahends, "subtract", i128::checked_sub)
    }

    fn multiply(
        &self,
        multiplicand: Integer,
        multipliers: &[Integer],
    ) -> Result<Integer, CalculatorError> {
        Self::fold(multiplicand, multipliers, "multiply", i128::checked_mul)
    }

    fn divide(&self, dividend: Integer, divisors: &[Integer]) -> Result<Integer, CalculatorError> {
        if divisors.iter().any(|d| d.value() == 0) {
            return Err(CalculatorError::DivisionByZero);
        }

        Self::fold(dividend, divisors, "divide", |a, b| {
            let quotient = a.checked_div(b)?;
            // round toward negative infinity
            if (a % b != 0) && ((a < 0) != (b < 0)) {
                quotient.checked_sub(1)
            } else {
                Some(quotient)
            }
        })
    }

    fn compare(&self, left: Integer, right: Integer) -> Ordering {
        left.cmp(&right)
    }

    fn to_hexadecimal(&self, value: Integer) -> Result<Hexadecimal, CalculatorError> {
        if value.is_negative() {
            return Err(CalculatorError::NegativeHexadecimal(value));
        }

        Ok(Hexadecimal::from_u128(value.value().unsigned_abs()))
    }

    fn from_hexadecimal(&self, value: &Hexadecimal) -> Result<Integer, CalculatorError> {
        let digits = value.as_str().trim_start_matches('0');
        if digits.is_empty() {
            return Ok(Integer::ZERO);
        }

        i128::from_str_radix(digits, 16)
            .map(Integer::new)
            .map_err(|_| CalculatorError::Overflow("from_hexadecimal"))
    }
}
