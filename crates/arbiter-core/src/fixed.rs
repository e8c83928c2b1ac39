//! Scaled fixed-point helpers.
//!
//! Every ratio in the engine is a `u128` with an implicit denominator of
//! [`SCALE`]. Products are formed in 256 bits so that
//! `stake * SCALE` never overflows before the division, and all divisions
//! round toward zero (floor for non-negative operands).

use primitive_types::U256;

use crate::constants::{SCALE, SCALE_DECIMALS};
use crate::error::{ArithmeticError, ParseAmountError};

/// `floor(a * b / denom)` with a 256-bit intermediate.
///
/// Fails with [`ArithmeticError::DivisionByZero`] when `denom == 0` and with
/// [`ArithmeticError::Overflow`] when the quotient does not fit in `u128`.
pub fn mul_div_floor(a: u128, b: u128, denom: u128) -> Result<u128, ArithmeticError> {
    if denom == 0 {
        return Err(ArithmeticError::DivisionByZero);
    }
    if a == 0 || b == 0 {
        return Ok(0);
    }

    // (2^128 - 1)^2 < 2^256, so the product itself cannot overflow.
    let quotient = U256::from(a) * U256::from(b) / U256::from(denom);
    if quotient > U256::from(u128::MAX) {
        return Err(ArithmeticError::Overflow);
    }
    Ok(quotient.low_u128())
}

/// Scale `amount` by a fraction expressed in [`SCALE`] units.
pub fn apply_fraction(amount: u128, fraction: u128) -> Result<u128, ArithmeticError> {
    mul_div_floor(amount, fraction, SCALE)
}

/// `numerator / denominator` as a scaled fraction.
pub fn ratio(numerator: u128, denominator: u128) -> Result<u128, ArithmeticError> {
    mul_div_floor(numerator, SCALE, denominator)
}

pub fn checked_add(a: u128, b: u128) -> Result<u128, ArithmeticError> {
    a.checked_add(b).ok_or(ArithmeticError::Overflow)
}

pub fn checked_sub(a: u128, b: u128) -> Result<u128, ArithmeticError> {
    a.checked_sub(b).ok_or(ArithmeticError::Underflow)
}

/// Sum an iterator of amounts, failing on overflow.
pub fn checked_sum<I>(values: I) -> Result<u128, ArithmeticError>
where
    I: IntoIterator<Item = u128>,
{
    values.into_iter().try_fold(0u128, checked_add)
}

/// Whole units expressed in scaled form (`units * SCALE`).
pub fn from_units(units: u128) -> Result<u128, ArithmeticError> {
    units.checked_mul(SCALE).ok_or(ArithmeticError::Overflow)
}

/// Parse a non-negative decimal string (`"12"`, `"0.25"`) into scaled units.
///
/// Fractional digits beyond [`SCALE_DECIMALS`] are rejected rather than
/// rounded so that parsing never silently changes a value.
///
/// # Examples
///
/// ```
/// use arbiter_core::constants::SCALE;
/// use arbiter_core::fixed::parse_scaled;
///
/// assert_eq!(parse_scaled("1").unwrap(), SCALE);
/// assert_eq!(parse_scaled("0.5").unwrap(), SCALE / 2);
/// assert!(parse_scaled("-1").is_err());
/// ```
pub fn parse_scaled(input: &str) -> Result<u128, ParseAmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseAmountError::Empty);
    }

    let (int_part, frac_part) = match input.split_once('.') {
        Some((i, f)) => (i, f),
        None => (input, ""),
    };
    if int_part.is_empty() {
        return Err(ParseAmountError::Empty);
    }
    if let Some(c) = int_part
        .chars()
        .chain(frac_part.chars())
        .find(|c| !c.is_ascii_digit())
    {
        return Err(ParseAmountError::InvalidCharacter(c));
    }
    if frac_part.len() > SCALE_DECIMALS {
        return Err(ParseAmountError::TooPrecise {
            digits: frac_part.len(),
            max: SCALE_DECIMALS,
        });
    }

    let whole: u128 = int_part.parse().map_err(|_| ParseAmountError::OutOfRange)?;
    let mut frac: u128 = 0;
    for (i, c) in frac_part.chars().enumerate() {
        let digit = c.to_digit(10).ok_or(ParseAmountError::InvalidCharacter(c))? as u128;
        frac += digit * 10u128.pow((SCALE_DECIMALS - 1 - i) as u32);
    }

    whole
        .checked_mul(SCALE)
        .and_then(|w| w.checked_add(frac))
        .ok_or(ParseAmountError::OutOfRange)
}

/// Render a scaled value as a decimal string without trailing zeros.
///
/// # Examples
///
/// ```
/// use arbiter_core::constants::SCALE;
/// use arbiter_core::fixed::format_scaled;
///
/// assert_eq!(format_scaled(3 * SCALE), "3");
/// assert_eq!(format_scaled(SCALE / 4), "0.25");
/// ```
pub fn format_scaled(value: u128) -> String {
    let whole = value / SCALE;
    let frac = value % SCALE;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{frac:0width$}", width = SCALE_DECIMALS);
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

/// Serde adapter storing scaled values as decimal strings.
///
/// Input must be a decimal string (`"9000"`, `"0.25"`). JSON numbers are
/// rejected: integers above `u64::MAX` arrive as floats, which would cap bare
/// amounts at about 18 tokens.
pub mod decimal {
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    use super::{format_scaled, parse_scaled};

    const NUMBER_REJECTED: &str = "scaled amounts must be decimal strings, e.g. \"12.5\"";

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_scaled(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        struct ScaledVisitor;

        impl Visitor<'_> for ScaledVisitor {
            type Value = u128;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative decimal string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
                parse_scaled(v).map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, _: u64) -> Result<u128, E> {
                Err(E::custom(NUMBER_REJECTED))
            }

            fn visit_i64<E: de::Error>(self, _: i64) -> Result<u128, E> {
                Err(E::custom(NUMBER_REJECTED))
            }

            fn visit_f64<E: de::Error>(self, _: f64) -> Result<u128, E> {
                Err(E::custom(NUMBER_REJECTED))
            }
        }

        deserializer.deserialize_any(ScaledVisitor)
    }
}
