//! Currency-quantized random amounts.
//!
//! Amounts are sampled at a finer resolution than cents and then brought back
//! to exactly two fractional digits. Initial balances are truncated toward zero
//! while transaction amounts are rounded half away from zero.

use bigdecimal::{BigDecimal, Signed, ToPrimitive};
use rand::Rng;
use thiserror::Error;

/// Fractional digits stored for every monetary value.
pub const CENT_SCALE: i64 = 2;

/// Resolution used when sampling before quantizing to cents.
const SAMPLE_SCALE: i64 = 4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("minimum {min} is greater than maximum {max}")]
    InvertedRange { min: String, max: String },

    #[error("amount {0} is negative")]
    Negative(String),

    #[error("amount {0} is too large to sample")]
    OutOfRange(String),
}

/// Uniform amount in `[min, max]`, truncated to cents (12.347 becomes 12.34).
pub fn random_money<R: Rng + ?Sized>(
    rng: &mut R,
    min: &BigDecimal,
    max: &BigDecimal,
) -> Result<BigDecimal, MoneyError> {
    let sampled = sample(rng, min, max)?;
    Ok(truncate_to_cents(&sampled))
}

/// Uniform amount in `[floor, ceiling]`, rounded to the nearest cent.
pub fn random_amount<R: Rng + ?Sized>(
    rng: &mut R,
    floor: &BigDecimal,
    ceiling: &BigDecimal,
) -> Result<BigDecimal, MoneyError> {
    let sampled = sample(rng, floor, ceiling)?;
    Ok(round_to_cents(&sampled))
}

/// Drops everything past the second fractional digit.
pub fn truncate_to_cents(value: &BigDecimal) -> BigDecimal {
    value.with_scale(CENT_SCALE)
}

/// Rounds half away from zero to two fractional digits.
pub fn round_to_cents(value: &BigDecimal) -> BigDecimal {
    let half_cent = BigDecimal::new(5.into(), CENT_SCALE + 1);
    if value.is_negative() {
        (value.clone() - half_cent).with_scale(CENT_SCALE)
    } else {
        (value.clone() + half_cent).with_scale(CENT_SCALE)
    }
}

fn sample<R: Rng + ?Sized>(
    rng: &mut R,
    min: &BigDecimal,
    max: &BigDecimal,
) -> Result<BigDecimal, MoneyError> {
    if min.is_negative() {
        return Err(MoneyError::Negative(min.to_string()));
    }
    if min > max {
        return Err(MoneyError::InvertedRange {
            min: min.to_string(),
            max: max.to_string(),
        });
    }

    let low = to_sample_units(min)?;
    let high = to_sample_units(max)?;
    let units = rng.gen_range(low..=high);

    Ok(BigDecimal::new(units.into(), SAMPLE_SCALE))
}

fn to_sample_units(value: &BigDecimal) -> Result<i64, MoneyError> {
    let (digits, _) = value.with_scale(SAMPLE_SCALE).as_bigint_and_exponent();
    digits
        .to_i64()
        .ok_or_else(|| MoneyError::OutOfRange(value.to_string()))
}
