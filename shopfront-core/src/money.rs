use rust_decimal::{Decimal, RoundingStrategy};

use crate::{CoreError, CoreResult};

/// Prices are fixed-point with two fraction digits.
pub const PRICE_SCALE: u32 = 2;

/// Largest accepted unit price, 99,999,999.99 (the `NUMERIC(10,2)` column ceiling).
pub const MAX_PRICE: Decimal = Decimal::from_parts(0x540B_E3FF, 2, 0, false, PRICE_SCALE);

/// Normalise a unit price to `PRICE_SCALE` digits, rejecting negatives and
/// anything above `MAX_PRICE`.
pub fn normalize_price(value: Decimal) -> CoreResult<Decimal> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(CoreError::ValidationError(format!(
            "price must not be negative, got {}",
            value
        )));
    }

    let mut price = value.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    price.rescale(PRICE_SCALE);
    if price > MAX_PRICE {
        return Err(CoreError::ValidationError(format!(
            "price must not exceed {}, got {}",
            MAX_PRICE, value
        )));
    }
    Ok(price)
}

/// `unit_price * quantity`, kept at price scale. `None` on overflow.
pub fn line_total(unit_price: Decimal, quantity: i32) -> Option<Decimal> {
    let mut total = unit_price.checked_mul(Decimal::from(quantity))?;
    total.rescale(PRICE_SCALE);
    Some(total)
}

/// Sum of line totals, kept at price scale. `None` on overflow.
pub fn sum_totals(totals: impl IntoIterator<Item = Option<Decimal>>) -> Option<Decimal> {
    let mut sum = totals
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, total| acc.checked_add(total?))?;
    sum.rescale(PRICE_SCALE);
    Some(sum)
}
