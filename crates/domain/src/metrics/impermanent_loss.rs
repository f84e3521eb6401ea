use crate::error::DomainError;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// Impermanent loss of a 50/50 pool position versus holding the deposit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpermanentLossReport {
    /// Loss as a negative fraction (e.g. -0.02 for a 2% loss).
    pub loss: Decimal,
    /// Loss scaled to percent.
    pub loss_pct: Decimal,
    /// Value of the initial asset bundle at current prices.
    pub hodl_value: Decimal,
    /// Value of the pool position at current prices.
    pub pool_value: Decimal,
}

/// Calculates impermanent loss for a 50/50 two-asset pool.
/// formula: 2 * sqrt(price_ratio) / (1 + price_ratio) - 1
///
/// `price_ratio` is the relative price move between the two assets:
/// (current[1]/initial[1]) / (current[0]/initial[0]).
///
/// # Errors
///
/// * `UnsupportedPoolShape` - anything other than two assets; weighted
///   pools need specialized math this module does not attempt.
/// * `Validation` - non-positive prices.
pub fn impermanent_loss(
    initial_prices: &[Decimal],
    current_prices: &[Decimal],
) -> Result<ImpermanentLossReport, DomainError> {
    if initial_prices.len() != 2 || current_prices.len() != 2 {
        return Err(DomainError::UnsupportedPoolShape(format!(
            "expected 2 assets, got {} initial / {} current",
            initial_prices.len(),
            current_prices.len()
        )));
    }
    if initial_prices.iter().any(|p| *p <= Decimal::ZERO)
        || current_prices.iter().any(|p| *p <= Decimal::ZERO)
    {
        return Err(DomainError::validation("prices must be positive"));
    }

    let ratio_0 = current_prices[0] / initial_prices[0];
    let ratio_1 = current_prices[1] / initial_prices[1];
    let price_ratio = ratio_1 / ratio_0;

    // sqrt needs a float bridge; IL is an estimation, so the f64 round
    // trip is acceptable precision here.
    let ratio_f64 = price_ratio
        .to_f64()
        .ok_or_else(|| DomainError::validation("price ratio overflow"))?;
    let pool_factor = 2.0 * ratio_f64.sqrt() / (1.0 + ratio_f64);
    let loss_f64 = pool_factor - 1.0;

    let loss = Decimal::from_f64(loss_f64)
        .ok_or_else(|| DomainError::validation("loss overflow"))?;
    let pool_factor = Decimal::from_f64(pool_factor)
        .ok_or_else(|| DomainError::validation("pool factor overflow"))?;

    let hodl_value = current_prices[0] + current_prices[1];
    let pool_value = pool_factor * (initial_prices[0] + initial_prices[1]);

    Ok(ImpermanentLossReport {
        loss,
        loss_pct: loss * Decimal::from(100),
        hodl_value,
        pool_value,
    })
}
