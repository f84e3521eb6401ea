use crate::enums::YieldCategory;
use crate::error::DomainError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Valuation of a single position at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub protocol: String,
    pub asset: String,
    pub category: YieldCategory,
    pub invested: Decimal,
    pub current_value: Decimal,
    pub apy: Decimal,
}

/// Aggregated performance of one yield category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPerformance {
    pub category: YieldCategory,
    pub value: Decimal,
    pub invested: Decimal,
    pub net_return: Decimal,
    /// Share of total portfolio value, in percent.
    pub percentage: Decimal,
    pub return_percentage: Decimal,
}

/// Portfolio-wide performance summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub total_value: Decimal,
    pub total_invested: Decimal,
    pub total_return: Decimal,
    pub total_return_percentage: Decimal,
    /// Average APY weighted by current value.
    pub weighted_apy: Decimal,
    pub categories: Vec<CategoryPerformance>,
    pub position_count: usize,
}

/// Summarises portfolio performance: totals, return, value-weighted APY
/// and a per-category breakdown.
///
/// Categories appear in the order of [`YieldCategory::ALL`], skipping
/// categories with no positions.
///
/// # Errors
/// Returns `DomainError::Validation` if there are no positions or the
/// total invested value is zero.
pub fn portfolio_performance(
    positions: &[PositionSnapshot],
) -> Result<PortfolioReport, DomainError> {
    if positions.is_empty() {
        return Err(DomainError::validation("no positions provided"));
    }

    let total_value: Decimal = positions.iter().map(|p| p.current_value).sum();
    let total_invested: Decimal = positions.iter().map(|p| p.invested).sum();
    if total_invested == Decimal::ZERO {
        return Err(DomainError::validation("no investment value provided"));
    }

    let total_return = total_value - total_invested;
    let weighted_apy = if total_value > Decimal::ZERO {
        positions
            .iter()
            .map(|p| p.apy * p.current_value)
            .sum::<Decimal>()
            / total_value
    } else {
        Decimal::ZERO
    };

    let categories = YieldCategory::ALL
        .iter()
        .filter_map(|category| {
            let members: Vec<&PositionSnapshot> = positions
                .iter()
                .filter(|p| p.category == *category)
                .collect();
            if members.is_empty() {
                return None;
            }
            let value: Decimal = members.iter().map(|p| p.current_value).sum();
            let invested: Decimal = members.iter().map(|p| p.invested).sum();
            let net_return = value - invested;
            Some(CategoryPerformance {
                category: *category,
                value,
                invested,
                net_return,
                percentage: if total_value > Decimal::ZERO {
                    value / total_value * Decimal::from(100)
                } else {
                    Decimal::ZERO
                },
                return_percentage: if invested > Decimal::ZERO {
                    net_return / invested * Decimal::from(100)
                } else {
                    Decimal::ZERO
                },
            })
        })
        .collect();

    Ok(PortfolioReport {
        total_value,
        total_invested,
        total_return,
        total_return_percentage: total_return / total_invested * Decimal::from(100),
        weighted_apy,
        categories,
        position_count: positions.len(),
    })
}
