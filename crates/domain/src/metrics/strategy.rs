use crate::enums::{RiskTolerance, YieldCategory};
use crate::error::DomainError;
use crate::value_objects::yield_opportunity::YieldOpportunity;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One leg of an allocation plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationLeg {
    pub protocol: String,
    pub asset: String,
    pub category: YieldCategory,
    pub apy: Decimal,
    pub amount: Decimal,
    pub percentage: Decimal,
    pub expected_annual_yield: Decimal,
}

/// Allocation plan across up to three opportunities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldStrategy {
    pub risk_tolerance: RiskTolerance,
    pub total_investment: Decimal,
    pub legs: Vec<AllocationLeg>,
    pub expected_annual_yield: Decimal,
    pub expected_apy: Decimal,
}

/// Splits an investment across up to three opportunities picked by risk
/// appetite.
///
/// Low risk draws from lending and staking, most conservative first;
/// high risk draws from farming and liquidity, highest APY first; medium
/// risk takes the best opportunity per category, highest APY first.
///
/// # Errors
/// Returns `DomainError::Validation` if the amount is not positive.
pub fn optimize_yield_strategy(
    opportunities: &[YieldOpportunity],
    risk_tolerance: RiskTolerance,
    investment_amount: Decimal,
) -> Result<YieldStrategy, DomainError> {
    if investment_amount <= Decimal::ZERO {
        return Err(DomainError::validation(
            "investment amount must be positive",
        ));
    }

    let (mut selected, allocations): (Vec<&YieldOpportunity>, &[Decimal]) = match risk_tolerance {
        RiskTolerance::Low => {
            let mut picks: Vec<&YieldOpportunity> = opportunities
                .iter()
                .filter(|o| {
                    matches!(o.category, YieldCategory::Lending | YieldCategory::Staking)
                })
                .collect();
            picks.sort_by(|a, b| a.apy.cmp(&b.apy));
            (picks, LOW_RISK_SPLIT)
        }
        RiskTolerance::High => {
            let mut picks: Vec<&YieldOpportunity> = opportunities
                .iter()
                .filter(|o| {
                    matches!(o.category, YieldCategory::Farming | YieldCategory::Liquidity)
                })
                .collect();
            picks.sort_by(|a, b| b.apy.cmp(&a.apy));
            (picks, HIGH_RISK_SPLIT)
        }
        RiskTolerance::Medium => {
            // Best opportunity from each category.
            let mut picks: Vec<&YieldOpportunity> = YieldCategory::ALL
                .iter()
                .filter_map(|category| {
                    opportunities
                        .iter()
                        .filter(|o| o.category == *category)
                        .max_by(|a, b| a.apy.cmp(&b.apy))
                })
                .collect();
            picks.sort_by(|a, b| b.apy.cmp(&a.apy));
            (picks, MEDIUM_RISK_SPLIT)
        }
    };
    selected.truncate(3);

    let legs: Vec<AllocationLeg> = selected
        .iter()
        .zip(allocations)
        .map(|(opportunity, share)| {
            let amount = investment_amount * *share;
            AllocationLeg {
                protocol: opportunity.protocol.clone(),
                asset: opportunity.asset.clone(),
                category: opportunity.category,
                apy: opportunity.apy,
                amount,
                percentage: *share * Decimal::from(100),
                expected_annual_yield: amount * opportunity.apy / Decimal::from(100),
            }
        })
        .collect();

    let expected_annual_yield: Decimal =
        legs.iter().map(|leg| leg.expected_annual_yield).sum();

    Ok(YieldStrategy {
        risk_tolerance,
        total_investment: investment_amount,
        legs,
        expected_annual_yield,
        expected_apy: expected_annual_yield / investment_amount * Decimal::from(100),
    })
}

const LOW_RISK_SPLIT: &[Decimal] = &[
    Decimal::from_parts(4, 0, 0, false, 1),
    Decimal::from_parts(3, 0, 0, false, 1),
    Decimal::from_parts(3, 0, 0, false, 1),
];
const HIGH_RISK_SPLIT: &[Decimal] = &[
    Decimal::from_parts(5, 0, 0, false, 1),
    Decimal::from_parts(3, 0, 0, false, 1),
    Decimal::from_parts(2, 0, 0, false, 1),
];
const MEDIUM_RISK_SPLIT: &[Decimal] = &[
    Decimal::from_parts(4, 0, 0, false, 1),
    Decimal::from_parts(4, 0, 0, false, 1),
    Decimal::from_parts(2, 0, 0, false, 1),
];

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn catalog() -> Vec<YieldOpportunity> {
        vec![
            YieldOpportunity::new("Aave", "USDC", dec!(4.2), YieldCategory::Lending),
            YieldOpportunity::new("Compound", "DAI", dec!(3.8), YieldCategory::Lending),
            YieldOpportunity::new("Uniswap", "ETH/USDC", dec!(15.2), YieldCategory::Liquidity),
            YieldOpportunity::new("Ethereum", "ETH", dec!(4.0), YieldCategory::Staking),
            YieldOpportunity::new("Convex", "CRV", dec!(18.7), YieldCategory::Farming),
            YieldOpportunity::new("Yearn", "USDC", dec!(11.2), YieldCategory::Farming),
        ]
    }

    #[test]
    fn test_low_risk_prefers_conservative_picks() {
        let strategy =
            optimize_yield_strategy(&catalog(), RiskTolerance::Low, dec!(10000)).unwrap();
        assert_eq!(strategy.legs.len(), 3);
        // Ascending APY from lending + staking only.
        assert_eq!(strategy.legs[0].protocol, "Compound");
        for leg in &strategy.legs {
            assert!(matches!(
                leg.category,
                YieldCategory::Lending | YieldCategory::Staking
            ));
        }
    }

    #[test]
    fn test_high_risk_chases_apy() {
        let strategy =
            optimize_yield_strategy(&catalog(), RiskTolerance::High, dec!(10000)).unwrap();
        assert_eq!(strategy.legs[0].protocol, "Convex");
        assert_eq!(strategy.legs[0].amount, dec!(5000));
    }

    #[test]
    fn test_medium_risk_takes_best_per_category() {
        let strategy =
            optimize_yield_strategy(&catalog(), RiskTolerance::Medium, dec!(10000)).unwrap();
        // Best per category: Convex 18.7, Uniswap 15.2, Aave 4.2, Ethereum 4.0;
        // top three by APY keep Convex, Uniswap, Aave.
        let protocols: Vec<&str> =
            strategy.legs.iter().map(|l| l.protocol.as_str()).collect();
        assert_eq!(protocols, vec!["Convex", "Uniswap", "Aave"]);
    }

    #[test]
    fn test_allocations_sum_to_investment() {
        let strategy =
            optimize_yield_strategy(&catalog(), RiskTolerance::Medium, dec!(10000)).unwrap();
        let allocated: Decimal = strategy.legs.iter().map(|l| l.amount).sum();
        assert_eq!(allocated, dec!(10000));
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        assert!(optimize_yield_strategy(&catalog(), RiskTolerance::Low, dec!(0)).is_err());
    }
}
