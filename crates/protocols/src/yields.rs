//! Yield opportunity source.

use crate::error::ProviderError;
use async_trait::async_trait;
use claim_tracker_domain::enums::YieldCategory;
use claim_tracker_domain::value_objects::YieldOpportunity;
use rust_decimal::Decimal;

/// Source of current yield opportunities across protocols.
#[async_trait]
pub trait YieldSource: Send + Sync {
    /// Opportunities grouped under lending, liquidity, staking and farming.
    async fn opportunities(&self) -> Result<Vec<YieldOpportunity>, ProviderError>;
}

/// Curated opportunity table. A placeholder for live aggregator feeds; the
/// numbers are indicative, not quotes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticYieldCatalog;

impl StaticYieldCatalog {
    /// The full table, in category order.
    #[must_use]
    pub fn entries() -> Vec<YieldOpportunity> {
        vec![
            YieldOpportunity::new("Aave", "USDC", Decimal::new(42, 1), YieldCategory::Lending),
            YieldOpportunity::new("Compound", "DAI", Decimal::new(38, 1), YieldCategory::Lending),
            YieldOpportunity::new("Euler", "USDT", Decimal::new(51, 1), YieldCategory::Lending),
            YieldOpportunity::new(
                "Uniswap",
                "ETH/USDC",
                Decimal::new(152, 1),
                YieldCategory::Liquidity,
            ),
            YieldOpportunity::new("Curve", "3pool", Decimal::new(87, 1), YieldCategory::Liquidity),
            YieldOpportunity::new(
                "Balancer",
                "BTC/ETH/USDC",
                Decimal::new(123, 1),
                YieldCategory::Liquidity,
            ),
            YieldOpportunity::new("Ethereum", "ETH", Decimal::new(40, 1), YieldCategory::Staking),
            YieldOpportunity::new("Polygon", "MATIC", Decimal::new(52, 1), YieldCategory::Staking),
            YieldOpportunity::new(
                "Avalanche",
                "AVAX",
                Decimal::new(81, 1),
                YieldCategory::Staking,
            ),
            YieldOpportunity::new("Convex", "CRV", Decimal::new(187, 1), YieldCategory::Farming),
            YieldOpportunity::new("Yearn", "USDC", Decimal::new(112, 1), YieldCategory::Farming),
            YieldOpportunity::new("Harvest", "FARM", Decimal::new(225, 1), YieldCategory::Farming),
        ]
    }
}

#[async_trait]
impl YieldSource for StaticYieldCatalog {
    async fn opportunities(&self) -> Result<Vec<YieldOpportunity>, ProviderError> {
        Ok(Self::entries())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_catalog_covers_all_categories() {
        let entries = StaticYieldCatalog::entries();
        assert_eq!(entries.len(), 12);
        for category in YieldCategory::ALL {
            assert_eq!(
                entries.iter().filter(|o| o.category == category).count(),
                3,
                "{category} should carry three entries"
            );
        }
    }

    #[test]
    fn test_catalog_sample_entry() {
        let entries = StaticYieldCatalog::entries();
        let harvest = entries
            .iter()
            .find(|o| o.protocol == "Harvest")
            .unwrap();
        assert_eq!(harvest.asset, "FARM");
        assert_eq!(harvest.apy, dec!(22.5));
    }
}
