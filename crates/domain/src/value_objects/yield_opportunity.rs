use crate::enums::YieldCategory;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A protocol/asset pair with an advertised yield.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldOpportunity {
    pub protocol: String,
    pub asset: String,
    pub apy: Decimal,
    pub category: YieldCategory,
}

impl YieldOpportunity {
    #[must_use]
    pub fn new(
        protocol: impl Into<String>,
        asset: impl Into<String>,
        apy: Decimal,
        category: YieldCategory,
    ) -> Self {
        Self {
            protocol: protocol.into(),
            asset: asset.into(),
            apy,
            category,
        }
    }
}
