use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Reference ETH price used when no price source is wired in.
pub const REFERENCE_ETH_PRICE_USD: u64 = 3000;

const GWEI_PER_ETH: u64 = 1_000_000_000;

/// Cost of a transaction at a given gas price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxCost {
    pub eth: Decimal,
    pub usd: Decimal,
}

/// Converts a gas limit and gwei price into ETH and USD cost.
#[must_use]
pub fn estimate_transaction_cost(
    gas_limit: u64,
    gas_price_gwei: u64,
    eth_price_usd: Decimal,
) -> TxCost {
    let eth = Decimal::from(gas_limit) * Decimal::from(gas_price_gwei)
        / Decimal::from(GWEI_PER_ETH);
    TxCost {
        eth,
        usd: eth * eth_price_usd,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_simple_transfer_cost() {
        // 21000 gas at 50 gwei = 0.00105 ETH; $3.15 at $3000/ETH.
        let cost = estimate_transaction_cost(21_000, 50, dec!(3000));
        assert_eq!(cost.eth, dec!(0.00105));
        assert_eq!(cost.usd, dec!(3.15));
    }

    #[test]
    fn test_zero_gas_price() {
        let cost = estimate_transaction_cost(21_000, 0, dec!(3000));
        assert_eq!(cost.eth, dec!(0));
        assert_eq!(cost.usd, dec!(0));
    }
}
