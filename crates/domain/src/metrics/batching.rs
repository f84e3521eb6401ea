use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Base cost of a standalone transfer.
pub const BASE_TX_GAS: u64 = 21_000;
/// Modeled per-call overhead inside a batched transaction.
pub const BATCH_CALL_GAS: u64 = 2_000;

/// A transaction a user intends to send, as input to batch planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedTransaction {
    pub to: String,
    /// Gas limit; `BASE_TX_GAS` assumed when unknown.
    pub gas: Option<u64>,
}

impl PlannedTransaction {
    #[must_use]
    pub fn to(recipient: impl Into<String>) -> Self {
        Self {
            to: recipient.into(),
            gas: None,
        }
    }
}

/// Per-recipient grouping in a batch plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchGroup {
    pub recipient: String,
    pub transactions: usize,
    /// Modeled cost of the batched call for this group.
    pub modeled_gas: u64,
}

/// Outcome of batch planning, distinguishing "nothing to gain" from a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BatchPlan {
    /// Fewer than two transactions, or no recipient repeats.
    NotBatchable { reason: String },
    /// Grouped plan with modeled gas savings.
    Batchable {
        groups: Vec<BatchGroup>,
        total_transactions: usize,
        batchable_transactions: usize,
        total_gas: u64,
        batched_gas: u64,
        savings_gas: i64,
        savings_pct: Decimal,
        message: String,
    },
}

impl BatchPlan {
    #[must_use]
    pub fn can_batch(&self) -> bool {
        matches!(self, Self::Batchable { .. })
    }
}

/// Groups planned transactions by recipient and models the gas saved by
/// batching repeated recipients into one call each.
///
/// Cost model: a batched group costs `BASE_TX_GAS + BATCH_CALL_GAS * count`;
/// transactions without a repeated recipient still cost `BASE_TX_GAS` each.
#[must_use]
pub fn suggest_batching(transactions: &[PlannedTransaction]) -> BatchPlan {
    if transactions.len() < 2 {
        return BatchPlan::NotBatchable {
            reason: "Need at least 2 transactions to batch".to_string(),
        };
    }

    // Group by recipient, preserving first-seen order.
    let mut grouped: Vec<(&str, usize)> = Vec::new();
    for tx in transactions {
        match grouped.iter_mut().find(|(to, _)| *to == tx.to) {
            Some((_, count)) => *count += 1,
            None => grouped.push((tx.to.as_str(), 1)),
        }
    }

    let batchable: Vec<&(&str, usize)> =
        grouped.iter().filter(|(_, count)| *count > 1).collect();
    if batchable.is_empty() {
        return BatchPlan::NotBatchable {
            reason: "No transactions can be batched (different recipients)".to_string(),
        };
    }

    let total_gas: u64 = transactions
        .iter()
        .map(|tx| tx.gas.unwrap_or(BASE_TX_GAS))
        .sum();

    let groups: Vec<BatchGroup> = batchable
        .iter()
        .map(|(recipient, count)| BatchGroup {
            recipient: (*recipient).to_string(),
            transactions: *count,
            modeled_gas: BASE_TX_GAS + BATCH_CALL_GAS * *count as u64,
        })
        .collect();

    let non_batchable_count = grouped.iter().filter(|(_, count)| *count == 1).count();
    let batched_gas: u64 = groups.iter().map(|g| g.modeled_gas).sum::<u64>()
        + non_batchable_count as u64 * BASE_TX_GAS;

    let savings_gas = total_gas as i64 - batched_gas as i64;
    let savings_pct = if total_gas > 0 {
        Decimal::from(savings_gas) / Decimal::from(total_gas) * Decimal::from(100)
    } else {
        Decimal::ZERO
    };

    let batchable_transactions: usize = groups.iter().map(|g| g.transactions).sum();
    let message = format!(
        "You can batch {batchable_transactions} transactions, saving approximately \
         {savings_pct:.1}% in gas"
    );

    BatchPlan::Batchable {
        groups,
        total_transactions: transactions.len(),
        batchable_transactions,
        total_gas,
        batched_gas,
        savings_gas,
        savings_pct,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_repeated_recipient_is_batchable() {
        let txs = [
            PlannedTransaction::to("0xA"),
            PlannedTransaction::to("0xA"),
            PlannedTransaction::to("0xB"),
        ];
        let plan = suggest_batching(&txs);
        assert!(plan.can_batch());

        if let BatchPlan::Batchable {
            groups,
            batchable_transactions,
            total_gas,
            batched_gas,
            savings_pct,
            ..
        } = plan
        {
            assert_eq!(groups.len(), 1);
            assert_eq!(groups[0].recipient, "0xA");
            assert_eq!(groups[0].transactions, 2);
            assert_eq!(batchable_transactions, 2);
            // 3 * 21000 ungrouped vs (21000 + 2*2000) + 21000
            assert_eq!(total_gas, 63_000);
            assert_eq!(batched_gas, 46_000);
            assert!(savings_pct > dec!(0) && savings_pct < dec!(100));
        }
    }

    #[test]
    fn test_single_transaction_not_batchable() {
        let plan = suggest_batching(&[PlannedTransaction::to("0xA")]);
        assert!(!plan.can_batch());
    }

    #[test]
    fn test_distinct_recipients_not_batchable() {
        let txs = [PlannedTransaction::to("0xA"), PlannedTransaction::to("0xB")];
        let plan = suggest_batching(&txs);
        assert!(matches!(plan, BatchPlan::NotBatchable { .. }));
    }
}
