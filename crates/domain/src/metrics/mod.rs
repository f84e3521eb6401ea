pub mod batching;
pub mod gas_hour;
pub mod impermanent_loss;
pub mod portfolio;
pub mod strategy;
pub mod tx_cost;

pub use batching::{suggest_batching, BatchGroup, BatchPlan, PlannedTransaction};
pub use gas_hour::{
    optimal_gas_hour, recommend_gas_strategy, Confidence, GasHourEstimate, GasRecommendation,
};
pub use impermanent_loss::{impermanent_loss, ImpermanentLossReport};
pub use portfolio::{portfolio_performance, CategoryPerformance, PortfolioReport, PositionSnapshot};
pub use strategy::{optimize_yield_strategy, AllocationLeg, YieldStrategy};
pub use tx_cost::{estimate_transaction_cost, TxCost};
