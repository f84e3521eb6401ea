pub mod event;
pub mod gas;
pub mod yield_opportunity;

pub use event::{EventRef, EventSpec};
pub use gas::{GasPrices, GasSample};
pub use yield_opportunity::YieldOpportunity;
