pub mod user;
pub mod wallet;
pub mod position;
pub mod alert;

// Re-export for easier access
pub use user::{User, UserId};
pub use wallet::{Wallet, WalletId};
pub use position::{Position, PositionId};
pub use alert::{Alert, AlertId};
