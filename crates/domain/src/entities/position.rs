use crate::entities::user::UserId;
use crate::entities::wallet::WalletId;
use crate::enums::{PositionStatus, PositionType};
use crate::value_objects::event::EventRef;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionId(pub i64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub user_id: UserId,
    pub wallet_id: Option<WalletId>,

    pub protocol: String,
    pub asset: String,
    pub amount: Decimal,
    pub position_type: PositionType,
    pub apy: Option<Decimal>,

    pub status: PositionStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,

    // Owned by the calendar reconciler; at most one live reference at a time.
    pub calendar_event_ref: Option<EventRef>,
}

impl Position {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == PositionStatus::Active
    }
}
