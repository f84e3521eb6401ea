use crate::entities::user::UserId;
use crate::enums::AlertKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertId(pub i64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub user_id: UserId,

    pub kind: AlertKind,
    pub parameters: String,
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}
