use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Produced elsewhere (gear/item tracking); this service only lists them
/// on the notifications view.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ItemNotification {
    pub id: i64,
    pub owner_id: i64,
    pub payload: String,
    pub created_at: DateTime<Utc>,
}
