use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A line in a user's cart. Converted 1:1 into an order line at checkout and
/// deleted afterwards. `unit_price_cents` is the designer-set price in minor
/// currency units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub designer_id: Uuid,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_cents: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Immutable once written; there is no update path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub designer_id: Uuid,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarningsRecord {
    pub id: Uuid,
    pub order_id: Uuid,
    pub order_line_id: Uuid,
    pub designer_id: Uuid,
    pub gross_cents: i64,
    pub commission_cents: i64,
    pub net_cents: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(user_id: Uuid, total_cents: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            total_cents,
            status: "pending".to_string(),
            created_at: Utc::now(),
        }
    }
}
