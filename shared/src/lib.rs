use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

/// Product colors a buyer can preview. Unrecognized names are treated as
/// pass-through by the transform, so callers parse with `.parse().ok()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ColorOption {
    Black,
    White,
    Gray,
    #[strum(to_string = "brown", serialize = "wood finish")]
    Brown,
    Blue,
    Beige,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum FinishOption {
    Glossy,
    Textured,
    Polished,
    Metallic,
    #[strum(to_string = "matte", serialize = "natural")]
    Matte,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct CheckoutRequest {
    pub user_id: Uuid,
}

/// Per-step outcome of the best-effort writes that follow the order commit.
/// The order itself is already durable when any of these is false.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SideEffects {
    pub earnings_recorded: bool,
    pub sales_counted: bool,
    pub cart_cleared: bool,
}

impl SideEffects {
    pub fn fully_applied(&self) -> bool {
        self.earnings_recorded && self.sales_counted && self.cart_cleared
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: Uuid,
    pub total_cents: i64,
    pub status: String,
    pub side_effects: SideEffects,
}
