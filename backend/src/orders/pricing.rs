use chrono::Utc;
use uuid::Uuid;

use super::models::{CartLine, EarningsRecord, Order, OrderLine};
use super::service::OrderError;

/// Platform fee retained per sale.
pub const COMMISSION_PERCENT: i64 = 7;

/// Commission in minor units, rounded half up, so that
/// commission + earnings always reconstructs the line total exactly.
pub fn commission_cents(line_total_cents: i64) -> i64 {
    (line_total_cents * COMMISSION_PERCENT + 50) / 100
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub line_total_cents: i64,
    pub commission_cents: i64,
    pub earnings_cents: i64,
}

pub fn price_line(unit_price_cents: i64, quantity: u32) -> PricedLine {
    let line_total_cents = unit_price_cents * quantity as i64;
    let commission = commission_cents(line_total_cents);
    PricedLine {
        line_total_cents,
        commission_cents: commission,
        earnings_cents: line_total_cents - commission,
    }
}

/// Everything checkout needs to persist, built without touching the store.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub order: Order,
    pub lines: Vec<OrderLine>,
    pub earnings: Vec<EarningsRecord>,
}

pub fn draft_order(user_id: Uuid, cart: &[CartLine]) -> Result<OrderDraft, OrderError> {
    if cart.is_empty() {
        return Err(OrderError::EmptyCart);
    }

    let total_cents = cart
        .iter()
        .map(|line| price_line(line.unit_price_cents, line.quantity).line_total_cents)
        .sum();
    let order = Order::new(user_id, total_cents);

    let mut lines = Vec::with_capacity(cart.len());
    let mut earnings = Vec::with_capacity(cart.len());

    for cart_line in cart {
        let priced = price_line(cart_line.unit_price_cents, cart_line.quantity);

        let line = OrderLine {
            id: Uuid::new_v4(),
            order_id: order.id,
            product_id: cart_line.product_id,
            designer_id: cart_line.designer_id,
            quantity: cart_line.quantity,
            unit_price_cents: cart_line.unit_price_cents,
            line_total_cents: priced.line_total_cents,
        };
        earnings.push(EarningsRecord {
            id: Uuid::new_v4(),
            order_id: order.id,
            order_line_id: line.id,
            designer_id: line.designer_id,
            gross_cents: priced.line_total_cents,
            commission_cents: priced.commission_cents,
            net_cents: priced.earnings_cents,
            status: "pending".to_string(),
            created_at: Utc::now(),
        });
        lines.push(line);
    }

    Ok(OrderDraft {
        order,
        lines,
        earnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart_line(unit_price_cents: i64, quantity: u32) -> CartLine {
        CartLine {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            designer_id: Uuid::new_v4(),
            quantity,
            unit_price_cents,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn seven_percent_split_on_round_amounts() {
        // 1000.00 at qty 2
        let priced = price_line(1000_00, 2);
        assert_eq!(priced.line_total_cents, 2000_00);
        assert_eq!(priced.commission_cents, 140_00);
        assert_eq!(priced.earnings_cents, 1860_00);
    }

    #[test]
    fn split_always_reconstructs_line_total() {
        for unit in [1, 99, 3999, 12_345, 1_000_000] {
            for qty in [1, 2, 3, 7] {
                let priced = price_line(unit, qty);
                assert_eq!(
                    priced.commission_cents + priced.earnings_cents,
                    priced.line_total_cents,
                    "unit {unit} qty {qty}"
                );
            }
        }
    }

    #[test]
    fn order_total_sums_all_lines() {
        let user = Uuid::new_v4();
        let cart = vec![cart_line(1000_00, 2), cart_line(49_99, 3)];
        let draft = draft_order(user, &cart).unwrap();

        assert_eq!(draft.order.total_cents, 2000_00 + 3 * 49_99);
        assert_eq!(draft.order.status, "pending");
        assert_eq!(draft.lines.len(), 2);
        assert_eq!(draft.earnings.len(), 2);

        for (line, earning) in draft.lines.iter().zip(&draft.earnings) {
            assert_eq!(earning.order_line_id, line.id);
            assert_eq!(earning.gross_cents, line.line_total_cents);
            assert_eq!(
                earning.commission_cents + earning.net_cents,
                line.line_total_cents
            );
            assert_eq!(earning.status, "pending");
        }
    }

    #[test]
    fn empty_cart_is_rejected() {
        let err = draft_order(Uuid::new_v4(), &[]).unwrap_err();
        assert!(matches!(err, OrderError::EmptyCart));
    }
}
