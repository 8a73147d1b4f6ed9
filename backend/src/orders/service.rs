use shared::{OrderReceipt, SideEffects};
use uuid::Uuid;

use crate::db::marketplace_repository::{MarketplaceRepository, RepositoryError};
use super::models::{Order, OrderLine};
use super::pricing;

#[derive(Clone)]
pub struct OrderService {
    repo: MarketplaceRepository,
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl OrderService {
    pub fn new(repo: MarketplaceRepository) -> Self {
        Self { repo }
    }

    /// Convert the user's cart into an order. The header and its lines must
    /// commit; the earnings records, product sales counters and cart cleanup
    /// are best-effort — a failure there is logged, reported through
    /// `SideEffects`, and does not fail the checkout.
    pub async fn checkout(&self, user_id: Uuid) -> Result<OrderReceipt, OrderError> {
        let cart = self.repo.get_cart_lines(user_id).await?;
        let draft = pricing::draft_order(user_id, &cart)?;

        self.repo.put_order(&draft.order).await?;
        self.repo.put_order_lines(&draft.lines).await?;

        let earnings_recorded = match self.repo.put_earnings(&draft.earnings).await {
            Ok(()) => true,
            Err(e) => {
                log::error!(
                    "failed to record designer earnings for order {}: {e}",
                    draft.order.id
                );
                false
            }
        };

        let mut sales_counted = true;
        for line in &draft.lines {
            if let Err(e) = self
                .repo
                .increment_product_sales(line.product_id, line.quantity)
                .await
            {
                log::error!(
                    "failed to increment sales counter for product {}: {e}",
                    line.product_id
                );
                sales_counted = false;
            }
        }

        let cart_cleared = match self.repo.clear_cart(user_id).await {
            Ok(()) => true,
            Err(e) => {
                log::error!("failed to clear cart for user {user_id}: {e}");
                false
            }
        };

        let side_effects = SideEffects {
            earnings_recorded,
            sales_counted,
            cart_cleared,
        };
        if !side_effects.fully_applied() {
            log::warn!(
                "order {} committed with partial side-effects: {side_effects:?}",
                draft.order.id
            );
        }

        Ok(OrderReceipt {
            order_id: draft.order.id,
            total_cents: draft.order.total_cents,
            status: draft.order.status.clone(),
            side_effects,
        })
    }

    pub async fn order_with_lines(
        &self,
        order_id: Uuid,
    ) -> Result<Option<(Order, Vec<OrderLine>)>, OrderError> {
        let Some(order) = self.repo.get_order(order_id).await? else {
            return Ok(None);
        };
        let lines = self.repo.get_order_lines(order_id).await?;
        Ok(Some((order, lines)))
    }
}
