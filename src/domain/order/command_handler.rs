use serde::Serialize;
use std::sync::Arc;

use crate::store::{Store, StoreError};

use super::commands::OrderCommand;
use super::value_objects::OrderStatus;

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Command → Status transition → Store → Confirmation message
//
// Cancellation is unconditional. Canceling an order that is already canceled
// (or issued) rewrites the same status and succeeds. Concurrent cancels are
// last-write-wins at the store.
//
// ============================================================================

/// What staff sees after a command ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandOutcome {
    pub message: String,
    pub updated: u64,
}

pub struct OrderCommandHandler {
    store: Arc<dyn Store>,
}

impl OrderCommandHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, command: OrderCommand) -> Result<CommandOutcome, StoreError> {
        match command {
            OrderCommand::CancelOrder { order_id } => self.cancel_order(order_id).await,
            OrderCommand::CancelOrders { order_ids } => self.cancel_orders(order_ids).await,
        }
    }

    async fn cancel_order(&self, order_id: i64) -> Result<CommandOutcome, StoreError> {
        let previous = self.store.get_order(order_id).await?.status;

        let updated = self
            .store
            .set_order_status(&[order_id], previous.cancel())
            .await?;
        if updated == 0 {
            // Deleted between the lookup and the update.
            return Err(StoreError::not_found("order", order_id));
        }

        tracing::info!(
            order_id = order_id,
            previous_status = %previous,
            "Order canceled"
        );

        Ok(CommandOutcome {
            message: format!("Order #{} canceled", order_id),
            updated,
        })
    }

    async fn cancel_orders(&self, mut order_ids: Vec<i64>) -> Result<CommandOutcome, StoreError> {
        order_ids.sort_unstable();
        order_ids.dedup();

        let updated = if order_ids.is_empty() {
            0
        } else {
            self.store
                .set_order_status(&order_ids, OrderStatus::Canceled)
                .await?
        };

        tracing::info!(
            requested = order_ids.len(),
            updated = updated,
            "Bulk order cancellation finished"
        );

        let message = match updated {
            1 => "1 order canceled".to_string(),
            n => format!("{} orders canceled", n),
        };

        Ok(CommandOutcome {
            message,
            updated,
        })
    }
}
