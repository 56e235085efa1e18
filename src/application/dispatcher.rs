use crate::domain::charge::ChargeAmount;
use crate::error::{BillingError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

/// Handler for a scheduled renewal payment event.
#[async_trait]
pub trait ScheduledPaymentHandler: Send + Sync {
    async fn scheduled_payment(&self, amount: ChargeAmount, order_id: u32) -> Result<()>;
}

/// Routes scheduled renewal events to the handler registered for a gateway.
///
/// Handlers register explicitly under their gateway id; events name the id
/// they target. The dispatcher also owns renewal idempotency: an order id is
/// delivered at most once, so a duplicate event from the scheduler can never
/// reach the retrier (which is not re-entrant per order and must not charge a
/// settled renewal again).
pub struct ScheduledPaymentDispatcher {
    handlers: HashMap<String, Arc<dyn ScheduledPaymentHandler>>,
    delivered: Mutex<HashSet<u32>>,
}

impl ScheduledPaymentDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            delivered: Mutex::new(HashSet::new()),
        }
    }

    pub fn register(&mut self, gateway_id: &str, handler: Arc<dyn ScheduledPaymentHandler>) {
        self.handlers.insert(gateway_id.to_string(), handler);
    }

    /// Delivers one renewal event to the gateway's handler.
    ///
    /// An unknown gateway id is an integration error. A duplicate order id is
    /// dropped with a warning and reported as success: the first delivery
    /// already owns the renewal's outcome.
    pub async fn dispatch(
        &self,
        gateway_id: &str,
        amount: ChargeAmount,
        order_id: u32,
    ) -> Result<()> {
        let handler = self
            .handlers
            .get(gateway_id)
            .ok_or_else(|| BillingError::GatewayNotRegistered(gateway_id.to_string()))?;

        {
            let mut delivered = self.delivered.lock().await;
            if !delivered.insert(order_id) {
                warn!(order = order_id, "duplicate renewal event dropped");
                return Ok(());
            }
        }

        handler.scheduled_payment(amount, order_id).await
    }
}

impl Default for ScheduledPaymentDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
