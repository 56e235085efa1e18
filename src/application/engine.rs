use crate::application::dispatcher::ScheduledPaymentHandler;
use crate::domain::charge::{ChargeAmount, ChargeResult};
use crate::domain::ports::{ChargeGatewayBox, OrderStoreBox};
use crate::domain::remediation::RemediationStep;
use crate::error::{BillingError, Result};
use async_trait::async_trait;
use tracing::{info, warn};

/// The recurring charge retrier.
///
/// Given a due renewal, `RenewalEngine` attempts a charge through the gateway
/// port. A decline triggers the next remediation step from the fixed sequence
/// (clear payment source, then clear customer reference) followed by a retry;
/// once the sequence is exhausted the order is marked failed with the last
/// decline reason. A renewal therefore sees at most three attempts, strictly
/// serialized — retrying a payment processor concurrently for the same order
/// risks a double charge.
pub struct RenewalEngine {
    order_store: OrderStoreBox,
    gateway: ChargeGatewayBox,
}

impl RenewalEngine {
    pub fn new(order_store: OrderStoreBox, gateway: ChargeGatewayBox) -> Self {
        Self {
            order_store,
            gateway,
        }
    }

    /// Charges one renewal, remediating and retrying on declines.
    ///
    /// Declines are absorbed into order state; `Err` means an integration
    /// failure (missing order, storage fault, gateway transport fault) and
    /// carries no payment-domain meaning. Callers must not invoke this twice
    /// concurrently for the same order; the dispatcher enforces at-most-once
    /// delivery per renewal.
    pub async fn charge_renewal_with_retry(
        &self,
        amount: ChargeAmount,
        order_id: u32,
    ) -> Result<()> {
        let mut order = self
            .order_store
            .get(order_id)
            .await?
            .ok_or(BillingError::OrderNotFound(order_id))?;

        info!(
            order = order.order,
            amount = %amount.value(),
            currency = amount.currency().as_str(),
            "processing scheduled renewal payment"
        );

        let mut remediations = RemediationStep::renewal_sequence();

        loop {
            match self.gateway.charge(&order, &amount).await? {
                ChargeResult::Approved(confirmation) => {
                    info!(
                        order = order.order,
                        transaction = %confirmation.transaction_id,
                        "renewal charge approved"
                    );
                    return Ok(());
                }
                ChargeResult::Declined { reason } => match remediations.pop_front() {
                    Some(step) => {
                        warn!(
                            order = order.order,
                            %reason,
                            ?step,
                            "renewal charge declined, remediating before retry"
                        );
                        step.apply(&mut order);
                        self.order_store.store(order.clone()).await?;
                    }
                    None => {
                        warn!(order = order.order, %reason, "renewal charge failed");
                        order.mark_failed(format!("Gateway transaction failed ({reason})"));
                        self.order_store.store(order).await?;
                        return Ok(());
                    }
                },
            }
        }
    }

    /// Whether the stored order exists and belongs to a subscription.
    ///
    /// The outer payment entry point uses this to decide if a checkout should
    /// go through the subscription path at all; the retrier never consults it.
    pub async fn handles_order(&self, order_id: u32) -> Result<bool> {
        Ok(self
            .order_store
            .get(order_id)
            .await?
            .map(|order| order.subscription)
            .unwrap_or(false))
    }
}

#[async_trait]
impl ScheduledPaymentHandler for RenewalEngine {
    async fn scheduled_payment(&self, amount: ChargeAmount, order_id: u32) -> Result<()> {
        self.charge_renewal_with_retry(amount, order_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::charge::{ChargeConfirmation, CurrencyCode};
    use crate::domain::order::{CustomerRef, OrderStatus, RenewalOrder, SourceToken};
    use crate::domain::ports::{ChargeGateway, OrderStore};
    use crate::infrastructure::in_memory::InMemoryOrderStore;
    use rust_decimal_macros::dec;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays a fixed script of charge results and records the order state
    /// seen at each attempt.
    struct ScriptedGateway {
        script: Mutex<VecDeque<ChargeResult>>,
        seen: Mutex<Vec<RenewalOrder>>,
    }

    impl ScriptedGateway {
        fn new(script: Vec<ChargeResult>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn approved() -> ChargeResult {
            ChargeResult::Approved(ChargeConfirmation {
                transaction_id: "txn_test".to_string(),
            })
        }
    }

    #[async_trait]
    impl ChargeGateway for ScriptedGateway {
        async fn charge(
            &self,
            order: &RenewalOrder,
            _amount: &ChargeAmount,
        ) -> Result<ChargeResult> {
            self.seen.lock().unwrap().push(order.clone());
            Ok(self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .expect("gateway called more times than scripted"))
        }
    }

    fn amount() -> ChargeAmount {
        ChargeAmount::new(dec!(10.00), CurrencyCode::new("USD").unwrap()).unwrap()
    }

    fn seeded_order() -> RenewalOrder {
        RenewalOrder::new(55)
            .with_customer(CustomerRef("C1".into()))
            .with_payment_source(SourceToken("S1".into()))
    }

    async fn engine_with(
        script: Vec<ChargeResult>,
    ) -> (RenewalEngine, InMemoryOrderStore, std::sync::Arc<ScriptedGateway>) {
        let store = InMemoryOrderStore::new();
        store.store(seeded_order()).await.unwrap();
        let gateway = std::sync::Arc::new(ScriptedGateway::new(script));
        let engine = RenewalEngine::new(
            Box::new(store.clone()),
            Box::new(SharedGateway(gateway.clone())),
        );
        (engine, store, gateway)
    }

    /// Lets the test keep a handle on the scripted gateway the engine owns.
    struct SharedGateway(std::sync::Arc<ScriptedGateway>);

    #[async_trait]
    impl ChargeGateway for SharedGateway {
        async fn charge(
            &self,
            order: &RenewalOrder,
            amount: &ChargeAmount,
        ) -> Result<ChargeResult> {
            self.0.charge(order, amount).await
        }
    }

    #[tokio::test]
    async fn test_first_attempt_approved_leaves_order_untouched() {
        let (engine, store, gateway) = engine_with(vec![ScriptedGateway::approved()]).await;

        engine
            .charge_renewal_with_retry(amount(), 55)
            .await
            .unwrap();

        let order = store.get(55).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_source, Some(SourceToken("S1".into())));
        assert_eq!(order.customer, Some(CustomerRef("C1".into())));
        assert_eq!(gateway.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_second_attempt_approved_after_source_cleared() {
        let (engine, store, gateway) = engine_with(vec![
            ChargeResult::declined("card_declined"),
            ScriptedGateway::approved(),
        ])
        .await;

        engine
            .charge_renewal_with_retry(amount(), 55)
            .await
            .unwrap();

        let order = store.get(55).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.payment_source.is_none());
        assert_eq!(order.customer, Some(CustomerRef("C1".into())));

        // Second attempt must have seen the cleared source.
        let seen = gateway.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[1].payment_source.is_none());
        assert!(seen[1].customer.is_some());
    }

    #[tokio::test]
    async fn test_success_after_both_remediations() {
        let (engine, store, gateway) = engine_with(vec![
            ChargeResult::declined("card_declined"),
            ChargeResult::declined("no_source"),
            ScriptedGateway::approved(),
        ])
        .await;

        engine
            .charge_renewal_with_retry(amount(), 55)
            .await
            .unwrap();

        let order = store.get(55).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.payment_source.is_none());
        assert!(order.customer.is_none());
        assert!(order.failure_reason.is_none());
        assert_eq!(gateway.seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_remediations_mark_order_failed() {
        let (engine, store, gateway) = engine_with(vec![
            ChargeResult::declined("card_declined"),
            ChargeResult::declined("no_source"),
            ChargeResult::declined("no_customer"),
        ])
        .await;

        engine
            .charge_renewal_with_retry(amount(), 55)
            .await
            .unwrap();

        let order = store.get(55).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Failed);
        assert!(
            order
                .failure_reason
                .as_deref()
                .unwrap()
                .contains("no_customer")
        );

        // Remediations ran in order: source cleared before customer.
        let seen = gateway.seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen[0].payment_source.is_some() && seen[0].customer.is_some());
        assert!(seen[1].payment_source.is_none() && seen[1].customer.is_some());
        assert!(seen[2].payment_source.is_none() && seen[2].customer.is_none());
    }

    #[tokio::test]
    async fn test_missing_order_is_an_integration_error() {
        let store = InMemoryOrderStore::new();
        let gateway = ScriptedGateway::new(vec![]);
        let engine = RenewalEngine::new(Box::new(store), Box::new(gateway));

        let result = engine.charge_renewal_with_retry(amount(), 404).await;
        assert!(matches!(result, Err(BillingError::OrderNotFound(404))));
    }

    #[tokio::test]
    async fn test_handles_order_checks_subscription_flag() {
        let store = InMemoryOrderStore::new();
        let mut one_shot = RenewalOrder::new(2);
        one_shot.subscription = false;
        store.store(RenewalOrder::new(1)).await.unwrap();
        store.store(one_shot).await.unwrap();

        let engine = RenewalEngine::new(Box::new(store), Box::new(ScriptedGateway::new(vec![])));

        assert!(engine.handles_order(1).await.unwrap());
        assert!(!engine.handles_order(2).await.unwrap());
        assert!(!engine.handles_order(3).await.unwrap());
    }
}
