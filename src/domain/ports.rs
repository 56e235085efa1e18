use crate::domain::charge::{ChargeAmount, ChargeResult};
use crate::domain::order::RenewalOrder;
use crate::error::Result;
use async_trait::async_trait;

pub type OrderStoreBox = Box<dyn OrderStore>;
pub type ChargeGatewayBox = Box<dyn ChargeGateway>;

/// Persistence port for renewal orders.
///
/// Remediation mutations and final failure marking are written back through
/// this port, so a persistent backend observes every state the retrier left
/// an order in.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn store(&self, order: RenewalOrder) -> Result<()>;
    async fn get(&self, order_id: u32) -> Result<Option<RenewalOrder>>;
    async fn get_all(&self) -> Result<Vec<RenewalOrder>>;
}

/// The payment-request collaborator.
///
/// Owns source resolution, request construction and transport. Implementations
/// must resolve "no usable payment source at all" to a `Declined` result with
/// an explicit reason, never attempt a null charge. `Err` is reserved for
/// transport and configuration faults.
#[async_trait]
pub trait ChargeGateway: Send + Sync {
    async fn charge(&self, order: &RenewalOrder, amount: &ChargeAmount) -> Result<ChargeResult>;
}
