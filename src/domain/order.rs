use serde::{Deserialize, Serialize};

/// Opaque reference to a previously tokenized payment method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceToken(pub String);

impl SourceToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier for the billing customer behind a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerRef(pub String);

impl CustomerRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Failed,
}

/// One subscription renewal awaiting settlement.
///
/// The order carries the references the gateway resolves a payment source
/// from. Remediation steps clear those references between failed charge
/// attempts; the retrier marks the order failed once remediations run out.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct RenewalOrder {
    /// The unique identifier for the renewal order.
    pub order: u32,
    /// The billing customer, if one is still attached.
    pub customer: Option<CustomerRef>,
    /// The stored payment source to charge, if one is still attached.
    pub payment_source: Option<SourceToken>,
    pub status: OrderStatus,
    pub failure_reason: Option<String>,
    /// Whether this order belongs to a subscription. Consulted by the outer
    /// payment entry point, never by the retrier itself.
    pub subscription: bool,
}

impl RenewalOrder {
    pub fn new(order: u32) -> Self {
        Self {
            order,
            customer: None,
            payment_source: None,
            status: OrderStatus::Pending,
            failure_reason: None,
            subscription: true,
        }
    }

    pub fn with_customer(mut self, customer: CustomerRef) -> Self {
        self.customer = Some(customer);
        self
    }

    pub fn with_payment_source(mut self, source: SourceToken) -> Self {
        self.payment_source = Some(source);
        self
    }

    /// Drops the stored payment source so the gateway re-resolves one on the
    /// next attempt.
    pub fn clear_payment_source(&mut self) {
        self.payment_source = None;
    }

    /// Drops the stored customer reference.
    pub fn clear_customer(&mut self) {
        self.customer = None;
    }

    pub fn mark_failed(&mut self, reason: String) {
        self.status = OrderStatus::Failed;
        self.failure_reason = Some(reason);
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self.status, OrderStatus::Pending)
    }
}
