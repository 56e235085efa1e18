use crate::domain::order::RenewalOrder;
use std::collections::VecDeque;

/// A corrective mutation applied to stale order data between failed charge
/// attempts, forcing the gateway to re-resolve a payment source on retry.
///
/// The set is closed and the order is fixed: sources are dropped before the
/// customer reference, and nothing runs twice within one retry cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemediationStep {
    ClearPaymentSource,
    ClearCustomer,
}

impl RemediationStep {
    /// The remediation queue for one renewal retry cycle, front first.
    pub fn renewal_sequence() -> VecDeque<RemediationStep> {
        VecDeque::from([
            RemediationStep::ClearPaymentSource,
            RemediationStep::ClearCustomer,
        ])
    }

    /// Mutates the order's stored references only. Never attempts a charge.
    pub fn apply(&self, order: &mut RenewalOrder) {
        match self {
            RemediationStep::ClearPaymentSource => order.clear_payment_source(),
            RemediationStep::ClearCustomer => order.clear_customer(),
        }
    }
}
