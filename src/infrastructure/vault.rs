use crate::domain::charge::{ChargeAmount, ChargeConfirmation, ChargeResult};
use crate::domain::order::{CustomerRef, RenewalOrder, SourceToken};
use crate::domain::ports::ChargeGateway;
use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceState {
    Active,
    Revoked,
}

/// The tokenized payment methods known to the gateway.
///
/// Maps each source token to its owning customer and state; a customer's
/// default source is their first active token, in insertion order.
#[derive(Default)]
pub struct TokenVault {
    sources: HashMap<SourceToken, SourceState>,
    defaults: HashMap<CustomerRef, SourceToken>,
}

impl TokenVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_source(&mut self, token: SourceToken, customer: CustomerRef, state: SourceState) {
        if state == SourceState::Active {
            self.defaults.entry(customer).or_insert_with(|| token.clone());
        }
        self.sources.insert(token, state);
    }

    pub fn default_source(&self, customer: &CustomerRef) -> Option<&SourceToken> {
        self.defaults.get(customer)
    }

    pub fn state_of(&self, token: &SourceToken) -> Option<SourceState> {
        self.sources.get(token).copied()
    }
}

/// Charge gateway backed by a [`TokenVault`].
///
/// Source resolution mirrors the recurring-billing gateway it stands in for:
/// the order's own token wins, a missing token falls back to the customer's
/// default, and when neither resolves the attempt declines with "customer not
/// found" rather than reaching for a null charge.
pub struct VaultGateway {
    vault: TokenVault,
    charges: AtomicU64,
}

impl VaultGateway {
    pub fn new(vault: TokenVault) -> Self {
        Self {
            vault,
            charges: AtomicU64::new(0),
        }
    }

    /// Number of approved charges so far.
    pub fn charges_made(&self) -> u64 {
        self.charges.load(Ordering::SeqCst)
    }

    fn resolve(&self, order: &RenewalOrder) -> Option<SourceToken> {
        if let Some(token) = &order.payment_source {
            return Some(token.clone());
        }
        order
            .customer
            .as_ref()
            .and_then(|customer| self.vault.default_source(customer))
            .cloned()
    }
}

#[async_trait]
impl ChargeGateway for VaultGateway {
    async fn charge(&self, order: &RenewalOrder, amount: &ChargeAmount) -> Result<ChargeResult> {
        let Some(token) = self.resolve(order) else {
            return Ok(ChargeResult::declined("customer not found"));
        };

        debug!(
            order = order.order,
            token = token.as_str(),
            amount = %amount.value(),
            "charging resolved payment source"
        );

        match self.vault.state_of(&token) {
            Some(SourceState::Active) => {
                let seq = self.charges.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(ChargeResult::Approved(ChargeConfirmation {
                    transaction_id: format!("txn_{}_{seq}", order.order),
                }))
            }
            Some(SourceState::Revoked) => Ok(ChargeResult::declined(format!(
                "payment source {} revoked",
                token.as_str()
            ))),
            None => Ok(ChargeResult::declined(format!(
                "payment source {} not found",
                token.as_str()
            ))),
        }
    }
}
