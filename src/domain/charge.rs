use crate::error::BillingError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An ISO-4217 style currency code: exactly three ASCII letters, stored
/// uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: &str) -> Result<Self, BillingError> {
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code.to_ascii_uppercase()))
        } else {
            Err(BillingError::Validation(format!(
                "Invalid currency code '{code}'"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for CurrencyCode {
    type Error = BillingError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A positive monetary amount in a given currency, as due for one renewal.
///
/// Wraps `rust_decimal::Decimal` so that a non-positive charge can never be
/// handed to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeAmount {
    value: Decimal,
    currency: CurrencyCode,
}

impl ChargeAmount {
    pub fn new(value: Decimal, currency: CurrencyCode) -> Result<Self, BillingError> {
        if value > Decimal::ZERO {
            Ok(Self { value, currency })
        } else {
            Err(BillingError::Validation(
                "Charge amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }
}

/// Opaque proof of a settled charge, as issued by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeConfirmation {
    pub transaction_id: String,
}

/// Outcome of one charge attempt.
///
/// A decline is domain data, not an error: the retrier reacts to it with
/// remediation, while transport and configuration faults propagate as
/// `BillingError`.
#[derive(Debug, Clone, PartialEq)]
pub enum ChargeResult {
    Approved(ChargeConfirmation),
    Declined { reason: String },
}

impl ChargeResult {
    pub fn declined(reason: impl Into<String>) -> Self {
        Self::Declined {
            reason: reason.into(),
        }
    }
}
