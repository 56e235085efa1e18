use thiserror::Error;

pub type Result<T> = std::result::Result<T, BillingError>;

/// Errors surfaced by the billing library.
///
/// Payment declines are NOT errors: they travel as `ChargeResult::Declined`
/// values through the retrier. Only integration failures (storage faults,
/// misconfiguration, missing orders) take this path.
#[derive(Error, Debug)]
pub enum BillingError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Renewal order {0} not found")]
    OrderNotFound(u32),
    #[error("No handler registered for gateway '{0}'")]
    GatewayNotRegistered(String),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    Storage(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}
