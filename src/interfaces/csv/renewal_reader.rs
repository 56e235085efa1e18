use crate::domain::charge::{ChargeAmount, CurrencyCode};
use crate::domain::order::{CustomerRef, RenewalOrder, SourceToken};
use crate::error::{BillingError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One row of the due-renewals CSV. Empty `customer`/`source` fields mean the
/// order carries no such reference.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct RenewalRecord {
    pub order: u32,
    pub customer: Option<String>,
    pub source: Option<String>,
    pub amount: Decimal,
    pub currency: String,
}

/// A due renewal: the order to settle plus the amount to charge for it.
#[derive(Debug, PartialEq, Clone)]
pub struct RenewalEvent {
    pub order: RenewalOrder,
    pub amount: ChargeAmount,
}

impl TryFrom<RenewalRecord> for RenewalEvent {
    type Error = BillingError;

    fn try_from(record: RenewalRecord) -> Result<Self> {
        let currency = CurrencyCode::new(&record.currency)?;
        let amount = ChargeAmount::new(record.amount, currency)?;

        let mut order = RenewalOrder::new(record.order);
        if let Some(customer) = record.customer {
            order = order.with_customer(CustomerRef(customer));
        }
        if let Some(source) = record.source {
            order = order.with_payment_source(SourceToken(source));
        }

        Ok(Self { order, amount })
    }
}

/// Reads due renewals from a CSV source.
///
/// Wraps `csv::Reader` and yields `Result<RenewalEvent>` lazily, so a large
/// renewal batch streams without loading the whole file. Whitespace is trimmed
/// and record lengths are flexible.
pub struct RenewalReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> RenewalReader<R> {
    /// Creates a new `RenewalReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads, deserializes and validates
    /// renewal rows.
    pub fn renewals(self) -> impl Iterator<Item = Result<RenewalEvent>> {
        self.reader
            .into_deserialize()
            .map(|result: std::result::Result<RenewalRecord, csv::Error>| {
                result.map_err(BillingError::from).and_then(RenewalEvent::try_from)
            })
    }
}
