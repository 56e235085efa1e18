use recurpay::domain::charge::{ChargeAmount, ChargeResult, CurrencyCode};
use recurpay::domain::order::RenewalOrder;
use recurpay::domain::ports::ChargeGateway;
use recurpay::error::Result;
use rust_decimal::Decimal;
use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Gateway wrapper letting a test keep a handle on the gateway an engine owns
/// through its boxed port.
pub struct SharedGateway<G>(pub Arc<G>);

#[async_trait::async_trait]
impl<G: ChargeGateway> ChargeGateway for SharedGateway<G> {
    async fn charge(&self, order: &RenewalOrder, amount: &ChargeAmount) -> Result<ChargeResult> {
        self.0.charge(order, amount).await
    }
}

pub fn usd(amount: &str) -> ChargeAmount {
    ChargeAmount::new(
        Decimal::from_str(amount).unwrap(),
        CurrencyCode::new("USD").unwrap(),
    )
    .unwrap()
}

/// Writes a renewals CSV with the standard header. Rows are raw CSV lines.
pub fn renewals_csv(rows: &[&str]) -> NamedTempFile {
    csv_file("order, customer, source, amount, currency", rows)
}

/// Writes a vault CSV with the standard header. Rows are raw CSV lines.
pub fn vault_csv(rows: &[&str]) -> NamedTempFile {
    csv_file("token, customer, state", rows)
}

fn csv_file(header: &str, rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{header}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file.flush().unwrap();
    file
}
