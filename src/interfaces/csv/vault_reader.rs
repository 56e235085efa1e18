use crate::domain::order::{CustomerRef, SourceToken};
use crate::error::Result;
use crate::infrastructure::vault::{SourceState, TokenVault};
use serde::Deserialize;
use std::io::Read;

/// One stored payment source: `token, customer, state`.
#[derive(Debug, Deserialize)]
struct SourceRecord {
    token: String,
    customer: String,
    state: SourceState,
}

/// Loads a [`TokenVault`] from a CSV of stored payment sources.
///
/// Row order matters: a customer's default source is their first active row.
pub struct VaultReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> VaultReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn into_vault(self) -> Result<TokenVault> {
        let mut vault = TokenVault::new();
        for record in self.reader.into_deserialize() {
            let record: SourceRecord = record?;
            vault.add_source(
                SourceToken(record.token),
                CustomerRef(record.customer),
                record.state,
            );
        }
        Ok(vault)
    }
}
