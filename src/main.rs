use clap::Parser;
use miette::{IntoDiagnostic, Result};
use recurpay::application::dispatcher::ScheduledPaymentDispatcher;
use recurpay::application::engine::RenewalEngine;
use recurpay::domain::ports::OrderStoreBox;
use recurpay::infrastructure::in_memory::InMemoryOrderStore;
#[cfg(feature = "storage-rocksdb")]
use recurpay::infrastructure::rocksdb::RocksDbOrderStore;
use recurpay::infrastructure::vault::VaultGateway;
use recurpay::interfaces::csv::order_writer::OrderWriter;
use recurpay::interfaces::csv::renewal_reader::{RenewalEvent, RenewalReader};
use recurpay::interfaces::csv::vault_reader::VaultReader;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

/// Gateway id this binary registers its renewal handler under.
const GATEWAY_ID: &str = "recurpay";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input due-renewals CSV file
    renewals: PathBuf,

    /// CSV of stored payment sources backing the gateway vault
    #[arg(long)]
    vault: PathBuf,

    /// Path to persistent order database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

/// Opens two handles on the same order store: one for the engine to own, one
/// for the binary to seed and dump.
fn open_order_store(db_path: Option<PathBuf>) -> Result<(OrderStoreBox, OrderStoreBox)> {
    #[cfg(feature = "storage-rocksdb")]
    if let Some(db_path) = db_path {
        let store = RocksDbOrderStore::open(db_path).into_diagnostic()?;
        return Ok((Box::new(store.clone()), Box::new(store)));
    }

    #[cfg(not(feature = "storage-rocksdb"))]
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }

    let store = InMemoryOrderStore::new();
    Ok((Box::new(store.clone()), Box::new(store)))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let (engine_store, order_store) = open_order_store(cli.db_path)?;

    let vault_file = File::open(cli.vault).into_diagnostic()?;
    let vault = VaultReader::new(vault_file).into_vault().into_diagnostic()?;
    let gateway = VaultGateway::new(vault);

    let engine = Arc::new(RenewalEngine::new(engine_store, Box::new(gateway)));
    let mut dispatcher = ScheduledPaymentDispatcher::new();
    dispatcher.register(GATEWAY_ID, engine);

    // Process due renewals
    let file = File::open(cli.renewals).into_diagnostic()?;
    for event in RenewalReader::new(file).renewals() {
        match event {
            Ok(RenewalEvent { order, amount }) => {
                let order_id = order.order;

                // A renewal already settled in the store (e.g. by a previous
                // run against the same database) must not be charged again.
                let settled = order_store
                    .get(order_id)
                    .await
                    .into_diagnostic()?
                    .is_some_and(|existing| existing.is_settled());
                if settled {
                    eprintln!("Skipping renewal for settled order {order_id}");
                    continue;
                }

                order_store.store(order).await.into_diagnostic()?;
                if let Err(e) = dispatcher.dispatch(GATEWAY_ID, amount, order_id).await {
                    eprintln!("Error processing renewal: {e}");
                }
            }
            Err(e) => {
                eprintln!("Error reading renewal: {e}");
            }
        }
    }

    // Output final order states
    let orders = order_store.get_all().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = OrderWriter::new(stdout.lock());
    writer.write_orders(orders).into_diagnostic()?;

    Ok(())
}
