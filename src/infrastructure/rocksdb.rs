use crate::domain::order::RenewalOrder;
use crate::domain::ports::OrderStore;
use crate::error::{BillingError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing renewal order states.
pub const CF_ORDERS: &str = "orders";

/// A persistent order store backed by RocksDB.
///
/// Orders are JSON-encoded under their big-endian order id, so a second run
/// against the same database path sees every remediation and failure state the
/// previous run persisted.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbOrderStore {
    db: Arc<DB>,
}

impl RocksDbOrderStore {
    /// Opens or creates a RocksDB instance at the specified path, ensuring the
    /// "orders" column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_orders])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(CF_ORDERS).ok_or_else(|| {
            BillingError::Internal(Box::new(std::io::Error::other(
                "Orders column family not found",
            )))
        })
    }
}

#[async_trait]
impl OrderStore for RocksDbOrderStore {
    async fn store(&self, order: RenewalOrder) -> Result<()> {
        let cf = self.cf()?;
        let key = order.order.to_be_bytes();
        let value = serde_json::to_vec(&order).map_err(|e| BillingError::Internal(Box::new(e)))?;
        self.db.put_cf(cf, key, value)?;
        Ok(())
    }

    async fn get(&self, order_id: u32) -> Result<Option<RenewalOrder>> {
        let cf = self.cf()?;
        let key = order_id.to_be_bytes();
        match self.db.get_cf(cf, key)? {
            Some(bytes) => {
                let order = serde_json::from_slice(&bytes)
                    .map_err(|e| BillingError::Internal(Box::new(e)))?;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    async fn get_all(&self) -> Result<Vec<RenewalOrder>> {
        let cf = self.cf()?;
        let mut all = Vec::new();
        for entry in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = entry?;
            let order = serde_json::from_slice(&value)
                .map_err(|e| BillingError::Internal(Box::new(e)))?;
            all.push(order);
        }
        // Big-endian keys iterate in id order already; keep the guarantee
        // explicit for mixed-width callers.
        all.sort_by_key(|order: &RenewalOrder| order.order);
        Ok(all)
    }
}
