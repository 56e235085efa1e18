//! Adapter implementations of the domain ports: order storage backends and
//! the token-vault charge gateway.

pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod vault;
