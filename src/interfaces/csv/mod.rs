pub mod order_writer;
pub mod renewal_reader;
pub mod vault_reader;
