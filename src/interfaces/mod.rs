//! Inbound/outbound adapters. Currently CSV only.

pub mod csv;
