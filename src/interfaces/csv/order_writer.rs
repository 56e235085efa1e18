use crate::domain::order::{OrderStatus, RenewalOrder};
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct OrderRow<'a> {
    order: u32,
    status: OrderStatus,
    reason: &'a str,
}

/// Writes final renewal-order states as CSV: `order, status, reason`.
pub struct OrderWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OrderWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_orders(&mut self, orders: Vec<RenewalOrder>) -> Result<()> {
        for order in &orders {
            self.writer.serialize(OrderRow {
                order: order.order,
                status: order.status,
                reason: order.failure_reason.as_deref().unwrap_or(""),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
