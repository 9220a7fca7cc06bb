use tracing::info;

use crate::error::ChoolgoError;

/// Receiver of inventory deductions, one call per aggregated product.
pub trait StockSink {
    fn deduct(&mut self, product: &str, quantity: u32, channel: &str) -> Result<(), ChoolgoError>;
}

/// Logs deductions without applying them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunSink;

impl StockSink for DryRunSink {
    fn deduct(&mut self, product: &str, quantity: u32, channel: &str) -> Result<(), ChoolgoError> {
        info!(product, quantity, channel, "[dry-run] stock deduction skipped");
        Ok(())
    }
}

/// Keeps running totals per product, in first-deduction order.
#[derive(Debug, Clone, Default)]
pub struct TallySink {
    totals: Vec<(String, u32)>,
}

impl TallySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn totals(&self) -> &[(String, u32)] {
        &self.totals
    }
}

impl StockSink for TallySink {
    fn deduct(&mut self, product: &str, quantity: u32, channel: &str) -> Result<(), ChoolgoError> {
        info!(product, quantity, channel, "stock deducted");
        match self.totals.iter_mut().find(|(p, _)| p == product) {
            Some((_, total)) => *total = total.saturating_add(quantity),
            None => self.totals.push((product.to_string(), quantity)),
        }
        Ok(())
    }
}
