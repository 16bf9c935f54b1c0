use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::{InvoiceCalculator, InvoiceTotals};
use crate::models::{InvoiceItem, InvoiceStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub invoice_number: String,
    pub client_id: i64,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,

    // Display order is insertion order
    pub items: Vec<InvoiceItem>,
    /// Percentage in `0..=100`.
    pub discount: Decimal,

    pub status: InvoiceStatus,
    pub notes: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Subtotal, discount, tax and total derived from the current items.
    pub fn totals(&self) -> InvoiceTotals {
        InvoiceCalculator::new(&self.items).calculate(self.discount)
    }

    /// Overwrite every editable field with `changes`, keeping identity and timestamps.
    pub fn apply(
        &mut self,
        changes: NewInvoice,
    ) {
        self.invoice_number = changes.invoice_number;
        self.client_id = changes.client_id;
        self.issue_date = changes.issue_date;
        self.due_date = changes.due_date;
        self.items = changes.items;
        self.discount = changes.discount;
        self.status = changes.status;
        self.notes = changes.notes;
    }
}

/// For creating new invoices (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInvoice {
    pub invoice_number: String,
    pub client_id: i64,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub items: Vec<InvoiceItem>,
    pub discount: Decimal,
    pub status: InvoiceStatus,
    pub notes: String,
}

impl NewInvoice {
    pub fn totals(&self) -> InvoiceTotals {
        InvoiceCalculator::new(&self.items).calculate(self.discount)
    }
}
