use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::validation::{ValidationError, validate_draft};
use crate::calculations::{InvoiceCalculator, InvoiceTotals, clamp_discount};
use crate::models::{Invoice, InvoiceItem, InvoiceStatus, NewInvoice};

/// Editable, possibly incomplete invoice as held by the create/edit screen.
///
/// Client and due date stay optional until [`validate`](InvoiceDraft::validate)
/// turns the draft into a [`NewInvoice`]. A draft always holds at least one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub invoice_number: String,
    pub client_id: Option<i64>,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub status: InvoiceStatus,
    pub notes: String,
    items: Vec<InvoiceItem>,
    discount: Decimal,
}

impl InvoiceDraft {
    /// A fresh draft with a single blank line item and no client or due date.
    pub fn new(
        invoice_number: impl Into<String>,
        issue_date: NaiveDate,
    ) -> Self {
        Self {
            invoice_number: invoice_number.into(),
            client_id: None,
            issue_date,
            due_date: None,
            status: InvoiceStatus::Draft,
            notes: String::new(),
            items: vec![InvoiceItem::blank(1)],
            discount: Decimal::ZERO,
        }
    }

    /// Pre-populate every editable field from an existing invoice.
    pub fn from_invoice(invoice: &Invoice) -> Self {
        let items = if invoice.items.is_empty() {
            vec![InvoiceItem::blank(1)]
        } else {
            invoice.items.clone()
        };

        Self {
            invoice_number: invoice.invoice_number.clone(),
            client_id: Some(invoice.client_id),
            issue_date: invoice.issue_date,
            due_date: Some(invoice.due_date),
            status: invoice.status,
            notes: invoice.notes.clone(),
            items,
            discount: invoice.discount,
        }
    }

    pub fn items(&self) -> &[InvoiceItem] {
        &self.items
    }

    pub fn item(
        &self,
        id: i64,
    ) -> Option<&InvoiceItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn item_mut(
        &mut self,
        id: i64,
    ) -> Option<&mut InvoiceItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Append a blank item and return its id.
    pub fn add_item(&mut self) -> i64 {
        let id = self.items.iter().map(|item| item.id).max().unwrap_or(0) + 1;
        self.items.push(InvoiceItem::blank(id));
        id
    }

    /// Remove the item with `id`. The last remaining item is never removed.
    pub fn remove_item(
        &mut self,
        id: i64,
    ) -> bool {
        if self.items.len() <= 1 {
            return false;
        }
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    pub fn discount(&self) -> Decimal {
        self.discount
    }

    /// Set the discount percentage, clamped to `0..=100`.
    pub fn set_discount(
        &mut self,
        discount: Decimal,
    ) {
        self.discount = clamp_discount(discount);
    }

    pub fn totals(&self) -> InvoiceTotals {
        InvoiceCalculator::new(&self.items).calculate(self.discount)
    }

    /// Check the draft and produce an invoice ready to be saved.
    ///
    /// # Errors
    ///
    /// Returns every unmet requirement at once; see [`validate_draft`].
    pub fn validate(&self) -> Result<NewInvoice, ValidationError> {
        validate_draft(self)
    }
}
