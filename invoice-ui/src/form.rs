//! Form state for creating or editing an invoice.
//!
//! Text coming from the screen is parsed here; the draft itself only ever
//! holds typed values.

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use thiserror::Error;

use invoice_core::{Invoice, InvoiceDraft};

use crate::utils::{ItemSpec, ParseDecimalError, parse_decimal};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum FormError {
    #[error("no line item with id {0}")]
    UnknownItem(i64),

    #[error("invalid date '{input}', expected YYYY-MM-DD")]
    InvalidDate {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error(transparent)]
    InvalidNumber(#[from] ParseDecimalError),
}

/// Build an invoice number from the millisecond part of `now`.
///
/// `INV-` plus three zero-padded digits, e.g. `INV-007`. Numbers are not
/// guaranteed unique; the store rejects duplicates.
pub fn generate_invoice_number<Tz: TimeZone>(
    prefix: &str,
    now: &DateTime<Tz>,
) -> String {
    format!("{prefix}{:03}", now.timestamp_millis().rem_euclid(1000))
}

/// What the create/edit screen is working on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceForm {
    draft: InvoiceDraft,
    editing: Option<Invoice>,
}

impl InvoiceForm {
    /// Fresh form: new number, issued today, one blank item.
    pub fn blank(
        prefix: &str,
        now: DateTime<Local>,
    ) -> Self {
        Self {
            draft: InvoiceDraft::new(generate_invoice_number(prefix, &now), now.date_naive()),
            editing: None,
        }
    }

    /// Form pre-populated from an existing invoice.
    pub fn for_invoice(invoice: Invoice) -> Self {
        Self {
            draft: InvoiceDraft::from_invoice(&invoice),
            editing: Some(invoice),
        }
    }

    pub fn draft(&self) -> &InvoiceDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut InvoiceDraft {
        &mut self.draft
    }

    /// The stored invoice being edited, if any.
    pub fn editing(&self) -> Option<&Invoice> {
        self.editing.as_ref()
    }

    pub fn title(&self) -> &'static str {
        if self.editing.is_some() {
            "Edit Invoice"
        } else {
            "Create Invoice"
        }
    }

    /// Blank input clears the due date.
    pub fn set_due_date_input(
        &mut self,
        input: &str,
    ) -> Result<(), FormError> {
        self.draft.due_date = parse_optional_date(input)?;
        Ok(())
    }

    /// Blank input leaves the issue date unchanged.
    pub fn set_issue_date_input(
        &mut self,
        input: &str,
    ) -> Result<(), FormError> {
        if let Some(date) = parse_optional_date(input)? {
            self.draft.issue_date = date;
        }
        Ok(())
    }

    pub fn set_discount_input(
        &mut self,
        input: &str,
    ) -> Result<(), FormError> {
        let discount = parse_decimal(input)?;
        self.draft.set_discount(discount);
        Ok(())
    }

    pub fn set_item_description(
        &mut self,
        item_id: i64,
        description: &str,
    ) -> Result<(), FormError> {
        let item = self
            .draft
            .item_mut(item_id)
            .ok_or(FormError::UnknownItem(item_id))?;
        item.description = description.to_string();
        Ok(())
    }

    pub fn set_item_quantity_input(
        &mut self,
        item_id: i64,
        input: &str,
    ) -> Result<(), FormError> {
        let quantity = parse_decimal(input)?;
        let item = self
            .draft
            .item_mut(item_id)
            .ok_or(FormError::UnknownItem(item_id))?;
        item.set_quantity(quantity);
        Ok(())
    }

    pub fn set_item_rate_input(
        &mut self,
        item_id: i64,
        input: &str,
    ) -> Result<(), FormError> {
        let rate = parse_decimal(input)?;
        let item = self
            .draft
            .item_mut(item_id)
            .ok_or(FormError::UnknownItem(item_id))?;
        item.set_rate(rate);
        Ok(())
    }

    /// Swap every line item for `items`, in order. An empty list keeps the
    /// current items, since a draft never has fewer than one.
    pub fn replace_items(
        &mut self,
        items: Vec<ItemSpec>,
    ) {
        if items.is_empty() {
            return;
        }
        let old_ids: Vec<i64> = self.draft.items().iter().map(|item| item.id).collect();
        for spec in items {
            let id = self.draft.add_item();
            if let Some(item) = self.draft.item_mut(id) {
                item.description = spec.description;
                item.set_quantity(spec.quantity);
                item.set_rate(spec.rate);
            }
        }
        for id in old_ids {
            self.draft.remove_item(id);
        }
    }
}

fn parse_optional_date(input: &str) -> Result<Option<NaiveDate>, FormError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map(Some)
        .map_err(|source| FormError::InvalidDate {
            input: trimmed.to_string(),
            source,
        })
}
