//! Pre-save validation of an [`InvoiceDraft`].

use std::fmt;

use thiserror::Error;

use crate::models::{InvoiceDraft, NewInvoice};

/// A single unmet requirement on a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationIssue {
    MissingClient,
    MissingDueDate,
    EmptyItemDescription { item_id: i64 },
}

impl fmt::Display for ValidationIssue {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::MissingClient => write!(f, "a client must be selected"),
            Self::MissingDueDate => write!(f, "a due date is required"),
            Self::EmptyItemDescription { item_id } => {
                write!(f, "item {item_id} needs a description")
            }
        }
    }
}

/// Every requirement the draft failed, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invoice is incomplete: {}", join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validate a draft and convert it to a [`NewInvoice`].
///
/// Rules:
/// - a client is selected
/// - a due date is set
/// - every line item has a non-blank description
///
/// Nothing is produced unless every rule holds.
pub fn validate_draft(draft: &InvoiceDraft) -> Result<NewInvoice, ValidationError> {
    let mut issues = Vec::new();

    if draft.client_id.is_none() {
        issues.push(ValidationIssue::MissingClient);
    }
    if draft.due_date.is_none() {
        issues.push(ValidationIssue::MissingDueDate);
    }
    issues.extend(
        draft
            .items()
            .iter()
            .filter(|item| !item.has_description())
            .map(|item| ValidationIssue::EmptyItemDescription { item_id: item.id }),
    );

    match (draft.client_id, draft.due_date) {
        (Some(client_id), Some(due_date)) if issues.is_empty() => Ok(NewInvoice {
            invoice_number: draft.invoice_number.trim().to_string(),
            client_id,
            issue_date: draft.issue_date,
            due_date,
            items: draft.items().to_vec(),
            discount: draft.discount(),
            status: draft.status,
            notes: draft.notes.clone(),
        }),
        _ => Err(ValidationError { issues }),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn complete_draft() -> InvoiceDraft {
        let mut draft = InvoiceDraft::new("INV-007", NaiveDate::from_ymd_opt(2026, 10, 1).unwrap());
        draft.client_id = Some(2);
        draft.due_date = NaiveDate::from_ymd_opt(2026, 10, 31);
        draft.notes = "Thanks!".to_string();
        draft.set_discount(dec!(10));
        if let Some(item) = draft.item_mut(1) {
            item.description = "Consulting".to_string();
            item.set_quantity(dec!(2));
            item.set_rate(dec!(50));
        }
        draft
    }

    #[test]
    fn complete_draft_becomes_new_invoice() {
        let draft = complete_draft();

        let invoice = validate_draft(&draft).unwrap();

        assert_eq!(invoice.invoice_number, "INV-007");
        assert_eq!(invoice.client_id, 2);
        assert_eq!(invoice.due_date, NaiveDate::from_ymd_opt(2026, 10, 31).unwrap());
        assert_eq!(invoice.items, draft.items().to_vec());
        assert_eq!(invoice.discount, dec!(10));
        assert_eq!(invoice.notes, "Thanks!");
        assert_eq!(invoice.totals().total, dec!(99));
    }

    #[test]
    fn missing_client_is_rejected_even_with_valid_items() {
        let mut draft = complete_draft();
        draft.client_id = None;

        let err = validate_draft(&draft).unwrap_err();

        assert_eq!(err.issues, vec![ValidationIssue::MissingClient]);
    }

    #[test]
    fn missing_due_date_is_rejected() {
        let mut draft = complete_draft();
        draft.due_date = None;

        let err = validate_draft(&draft).unwrap_err();

        assert_eq!(err.issues, vec![ValidationIssue::MissingDueDate]);
    }

    #[test]
    fn empty_item_description_is_rejected() {
        let mut draft = complete_draft();
        let blank = draft.add_item();

        let err = validate_draft(&draft).unwrap_err();

        assert_eq!(
            err.issues,
            vec![ValidationIssue::EmptyItemDescription { item_id: blank }]
        );
    }

    #[test]
    fn every_issue_is_reported_at_once() {
        let draft = InvoiceDraft::new("INV-1", NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());

        let err = validate_draft(&draft).unwrap_err();

        assert_eq!(
            err.issues,
            vec![
                ValidationIssue::MissingClient,
                ValidationIssue::MissingDueDate,
                ValidationIssue::EmptyItemDescription { item_id: 1 },
            ]
        );
        assert_eq!(
            err.to_string(),
            "invoice is incomplete: a client must be selected; a due date is required; \
             item 1 needs a description"
        );
    }
}
