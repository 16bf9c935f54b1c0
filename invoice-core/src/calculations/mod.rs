//! Invoice arithmetic, pre-save validation and list/dashboard queries.
//!
//! Nothing in here performs I/O; every function maps plain values to plain
//! values so the create/edit screen can call it on each keystroke.

pub mod common;
pub mod dashboard;
pub mod totals;
pub mod validation;

pub use dashboard::{dashboard_stats, search_invoices};
pub use totals::{InvoiceCalculator, InvoiceTotals, MAX_DISCOUNT, TAX_RATE, clamp_discount};
pub use validation::{ValidationError, ValidationIssue, validate_draft};
