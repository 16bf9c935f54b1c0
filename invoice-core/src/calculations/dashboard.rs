//! Read-only queries over an invoice list for the dashboard and list screens.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::models::{Client, DashboardStats, Invoice, InvoiceStatus};

/// Summarise `invoices` for the dashboard.
///
/// Revenue counts paid invoices only. `recent_limit` caps the number of
/// invoices returned in [`DashboardStats::recent_invoices`].
pub fn dashboard_stats(
    invoices: &[Invoice],
    recent_limit: usize,
) -> DashboardStats {
    let paid: Vec<&Invoice> = invoices
        .iter()
        .filter(|invoice| invoice.status == InvoiceStatus::Paid)
        .collect();

    let total_revenue: Decimal = paid.iter().map(|invoice| invoice.totals().total).sum();

    let overdue_invoices = invoices
        .iter()
        .filter(|invoice| invoice.status == InvoiceStatus::Overdue)
        .count();

    let mut recent_invoices = invoices.to_vec();
    recent_invoices.sort_by(|a, b| {
        b.issue_date
            .cmp(&a.issue_date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    recent_invoices.truncate(recent_limit);

    DashboardStats {
        total_invoices: invoices.len(),
        total_revenue,
        paid_invoices: paid.len(),
        overdue_invoices,
        recent_invoices,
    }
}

/// Filter invoices whose number or client name contains `term`, ignoring case.
///
/// A blank term matches everything. Input order is preserved.
pub fn search_invoices<'a>(
    invoices: &'a [Invoice],
    clients: &[Client],
    term: &str,
) -> Vec<&'a Invoice> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return invoices.iter().collect();
    }

    let names: HashMap<i64, String> = clients
        .iter()
        .map(|client| (client.id, client.name.to_lowercase()))
        .collect();

    invoices
        .iter()
        .filter(|invoice| {
            invoice.invoice_number.to_lowercase().contains(&needle)
                || names
                    .get(&invoice.client_id)
                    .is_some_and(|name| name.contains(&needle))
        })
        .collect()
}
