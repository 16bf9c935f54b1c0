//! Plain-text rendering of each view for the terminal.

use std::fmt::Write;

use invoice_core::{Client, DashboardStats, Invoice};

use crate::app::InvoiceRow;
use crate::form::{DATE_FORMAT, InvoiceForm};
use crate::utils::format_currency;

fn invoice_line(
    out: &mut String,
    invoice: &Invoice,
    client: &str,
) {
    let _ = writeln!(
        out,
        "{:<12} {:<24} {:>14} {:<8} due {}",
        invoice.invoice_number,
        client,
        format_currency(invoice.totals().total),
        invoice.status.as_str(),
        invoice.due_date.format(DATE_FORMAT),
    );
}

pub fn dashboard(
    stats: &DashboardStats,
    clients: &[Client],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Dashboard");
    let _ = writeln!(out, "  Total invoices:  {}", stats.total_invoices);
    let _ = writeln!(
        out,
        "  Total revenue:   {}",
        format_currency(stats.total_revenue)
    );
    let _ = writeln!(out, "  Paid invoices:   {}", stats.paid_invoices);
    let _ = writeln!(out, "  Overdue:         {}", stats.overdue_invoices);
    let _ = writeln!(out);
    let _ = writeln!(out, "Recent invoices");

    if stats.recent_invoices.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for invoice in &stats.recent_invoices {
        let client = clients
            .iter()
            .find(|c| c.id == invoice.client_id)
            .map_or("Unknown", |c| c.name.as_str());
        out.push_str("  ");
        invoice_line(&mut out, invoice, client);
    }
    out
}

pub fn invoice_list(rows: &[InvoiceRow]) -> String {
    let mut out = String::new();
    if rows.is_empty() {
        let _ = writeln!(out, "No invoices found.");
        return out;
    }
    let _ = writeln!(
        out,
        "{:<6} {:<12} {:<24} {:>14} {:<8} {}",
        "ID", "Number", "Client", "Total", "Status", "Due"
    );
    for row in rows {
        let _ = write!(out, "{:<6} ", row.invoice.id);
        invoice_line(
            &mut out,
            &row.invoice,
            row.client_name.as_deref().unwrap_or("Unknown"),
        );
    }
    out
}

pub fn clients(clients: &[Client]) -> String {
    let mut out = String::new();
    if clients.is_empty() {
        let _ = writeln!(out, "No clients found.");
        return out;
    }
    for client in clients {
        let _ = writeln!(out, "{:<4} {} <{}>", client.id, client.name, client.email);
        if let Some(company) = &client.company {
            let _ = writeln!(out, "     {company}");
        }
        if let Some(phone) = &client.phone {
            let _ = writeln!(out, "     {phone}");
        }
        if let Some(address) = &client.address {
            let _ = writeln!(out, "     {address}");
        }
    }
    out
}

pub fn reports() -> String {
    "Reports\n  Analytics and reports are not available yet.\n".to_string()
}

/// Form header, line items and the live totals block.
pub fn invoice_form(form: &InvoiceForm) -> String {
    let draft = form.draft();
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", form.title(), draft.invoice_number);
    let _ = writeln!(
        out,
        "  Client:  {}",
        draft
            .client_id
            .map_or_else(|| "(none)".to_string(), |id| id.to_string())
    );
    let _ = writeln!(out, "  Issued:  {}", draft.issue_date.format(DATE_FORMAT));
    let _ = writeln!(
        out,
        "  Due:     {}",
        draft
            .due_date
            .map_or_else(|| "(none)".to_string(), |d| d.format(DATE_FORMAT).to_string())
    );
    let _ = writeln!(out, "  Status:  {}", draft.status);

    for item in draft.items() {
        let _ = writeln!(
            out,
            "  {:>3}. {:<30} {:>8} x {:>12} = {:>14}",
            item.id,
            item.description,
            item.quantity(),
            format_currency(item.rate()),
            format_currency(item.amount()),
        );
    }

    let totals = draft.totals();
    let _ = writeln!(out, "  Subtotal:          {:>14}", format_currency(totals.subtotal));
    let discount_label = format!("Discount ({}%):", draft.discount());
    let _ = writeln!(
        out,
        "  {discount_label:<19}{:>14}",
        format!("-{}", format_currency(totals.discount_amount))
    );
    let _ = writeln!(out, "  Tax (10%):         {:>14}", format_currency(totals.tax));
    let _ = writeln!(out, "  Total:             {:>14}", format_currency(totals.total));
    if !draft.notes.is_empty() {
        let _ = writeln!(out, "  Notes: {}", draft.notes);
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::{Local, NaiveDate, Utc};
    use invoice_core::{InvoiceItem, InvoiceStatus};
    use rust_decimal_macros::dec;

    use super::*;

    fn invoice() -> Invoice {
        let now = Utc::now();
        Invoice {
            id: 4,
            invoice_number: "INV-004".to_string(),
            client_id: 1,
            issue_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
            items: vec![
                InvoiceItem::new(1, "Consulting", dec!(2), dec!(50)),
                InvoiceItem::new(2, "Report", dec!(1), dec!(100)),
            ],
            discount: dec!(10),
            status: InvoiceStatus::Sent,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn list_shows_client_and_total() {
        let rows = vec![InvoiceRow {
            invoice: invoice(),
            client_name: Some("Acme Corp".to_string()),
        }];

        let text = invoice_list(&rows);

        assert!(text.contains("INV-004"), "{text}");
        assert!(text.contains("Acme Corp"), "{text}");
        assert!(text.contains("$198.00"), "{text}");
        assert!(text.contains("2024-02-10"), "{text}");
    }

    #[test]
    fn empty_list_says_so() {
        assert_eq!(invoice_list(&[]), "No invoices found.\n");
    }

    #[test]
    fn form_shows_totals() {
        let form = InvoiceForm::for_invoice(invoice());

        let text = invoice_form(&form);

        assert!(text.starts_with("Edit Invoice INV-004"), "{text}");
        assert!(text.contains("$200.00"), "{text}");
        assert!(text.contains("-$20.00"), "{text}");
        assert!(text.contains("$18.00"), "{text}");
        assert!(text.contains("$198.00"), "{text}");
    }

    #[test]
    fn blank_form_has_no_due_date() {
        let form = InvoiceForm::blank("INV-", Local::now());

        let text = invoice_form(&form);

        assert!(text.contains("Due:     (none)"), "{text}");
    }
}
