mod client;
mod dashboard_stats;
mod invoice;
mod invoice_draft;
mod invoice_item;
mod invoice_status;

pub use client::{Client, NewClient};
pub use dashboard_stats::DashboardStats;
pub use invoice::{Invoice, NewInvoice};
pub use invoice_draft::InvoiceDraft;
pub use invoice_item::InvoiceItem;
pub use invoice_status::InvoiceStatus;
