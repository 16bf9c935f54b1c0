use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Invoice;

/// Summary figures shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_invoices: usize,
    /// Sum of totals over paid invoices.
    pub total_revenue: Decimal,
    pub paid_invoices: usize,
    pub overdue_invoices: usize,
    /// Newest first by issue date.
    pub recent_invoices: Vec<Invoice>,
}
