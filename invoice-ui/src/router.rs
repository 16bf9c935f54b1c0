use std::fmt;

use chrono::Local;
use tracing::debug;

use invoice_core::Invoice;

use crate::form::InvoiceForm;

/// Navigation tabs, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Invoices,
    Create,
    Clients,
    Reports,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[
            Tab::Dashboard,
            Tab::Invoices,
            Tab::Create,
            Tab::Clients,
            Tab::Reports,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Invoices => "Invoices",
            Tab::Create => "Create",
            Tab::Clients => "Clients",
            Tab::Reports => "Reports",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which view is currently active
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Dashboard,
    InvoiceList,
    CreateOrEdit(Box<InvoiceForm>),
    Clients,
    Reports,
}

impl View {
    /// The tab highlighted while this view is shown.
    pub fn tab(&self) -> Tab {
        match self {
            View::Dashboard => Tab::Dashboard,
            View::InvoiceList => Tab::Invoices,
            View::CreateOrEdit(_) => Tab::Create,
            View::Clients => Tab::Clients,
            View::Reports => Tab::Reports,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            View::Dashboard => "dashboard",
            View::InvoiceList => "invoice list",
            View::CreateOrEdit(form) if form.editing().is_some() => "edit invoice",
            View::CreateOrEdit(_) => "create invoice",
            View::Clients => "clients",
            View::Reports => "reports",
        }
    }
}

/// Single active view with no history.
///
/// The create/edit form lives inside [`View::CreateOrEdit`], so navigating
/// anywhere else drops it.
#[derive(Debug, Clone)]
pub struct Router {
    view: View,
    invoice_prefix: String,
}

impl Router {
    pub fn new(invoice_prefix: impl Into<String>) -> Self {
        Self {
            view: View::Dashboard,
            invoice_prefix: invoice_prefix.into(),
        }
    }

    pub fn current(&self) -> &View {
        &self.view
    }

    pub fn active_tab(&self) -> Tab {
        self.view.tab()
    }

    pub fn form(&self) -> Option<&InvoiceForm> {
        match &self.view {
            View::CreateOrEdit(form) => Some(form.as_ref()),
            _ => None,
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut InvoiceForm> {
        match &mut self.view {
            View::CreateOrEdit(form) => Some(form.as_mut()),
            _ => None,
        }
    }

    /// Switch to `tab`. The create tab always opens a fresh draft.
    pub fn select_tab(
        &mut self,
        tab: Tab,
    ) {
        let view = match tab {
            Tab::Dashboard => View::Dashboard,
            Tab::Invoices => View::InvoiceList,
            Tab::Create => View::CreateOrEdit(Box::new(self.blank_form())),
            Tab::Clients => View::Clients,
            Tab::Reports => View::Reports,
        };
        self.go(view);
    }

    /// Open the form with a fresh draft.
    pub fn create(&mut self) {
        let form = self.blank_form();
        self.go(View::CreateOrEdit(Box::new(form)));
    }

    /// Open the form pre-populated from `invoice`.
    pub fn edit(
        &mut self,
        invoice: Invoice,
    ) {
        self.go(View::CreateOrEdit(Box::new(InvoiceForm::for_invoice(invoice))));
    }

    /// Leave the current view for the dashboard, discarding any form.
    ///
    /// Used for both cancel and a completed save.
    pub fn back(&mut self) {
        self.go(View::Dashboard);
    }

    fn blank_form(&self) -> InvoiceForm {
        InvoiceForm::blank(&self.invoice_prefix, Local::now())
    }

    fn go(
        &mut self,
        view: View,
    ) {
        debug!(from = self.view.name(), to = view.name(), "navigate");
        self.view = view;
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new("INV-")
    }
}
