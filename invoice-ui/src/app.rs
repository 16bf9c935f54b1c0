use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use invoice_core::calculations::{ValidationError, dashboard_stats, search_invoices};
use invoice_core::db::RepositoryRegistry;
use invoice_core::{
    Client, DashboardStats, Invoice, InvoiceRepository, Notifier, RepositoryError, Severity,
};
use invoice_db_sqlite::SqliteRepositoryFactory;

use crate::config::AppConfig;
use crate::router::{Router, Tab};

/// Build the repository registry with every backend this binary supports.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("no invoice form is open")]
    NoOpenForm,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result of [`InvoiceApp::save`] when nothing went wrong in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(Invoice),
    Updated(Invoice),
    /// The form is incomplete; it stays open with its contents.
    Rejected(ValidationError),
}

/// One row of the invoice list: the invoice and its client's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceRow {
    pub invoice: Invoice,
    pub client_name: Option<String>,
}

/// Application state: the active view plus the store and notifier it talks to.
pub struct InvoiceApp {
    router: Router,
    repo: Box<dyn InvoiceRepository>,
    notifier: Arc<dyn Notifier>,
    config: AppConfig,
}

impl InvoiceApp {
    pub fn new(
        repo: Box<dyn InvoiceRepository>,
        notifier: Arc<dyn Notifier>,
        config: AppConfig,
    ) -> Self {
        Self {
            router: Router::new(config.invoice_prefix.clone()),
            repo,
            notifier,
            config,
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn repository(&self) -> &dyn InvoiceRepository {
        self.repo.as_ref()
    }

    pub fn select_tab(
        &mut self,
        tab: Tab,
    ) {
        self.router.select_tab(tab);
    }

    pub fn create(&mut self) {
        self.router.create();
    }

    /// Load invoice `id` and open it for editing.
    pub async fn edit(
        &mut self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let invoice = self.repo.get_invoice(id).await?;
        self.router.edit(invoice);
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.router.back();
    }

    pub async fn dashboard(&self) -> Result<DashboardStats, RepositoryError> {
        let invoices = self.repo.list_invoices().await?;
        Ok(dashboard_stats(&invoices, self.config.recent_invoice_count))
    }

    /// Invoices whose number or client name contains `search`.
    pub async fn invoice_list(
        &self,
        search: &str,
    ) -> Result<Vec<InvoiceRow>, RepositoryError> {
        let invoices = self.repo.list_invoices().await?;
        let clients = self.repo.list_clients().await?;
        let names: HashMap<i64, &str> = clients
            .iter()
            .map(|client| (client.id, client.name.as_str()))
            .collect();

        let rows = search_invoices(&invoices, &clients, search)
            .into_iter()
            .map(|invoice| InvoiceRow {
                client_name: names.get(&invoice.client_id).map(|name| name.to_string()),
                invoice: invoice.clone(),
            })
            .collect::<Vec<_>>();
        debug!(search, matched = rows.len(), "invoice list");
        Ok(rows)
    }

    pub async fn clients(&self) -> Result<Vec<Client>, RepositoryError> {
        self.repo.list_clients().await
    }

    pub async fn delete_invoice(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        self.repo.delete_invoice(id).await?;
        info!(id, "invoice deleted");
        Ok(())
    }

    /// Validate and store the open form.
    ///
    /// An incomplete form is reported through the notifier and left open.
    /// On success the user is told and taken back to the dashboard. A storage
    /// failure is reported and returned, and the form stays open.
    pub async fn save(&mut self) -> Result<SaveOutcome, SaveError> {
        let form = self.router.form().ok_or(SaveError::NoOpenForm)?;

        let new_invoice = match form.draft().validate() {
            Ok(invoice) => invoice,
            Err(e) => {
                warn!(invoice_number = %form.draft().invoice_number, "save rejected: {e}");
                self.notifier.notify(
                    "Validation Error",
                    &format!("Please fill in all required fields: {e}"),
                    Severity::Error,
                );
                return Ok(SaveOutcome::Rejected(e));
            }
        };

        let result = match form.editing() {
            Some(original) => {
                let mut updated = original.clone();
                updated.apply(new_invoice);
                self.repo
                    .update_invoice(&updated)
                    .await
                    .map(|()| SaveOutcome::Updated(updated))
            }
            None => self
                .repo
                .create_invoice(new_invoice)
                .await
                .map(SaveOutcome::Created),
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                self.notifier
                    .notify("Save Failed", &e.to_string(), Severity::Error);
                return Err(e.into());
            }
        };

        let (title, verb, invoice) = match &outcome {
            SaveOutcome::Created(invoice) => ("Invoice Created", "created", invoice),
            SaveOutcome::Updated(invoice) => ("Invoice Updated", "updated", invoice),
            SaveOutcome::Rejected(_) => return Ok(outcome),
        };
        info!(id = invoice.id, number = %invoice.invoice_number, "invoice {verb}");
        self.notifier.notify(
            title,
            &format!(
                "Invoice {} has been {verb} successfully",
                invoice.invoice_number
            ),
            Severity::Success,
        );

        self.router.back();
        Ok(outcome)
    }
}
