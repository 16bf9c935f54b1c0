use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Client, Invoice, NewClient, NewInvoice};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Storage for clients and invoices.
///
/// The calculator and router never see a concrete store; everything that
/// reads or persists records goes through this trait.
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    // Clients
    async fn list_clients(&self) -> Result<Vec<Client>, RepositoryError>;
    async fn get_client(&self, id: i64) -> Result<Client, RepositoryError>;
    async fn create_client(&self, client: NewClient) -> Result<Client, RepositoryError>;

    // Invoices
    async fn list_invoices(&self) -> Result<Vec<Invoice>, RepositoryError>;
    async fn get_invoice(&self, id: i64) -> Result<Invoice, RepositoryError>;
    async fn create_invoice(&self, invoice: NewInvoice) -> Result<Invoice, RepositoryError>;

    /// Replace the stored invoice with the same id, items included.
    async fn update_invoice(&self, invoice: &Invoice) -> Result<(), RepositoryError>;

    async fn delete_invoice(&self, id: i64) -> Result<(), RepositoryError>;
}
