pub mod calculations;
pub mod db;
pub mod models;
pub mod notify;

pub use db::repository::{InvoiceRepository, RepositoryError};
pub use models::*;
pub use notify::{Notifier, Severity};
