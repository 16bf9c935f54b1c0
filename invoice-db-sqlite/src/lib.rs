//! SQLite storage for clients and invoices.
//!
//! Register [`SqliteRepositoryFactory`] with an
//! [`invoice_core::db::RepositoryRegistry`] to make the `"sqlite"` backend
//! available, or use [`SqliteRepository`] directly.

pub mod decimal;
pub mod factory;
pub mod repository;

pub use factory::SqliteRepositoryFactory;
pub use repository::SqliteRepository;
