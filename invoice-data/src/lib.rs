//! Bulk import of reference data into an invoice store.

mod loader;

pub use loader::{ClientLoader, ClientLoaderError, ClientRecord};
