pub mod app;
pub mod config;
pub mod form;
pub mod logging;
pub mod notifier;
pub mod router;
pub mod utils;
pub mod views;

pub use app::{InvoiceApp, InvoiceRow, SaveError, SaveOutcome, build_registry};
pub use config::{AppConfig, ConfigError};
pub use form::InvoiceForm;
pub use notifier::ConsoleNotifier;
pub use router::{Router, Tab, View};
