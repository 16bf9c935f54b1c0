use std::collections::HashSet;
use std::io::Read;
use std::sync::LazyLock;

use invoice_core::{InvoiceRepository, NewClient, RepositoryError};
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is a valid regex")
});

/// Errors that can occur when importing client data.
#[derive(Debug, Error)]
pub enum ClientLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Line {line}: client name is empty")]
    MissingName { line: usize },

    #[error("Line {line}: invalid email address '{email}'")]
    InvalidEmail { line: usize, email: String },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for ClientLoaderError {
    fn from(err: csv::Error) -> Self {
        ClientLoaderError::CsvParse(err.to_string())
    }
}

/// A single row of the clients CSV file.
///
/// Columns: `name,email,phone,address,company`. The last three may be left
/// blank.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ClientRecord {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub company: Option<String>,
}

impl From<&ClientRecord> for NewClient {
    fn from(record: &ClientRecord) -> Self {
        NewClient {
            name: record.name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            address: record.address.clone(),
            company: record.company.clone(),
        }
    }
}

/// Imports client reference data from CSV through any [`InvoiceRepository`].
pub struct ClientLoader;

impl ClientLoader {
    /// Parse and check client records from a CSV reader.
    ///
    /// Fields are trimmed. Every row needs a name and a plausible email
    /// address; the first bad row aborts the parse.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<ClientRecord>, ClientLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for (index, result) in csv_reader.deserialize().enumerate() {
            let record: ClientRecord = result?;
            // Header is line 1
            let line = index + 2;

            if record.name.is_empty() {
                return Err(ClientLoaderError::MissingName { line });
            }
            if !EMAIL_PATTERN.is_match(&record.email) {
                return Err(ClientLoaderError::InvalidEmail {
                    line,
                    email: record.email,
                });
            }
            records.push(record);
        }

        Ok(records)
    }

    /// Insert `records` that are not already stored.
    ///
    /// Clients are matched by email, ignoring case, against both the
    /// repository and earlier rows, so loading the same file twice inserts
    /// nothing the second time. Returns the number of clients inserted.
    pub async fn load<R: InvoiceRepository + ?Sized>(
        repo: &R,
        records: &[ClientRecord],
    ) -> Result<usize, ClientLoaderError> {
        let mut known: HashSet<String> = repo
            .list_clients()
            .await?
            .into_iter()
            .map(|client| client.email.to_lowercase())
            .collect();

        let mut inserted = 0;
        for record in records {
            if !known.insert(record.email.to_lowercase()) {
                debug!(email = %record.email, "client already present, skipping");
                continue;
            }
            repo.create_client(NewClient::from(record)).await?;
            inserted += 1;
        }

        Ok(inserted)
    }
}
