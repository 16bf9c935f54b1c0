use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use invoice_core::{
    Client, Invoice, InvoiceItem, InvoiceRepository, InvoiceStatus, NewClient, NewInvoice,
    RepositoryError,
};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, Transaction};

use crate::decimal::{decimal_to_text, get_decimal};

const INVOICE_COLUMNS: &str = "id, invoice_number, client_id, issue_date, due_date, discount,
     status, notes, created_at, updated_at";

const ITEM_COLUMNS: &str = "invoice_id, item_id, description, quantity, rate";

/// An in-memory database lives only as long as its one connection, so that
/// connection is never retired.
fn pool_options(database_url: &str) -> SqlitePoolOptions {
    if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    }
}

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = pool_options(database_url)
            .connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn items_for(
        &self,
        invoice_id: i64,
    ) -> Result<Vec<InvoiceItem>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM invoice_items WHERE invoice_id = ? ORDER BY position"
        ))
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(row_to_item).collect()
    }
}

fn db_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn column<'r, T>(
    row: &'r SqliteRow,
    name: &str,
) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
{
    row.try_get(name)
        .map_err(|e| RepositoryError::Database(format!("Failed to get {}: {}", name, e)))
}

fn row_to_client(row: &SqliteRow) -> Result<Client, RepositoryError> {
    Ok(Client {
        id: column(row, "id")?,
        name: column(row, "name")?,
        email: column(row, "email")?,
        phone: column(row, "phone")?,
        address: column(row, "address")?,
        company: column(row, "company")?,
    })
}

fn row_to_item(row: &SqliteRow) -> Result<InvoiceItem, RepositoryError> {
    Ok(InvoiceItem::new(
        column(row, "item_id")?,
        column::<String>(row, "description")?,
        get_decimal(row, "quantity")?,
        get_decimal(row, "rate")?,
    ))
}

fn row_to_invoice(
    row: &SqliteRow,
    items: Vec<InvoiceItem>,
) -> Result<Invoice, RepositoryError> {
    let status: String = column(row, "status")?;
    let status = InvoiceStatus::parse(&status)
        .ok_or_else(|| RepositoryError::Database(format!("Invalid invoice status: {}", status)))?;

    Ok(Invoice {
        id: column(row, "id")?,
        invoice_number: column(row, "invoice_number")?,
        client_id: column(row, "client_id")?,
        issue_date: column::<NaiveDate>(row, "issue_date")?,
        due_date: column::<NaiveDate>(row, "due_date")?,
        items,
        discount: get_decimal(row, "discount")?,
        status,
        notes: column(row, "notes")?,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
        updated_at: column::<DateTime<Utc>>(row, "updated_at")?,
    })
}

/// Write `items` for `invoice_id` in display order.
async fn insert_items(
    tx: &mut Transaction<'_, Sqlite>,
    invoice_id: i64,
    items: &[InvoiceItem],
) -> Result<(), RepositoryError> {
    for (position, item) in items.iter().enumerate() {
        sqlx::query(
            "INSERT INTO invoice_items (invoice_id, item_id, position, description, quantity, rate)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(invoice_id)
        .bind(item.id)
        .bind(position as i64)
        .bind(&item.description)
        .bind(decimal_to_text(item.quantity()))
        .bind(decimal_to_text(item.rate()))
        .execute(&mut **tx)
        .await
        .map_err(db_err)?;
    }
    Ok(())
}

#[async_trait]
impl InvoiceRepository for SqliteRepository {
    async fn list_clients(&self) -> Result<Vec<Client>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, email, phone, address, company FROM clients ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(row_to_client).collect()
    }

    async fn get_client(
        &self,
        id: i64,
    ) -> Result<Client, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, email, phone, address, company FROM clients WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_client(&row)
    }

    async fn create_client(
        &self,
        client: NewClient,
    ) -> Result<Client, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO clients (name, email, phone, address, company) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.address)
        .bind(&client.company)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        self.get_client(result.last_insert_rowid()).await
    }

    async fn list_invoices(&self) -> Result<Vec<Invoice>, RepositoryError> {
        let rows = sqlx::query(&format!("SELECT {INVOICE_COLUMNS} FROM invoices ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let item_rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM invoice_items ORDER BY invoice_id, position"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut items_by_invoice: HashMap<i64, Vec<InvoiceItem>> = HashMap::new();
        for row in &item_rows {
            let invoice_id: i64 = column(row, "invoice_id")?;
            items_by_invoice
                .entry(invoice_id)
                .or_default()
                .push(row_to_item(row)?);
        }

        rows.iter()
            .map(|row| {
                let id: i64 = column(row, "id")?;
                row_to_invoice(row, items_by_invoice.remove(&id).unwrap_or_default())
            })
            .collect()
    }

    async fn get_invoice(
        &self,
        id: i64,
    ) -> Result<Invoice, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or(RepositoryError::NotFound)?;

        let items = self.items_for(id).await?;
        row_to_invoice(&row, items)
    }

    async fn create_invoice(
        &self,
        invoice: NewInvoice,
    ) -> Result<Invoice, RepositoryError> {
        let now = Utc::now();
        let totals = invoice.totals();
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let result = sqlx::query(
            "INSERT INTO invoices (
                invoice_number, client_id, issue_date, due_date, discount, status, notes,
                subtotal, discount_amount, tax, total, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&invoice.invoice_number)
        .bind(invoice.client_id)
        .bind(invoice.issue_date)
        .bind(invoice.due_date)
        .bind(decimal_to_text(invoice.discount))
        .bind(invoice.status.as_str())
        .bind(&invoice.notes)
        .bind(decimal_to_text(totals.subtotal))
        .bind(decimal_to_text(totals.discount_amount))
        .bind(decimal_to_text(totals.tax))
        .bind(decimal_to_text(totals.total))
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        let id = result.last_insert_rowid();
        insert_items(&mut tx, id, &invoice.items).await?;
        tx.commit().await.map_err(db_err)?;

        tracing::debug!(id, number = %invoice.invoice_number, "invoice inserted");
        self.get_invoice(id).await
    }

    async fn update_invoice(
        &self,
        invoice: &Invoice,
    ) -> Result<(), RepositoryError> {
        let now = Utc::now();
        let totals = invoice.totals();
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let result = sqlx::query(
            "UPDATE invoices SET
                invoice_number = ?, client_id = ?, issue_date = ?, due_date = ?,
                discount = ?, status = ?, notes = ?,
                subtotal = ?, discount_amount = ?, tax = ?, total = ?,
                updated_at = ?
             WHERE id = ?",
        )
        .bind(&invoice.invoice_number)
        .bind(invoice.client_id)
        .bind(invoice.issue_date)
        .bind(invoice.due_date)
        .bind(decimal_to_text(invoice.discount))
        .bind(invoice.status.as_str())
        .bind(&invoice.notes)
        .bind(decimal_to_text(totals.subtotal))
        .bind(decimal_to_text(totals.discount_amount))
        .bind(decimal_to_text(totals.tax))
        .bind(decimal_to_text(totals.total))
        .bind(now)
        .bind(invoice.id)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = ?")
            .bind(invoice.id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        insert_items(&mut tx, invoice.id, &invoice.items).await?;

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn delete_invoice(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;

    async fn setup_test_db() -> SqliteRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        let repo = SqliteRepository::new_with_pool(pool).await;
        repo.run_migrations()
            .await
            .expect("Failed to run migrations");
        repo
    }

    #[test]
    fn in_memory_pool_keeps_its_only_connection() {
        let options = pool_options("sqlite::memory:");

        assert_eq!(options.get_max_connections(), 1);
        assert_eq!(options.get_min_connections(), 1);
        assert_eq!(options.get_idle_timeout(), None);
        assert_eq!(options.get_max_lifetime(), None);
    }

    #[test]
    fn file_pool_uses_several_connections() {
        let options = pool_options("sqlite:invoices.db?mode=rwc");

        assert_eq!(options.get_max_connections(), 5);
    }

    #[tokio::test]
    async fn in_memory_url_keeps_data_across_calls() {
        let repo = SqliteRepository::new("sqlite::memory:")
            .await
            .expect("Failed to open in-memory database");
        repo.run_migrations()
            .await
            .expect("Failed to run migrations");

        repo.create_client(new_client("Acme Corp", "contact@acme.com"))
            .await
            .unwrap();

        assert_eq!(repo.list_clients().await.unwrap().len(), 1);
    }

    fn new_client(
        name: &str,
        email: &str,
    ) -> NewClient {
        NewClient {
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            address: None,
            company: None,
        }
    }

    async fn insert_test_client(repo: &SqliteRepository) -> Client {
        repo.create_client(NewClient {
            company: Some("Acme Corporation".to_string()),
            phone: Some("555-0100".to_string()),
            ..new_client("Acme Corp", "contact@acme.com")
        })
        .await
        .expect("Should create client")
    }

    fn create_test_invoice(client_id: i64) -> NewInvoice {
        NewInvoice {
            invoice_number: "INV-001".to_string(),
            client_id,
            issue_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 2, 15).unwrap(),
            items: vec![
                InvoiceItem::new(3, "Consulting", dec!(2), dec!(50)),
                InvoiceItem::new(1, "Setup", dec!(1), dec!(100)),
                InvoiceItem::new(2, "Rounding check", dec!(0.333), dec!(3.33)),
            ],
            discount: dec!(10),
            status: InvoiceStatus::Draft,
            notes: "Net 30".to_string(),
        }
    }

    // =========================================================================
    // clients
    // =========================================================================

    #[tokio::test]
    async fn test_create_and_get_client() {
        let repo = setup_test_db().await;

        let created = insert_test_client(&repo).await;
        let fetched = repo.get_client(created.id).await.expect("Should fetch client");

        assert!(created.id > 0);
        assert_eq!(fetched, created);
        assert_eq!(fetched.company.as_deref(), Some("Acme Corporation"));
        assert_eq!(fetched.address, None);
    }

    #[tokio::test]
    async fn test_get_client_not_found() {
        let repo = setup_test_db().await;

        assert_eq!(repo.get_client(99999).await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_list_clients_sorted_by_name() {
        let repo = setup_test_db().await;
        repo.create_client(new_client("Tech Solutions", "info@techsolutions.com"))
            .await
            .unwrap();
        repo.create_client(new_client("Design Studio", "hello@designstudio.com"))
            .await
            .unwrap();

        let names: Vec<String> = repo
            .list_clients()
            .await
            .expect("Should list clients")
            .into_iter()
            .map(|c| c.name)
            .collect();

        assert_eq!(names, vec!["Design Studio", "Tech Solutions"]);
    }

    #[tokio::test]
    async fn test_duplicate_client_email_is_rejected() {
        let repo = setup_test_db().await;
        insert_test_client(&repo).await;

        let result = repo
            .create_client(new_client("Acme Again", "contact@acme.com"))
            .await;

        assert!(matches!(result, Err(RepositoryError::Database(_))));
    }

    // =========================================================================
    // invoices
    // =========================================================================

    #[tokio::test]
    async fn test_create_and_get_invoice() {
        let repo = setup_test_db().await;
        let client = insert_test_client(&repo).await;

        let created = repo
            .create_invoice(create_test_invoice(client.id))
            .await
            .expect("Should create invoice");

        assert!(created.id > 0);
        assert_eq!(created.invoice_number, "INV-001");
        assert_eq!(created.client_id, client.id);
        assert_eq!(created.discount, dec!(10));
        assert_eq!(created.status, InvoiceStatus::Draft);
        assert_eq!(created.notes, "Net 30");
        assert_eq!(created.items, create_test_invoice(client.id).items);

        let fetched = repo
            .get_invoice(created.id)
            .await
            .expect("Should fetch invoice");
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_items_keep_insertion_order_not_id_order() {
        let repo = setup_test_db().await;
        let client = insert_test_client(&repo).await;

        let created = repo
            .create_invoice(create_test_invoice(client.id))
            .await
            .unwrap();

        let ids: Vec<i64> = created.items.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_stored_totals_match_calculator() {
        let repo = setup_test_db().await;
        let client = insert_test_client(&repo).await;
        let created = repo
            .create_invoice(create_test_invoice(client.id))
            .await
            .unwrap();

        let row = sqlx::query(
            "SELECT subtotal, discount_amount, tax, total FROM invoices WHERE id = ?",
        )
        .bind(created.id)
        .fetch_one(repo.pool())
        .await
        .unwrap();

        let totals = created.totals();
        assert_eq!(get_decimal(&row, "subtotal"), Ok(totals.subtotal));
        assert_eq!(get_decimal(&row, "discount_amount"), Ok(totals.discount_amount));
        assert_eq!(get_decimal(&row, "tax"), Ok(totals.tax));
        assert_eq!(get_decimal(&row, "total"), Ok(totals.total));
        // 200 + 0.333 * 3.33 kept at full precision
        assert_eq!(totals.subtotal, dec!(201.10889));
    }

    #[tokio::test]
    async fn test_create_invoice_for_unknown_client_fails() {
        let repo = setup_test_db().await;

        let result = repo.create_invoice(create_test_invoice(424242)).await;

        assert!(matches!(result, Err(RepositoryError::Database(_))));
        assert_eq!(repo.list_invoices().await, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn test_duplicate_invoice_number_leaves_no_partial_rows() {
        let repo = setup_test_db().await;
        let client = insert_test_client(&repo).await;
        repo.create_invoice(create_test_invoice(client.id))
            .await
            .unwrap();

        let result = repo.create_invoice(create_test_invoice(client.id)).await;

        assert!(matches!(result, Err(RepositoryError::Database(_))));
        let item_count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM invoice_items")
            .fetch_one(repo.pool())
            .await
            .unwrap()
            .get("n");
        assert_eq!(item_count, 3);
    }

    #[tokio::test]
    async fn test_update_invoice_replaces_items() {
        let repo = setup_test_db().await;
        let client = insert_test_client(&repo).await;
        let mut invoice = repo
            .create_invoice(create_test_invoice(client.id))
            .await
            .unwrap();

        invoice.items = vec![InvoiceItem::new(1, "Retainer", dec!(1), dec!(900))];
        invoice.discount = Decimal::ZERO;
        invoice.status = InvoiceStatus::Sent;
        invoice.notes = String::new();
        repo.update_invoice(&invoice)
            .await
            .expect("Should update invoice");

        let fetched = repo.get_invoice(invoice.id).await.unwrap();
        assert_eq!(fetched.items, invoice.items);
        assert_eq!(fetched.status, InvoiceStatus::Sent);
        assert_eq!(fetched.totals().total, dec!(990));
        assert_eq!(fetched.created_at, invoice.created_at);
        assert!(fetched.updated_at >= invoice.updated_at);
    }

    #[tokio::test]
    async fn test_update_invoice_not_found() {
        let repo = setup_test_db().await;
        let client = insert_test_client(&repo).await;
        let mut invoice = repo
            .create_invoice(create_test_invoice(client.id))
            .await
            .unwrap();

        invoice.id = 99999;

        assert_eq!(
            repo.update_invoice(&invoice).await,
            Err(RepositoryError::NotFound)
        );
    }

    #[tokio::test]
    async fn test_delete_invoice_removes_items() {
        let repo = setup_test_db().await;
        let client = insert_test_client(&repo).await;
        let invoice = repo
            .create_invoice(create_test_invoice(client.id))
            .await
            .unwrap();

        repo.delete_invoice(invoice.id)
            .await
            .expect("Should delete invoice");

        assert_eq!(
            repo.get_invoice(invoice.id).await,
            Err(RepositoryError::NotFound)
        );
        let remaining = sqlx::query("SELECT item_id FROM invoice_items")
            .fetch_all(repo.pool())
            .await
            .unwrap();
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn test_delete_invoice_not_found() {
        let repo = setup_test_db().await;

        assert_eq!(
            repo.delete_invoice(99999).await,
            Err(RepositoryError::NotFound)
        );
    }

    #[tokio::test]
    async fn test_list_invoices_groups_items_per_invoice() {
        let repo = setup_test_db().await;
        let client = insert_test_client(&repo).await;
        let first = repo
            .create_invoice(create_test_invoice(client.id))
            .await
            .unwrap();
        let second = repo
            .create_invoice(NewInvoice {
                invoice_number: "INV-002".to_string(),
                items: vec![InvoiceItem::new(1, "Hosting", dec!(12), dec!(20))],
                status: InvoiceStatus::Paid,
                ..create_test_invoice(client.id)
            })
            .await
            .unwrap();

        let listed = repo.list_invoices().await.expect("Should list invoices");

        assert_eq!(listed, vec![first, second]);
    }

    #[tokio::test]
    async fn test_invalid_status_in_database_is_reported() {
        let repo = setup_test_db().await;
        let client = insert_test_client(&repo).await;
        let invoice = repo
            .create_invoice(create_test_invoice(client.id))
            .await
            .unwrap();

        // Bypass the CHECK constraint the way a manual edit would
        sqlx::query("PRAGMA ignore_check_constraints = ON")
            .execute(repo.pool())
            .await
            .unwrap();
        sqlx::query("UPDATE invoices SET status = 'void' WHERE id = ?")
            .bind(invoice.id)
            .execute(repo.pool())
            .await
            .unwrap();

        assert!(matches!(
            repo.get_invoice(invoice.id).await,
            Err(RepositoryError::Database(_))
        ));
    }
}
