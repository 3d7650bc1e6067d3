use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};

use super::TransactionRepository;
use crate::models::{
    InvoiceId, NewTransaction, PaymentMethod, Transaction, TransactionId, TransactionStatus,
    TransactionType,
};
use crate::utils::errors::{database_error, AppError, AppResult};

const TRANSACTION_COLUMNS: &str = "id, invoice_id, transaction_type, payment_method, amount, \
     status, description, transaction_date, created_by, modified_by";

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: TransactionId,
    invoice_id: Option<InvoiceId>,
    transaction_type: TransactionType,
    payment_method: PaymentMethod,
    amount: Decimal,
    status: TransactionStatus,
    description: Option<String>,
    transaction_date: DateTime<Utc>,
    created_by: Option<String>,
    modified_by: Option<String>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = AppError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let draft = NewTransaction {
            invoice_id: row.invoice_id,
            transaction_type: row.transaction_type,
            payment_method: row.payment_method,
            amount: row.amount,
            description: row.description,
            transaction_date: row.transaction_date,
            created_by: row.created_by,
        };
        Ok(Transaction::restore(row.id, draft, row.status, row.modified_by)?)
    }
}

pub(super) async fn insert_transaction<'e>(
    executor: impl PgExecutor<'e>,
    transaction: &Transaction,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO transactions (id, invoice_id, transaction_type, payment_method, amount,
            status, description, transaction_date, created_by, modified_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(transaction.id())
    .bind(transaction.invoice_id())
    .bind(transaction.transaction_type())
    .bind(transaction.payment_method())
    .bind(transaction.amount())
    .bind(transaction.status())
    .bind(transaction.description())
    .bind(transaction.transaction_date())
    .bind(transaction.created_by())
    .bind(transaction.modified_by())
    .execute(executor)
    .await
    .map_err(|e| database_error("Error creating transaction", e))?;

    Ok(())
}

pub struct PgTransactionRepository {
    pool: PgPool,
}

impl PgTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRepository for PgTransactionRepository {
    async fn insert(&self, transaction: &Transaction) -> AppResult<()> {
        insert_transaction(&self.pool, transaction).await
    }

    async fn update(&self, transaction: &Transaction) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET invoice_id = $2, payment_method = $3, amount = $4, status = $5,
                description = $6, modified_by = $7
            WHERE id = $1
            "#,
        )
        .bind(transaction.id())
        .bind(transaction.invoice_id())
        .bind(transaction.payment_method())
        .bind(transaction.amount())
        .bind(transaction.status())
        .bind(transaction.description())
        .bind(transaction.modified_by())
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("Error updating transaction", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Transaction not found".to_string()));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: TransactionId) -> AppResult<Option<Transaction>> {
        let query = format!("SELECT {} FROM transactions WHERE id = $1", TRANSACTION_COLUMNS);
        let row = sqlx::query_as::<_, TransactionRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("Error finding transaction", e))?;

        row.map(Transaction::try_from).transpose()
    }

    async fn find_by_invoice(&self, invoice_id: InvoiceId) -> AppResult<Vec<Transaction>> {
        let query = format!(
            "SELECT {} FROM transactions WHERE invoice_id = $1 ORDER BY transaction_date ASC",
            TRANSACTION_COLUMNS
        );
        let rows = sqlx::query_as::<_, TransactionRow>(&query)
            .bind(invoice_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database_error("Error listing transactions", e))?;

        rows.into_iter().map(Transaction::try_from).collect()
    }
}
