use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use crate::models::{InvoiceId, NewTransaction, Transaction, TransactionId, TransactionStatus};
use crate::repositories::TransactionRepository;
use crate::utils::errors::{not_found_error, AppError, AppResult};

/// Servicio de movimientos financieros
pub struct TransactionService {
    transactions: Arc<dyn TransactionRepository>,
}

impl TransactionService {
    pub fn new(transactions: Arc<dyn TransactionRepository>) -> Self {
        Self { transactions }
    }

    pub async fn record(&self, draft: NewTransaction) -> AppResult<Transaction> {
        let transaction = Transaction::new(TransactionId::new(), draft)?;
        self.transactions.insert(&transaction).await?;
        info!(
            "🧾 Transacción {} registrada: {} {}",
            transaction.id(),
            transaction.transaction_type(),
            transaction.amount()
        );
        Ok(transaction)
    }

    pub async fn get(&self, id: TransactionId) -> AppResult<Transaction> {
        self.transactions
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Transaction", id))
    }

    pub async fn complete(&self, id: TransactionId, actor: &str) -> AppResult<Transaction> {
        self.move_to(id, TransactionStatus::Completed, actor).await
    }

    pub async fn fail(&self, id: TransactionId, actor: &str) -> AppResult<Transaction> {
        self.move_to(id, TransactionStatus::Failed, actor).await
    }

    pub async fn for_invoice(&self, invoice_id: InvoiceId) -> AppResult<Vec<Transaction>> {
        self.transactions.find_by_invoice(invoice_id).await
    }

    /// Suma de los montos completados de una factura
    pub async fn completed_total(&self, invoice_id: InvoiceId) -> AppResult<Decimal> {
        self.for_invoice(invoice_id)
            .await?
            .iter()
            .filter(|t| t.status() == TransactionStatus::Completed)
            .try_fold(Decimal::ZERO, |total, t| total.checked_add(t.amount()))
            .ok_or_else(|| {
                AppError::Internal(format!("Completed total of invoice '{}' overflows", invoice_id))
            })
    }

    async fn move_to(
        &self,
        id: TransactionId,
        next: TransactionStatus,
        actor: &str,
    ) -> AppResult<Transaction> {
        let mut transaction = self.get(id).await?;
        transaction.transition_to(next)?;
        transaction.set_modified_by(actor)?;
        self.transactions.update(&transaction).await?;

        info!("✅ Transacción {} → {}", id, next);
        Ok(transaction)
    }
}
