//! Modelo de Transaction
//!
//! Una transacción registra un movimiento financiero: ingreso, gasto,
//! pago de deuda o costo de reparación. El monto siempre es positivo y el
//! estado sólo avanza de `Pending` a `Completed` o `Failed`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use super::codes::coded_enum;
use super::ids::{InvoiceId, TransactionId};
use super::payment::PaymentMethod;
use crate::utils::validation::{self, field};

pub const MAX_DESCRIPTION_LENGTH: usize = 255;
pub const MAX_ACTOR_LENGTH: usize = 50;

coded_enum! {
    /// Tipo de transacción
    pub enum TransactionType {
        Revenue = 1 => "Revenue",
        Expense = 2 => "Expense",
        DebtPayment = 3 => "Debt payment",
        RepairCost = 4 => "Repair cost",
    }
}

coded_enum! {
    /// Estado de la transacción
    #[derive(Default)]
    pub enum TransactionStatus {
        #[default]
        Pending = 1 => "Pending",
        Completed = 2 => "Completed",
        Failed = 3 => "Failed",
    }
}

impl TransactionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TransactionStatus::Completed | TransactionStatus::Failed)
    }

    /// Transiciones permitidas: Pending → Completed | Failed.
    /// Quedarse en el mismo estado siempre es válido.
    pub fn can_transition_to(self, next: TransactionStatus) -> bool {
        self == next || (self == TransactionStatus::Pending && next.is_terminal())
    }
}

fn validate_amount(amount: &Decimal) -> Result<(), ValidationError> {
    validation::validate_positive(*amount)?;
    validation::validate_money(amount)
}

fn validate_description(description: &str) -> Result<(), ValidationError> {
    validation::validate_max_length(description, MAX_DESCRIPTION_LENGTH)
}

fn validate_actor(actor: &str) -> Result<(), ValidationError> {
    validation::validate_max_length(actor, MAX_ACTOR_LENGTH)
}

/// Datos para registrar una nueva transacción
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewTransaction {
    pub invoice_id: Option<InvoiceId>,
    pub transaction_type: TransactionType,
    pub payment_method: PaymentMethod,

    #[validate(custom = "validate_amount")]
    pub amount: Decimal,

    #[validate(custom = "validate_description")]
    pub description: Option<String>,

    pub transaction_date: DateTime<Utc>,

    #[validate(custom = "validate_actor")]
    pub created_by: Option<String>,
}

/// Transacción financiera
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
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

impl Transaction {
    /// Crear una transacción en estado `Pending`
    pub fn new(id: TransactionId, draft: NewTransaction) -> Result<Self, ValidationErrors> {
        draft.validate()?;

        Ok(Self {
            id,
            invoice_id: draft.invoice_id,
            transaction_type: draft.transaction_type,
            payment_method: draft.payment_method,
            amount: draft.amount,
            status: TransactionStatus::Pending,
            description: draft.description,
            transaction_date: draft.transaction_date,
            created_by: draft.created_by,
            modified_by: None,
        })
    }

    /// Reconstruir una transacción guardada, revalidando todos los campos
    pub fn restore(
        id: TransactionId,
        draft: NewTransaction,
        status: TransactionStatus,
        modified_by: Option<String>,
    ) -> Result<Self, ValidationErrors> {
        let modified_check = match modified_by.as_deref() {
            Some(actor) => field("modified_by", validate_actor(actor)),
            None => Ok(()),
        };
        validation::merge(draft.validate(), modified_check)?;

        let mut transaction = Self::new(id, draft)?;
        transaction.status = status;
        transaction.modified_by = modified_by;
        Ok(transaction)
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn invoice_id(&self) -> Option<InvoiceId> {
        self.invoice_id
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn transaction_date(&self) -> DateTime<Utc> {
        self.transaction_date
    }

    pub fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }

    pub fn modified_by(&self) -> Option<&str> {
        self.modified_by.as_deref()
    }

    pub fn set_amount(&mut self, amount: Decimal) -> Result<(), ValidationErrors> {
        field("amount", validate_amount(&amount))?;
        self.amount = amount;
        Ok(())
    }

    pub fn set_description(&mut self, description: Option<String>) -> Result<(), ValidationErrors> {
        if let Some(text) = description.as_deref() {
            field("description", validate_description(text))?;
        }
        self.description = description;
        Ok(())
    }

    pub fn set_payment_method(&mut self, payment_method: PaymentMethod) {
        self.payment_method = payment_method;
    }

    pub fn set_invoice_id(&mut self, invoice_id: Option<InvoiceId>) {
        self.invoice_id = invoice_id;
    }

    pub fn set_modified_by(&mut self, actor: impl Into<String>) -> Result<(), ValidationErrors> {
        let actor = actor.into();
        field("modified_by", validate_actor(&actor))?;
        self.modified_by = Some(actor);
        Ok(())
    }

    /// Cambiar el estado respetando Pending → Completed | Failed
    pub fn transition_to(&mut self, next: TransactionStatus) -> Result<(), ValidationErrors> {
        if !self.status.can_transition_to(next) {
            let mut error = ValidationError::new("status_transition");
            error.add_param("from".into(), &self.status);
            error.add_param("to".into(), &next);
            error.message = Some(
                format!("cannot move transaction from {} to {}", self.status, next).into(),
            );
            return field("status", Err(error));
        }
        self.status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft(amount: Decimal) -> NewTransaction {
        NewTransaction {
            invoice_id: None,
            transaction_type: TransactionType::Revenue,
            payment_method: PaymentMethod::Cash,
            amount,
            description: Some("Oil change".to_string()),
            transaction_date: Utc.with_ymd_and_hms(2025, 5, 2, 9, 30, 0).unwrap(),
            created_by: Some("cashier-01".to_string()),
        }
    }

    #[test]
    fn test_new_transaction_is_pending() {
        let tx = Transaction::new(TransactionId::new(), draft(Decimal::new(250_000, 0))).unwrap();
        assert_eq!(tx.status(), TransactionStatus::Pending);
        assert_eq!(tx.amount(), Decimal::new(250_000, 0));
        assert_eq!(tx.modified_by(), None);
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        for amount in [Decimal::ZERO, Decimal::new(-1, 2), Decimal::new(-500, 0)] {
            let errors = Transaction::new(TransactionId::new(), draft(amount)).unwrap_err();
            assert!(errors.field_errors().contains_key("amount"));
        }

        let mut tx = Transaction::new(TransactionId::new(), draft(Decimal::ONE)).unwrap();
        assert!(tx.set_amount(Decimal::ZERO).is_err());
        assert_eq!(tx.amount(), Decimal::ONE);
        assert!(tx.set_amount(Decimal::new(1, 2)).is_ok());
    }

    #[test]
    fn test_amount_must_fit_storage() {
        for amount in [Decimal::new(1, 3), Decimal::new(12_345, 4), Decimal::MAX] {
            let errors = Transaction::new(TransactionId::new(), draft(amount)).unwrap_err();
            assert!(errors.field_errors().contains_key("amount"), "{amount} accepted");
        }

        let mut tx = Transaction::new(TransactionId::new(), draft(Decimal::new(1_250, 3))).unwrap();
        assert!(tx.set_amount(Decimal::new(5, 3)).is_err());
        assert_eq!(tx.amount(), Decimal::new(125, 2));
    }

    #[test]
    fn test_description_bounded() {
        let mut long = draft(Decimal::ONE);
        long.description = Some("x".repeat(MAX_DESCRIPTION_LENGTH + 1));
        let errors = Transaction::new(TransactionId::new(), long).unwrap_err();
        assert!(errors.field_errors().contains_key("description"));

        let mut tx = Transaction::new(TransactionId::new(), draft(Decimal::ONE)).unwrap();
        assert!(tx.set_description(Some("x".repeat(MAX_DESCRIPTION_LENGTH))).is_ok());
        assert!(tx.set_description(Some("x".repeat(MAX_DESCRIPTION_LENGTH + 1))).is_err());
        assert!(tx.set_description(None).is_ok());
    }

    #[test]
    fn test_actor_fields_bounded() {
        let mut bad = draft(Decimal::ONE);
        bad.created_by = Some("a".repeat(51));
        assert!(Transaction::new(TransactionId::new(), bad).is_err());

        let mut tx = Transaction::new(TransactionId::new(), draft(Decimal::ONE)).unwrap();
        assert!(tx.set_modified_by("a".repeat(51)).is_err());
        tx.set_modified_by("accountant-02").unwrap();
        assert_eq!(tx.modified_by(), Some("accountant-02"));
    }

    #[test]
    fn test_status_transitions() {
        let mut tx = Transaction::new(TransactionId::new(), draft(Decimal::ONE)).unwrap();
        tx.transition_to(TransactionStatus::Completed).unwrap();
        assert_eq!(tx.status(), TransactionStatus::Completed);

        let errors = tx.transition_to(TransactionStatus::Failed).unwrap_err();
        assert!(errors.field_errors().contains_key("status"));
        assert!(tx.transition_to(TransactionStatus::Pending).is_err());
        assert!(tx.transition_to(TransactionStatus::Completed).is_ok());
    }

    #[test]
    fn test_restore_keeps_status() {
        let tx = Transaction::restore(
            TransactionId::new(),
            draft(Decimal::TEN),
            TransactionStatus::Failed,
            Some("auditor".to_string()),
        )
        .unwrap();
        assert_eq!(tx.status(), TransactionStatus::Failed);
        assert_eq!(tx.modified_by(), Some("auditor"));
    }
}
