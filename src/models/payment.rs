//! Métodos de pago

use super::codes::coded_enum;

coded_enum! {
    /// Método de pago de una transacción
    pub enum PaymentMethod {
        Cash = 1 => "Cash",
        BankTransfer = 2 => "Bank transfer",
        CreditCard = 3 => "Credit card",
        EWallet = 4 => "E-wallet",
    }
}
