//! Identificadores tipados
//!
//! Cada entidad y cada clave foránea tiene su propio newtype sobre `Uuid`,
//! así un `VehicleId` no puede pasarse donde se espera un `CustomerId`.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

entity_id!(
    /// Id de cliente (dueño del vehículo)
    CustomerId
);
entity_id!(
    /// Id de factura
    InvoiceId
);
entity_id!(EmployeeId);
entity_id!(TransactionId);
entity_id!(VehicleId);
entity_id!(RepairOrderId);
entity_id!(RepairTaskId);
entity_id!(ReplacementPartId);
entity_id!(
    /// Id de un servicio del catálogo del taller
    ServiceItemId
);
entity_id!(RepairHistoryId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_display_as_uuid() {
        let a = VehicleId::new();
        let b = VehicleId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string(), a.as_uuid().to_string());
    }

    #[test]
    fn test_id_serializes_transparently() {
        let uuid = Uuid::nil();
        let id = CustomerId::from(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
    }
}
