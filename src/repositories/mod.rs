//! Repositorios
//!
//! Cada entidad tiene un trait de repositorio. Las referencias entre
//! entidades (cliente, vehículo, factura) se resuelven a través de estos
//! traits en lugar de grafos de objetos embebidos.
//!
//! Hay dos implementaciones: PostgreSQL (`Pg*Repository`) y una en memoria
//! (`InMemoryStore`) que implementa todos los traits a la vez.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{
    CustomerId, CustomerType, Employee, EmployeeId, InvoiceId, LicensePlate, RepairHistoryEntry,
    RepairOrder, RepairOrderId, Transaction, TransactionId, Vehicle, VehicleId,
};
use crate::utils::errors::AppResult;

pub mod customer_repository;
pub mod employee_repository;
pub mod memory;
pub mod repair_order_repository;
pub mod transaction_repository;
pub mod vehicle_repository;

pub use customer_repository::PgCustomerRepository;
pub use employee_repository::PgEmployeeRepository;
pub use memory::InMemoryStore;
pub use repair_order_repository::PgRepairOrderRepository;
pub use transaction_repository::PgTransactionRepository;
pub use vehicle_repository::PgVehicleRepository;

/// Consulta de clientes; la tabla de clientes pertenece a la aplicación
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn find_customer_type(&self, id: CustomerId) -> AppResult<Option<CustomerType>>;

    async fn exists(&self, id: CustomerId) -> AppResult<bool> {
        Ok(self.find_customer_type(id).await?.is_some())
    }
}

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    async fn insert(&self, vehicle: &Vehicle) -> AppResult<()>;
    async fn update(&self, vehicle: &Vehicle) -> AppResult<()>;
    async fn find_by_id(&self, id: VehicleId) -> AppResult<Option<Vehicle>>;
    async fn find_by_customer(&self, customer_id: CustomerId) -> AppResult<Vec<Vehicle>>;
    async fn find_by_license_plate(&self, plate: &LicensePlate) -> AppResult<Option<Vehicle>>;
    async fn add_history_entry(&self, entry: &RepairHistoryEntry) -> AppResult<()>;
    async fn repair_history(&self, vehicle_id: VehicleId) -> AppResult<Vec<RepairHistoryEntry>>;
}

#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn insert(&self, employee: &Employee) -> AppResult<()>;
    async fn update(&self, employee: &Employee) -> AppResult<()>;
    async fn find_by_id(&self, id: EmployeeId) -> AppResult<Option<Employee>>;
    async fn find_all(&self) -> AppResult<Vec<Employee>>;

    /// Persistir `Inactive` en los empleados con fecha de fin anterior a
    /// `now` que todavía no lo estaban. Devuelve cuántos cambiaron.
    async fn deactivate_expired(&self, now: DateTime<Utc>) -> AppResult<usize>;
}

#[async_trait]
pub trait RepairOrderRepository: Send + Sync {
    async fn insert(&self, order: &RepairOrder) -> AppResult<()>;
    /// Reemplaza la orden y todas sus líneas
    async fn update(&self, order: &RepairOrder) -> AppResult<()>;
    async fn find_by_id(&self, id: RepairOrderId) -> AppResult<Option<RepairOrder>>;
    async fn find_by_vehicle(&self, vehicle_id: VehicleId) -> AppResult<Vec<RepairOrder>>;

    /// Registrar la liquidación de una orden: la entrada de historial y la
    /// transacción se escriben juntas o no se escribe ninguna. Si la orden ya
    /// tiene historial devuelve `Conflict`.
    async fn record_settlement(
        &self,
        entry: &RepairHistoryEntry,
        transaction: &Transaction,
    ) -> AppResult<()>;
}

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn insert(&self, transaction: &Transaction) -> AppResult<()>;
    async fn update(&self, transaction: &Transaction) -> AppResult<()>;
    async fn find_by_id(&self, id: TransactionId) -> AppResult<Option<Transaction>>;
    async fn find_by_invoice(&self, invoice_id: InvoiceId) -> AppResult<Vec<Transaction>>;
}
