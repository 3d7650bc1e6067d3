//! Almacenamiento en memoria
//!
//! Implementa todos los traits de repositorio sobre mapas protegidos por
//! `RwLock`. Aplica las mismas restricciones que el esquema SQL (ids y
//! matrículas únicas) y se usa en tests y en ejecuciones sin base de datos.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use super::{
    CustomerRepository, EmployeeRepository, RepairOrderRepository, TransactionRepository,
    VehicleRepository,
};
use crate::models::{
    CustomerId, CustomerType, Employee, EmployeeId, EmploymentStatus, InvoiceId, LicensePlate,
    RepairHistoryEntry, RepairOrder, RepairOrderId, Transaction, TransactionId, Vehicle,
    VehicleId,
};
use crate::utils::errors::{conflict_error, AppError, AppResult};
use crate::utils::Clock;

#[derive(Clone)]
pub struct InMemoryStore {
    clock: Arc<dyn Clock>,
    customers: Arc<RwLock<HashMap<CustomerId, CustomerType>>>,
    vehicles: Arc<RwLock<HashMap<VehicleId, Vehicle>>>,
    histories: Arc<RwLock<Vec<RepairHistoryEntry>>>,
    employees: Arc<RwLock<HashMap<EmployeeId, Employee>>>,
    repair_orders: Arc<RwLock<HashMap<RepairOrderId, RepairOrder>>>,
    transactions: Arc<RwLock<HashMap<TransactionId, Transaction>>>,
}

impl InMemoryStore {
    /// `clock` se usa para recalcular el estado de los empleados al leerlos
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            customers: Arc::new(RwLock::new(HashMap::new())),
            vehicles: Arc::new(RwLock::new(HashMap::new())),
            histories: Arc::new(RwLock::new(Vec::new())),
            employees: Arc::new(RwLock::new(HashMap::new())),
            repair_orders: Arc::new(RwLock::new(HashMap::new())),
            transactions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registrar un cliente; la gestión de clientes vive fuera de este crate
    pub async fn add_customer(&self, id: CustomerId, customer_type: CustomerType) {
        self.customers.write().await.insert(id, customer_type);
        debug!("👤 Cliente {} registrado en memoria", id);
    }
}

/// Las mismas restricciones que `repair_histories`: vehículo existente y
/// una sola entrada por orden
fn check_history_entry(
    vehicles: &HashMap<VehicleId, Vehicle>,
    histories: &[RepairHistoryEntry],
    entry: &RepairHistoryEntry,
) -> AppResult<()> {
    if !vehicles.contains_key(&entry.vehicle_id) {
        return Err(AppError::NotFound("Vehicle not found".to_string()));
    }
    if histories
        .iter()
        .any(|h| h.repair_order_id == entry.repair_order_id)
    {
        return Err(conflict_error(
            "Repair history",
            "repair_order_id",
            &entry.repair_order_id.to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl CustomerRepository for InMemoryStore {
    async fn find_customer_type(&self, id: CustomerId) -> AppResult<Option<CustomerType>> {
        Ok(self.customers.read().await.get(&id).copied())
    }
}

#[async_trait]
impl VehicleRepository for InMemoryStore {
    async fn insert(&self, vehicle: &Vehicle) -> AppResult<()> {
        let mut vehicles = self.vehicles.write().await;
        if vehicles.contains_key(&vehicle.id()) {
            return Err(conflict_error("Vehicle", "id", &vehicle.id().to_string()));
        }
        if vehicles
            .values()
            .any(|v| v.license_plate() == vehicle.license_plate())
        {
            return Err(conflict_error(
                "Vehicle",
                "license_plate",
                vehicle.license_plate().as_str(),
            ));
        }
        vehicles.insert(vehicle.id(), vehicle.clone());
        Ok(())
    }

    async fn update(&self, vehicle: &Vehicle) -> AppResult<()> {
        let mut vehicles = self.vehicles.write().await;
        if vehicles
            .values()
            .any(|v| v.id() != vehicle.id() && v.license_plate() == vehicle.license_plate())
        {
            return Err(conflict_error(
                "Vehicle",
                "license_plate",
                vehicle.license_plate().as_str(),
            ));
        }
        match vehicles.get_mut(&vehicle.id()) {
            Some(stored) => {
                *stored = vehicle.clone();
                Ok(())
            }
            None => Err(AppError::NotFound("Vehicle not found".to_string())),
        }
    }

    async fn find_by_id(&self, id: VehicleId) -> AppResult<Option<Vehicle>> {
        Ok(self.vehicles.read().await.get(&id).cloned())
    }

    async fn find_by_customer(&self, customer_id: CustomerId) -> AppResult<Vec<Vehicle>> {
        let vehicles = self.vehicles.read().await;
        let mut owned: Vec<Vehicle> = vehicles
            .values()
            .filter(|v| v.customer_id() == customer_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.registration_date().cmp(&a.registration_date()));
        Ok(owned)
    }

    async fn find_by_license_plate(&self, plate: &LicensePlate) -> AppResult<Option<Vehicle>> {
        let vehicles = self.vehicles.read().await;
        Ok(vehicles.values().find(|v| v.license_plate() == plate).cloned())
    }

    async fn add_history_entry(&self, entry: &RepairHistoryEntry) -> AppResult<()> {
        let vehicles = self.vehicles.read().await;
        let mut histories = self.histories.write().await;
        check_history_entry(&vehicles, &histories, entry)?;
        histories.push(entry.clone());
        Ok(())
    }

    async fn repair_history(&self, vehicle_id: VehicleId) -> AppResult<Vec<RepairHistoryEntry>> {
        let histories = self.histories.read().await;
        let mut entries: Vec<RepairHistoryEntry> = histories
            .iter()
            .filter(|h| h.vehicle_id == vehicle_id)
            .cloned()
            .collect();
        entries.sort_by_key(|h| h.repair_date);
        Ok(entries)
    }
}

#[async_trait]
impl EmployeeRepository for InMemoryStore {
    async fn insert(&self, employee: &Employee) -> AppResult<()> {
        let mut employees = self.employees.write().await;
        if employees.contains_key(&employee.id()) {
            return Err(conflict_error("Employee", "id", &employee.id().to_string()));
        }
        employees.insert(employee.id(), employee.clone());
        Ok(())
    }

    async fn update(&self, employee: &Employee) -> AppResult<()> {
        match self.employees.write().await.get_mut(&employee.id()) {
            Some(stored) => {
                *stored = employee.clone();
                Ok(())
            }
            None => Err(AppError::NotFound("Employee not found".to_string())),
        }
    }

    async fn find_by_id(&self, id: EmployeeId) -> AppResult<Option<Employee>> {
        let now = self.clock.now();
        Ok(self.employees.read().await.get(&id).cloned().map(|mut e| {
            e.update_status(now);
            e
        }))
    }

    async fn find_all(&self) -> AppResult<Vec<Employee>> {
        let now = self.clock.now();
        let employees = self.employees.read().await;
        let mut all: Vec<Employee> = employees
            .values()
            .cloned()
            .map(|mut e| {
                e.update_status(now);
                e
            })
            .collect();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(all)
    }

    async fn deactivate_expired(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let mut employees = self.employees.write().await;
        let mut changed = 0;
        for employee in employees.values_mut() {
            let expired = employee.end_date().is_some_and(|end| end < now);
            if expired && employee.status() != EmploymentStatus::Inactive {
                employee.update_status(now);
                changed += 1;
            }
        }
        Ok(changed)
    }
}

#[async_trait]
impl RepairOrderRepository for InMemoryStore {
    async fn insert(&self, order: &RepairOrder) -> AppResult<()> {
        let mut orders = self.repair_orders.write().await;
        if orders.contains_key(&order.id()) {
            return Err(conflict_error("Repair order", "id", &order.id().to_string()));
        }
        orders.insert(order.id(), order.clone());
        Ok(())
    }

    async fn update(&self, order: &RepairOrder) -> AppResult<()> {
        match self.repair_orders.write().await.get_mut(&order.id()) {
            Some(stored) => {
                *stored = order.clone();
                Ok(())
            }
            None => Err(AppError::NotFound("Repair order not found".to_string())),
        }
    }

    async fn find_by_id(&self, id: RepairOrderId) -> AppResult<Option<RepairOrder>> {
        Ok(self.repair_orders.read().await.get(&id).cloned())
    }

    async fn find_by_vehicle(&self, vehicle_id: VehicleId) -> AppResult<Vec<RepairOrder>> {
        let orders = self.repair_orders.read().await;
        let mut found: Vec<RepairOrder> = orders
            .values()
            .filter(|o| o.vehicle_id() == vehicle_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.order_date().cmp(&a.order_date()));
        Ok(found)
    }

    async fn record_settlement(
        &self,
        entry: &RepairHistoryEntry,
        transaction: &Transaction,
    ) -> AppResult<()> {
        // todos los candados antes de validar, nada se escribe si algo falla
        let vehicles = self.vehicles.read().await;
        let mut histories = self.histories.write().await;
        let mut transactions = self.transactions.write().await;

        check_history_entry(&vehicles, &histories, entry)?;
        if transactions.contains_key(&transaction.id()) {
            return Err(conflict_error("Transaction", "id", &transaction.id().to_string()));
        }

        histories.push(entry.clone());
        transactions.insert(transaction.id(), transaction.clone());
        Ok(())
    }
}

#[async_trait]
impl TransactionRepository for InMemoryStore {
    async fn insert(&self, transaction: &Transaction) -> AppResult<()> {
        let mut transactions = self.transactions.write().await;
        if transactions.contains_key(&transaction.id()) {
            return Err(conflict_error("Transaction", "id", &transaction.id().to_string()));
        }
        transactions.insert(transaction.id(), transaction.clone());
        Ok(())
    }

    async fn update(&self, transaction: &Transaction) -> AppResult<()> {
        match self.transactions.write().await.get_mut(&transaction.id()) {
            Some(stored) => {
                *stored = transaction.clone();
                Ok(())
            }
            None => Err(AppError::NotFound("Transaction not found".to_string())),
        }
    }

    async fn find_by_id(&self, id: TransactionId) -> AppResult<Option<Transaction>> {
        Ok(self.transactions.read().await.get(&id).cloned())
    }

    async fn find_by_invoice(&self, invoice_id: InvoiceId) -> AppResult<Vec<Transaction>> {
        let transactions = self.transactions.read().await;
        let mut found: Vec<Transaction> = transactions
            .values()
            .filter(|t| t.invoice_id() == Some(invoice_id))
            .cloned()
            .collect();
        found.sort_by_key(|t| t.transaction_date());
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewEmployee, NewTransaction, NewVehicle, PaymentMethod, TransactionType};
    use crate::utils::FixedClock;
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;

    fn store() -> InMemoryStore {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        InMemoryStore::new(Arc::new(FixedClock::new(now)))
    }

    fn vehicle(plate: &str) -> Vehicle {
        let registered = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        Vehicle::new(
            VehicleId::new(),
            NewVehicle::new(CustomerId::new(), plate, registered),
        )
        .unwrap()
    }

    fn settlement(
        vehicle_id: VehicleId,
        order_id: RepairOrderId,
    ) -> (RepairHistoryEntry, Transaction) {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let invoice_id = InvoiceId::new();
        let entry =
            RepairHistoryEntry::new(vehicle_id, order_id, at, Decimal::new(4_500, 2), None).unwrap();
        let transaction = Transaction::new(
            TransactionId::new(),
            NewTransaction {
                invoice_id: Some(invoice_id),
                transaction_type: TransactionType::RepairCost,
                payment_method: PaymentMethod::Cash,
                amount: Decimal::new(4_500, 2),
                description: None,
                transaction_date: at,
                created_by: None,
            },
        )
        .unwrap();
        (entry, transaction)
    }

    #[tokio::test]
    async fn test_duplicate_plate_is_conflict() {
        let store = store();
        VehicleRepository::insert(&store, &vehicle("30A-1234")).await.unwrap();

        let err = VehicleRepository::insert(&store, &vehicle("30a-1234"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "CONFLICT");
    }

    #[tokio::test]
    async fn test_update_unknown_vehicle_is_not_found() {
        let store = store();
        let err = VehicleRepository::update(&store, &vehicle("30A-1234"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_customer_lookup() {
        let store = store();
        let id = CustomerId::new();
        assert!(!store.exists(id).await.unwrap());

        store.add_customer(id, CustomerType::Vip).await;
        assert!(store.exists(id).await.unwrap());
        assert_eq!(
            store.find_customer_type(id).await.unwrap(),
            Some(CustomerType::Vip)
        );
    }

    #[tokio::test]
    async fn test_history_entry_unique_per_order() {
        let store = store();
        let car = vehicle("51F-12345");
        VehicleRepository::insert(&store, &car).await.unwrap();

        let order_id = RepairOrderId::new();
        let (first, _) = settlement(car.id(), order_id);
        let (second, _) = settlement(car.id(), order_id);
        store.add_history_entry(&first).await.unwrap();

        let err = store.add_history_entry(&second).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.repair_history(car.id()).await.unwrap(), vec![first]);
    }

    #[tokio::test]
    async fn test_settlement_writes_nothing_when_history_fails() {
        let store = store();
        let car = vehicle("51F-12345");
        VehicleRepository::insert(&store, &car).await.unwrap();

        // vehículo desconocido
        let (orphan, transaction) = settlement(VehicleId::new(), RepairOrderId::new());
        let err = store.record_settlement(&orphan, &transaction).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(TransactionRepository::find_by_id(&store, transaction.id())
            .await
            .unwrap()
            .is_none());

        // orden ya registrada
        let order_id = RepairOrderId::new();
        let (first, paid) = settlement(car.id(), order_id);
        store.record_settlement(&first, &paid).await.unwrap();

        let (again, second_charge) = settlement(car.id(), order_id);
        let err = store
            .record_settlement(&again, &second_charge)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(TransactionRepository::find_by_id(&store, second_charge.id())
            .await
            .unwrap()
            .is_none());
        assert_eq!(store.repair_history(car.id()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_deactivate_expired_counts_changes_only() {
        let store = store();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut draft = NewEmployee::new("Le Van Binh", now - Duration::days(90));
        draft.status = EmploymentStatus::Active;
        draft.end_date = Some(now - Duration::days(1));
        let leaver = Employee::new(EmployeeId::new(), draft, now - Duration::days(30)).unwrap();
        assert_eq!(leaver.status(), EmploymentStatus::Active);
        EmployeeRepository::insert(&store, &leaver).await.unwrap();

        assert_eq!(store.deactivate_expired(now).await.unwrap(), 1);
        assert_eq!(store.deactivate_expired(now).await.unwrap(), 0);
    }
}
