//! Servicio de órdenes de reparación
//!
//! Abre órdenes verificando cliente y vehículo, agrega o quita líneas y
//! liquida la orden: registra una transacción `RepairCost` por el total y
//! agrega la entrada correspondiente al historial del vehículo.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use crate::models::{
    CustomerId, InvoiceId, NewRepairOrder, NewTransaction, PaymentMethod, RepairHistoryEntry,
    RepairOrder, RepairOrderId, RepairTask, RepairTaskId, ReplacementPart, ReplacementPartId,
    ServiceItemId, Transaction, TransactionId, TransactionType, VehicleId,
};
use crate::repositories::{CustomerRepository, RepairOrderRepository, VehicleRepository};
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::Clock;

/// Resultado de liquidar una orden
#[derive(Debug, Clone, Serialize)]
pub struct Settlement {
    pub transaction: Transaction,
    pub history_entry: RepairHistoryEntry,
}

pub struct RepairOrderService {
    orders: Arc<dyn RepairOrderRepository>,
    vehicles: Arc<dyn VehicleRepository>,
    customers: Arc<dyn CustomerRepository>,
    clock: Arc<dyn Clock>,
}

impl RepairOrderService {
    pub fn new(
        orders: Arc<dyn RepairOrderRepository>,
        vehicles: Arc<dyn VehicleRepository>,
        customers: Arc<dyn CustomerRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            orders,
            vehicles,
            customers,
            clock,
        }
    }

    /// Abrir una orden vacía con fecha actual.
    ///
    /// El vehículo tiene que pertenecer al cliente indicado.
    pub async fn open_order(
        &self,
        invoice_id: InvoiceId,
        owner_id: CustomerId,
        vehicle_id: VehicleId,
    ) -> AppResult<RepairOrder> {
        if !self.customers.exists(owner_id).await? {
            return Err(not_found_error("Customer", owner_id));
        }
        let vehicle = self
            .vehicles
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", vehicle_id))?;

        if vehicle.customer_id() != owner_id {
            warn!(
                "⚠️ Vehículo {} no pertenece al cliente {}",
                vehicle.license_plate(),
                owner_id
            );
            return Err(AppError::Conflict(format!(
                "Vehicle '{}' does not belong to customer '{}'",
                vehicle_id, owner_id
            )));
        }

        let order = RepairOrder::new(
            RepairOrderId::new(),
            NewRepairOrder {
                invoice_id,
                owner_id,
                vehicle_id,
                order_date: self.clock.now(),
            },
        );
        self.orders.insert(&order).await?;
        info!("📝 Orden {} abierta para {}", order.id(), vehicle.license_plate());
        Ok(order)
    }

    pub async fn get(&self, id: RepairOrderId) -> AppResult<RepairOrder> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Repair order", id))
    }

    pub async fn orders_for_vehicle(&self, vehicle_id: VehicleId) -> AppResult<Vec<RepairOrder>> {
        self.orders.find_by_vehicle(vehicle_id).await
    }

    pub async fn add_task(
        &self,
        order_id: RepairOrderId,
        service_item_id: ServiceItemId,
        description: &str,
        unit_price: Decimal,
    ) -> AppResult<RepairOrder> {
        let mut order = self.get(order_id).await?;
        order.add_task(RepairTask::new(service_item_id, description, unit_price)?)?;
        self.orders.update(&order).await?;
        Ok(order)
    }

    pub async fn add_part(
        &self,
        order_id: RepairOrderId,
        part_name: &str,
        unit_price: Decimal,
    ) -> AppResult<RepairOrder> {
        let mut order = self.get(order_id).await?;
        order.add_part(ReplacementPart::new(part_name, unit_price)?)?;
        self.orders.update(&order).await?;
        Ok(order)
    }

    pub async fn remove_task(
        &self,
        order_id: RepairOrderId,
        task_id: RepairTaskId,
    ) -> AppResult<RepairOrder> {
        let mut order = self.get(order_id).await?;
        order
            .remove_task(task_id)
            .ok_or_else(|| not_found_error("Repair task", task_id))?;
        self.orders.update(&order).await?;
        Ok(order)
    }

    pub async fn remove_part(
        &self,
        order_id: RepairOrderId,
        part_id: ReplacementPartId,
    ) -> AppResult<RepairOrder> {
        let mut order = self.get(order_id).await?;
        order
            .remove_part(part_id)
            .ok_or_else(|| not_found_error("Replacement part", part_id))?;
        self.orders.update(&order).await?;
        Ok(order)
    }

    pub async fn total_cost(&self, order_id: RepairOrderId) -> AppResult<Decimal> {
        Ok(self.get(order_id).await?.total_repair_cost()?)
    }

    /// Liquidar la orden.
    ///
    /// Crea una transacción `RepairCost` pendiente por el total de la orden
    /// y agrega la entrada al historial del vehículo en una sola escritura del
    /// repositorio. Una orden se liquida una sola vez (`Conflict`); una orden
    /// sin costo no genera transacción y falla la validación del monto.
    pub async fn settle(
        &self,
        order_id: RepairOrderId,
        payment_method: PaymentMethod,
        created_by: Option<String>,
        notes: Option<String>,
    ) -> AppResult<Settlement> {
        let order = self.get(order_id).await?;
        let now = self.clock.now();
        let total = order.total_repair_cost()?;

        let transaction = Transaction::new(
            TransactionId::new(),
            NewTransaction {
                invoice_id: Some(order.invoice_id()),
                transaction_type: TransactionType::RepairCost,
                payment_method,
                amount: total,
                description: Some(format!("Repair order {}", order.id())),
                transaction_date: now,
                created_by,
            },
        )?;
        let history_entry =
            RepairHistoryEntry::new(order.vehicle_id(), order.id(), now, total, notes)?;

        self.orders
            .record_settlement(&history_entry, &transaction)
            .await?;

        info!("💰 Orden {} liquidada por {}", order.id(), total);
        Ok(Settlement {
            transaction,
            history_entry,
        })
    }
}
