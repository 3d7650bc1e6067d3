//! Modelo de RepairOrder
//!
//! Una orden de reparación agrupa las tareas realizadas y los repuestos
//! reemplazados. El costo total se calcula siempre a partir de esas dos
//! listas; no se guarda en la orden.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use super::ids::{
    CustomerId, InvoiceId, RepairOrderId, RepairTaskId, ReplacementPartId, ServiceItemId,
    VehicleId,
};
use crate::utils::validation::{self, field};

pub const MAX_TASK_DESCRIPTION_LENGTH: usize = 255;
pub const MAX_PART_NAME_LENGTH: usize = 100;

fn validate_unit_price(price: &Decimal) -> Result<(), ValidationError> {
    validation::validate_non_negative(*price)?;
    validation::validate_money(price)
}

fn validate_task_description(description: &str) -> Result<(), ValidationError> {
    validation::validate_max_length(description, MAX_TASK_DESCRIPTION_LENGTH)
}

fn validate_part_name(name: &str) -> Result<(), ValidationError> {
    validation::validate_not_empty(name)?;
    validation::validate_max_length(name, MAX_PART_NAME_LENGTH)
}

fn total_overflow() -> ValidationError {
    let mut error = ValidationError::new("overflow");
    error.message = Some("total repair cost overflows".into());
    error
}

/// Tarea de reparación: un servicio del catálogo con su precio al momento
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RepairTask {
    pub id: RepairTaskId,
    pub service_item_id: ServiceItemId,

    #[validate(custom = "validate_task_description")]
    pub description: String,

    #[validate(custom = "validate_unit_price")]
    pub unit_price: Decimal,
}

impl RepairTask {
    pub fn new(
        service_item_id: ServiceItemId,
        description: &str,
        unit_price: Decimal,
    ) -> Result<Self, ValidationErrors> {
        let task = Self {
            id: RepairTaskId::new(),
            service_item_id,
            description: description.trim().to_string(),
            unit_price,
        };
        task.validate()?;
        Ok(task)
    }
}

/// Repuesto reemplazado
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ReplacementPart {
    pub id: ReplacementPartId,

    #[validate(custom = "validate_part_name")]
    pub part_name: String,

    #[validate(custom = "validate_unit_price")]
    pub unit_price: Decimal,
}

impl ReplacementPart {
    pub fn new(part_name: &str, unit_price: Decimal) -> Result<Self, ValidationErrors> {
        let part = Self {
            id: ReplacementPartId::new(),
            part_name: part_name.trim().to_string(),
            unit_price,
        };
        part.validate()?;
        Ok(part)
    }
}

/// Datos para abrir una orden
#[derive(Debug, Clone, Deserialize)]
pub struct NewRepairOrder {
    pub invoice_id: InvoiceId,
    pub owner_id: CustomerId,
    pub vehicle_id: VehicleId,
    pub order_date: DateTime<Utc>,
}

/// Orden de reparación
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepairOrder {
    id: RepairOrderId,
    invoice_id: InvoiceId,
    owner_id: CustomerId,
    vehicle_id: VehicleId,
    order_date: DateTime<Utc>,
    repair_tasks: Vec<RepairTask>,
    replacement_parts: Vec<ReplacementPart>,
}

impl RepairOrder {
    /// Orden vacía, sin tareas ni repuestos
    pub fn new(id: RepairOrderId, draft: NewRepairOrder) -> Self {
        Self {
            id,
            invoice_id: draft.invoice_id,
            owner_id: draft.owner_id,
            vehicle_id: draft.vehicle_id,
            order_date: draft.order_date,
            repair_tasks: Vec::new(),
            replacement_parts: Vec::new(),
        }
    }

    /// Reconstruir una orden guardada junto con sus líneas
    pub fn with_items(
        id: RepairOrderId,
        draft: NewRepairOrder,
        repair_tasks: Vec<RepairTask>,
        replacement_parts: Vec<ReplacementPart>,
    ) -> Result<Self, ValidationErrors> {
        for task in &repair_tasks {
            task.validate()?;
        }
        for part in &replacement_parts {
            part.validate()?;
        }

        let mut order = Self::new(id, draft);
        order.repair_tasks = repair_tasks;
        order.replacement_parts = replacement_parts;
        Ok(order)
    }

    pub fn id(&self) -> RepairOrderId {
        self.id
    }

    pub fn invoice_id(&self) -> InvoiceId {
        self.invoice_id
    }

    pub fn owner_id(&self) -> CustomerId {
        self.owner_id
    }

    pub fn vehicle_id(&self) -> VehicleId {
        self.vehicle_id
    }

    pub fn order_date(&self) -> DateTime<Utc> {
        self.order_date
    }

    pub fn repair_tasks(&self) -> &[RepairTask] {
        &self.repair_tasks
    }

    pub fn replacement_parts(&self) -> &[ReplacementPart] {
        &self.replacement_parts
    }

    /// Las líneas tienen campos públicos; se revalidan al agregarse
    pub fn add_task(&mut self, task: RepairTask) -> Result<(), ValidationErrors> {
        task.validate()?;
        self.repair_tasks.push(task);
        Ok(())
    }

    pub fn add_part(&mut self, part: ReplacementPart) -> Result<(), ValidationErrors> {
        part.validate()?;
        self.replacement_parts.push(part);
        Ok(())
    }

    pub fn remove_task(&mut self, id: RepairTaskId) -> Option<RepairTask> {
        let index = self.repair_tasks.iter().position(|t| t.id == id)?;
        Some(self.repair_tasks.remove(index))
    }

    pub fn remove_part(&mut self, id: ReplacementPartId) -> Option<ReplacementPart> {
        let index = self.replacement_parts.iter().position(|p| p.id == id)?;
        Some(self.replacement_parts.remove(index))
    }

    /// Suma de precios de tareas más suma de precios de repuestos.
    ///
    /// La suma es verificada: falla en `total_cost` si desborda `Decimal`.
    pub fn total_repair_cost(&self) -> Result<Decimal, ValidationErrors> {
        let prices = self
            .repair_tasks
            .iter()
            .map(|t| t.unit_price)
            .chain(self.replacement_parts.iter().map(|p| p.unit_price));

        let mut total = Decimal::ZERO;
        for price in prices {
            total = field("total_cost", total.checked_add(price).ok_or_else(total_overflow))?;
        }
        Ok(total)
    }
}
