use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::models::{CustomerId, NewVehicle, RepairHistoryEntry, Vehicle, VehicleId};
use crate::repositories::{CustomerRepository, VehicleRepository};
use crate::utils::errors::{conflict_error, not_found_error, AppResult};
use crate::utils::Clock;

/// Servicio de registro y mantenimiento de vehículos
pub struct VehicleService {
    vehicles: Arc<dyn VehicleRepository>,
    customers: Arc<dyn CustomerRepository>,
    clock: Arc<dyn Clock>,
}

impl VehicleService {
    pub fn new(
        vehicles: Arc<dyn VehicleRepository>,
        customers: Arc<dyn CustomerRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            vehicles,
            customers,
            clock,
        }
    }

    /// Registrar un vehículo para un cliente existente.
    ///
    /// La matrícula debe ser única en todo el taller.
    pub async fn register(&self, draft: NewVehicle) -> AppResult<Vehicle> {
        if !self.customers.exists(draft.customer_id).await? {
            return Err(not_found_error("Customer", draft.customer_id));
        }

        let vehicle = Vehicle::new(VehicleId::new(), draft)?;
        if self
            .vehicles
            .find_by_license_plate(vehicle.license_plate())
            .await?
            .is_some()
        {
            warn!("⚠️ Matrícula duplicada: {}", vehicle.license_plate());
            return Err(conflict_error(
                "Vehicle",
                "license_plate",
                vehicle.license_plate().as_str(),
            ));
        }

        self.vehicles.insert(&vehicle).await?;
        info!(
            "🚗 Vehículo {} registrado para cliente {}",
            vehicle.license_plate(),
            vehicle.customer_id()
        );
        Ok(vehicle)
    }

    pub async fn get(&self, id: VehicleId) -> AppResult<Vehicle> {
        self.vehicles
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", id))
    }

    pub async fn vehicles_of(&self, customer_id: CustomerId) -> AppResult<Vec<Vehicle>> {
        self.vehicles.find_by_customer(customer_id).await
    }

    /// Actualizar kilometraje y vencimiento del seguro tras una revisión
    pub async fn record_inspection(
        &self,
        id: VehicleId,
        mileage: f64,
        insurance_expiry_date: Option<DateTime<Utc>>,
    ) -> AppResult<Vehicle> {
        let mut vehicle = self.get(id).await?;
        vehicle.set_mileage(mileage)?;
        if insurance_expiry_date.is_some() {
            vehicle.set_insurance_expiry_date(insurance_expiry_date);
        }

        self.vehicles.update(&vehicle).await?;
        if vehicle.is_insurance_expired(self.clock.now()) {
            warn!("⚠️ Seguro vencido para vehículo {}", vehicle.license_plate());
        }
        info!(
            "🔧 Revisión registrada para {}: {} km",
            vehicle.license_plate(),
            vehicle.mileage()
        );
        Ok(vehicle)
    }

    /// Cambiar la matrícula, manteniendo la unicidad
    pub async fn change_license_plate(&self, id: VehicleId, raw: &str) -> AppResult<Vehicle> {
        let mut vehicle = self.get(id).await?;
        vehicle.set_license_plate(raw)?;

        if let Some(other) = self
            .vehicles
            .find_by_license_plate(vehicle.license_plate())
            .await?
        {
            if other.id() != id {
                return Err(conflict_error(
                    "Vehicle",
                    "license_plate",
                    vehicle.license_plate().as_str(),
                ));
            }
        }

        self.vehicles.update(&vehicle).await?;
        Ok(vehicle)
    }

    /// Historial de reparaciones, del más antiguo al más reciente
    pub async fn history(&self, id: VehicleId) -> AppResult<Vec<RepairHistoryEntry>> {
        self.get(id).await?;
        self.vehicles.repair_history(id).await
    }
}
