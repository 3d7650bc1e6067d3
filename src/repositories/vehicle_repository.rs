use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};

use super::VehicleRepository;
use crate::models::{
    CarBrand, CarColor, CarType, CustomerId, LicensePlate, NewVehicle, RepairHistoryEntry,
    RepairHistoryId, RepairOrderId, Vehicle, VehicleId,
};
use crate::utils::errors::{
    conflict_error, database_error, is_unique_violation, AppError, AppResult,
};

const VEHICLE_COLUMNS: &str = "id, customer_id, car_year, car_type, car_color, car_brand, \
     license_plate, car_model, frame_number, engine_number, registration_date, mileage, \
     insurance_expiry_date";

// Fila tal como está en la tabla `vehicles`
#[derive(Debug, sqlx::FromRow)]
struct VehicleRow {
    id: VehicleId,
    customer_id: CustomerId,
    car_year: i32,
    car_type: CarType,
    car_color: CarColor,
    car_brand: CarBrand,
    license_plate: String,
    car_model: String,
    frame_number: String,
    engine_number: String,
    registration_date: DateTime<Utc>,
    mileage: f64,
    insurance_expiry_date: Option<DateTime<Utc>>,
}

impl TryFrom<VehicleRow> for Vehicle {
    type Error = AppError;

    fn try_from(row: VehicleRow) -> Result<Self, Self::Error> {
        let vehicle = Vehicle::new(
            row.id,
            NewVehicle {
                customer_id: row.customer_id,
                year: row.car_year,
                car_type: row.car_type,
                car_color: row.car_color,
                car_brand: row.car_brand,
                license_plate: row.license_plate,
                model: row.car_model,
                frame_number: row.frame_number,
                engine_number: row.engine_number,
                registration_date: row.registration_date,
                mileage: row.mileage,
                insurance_expiry_date: row.insurance_expiry_date,
            },
        )?;
        Ok(vehicle)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RepairHistoryRow {
    id: RepairHistoryId,
    vehicle_id: VehicleId,
    repair_order_id: RepairOrderId,
    repair_date: DateTime<Utc>,
    total_cost: Decimal,
    notes: Option<String>,
}

impl TryFrom<RepairHistoryRow> for RepairHistoryEntry {
    type Error = AppError;

    fn try_from(row: RepairHistoryRow) -> Result<Self, Self::Error> {
        Ok(RepairHistoryEntry::restore(
            row.id,
            row.vehicle_id,
            row.repair_order_id,
            row.repair_date,
            row.total_cost,
            row.notes,
        )?)
    }
}

/// Insertar una entrada de historial; una orden ya registrada es un conflicto
pub(super) async fn insert_history_entry<'e>(
    executor: impl PgExecutor<'e>,
    entry: &RepairHistoryEntry,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO repair_histories (id, vehicle_id, repair_order_id, repair_date, total_cost, notes)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(entry.id)
    .bind(entry.vehicle_id)
    .bind(entry.repair_order_id)
    .bind(entry.repair_date)
    .bind(entry.total_cost)
    .bind(entry.notes.as_deref())
    .execute(executor)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            conflict_error(
                "Repair history",
                "repair_order_id",
                &entry.repair_order_id.to_string(),
            )
        } else {
            database_error("Error recording repair history", e)
        }
    })?;

    Ok(())
}

pub struct PgVehicleRepository {
    pool: PgPool,
}

impl PgVehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleRepository for PgVehicleRepository {
    async fn insert(&self, vehicle: &Vehicle) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO vehicles (id, customer_id, car_year, car_type, car_color, car_brand,
                license_plate, car_model, frame_number, engine_number, registration_date,
                mileage, insurance_expiry_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(vehicle.id())
        .bind(vehicle.customer_id())
        .bind(vehicle.year())
        .bind(vehicle.car_type())
        .bind(vehicle.car_color())
        .bind(vehicle.car_brand())
        .bind(vehicle.license_plate().as_str())
        .bind(vehicle.model())
        .bind(vehicle.frame_number())
        .bind(vehicle.engine_number())
        .bind(vehicle.registration_date())
        .bind(vehicle.mileage())
        .bind(vehicle.insurance_expiry_date())
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("Error creating vehicle", e))?;

        Ok(())
    }

    async fn update(&self, vehicle: &Vehicle) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE vehicles
            SET car_year = $2, car_type = $3, car_color = $4, car_brand = $5,
                license_plate = $6, car_model = $7, frame_number = $8, engine_number = $9,
                mileage = $10, insurance_expiry_date = $11
            WHERE id = $1
            "#,
        )
        .bind(vehicle.id())
        .bind(vehicle.year())
        .bind(vehicle.car_type())
        .bind(vehicle.car_color())
        .bind(vehicle.car_brand())
        .bind(vehicle.license_plate().as_str())
        .bind(vehicle.model())
        .bind(vehicle.frame_number())
        .bind(vehicle.engine_number())
        .bind(vehicle.mileage())
        .bind(vehicle.insurance_expiry_date())
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("Error updating vehicle", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Vehicle not found".to_string()));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: VehicleId) -> AppResult<Option<Vehicle>> {
        let query = format!("SELECT {} FROM vehicles WHERE id = $1", VEHICLE_COLUMNS);
        let row = sqlx::query_as::<_, VehicleRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("Error finding vehicle", e))?;

        row.map(Vehicle::try_from).transpose()
    }

    async fn find_by_customer(&self, customer_id: CustomerId) -> AppResult<Vec<Vehicle>> {
        let query = format!(
            "SELECT {} FROM vehicles WHERE customer_id = $1 ORDER BY registration_date DESC",
            VEHICLE_COLUMNS
        );
        let rows = sqlx::query_as::<_, VehicleRow>(&query)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database_error("Error listing vehicles", e))?;

        rows.into_iter().map(Vehicle::try_from).collect()
    }

    async fn find_by_license_plate(&self, plate: &LicensePlate) -> AppResult<Option<Vehicle>> {
        let query = format!("SELECT {} FROM vehicles WHERE license_plate = $1", VEHICLE_COLUMNS);
        let row = sqlx::query_as::<_, VehicleRow>(&query)
            .bind(plate.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("Error checking license plate", e))?;

        row.map(Vehicle::try_from).transpose()
    }

    async fn add_history_entry(&self, entry: &RepairHistoryEntry) -> AppResult<()> {
        insert_history_entry(&self.pool, entry).await
    }

    async fn repair_history(&self, vehicle_id: VehicleId) -> AppResult<Vec<RepairHistoryEntry>> {
        let rows = sqlx::query_as::<_, RepairHistoryRow>(
            r#"
            SELECT id, vehicle_id, repair_order_id, repair_date, total_cost, notes
            FROM repair_histories
            WHERE vehicle_id = $1
            ORDER BY repair_date ASC
            "#,
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("Error listing repair history", e))?;

        rows.into_iter().map(RepairHistoryEntry::try_from).collect()
    }
}
