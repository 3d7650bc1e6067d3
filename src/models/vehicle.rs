//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle, la matrícula normalizada y el
//! historial de reparaciones. Los textos libres se recortan al asignarse y
//! la matrícula se pasa a mayúsculas antes de validar el formato.

use std::fmt;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use super::cars::{CarBrand, CarColor, CarType};
use super::ids::{CustomerId, RepairHistoryId, RepairOrderId, VehicleId};
use crate::utils::validation::{self, collect, field};

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;
pub const MAX_MILEAGE: f64 = 1_000_000.0;
pub const MAX_LICENSE_PLATE_LENGTH: usize = 9;
pub const MAX_MODEL_LENGTH: usize = 50;
pub const MAX_FRAME_NUMBER_LENGTH: usize = 17;
pub const MAX_ENGINE_NUMBER_LENGTH: usize = 17;
pub const MAX_HISTORY_NOTES_LENGTH: usize = 255;

lazy_static! {
    static ref LICENSE_PLATE_RE: Regex =
        Regex::new(r"^[0-9]{2}[A-Z]{1,2}-[0-9]{3,5}$").expect("license plate pattern compiles");
}

/// Matrícula normalizada (recortada, en mayúsculas) y validada
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LicensePlate(String);

impl LicensePlate {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let normalized = raw.trim().to_uppercase();

        validation::validate_not_empty(&normalized)?;
        validation::validate_max_length(&normalized, MAX_LICENSE_PLATE_LENGTH)?;
        if !LICENSE_PLATE_RE.is_match(&normalized) {
            let mut error = ValidationError::new("license_plate");
            error.add_param("value".into(), &normalized);
            error.message = Some("license plate does not match required pattern".into());
            return Err(error);
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LicensePlate {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LicensePlate> for String {
    fn from(plate: LicensePlate) -> String {
        plate.0
    }
}

impl fmt::Display for LicensePlate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate_license_plate(raw: &str) -> Result<(), ValidationError> {
    LicensePlate::parse(raw).map(|_| ())
}

fn validate_model(model: &str) -> Result<(), ValidationError> {
    validation::validate_max_length(model, MAX_MODEL_LENGTH)
}

fn validate_frame_number(frame_number: &str) -> Result<(), ValidationError> {
    validation::validate_max_length(frame_number, MAX_FRAME_NUMBER_LENGTH)
}

fn validate_engine_number(engine_number: &str) -> Result<(), ValidationError> {
    validation::validate_max_length(engine_number, MAX_ENGINE_NUMBER_LENGTH)
}

fn validate_year(year: i32) -> Result<(), ValidationError> {
    validation::validate_range(year, MIN_YEAR, MAX_YEAR)
}

fn validate_mileage(mileage: f64) -> Result<(), ValidationError> {
    if !mileage.is_finite() {
        let mut error = ValidationError::new("range");
        error.message = Some("mileage must be a finite number".into());
        return Err(error);
    }
    validation::validate_range(mileage, 0.0, MAX_MILEAGE)
}

fn default_year() -> i32 {
    MIN_YEAR
}

/// Datos para registrar un vehículo
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewVehicle {
    pub customer_id: CustomerId,

    #[serde(default = "default_year")]
    pub year: i32,

    #[serde(default)]
    pub car_type: CarType,

    #[serde(default)]
    pub car_color: CarColor,

    #[serde(default)]
    pub car_brand: CarBrand,

    #[validate(custom = "validate_license_plate")]
    pub license_plate: String,

    #[serde(default)]
    #[validate(custom = "validate_model")]
    pub model: String,

    #[serde(default)]
    #[validate(custom = "validate_frame_number")]
    pub frame_number: String,

    #[serde(default)]
    #[validate(custom = "validate_engine_number")]
    pub engine_number: String,

    pub registration_date: DateTime<Utc>,

    #[serde(default)]
    pub mileage: f64,

    pub insurance_expiry_date: Option<DateTime<Utc>>,
}

impl NewVehicle {
    /// Borrador con los valores por defecto del taller
    pub fn new(
        customer_id: CustomerId,
        license_plate: impl Into<String>,
        registration_date: DateTime<Utc>,
    ) -> Self {
        Self {
            customer_id,
            year: MIN_YEAR,
            car_type: CarType::default(),
            car_color: CarColor::default(),
            car_brand: CarBrand::default(),
            license_plate: license_plate.into(),
            model: String::new(),
            frame_number: String::new(),
            engine_number: String::new(),
            registration_date,
            mileage: 0.0,
            insurance_expiry_date: None,
        }
    }

    fn normalized(mut self) -> Self {
        self.license_plate = self.license_plate.trim().to_uppercase();
        self.model = self.model.trim().to_string();
        self.frame_number = self.frame_number.trim().to_string();
        self.engine_number = self.engine_number.trim().to_string();
        self
    }
}

/// Vehículo de un cliente
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vehicle {
    id: VehicleId,
    customer_id: CustomerId,
    year: i32,
    car_type: CarType,
    car_color: CarColor,
    car_brand: CarBrand,
    license_plate: LicensePlate,
    model: String,
    frame_number: String,
    engine_number: String,
    registration_date: DateTime<Utc>,
    mileage: f64,
    insurance_expiry_date: Option<DateTime<Utc>>,
}

impl Vehicle {
    /// Normaliza y valida todos los campos; devuelve todos los errores juntos
    pub fn new(id: VehicleId, draft: NewVehicle) -> Result<Self, ValidationErrors> {
        let draft = draft.normalized();
        validation::merge(
            draft.validate(),
            collect([
                ("year", validate_year(draft.year)),
                ("mileage", validate_mileage(draft.mileage)),
            ]),
        )?;

        let license_plate = field("license_plate", LicensePlate::parse(&draft.license_plate))?;

        Ok(Self {
            id,
            customer_id: draft.customer_id,
            year: draft.year,
            car_type: draft.car_type,
            car_color: draft.car_color,
            car_brand: draft.car_brand,
            license_plate,
            model: draft.model,
            frame_number: draft.frame_number,
            engine_number: draft.engine_number,
            registration_date: draft.registration_date,
            mileage: draft.mileage,
            insurance_expiry_date: draft.insurance_expiry_date,
        })
    }

    pub fn id(&self) -> VehicleId {
        self.id
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn car_type(&self) -> CarType {
        self.car_type
    }

    pub fn car_color(&self) -> CarColor {
        self.car_color
    }

    pub fn car_brand(&self) -> CarBrand {
        self.car_brand
    }

    pub fn license_plate(&self) -> &LicensePlate {
        &self.license_plate
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn frame_number(&self) -> &str {
        &self.frame_number
    }

    pub fn engine_number(&self) -> &str {
        &self.engine_number
    }

    pub fn registration_date(&self) -> DateTime<Utc> {
        self.registration_date
    }

    pub fn mileage(&self) -> f64 {
        self.mileage
    }

    pub fn insurance_expiry_date(&self) -> Option<DateTime<Utc>> {
        self.insurance_expiry_date
    }

    /// El seguro venció antes de `now`
    pub fn is_insurance_expired(&self, now: DateTime<Utc>) -> bool {
        self.insurance_expiry_date.is_some_and(|expiry| expiry < now)
    }

    pub fn set_license_plate(&mut self, raw: &str) -> Result<(), ValidationErrors> {
        self.license_plate = field("license_plate", LicensePlate::parse(raw))?;
        Ok(())
    }

    pub fn set_model(&mut self, model: &str) -> Result<(), ValidationErrors> {
        let model = model.trim();
        field("model", validate_model(model))?;
        self.model = model.to_string();
        Ok(())
    }

    pub fn set_frame_number(&mut self, frame_number: &str) -> Result<(), ValidationErrors> {
        let frame_number = frame_number.trim();
        field("frame_number", validate_frame_number(frame_number))?;
        self.frame_number = frame_number.to_string();
        Ok(())
    }

    pub fn set_engine_number(&mut self, engine_number: &str) -> Result<(), ValidationErrors> {
        let engine_number = engine_number.trim();
        field("engine_number", validate_engine_number(engine_number))?;
        self.engine_number = engine_number.to_string();
        Ok(())
    }

    pub fn set_year(&mut self, year: i32) -> Result<(), ValidationErrors> {
        field("year", validate_year(year))?;
        self.year = year;
        Ok(())
    }

    pub fn set_mileage(&mut self, mileage: f64) -> Result<(), ValidationErrors> {
        field("mileage", validate_mileage(mileage))?;
        self.mileage = mileage;
        Ok(())
    }

    pub fn set_insurance_expiry_date(&mut self, expiry: Option<DateTime<Utc>>) {
        self.insurance_expiry_date = expiry;
    }

    pub fn set_car_type(&mut self, car_type: CarType) {
        self.car_type = car_type;
    }

    pub fn set_car_color(&mut self, car_color: CarColor) {
        self.car_color = car_color;
    }

    pub fn set_car_brand(&mut self, car_brand: CarBrand) {
        self.car_brand = car_brand;
    }
}

/// Entrada del historial de reparaciones de un vehículo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairHistoryEntry {
    pub id: RepairHistoryId,
    pub vehicle_id: VehicleId,
    pub repair_order_id: RepairOrderId,
    pub repair_date: DateTime<Utc>,
    pub total_cost: Decimal,
    pub notes: Option<String>,
}

fn validate_total_cost(total_cost: &Decimal) -> Result<(), ValidationError> {
    validation::validate_non_negative(*total_cost)?;
    validation::validate_money(total_cost)
}

impl RepairHistoryEntry {
    pub fn new(
        vehicle_id: VehicleId,
        repair_order_id: RepairOrderId,
        repair_date: DateTime<Utc>,
        total_cost: Decimal,
        notes: Option<String>,
    ) -> Result<Self, ValidationErrors> {
        Self::restore(
            RepairHistoryId::new(),
            vehicle_id,
            repair_order_id,
            repair_date,
            total_cost,
            notes,
        )
    }

    /// Reconstruir una entrada guardada con las mismas reglas que `new`
    pub fn restore(
        id: RepairHistoryId,
        vehicle_id: VehicleId,
        repair_order_id: RepairOrderId,
        repair_date: DateTime<Utc>,
        total_cost: Decimal,
        notes: Option<String>,
    ) -> Result<Self, ValidationErrors> {
        let notes = validation::trim_optional(notes);
        collect([
            ("total_cost", validate_total_cost(&total_cost)),
            (
                "notes",
                notes
                    .as_deref()
                    .map_or(Ok(()), |n| validation::validate_max_length(n, MAX_HISTORY_NOTES_LENGTH)),
            ),
        ])?;

        Ok(Self {
            id,
            vehicle_id,
            repair_order_id,
            repair_date,
            total_cost,
            notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn registered() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 20, 10, 0, 0).unwrap()
    }

    fn draft(plate: &str) -> NewVehicle {
        NewVehicle::new(CustomerId::new(), plate, registered())
    }

    #[test]
    fn test_valid_plates_are_normalized() {
        for (raw, stored) in [
            ("30a-12345", "30A-12345"),
            ("  51G-123 ", "51G-123"),
            ("29ld-1234", "29LD-1234"),
        ] {
            let plate = LicensePlate::parse(raw).unwrap();
            assert_eq!(plate.as_str(), stored);
        }
    }

    #[test]
    fn test_invalid_plates_rejected() {
        for raw in [
            "",
            "   ",
            "3A-12345",
            "30ABC-123",
            "30A12345",
            "30A-12",
            "30A-123456",
            "30Á-1234",
            // encaja con el patrón pero supera 9 caracteres
            "30AB-12345",
        ] {
            assert!(LicensePlate::parse(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn test_plate_error_mentions_pattern() {
        let err = LicensePlate::parse("AB-1234").unwrap_err();
        assert_eq!(err.code, "license_plate");
        assert_eq!(
            err.message.as_deref(),
            Some("license plate does not match required pattern")
        );
    }

    #[test]
    fn test_new_vehicle_uses_defaults() {
        let vehicle = Vehicle::new(VehicleId::new(), draft("30a-1234")).unwrap();
        assert_eq!(vehicle.license_plate().as_str(), "30A-1234");
        assert_eq!(vehicle.year(), MIN_YEAR);
        assert_eq!(vehicle.car_type(), CarType::Sedan);
        assert_eq!(vehicle.car_color(), CarColor::None);
        assert_eq!(vehicle.car_brand(), CarBrand::None);
        assert_eq!(vehicle.mileage(), 0.0);
    }

    #[test]
    fn test_free_text_fields_trimmed() {
        let mut d = draft("30A-1234");
        d.model = "  Corolla Altis ".to_string();
        d.frame_number = " RL4BT9F30B5012345 ".to_string();
        d.engine_number = "\t2ZR1234567\n".to_string();
        let mut vehicle = Vehicle::new(VehicleId::new(), d).unwrap();

        assert_eq!(vehicle.model(), "Corolla Altis");
        assert_eq!(vehicle.frame_number(), "RL4BT9F30B5012345");
        assert_eq!(vehicle.engine_number(), "2ZR1234567");

        vehicle.set_model("  CX-5  ").unwrap();
        vehicle.set_frame_number(" ABC ").unwrap();
        vehicle.set_engine_number(" E1 ").unwrap();
        assert_eq!(vehicle.model(), "CX-5");
        assert_eq!(vehicle.frame_number(), "ABC");
        assert_eq!(vehicle.engine_number(), "E1");
    }

    #[test]
    fn test_length_limits_apply_after_trim() {
        let mut vehicle = Vehicle::new(VehicleId::new(), draft("30A-1234")).unwrap();
        let padded = format!("  {}  ", "F".repeat(MAX_FRAME_NUMBER_LENGTH));
        assert!(vehicle.set_frame_number(&padded).is_ok());
        assert!(vehicle
            .set_frame_number(&"F".repeat(MAX_FRAME_NUMBER_LENGTH + 1))
            .is_err());
        assert!(vehicle.set_model(&"m".repeat(MAX_MODEL_LENGTH + 1)).is_err());
        assert!(vehicle
            .set_engine_number(&"e".repeat(MAX_ENGINE_NUMBER_LENGTH + 1))
            .is_err());
    }

    #[test]
    fn test_all_errors_reported_together() {
        let mut d = draft("bad plate");
        d.year = 1899;
        d.mileage = 1_000_000.5;
        d.model = "m".repeat(MAX_MODEL_LENGTH + 1);

        let errors = Vehicle::new(VehicleId::new(), d).unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("license_plate"));
        assert!(fields.contains_key("year"));
        assert!(fields.contains_key("mileage"));
        assert!(fields.contains_key("model"));
    }

    #[test]
    fn test_setters_validate_ranges() {
        let mut vehicle = Vehicle::new(VehicleId::new(), draft("30A-1234")).unwrap();
        assert!(vehicle.set_year(2100).is_ok());
        assert!(vehicle.set_year(2101).is_err());
        assert_eq!(vehicle.year(), 2100);

        assert!(vehicle.set_mileage(1_000_000.0).is_ok());
        assert!(vehicle.set_mileage(-1.0).is_err());
        assert!(vehicle.set_mileage(f64::NAN).is_err());
        assert_eq!(vehicle.mileage(), 1_000_000.0);
    }

    #[test]
    fn test_set_license_plate_keeps_old_value_on_error() {
        let mut vehicle = Vehicle::new(VehicleId::new(), draft("30A-1234")).unwrap();
        let errors = vehicle.set_license_plate("nope").unwrap_err();
        assert!(errors.field_errors().contains_key("license_plate"));
        assert_eq!(vehicle.license_plate().as_str(), "30A-1234");

        vehicle.set_license_plate(" 43c-56789 ").unwrap();
        assert_eq!(vehicle.license_plate().as_str(), "43C-56789");
    }

    #[test]
    fn test_insurance_expiry() {
        let mut vehicle = Vehicle::new(VehicleId::new(), draft("30A-1234")).unwrap();
        let now = registered() + Duration::days(400);
        assert!(!vehicle.is_insurance_expired(now));

        vehicle.set_insurance_expiry_date(Some(now - Duration::days(1)));
        assert!(vehicle.is_insurance_expired(now));
        vehicle.set_insurance_expiry_date(Some(now + Duration::days(1)));
        assert!(!vehicle.is_insurance_expired(now));
    }

    #[test]
    fn test_plate_deserializes_through_validation() {
        let plate: LicensePlate = serde_json::from_str("\" 30a-123 \"").unwrap();
        assert_eq!(plate.as_str(), "30A-123");
        assert!(serde_json::from_str::<LicensePlate>("\"xx\"").is_err());
    }

    #[test]
    fn test_history_entry_validation() {
        let entry = RepairHistoryEntry::new(
            VehicleId::new(),
            RepairOrderId::new(),
            registered(),
            Decimal::new(35, 0),
            Some("  brake pads  ".to_string()),
        )
        .unwrap();
        assert_eq!(entry.notes.as_deref(), Some("brake pads"));

        assert!(RepairHistoryEntry::new(
            VehicleId::new(),
            RepairOrderId::new(),
            registered(),
            Decimal::new(-1, 0),
            None,
        )
        .is_err());
    }

    #[test]
    fn test_history_entry_restore_keeps_rules() {
        let id = RepairHistoryId::new();
        let restored = RepairHistoryEntry::restore(
            id,
            VehicleId::new(),
            RepairOrderId::new(),
            registered(),
            Decimal::new(12_050, 2),
            None,
        )
        .unwrap();
        assert_eq!(restored.id, id);

        let errors = RepairHistoryEntry::restore(
            id,
            VehicleId::new(),
            RepairOrderId::new(),
            registered(),
            Decimal::new(-5, 0),
            Some("x".repeat(MAX_HISTORY_NOTES_LENGTH + 1)),
        )
        .unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("total_cost"));
        assert!(fields.contains_key("notes"));

        assert!(RepairHistoryEntry::restore(
            id,
            VehicleId::new(),
            RepairOrderId::new(),
            registered(),
            Decimal::new(1, 3),
            None,
        )
        .is_err());
    }
}
