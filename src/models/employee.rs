//! Modelo de Employee
//!
//! Datos de personal del taller. El estado laboral se recalcula cada vez que
//! se asigna la fecha de fin: si ya pasó, el empleado queda `Inactive`.
//! Nunca vuelve a `Active` de forma automática.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use super::codes::coded_enum;
use super::ids::EmployeeId;
use crate::utils::validation::{self, field};

pub const MAX_NAME_LENGTH: usize = 50;
pub const MAX_ADDRESS_LENGTH: usize = 200;
pub const MAX_PHONE_LENGTH: usize = 14;
pub const MAX_EMAIL_LENGTH: usize = 50;

coded_enum! {
    #[derive(Default)]
    pub enum Gender {
        #[default]
        None = 0 => "Unspecified",
        Male = 1 => "Male",
        Female = 2 => "Female",
        Other = 255 => "Other",
    }
}

coded_enum! {
    /// Cargo dentro del taller
    #[derive(Default)]
    pub enum Position {
        #[default]
        None = 0 => "Unspecified",
        Apprentice = 1 => "Apprentice",
        Mechanic = 2 => "Mechanic",
        Technician = 3 => "Technician",
        ServiceAdvisor = 4 => "Service advisor",
        Cashier = 5 => "Cashier",
        Accountant = 6 => "Accountant",
        Manager = 7 => "Manager",
        Other = 255 => "Other",
    }
}

coded_enum! {
    /// Estado laboral
    #[derive(Default)]
    pub enum EmploymentStatus {
        #[default]
        None = 0 => "Unspecified",
        Active = 1 => "Active",
        Inactive = 2 => "Inactive",
        OnLeave = 3 => "On leave",
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    validation::validate_not_empty(name)?;
    validation::validate_max_length(name, MAX_NAME_LENGTH)
}

fn validate_address(address: &str) -> Result<(), ValidationError> {
    validation::validate_max_length(address, MAX_ADDRESS_LENGTH)
}

fn validate_phone_number(phone: &str) -> Result<(), ValidationError> {
    validation::validate_max_length(phone, MAX_PHONE_LENGTH)
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    validation::validate_max_length(email, MAX_EMAIL_LENGTH)?;
    validation::validate_email(email)
}

/// Datos para dar de alta un empleado
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewEmployee {
    #[validate(custom = "validate_name")]
    pub name: String,

    #[serde(default)]
    pub gender: Gender,

    pub date_of_birth: Option<NaiveDate>,

    #[validate(custom = "validate_address")]
    pub address: Option<String>,

    #[validate(custom = "validate_phone_number")]
    pub phone_number: Option<String>,

    #[validate(custom = "validate_email")]
    pub email: Option<String>,

    #[serde(default)]
    pub position: Position,

    pub start_date: DateTime<Utc>,

    pub end_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub status: EmploymentStatus,
}

impl NewEmployee {
    /// Borrador mínimo: nombre y fecha de inicio
    pub fn new(name: impl Into<String>, start_date: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            gender: Gender::None,
            date_of_birth: None,
            address: None,
            phone_number: None,
            email: None,
            position: Position::None,
            start_date,
            end_date: None,
            status: EmploymentStatus::None,
        }
    }
}

/// Empleado
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Employee {
    id: EmployeeId,
    name: String,
    gender: Gender,
    date_of_birth: Option<NaiveDate>,
    address: Option<String>,
    phone_number: Option<String>,
    email: Option<String>,
    position: Position,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    status: EmploymentStatus,
}

impl Employee {
    /// Crear un empleado validando todos los campos.
    ///
    /// `now` se usa para derivar el estado a partir de la fecha de fin; el
    /// mismo constructor sirve para reconstruir filas guardadas.
    pub fn new(
        id: EmployeeId,
        draft: NewEmployee,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationErrors> {
        validation::merge(
            draft.validate(),
            field(
                "start_date",
                validation::validate_date_order(draft.start_date, draft.end_date),
            ),
        )?;

        let mut employee = Self {
            id,
            name: draft.name,
            gender: draft.gender,
            date_of_birth: draft.date_of_birth,
            address: draft.address,
            phone_number: draft.phone_number,
            email: draft.email,
            position: draft.position,
            start_date: draft.start_date,
            end_date: draft.end_date,
            status: draft.status,
        };
        employee.update_status(now);
        Ok(employee)
    }

    pub fn id(&self) -> EmployeeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn date_of_birth(&self) -> Option<NaiveDate> {
        self.date_of_birth
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }

    pub fn status(&self) -> EmploymentStatus {
        self.status
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), ValidationErrors> {
        let name = name.into();
        field("name", validate_name(&name))?;
        self.name = name;
        Ok(())
    }

    pub fn set_gender(&mut self, gender: Gender) {
        self.gender = gender;
    }

    pub fn set_date_of_birth(&mut self, date_of_birth: Option<NaiveDate>) {
        self.date_of_birth = date_of_birth;
    }

    pub fn set_address(&mut self, address: Option<String>) -> Result<(), ValidationErrors> {
        if let Some(value) = address.as_deref() {
            field("address", validate_address(value))?;
        }
        self.address = address;
        Ok(())
    }

    pub fn set_phone_number(&mut self, phone_number: Option<String>) -> Result<(), ValidationErrors> {
        if let Some(value) = phone_number.as_deref() {
            field("phone_number", validate_phone_number(value))?;
        }
        self.phone_number = phone_number;
        Ok(())
    }

    pub fn set_email(&mut self, email: Option<String>) -> Result<(), ValidationErrors> {
        if let Some(value) = email.as_deref() {
            field("email", validate_email(value))?;
        }
        self.email = email;
        Ok(())
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn set_status(&mut self, status: EmploymentStatus) {
        self.status = status;
    }

    /// Falla si la nueva fecha de inicio es posterior a la fecha de fin actual
    pub fn set_start_date(&mut self, start_date: DateTime<Utc>) -> Result<(), ValidationErrors> {
        field(
            "start_date",
            validation::validate_date_order(start_date, self.end_date),
        )?;
        self.start_date = start_date;
        Ok(())
    }

    /// Asigna la fecha de fin y recalcula el estado
    pub fn set_end_date(
        &mut self,
        end_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationErrors> {
        field(
            "end_date",
            validation::validate_date_order(self.start_date, end_date),
        )?;
        self.end_date = end_date;
        self.update_status(now);
        Ok(())
    }

    /// Pasa a `Inactive` si la fecha de fin ya pasó; si no, no toca el estado
    pub fn update_status(&mut self, now: DateTime<Utc>) {
        if self.end_date.is_some_and(|end| end < now) {
            self.status = EmploymentStatus::Inactive;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn hired(start: DateTime<Utc>) -> Employee {
        let mut draft = NewEmployee::new("Tran Van Binh", start);
        draft.status = EmploymentStatus::Active;
        draft.position = Position::Mechanic;
        draft.email = Some("binh.tran@garage.vn".to_string());
        Employee::new(EmployeeId::new(), draft, now()).unwrap()
    }

    #[test]
    fn test_new_employee_keeps_status_without_end_date() {
        let employee = hired(now() - Duration::days(365));
        assert_eq!(employee.status(), EmploymentStatus::Active);
        assert_eq!(employee.position(), Position::Mechanic);
    }

    #[test]
    fn test_required_and_bounded_fields() {
        let mut draft = NewEmployee::new("  ", now());
        draft.phone_number = Some("0".repeat(MAX_PHONE_LENGTH + 1));
        draft.address = Some("a".repeat(MAX_ADDRESS_LENGTH + 1));
        draft.email = Some("not-an-email".to_string());

        let errors = Employee::new(EmployeeId::new(), draft, now()).unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("phone_number"));
        assert!(fields.contains_key("address"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn test_long_email_rejected() {
        let mut employee = hired(now());
        let long = format!("{}@garage.vn", "a".repeat(45));
        assert!(employee.set_email(Some(long)).is_err());
        assert!(employee.set_email(Some("ok@garage.vn".to_string())).is_ok());
        assert!(employee.set_name("b".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_start_after_end_rejected_on_construction() {
        let mut draft = NewEmployee::new("Le Thi Hoa", now());
        draft.end_date = Some(now() - Duration::days(1));
        let errors = Employee::new(EmployeeId::new(), draft, now()).unwrap_err();
        assert!(errors.field_errors().contains_key("start_date"));
    }

    #[test]
    fn test_set_start_date_after_end_date_fails() {
        let start = now() - Duration::days(100);
        let mut employee = hired(start);
        employee
            .set_end_date(Some(now() + Duration::days(30)), now())
            .unwrap();

        let errors = employee
            .set_start_date(now() + Duration::days(31))
            .unwrap_err();
        assert!(errors.field_errors().contains_key("start_date"));
        assert_eq!(employee.start_date(), start);

        assert!(employee.set_start_date(now() + Duration::days(30)).is_ok());
    }

    #[test]
    fn test_past_end_date_deactivates() {
        let mut employee = hired(now() - Duration::days(200));
        employee
            .set_end_date(Some(now() - Duration::days(1)), now())
            .unwrap();
        assert_eq!(employee.status(), EmploymentStatus::Inactive);
    }

    #[test]
    fn test_future_end_date_leaves_status() {
        let mut employee = hired(now() - Duration::days(200));
        employee
            .set_end_date(Some(now() + Duration::days(10)), now())
            .unwrap();
        assert_eq!(employee.status(), EmploymentStatus::Active);

        employee.update_status(now() + Duration::days(11));
        assert_eq!(employee.status(), EmploymentStatus::Inactive);
    }

    #[test]
    fn test_clearing_end_date_does_not_reactivate() {
        let mut employee = hired(now() - Duration::days(200));
        employee
            .set_end_date(Some(now() - Duration::days(1)), now())
            .unwrap();
        employee.set_end_date(None, now()).unwrap();
        assert_eq!(employee.status(), EmploymentStatus::Inactive);
    }

    #[test]
    fn test_end_before_start_rejected() {
        let mut employee = hired(now());
        let errors = employee
            .set_end_date(Some(now() - Duration::days(1)), now())
            .unwrap_err();
        assert!(errors.field_errors().contains_key("end_date"));
        assert_eq!(employee.end_date(), None);
    }
}
