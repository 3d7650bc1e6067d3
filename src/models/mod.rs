//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos del taller. Cada entidad
//! valida y normaliza sus campos en el constructor y en cada setter; las
//! referencias entre entidades son ids tipados.

mod codes;

pub mod cars;
pub mod customer_type;
pub mod employee;
pub mod ids;
pub mod payment;
pub mod repair_order;
pub mod transaction;
pub mod vehicle;

pub use cars::{CarBrand, CarColor, CarType};
pub use customer_type::CustomerType;
pub use employee::{Employee, EmploymentStatus, Gender, NewEmployee, Position};
pub use ids::*;
pub use payment::PaymentMethod;
pub use repair_order::{NewRepairOrder, RepairOrder, RepairTask, ReplacementPart};
pub use transaction::{NewTransaction, Transaction, TransactionStatus, TransactionType};
pub use vehicle::{LicensePlate, NewVehicle, RepairHistoryEntry, Vehicle};
