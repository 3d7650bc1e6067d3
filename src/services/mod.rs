pub mod employee_service;
pub mod repair_order_service;
pub mod transaction_service;
pub mod vehicle_service;

pub use employee_service::EmployeeService;
pub use repair_order_service::{RepairOrderService, Settlement};
pub use transaction_service::TransactionService;
pub use vehicle_service::VehicleService;
