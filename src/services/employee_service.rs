use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::models::{Employee, EmployeeId, NewEmployee};
use crate::repositories::EmployeeRepository;
use crate::utils::errors::{not_found_error, AppResult};
use crate::utils::Clock;

/// Servicio de personal
pub struct EmployeeService {
    employees: Arc<dyn EmployeeRepository>,
    clock: Arc<dyn Clock>,
}

impl EmployeeService {
    pub fn new(employees: Arc<dyn EmployeeRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { employees, clock }
    }

    pub async fn hire(&self, draft: NewEmployee) -> AppResult<Employee> {
        let employee = Employee::new(EmployeeId::new(), draft, self.clock.now())?;
        self.employees.insert(&employee).await?;
        info!("👷 Empleado contratado: {} ({})", employee.name(), employee.position());
        Ok(employee)
    }

    pub async fn get(&self, id: EmployeeId) -> AppResult<Employee> {
        self.employees
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Employee", id))
    }

    pub async fn list(&self) -> AppResult<Vec<Employee>> {
        self.employees.find_all().await
    }

    /// Fijar la fecha de fin; si ya pasó, el empleado queda inactivo
    pub async fn terminate(&self, id: EmployeeId, end_date: DateTime<Utc>) -> AppResult<Employee> {
        let mut employee = self.get(id).await?;
        employee.set_end_date(Some(end_date), self.clock.now())?;
        self.employees.update(&employee).await?;

        info!(
            "📅 Fin de contrato para {}: {} (estado: {})",
            employee.name(),
            end_date.date_naive(),
            employee.status()
        );
        Ok(employee)
    }

    /// Persistir `Inactive` para los empleados cuya fecha de fin ya pasó.
    /// Devuelve cuántos cambiaron en esta llamada; los que ya estaban
    /// inactivos no se cuentan.
    pub async fn refresh_statuses(&self) -> AppResult<usize> {
        let deactivated = self.employees.deactivate_expired(self.clock.now()).await?;
        info!("🔄 Estados laborales recalculados: {} inactivos", deactivated);
        Ok(deactivated)
    }
}
