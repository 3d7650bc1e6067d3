use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use super::EmployeeRepository;
use crate::models::{Employee, EmployeeId, EmploymentStatus, Gender, NewEmployee, Position};
use crate::utils::errors::{database_error, AppError, AppResult};
use crate::utils::Clock;

const EMPLOYEE_COLUMNS: &str = "id, name, gender, date_of_birth, address, phone_number, email, \
     position, start_date, end_date, status";

#[derive(Debug, sqlx::FromRow)]
struct EmployeeRow {
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

impl EmployeeRow {
    /// El estado se recalcula con la hora actual al cargar la fila
    fn into_employee(self, now: DateTime<Utc>) -> AppResult<Employee> {
        let draft = NewEmployee {
            name: self.name,
            gender: self.gender,
            date_of_birth: self.date_of_birth,
            address: self.address,
            phone_number: self.phone_number,
            email: self.email,
            position: self.position,
            start_date: self.start_date,
            end_date: self.end_date,
            status: self.status,
        };
        Ok(Employee::new(self.id, draft, now)?)
    }
}

pub struct PgEmployeeRepository {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl PgEmployeeRepository {
    pub fn new(pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl EmployeeRepository for PgEmployeeRepository {
    async fn insert(&self, employee: &Employee) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO employees (id, name, gender, date_of_birth, address, phone_number, email,
                position, start_date, end_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(employee.id())
        .bind(employee.name())
        .bind(employee.gender())
        .bind(employee.date_of_birth())
        .bind(employee.address())
        .bind(employee.phone_number())
        .bind(employee.email())
        .bind(employee.position())
        .bind(employee.start_date())
        .bind(employee.end_date())
        .bind(employee.status())
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("Error creating employee", e))?;

        Ok(())
    }

    async fn update(&self, employee: &Employee) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE employees
            SET name = $2, gender = $3, date_of_birth = $4, address = $5, phone_number = $6,
                email = $7, position = $8, start_date = $9, end_date = $10, status = $11
            WHERE id = $1
            "#,
        )
        .bind(employee.id())
        .bind(employee.name())
        .bind(employee.gender())
        .bind(employee.date_of_birth())
        .bind(employee.address())
        .bind(employee.phone_number())
        .bind(employee.email())
        .bind(employee.position())
        .bind(employee.start_date())
        .bind(employee.end_date())
        .bind(employee.status())
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("Error updating employee", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Employee not found".to_string()));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: EmployeeId) -> AppResult<Option<Employee>> {
        let query = format!("SELECT {} FROM employees WHERE id = $1", EMPLOYEE_COLUMNS);
        let row = sqlx::query_as::<_, EmployeeRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("Error finding employee", e))?;

        let now = self.clock.now();
        row.map(|r| r.into_employee(now)).transpose()
    }

    async fn find_all(&self) -> AppResult<Vec<Employee>> {
        let query = format!("SELECT {} FROM employees ORDER BY name ASC", EMPLOYEE_COLUMNS);
        let rows = sqlx::query_as::<_, EmployeeRow>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database_error("Error listing employees", e))?;

        let now = self.clock.now();
        rows.into_iter().map(|r| r.into_employee(now)).collect()
    }

    async fn deactivate_expired(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let result = sqlx::query(
            r#"
            UPDATE employees
            SET status = $2
            WHERE end_date < $1 AND status <> $2
            "#,
        )
        .bind(now)
        .bind(EmploymentStatus::Inactive)
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("Error deactivating employees", e))?;

        Ok(result.rows_affected() as usize)
    }
}
