use async_trait::async_trait;
use sqlx::PgPool;

use super::CustomerRepository;
use crate::models::{CustomerId, CustomerType};
use crate::utils::errors::{database_error, AppResult};

pub struct PgCustomerRepository {
    pool: PgPool,
}

impl PgCustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerRepository for PgCustomerRepository {
    async fn find_customer_type(&self, id: CustomerId) -> AppResult<Option<CustomerType>> {
        let row: Option<(CustomerType,)> =
            sqlx::query_as("SELECT customer_type FROM customers WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database_error("Error finding customer", e))?;

        Ok(row.map(|(customer_type,)| customer_type))
    }

    async fn exists(&self, id: CustomerId) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| database_error("Error checking customer", e))?;

        Ok(result.0)
    }
}
