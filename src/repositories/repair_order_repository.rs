use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use super::transaction_repository::insert_transaction;
use super::vehicle_repository::insert_history_entry;
use super::RepairOrderRepository;
use crate::models::{
    self, CustomerId, InvoiceId, NewRepairOrder, RepairHistoryEntry, RepairOrder, RepairOrderId,
    RepairTask, RepairTaskId, ReplacementPart, ReplacementPartId, ServiceItemId, VehicleId,
};
use crate::utils::errors::{database_error, AppError, AppResult};

#[derive(Debug, sqlx::FromRow)]
struct RepairOrderRow {
    id: RepairOrderId,
    invoice_id: InvoiceId,
    owner_id: CustomerId,
    vehicle_id: VehicleId,
    order_date: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct RepairTaskRow {
    id: RepairTaskId,
    service_item_id: ServiceItemId,
    description: String,
    unit_price: Decimal,
}

#[derive(Debug, sqlx::FromRow)]
struct ReplacementPartRow {
    id: ReplacementPartId,
    part_name: String,
    unit_price: Decimal,
}

pub struct PgRepairOrderRepository {
    pool: PgPool,
}

impl PgRepairOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Cargar las líneas de una orden y reconstruirla
    async fn hydrate(&self, row: RepairOrderRow) -> AppResult<RepairOrder> {
        let tasks = sqlx::query_as::<_, RepairTaskRow>(
            r#"
            SELECT id, service_item_id, description, unit_price
            FROM repair_tasks
            WHERE repair_order_id = $1
            ORDER BY line_no ASC
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("Error loading repair tasks", e))?;

        let parts = sqlx::query_as::<_, ReplacementPartRow>(
            r#"
            SELECT id, part_name, unit_price
            FROM replacement_parts
            WHERE repair_order_id = $1
            ORDER BY line_no ASC
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("Error loading replacement parts", e))?;

        let tasks = tasks
            .into_iter()
            .map(|t| RepairTask {
                id: t.id,
                service_item_id: t.service_item_id,
                description: t.description,
                unit_price: t.unit_price,
            })
            .collect();
        let parts = parts
            .into_iter()
            .map(|p| ReplacementPart {
                id: p.id,
                part_name: p.part_name,
                unit_price: p.unit_price,
            })
            .collect();

        let draft = NewRepairOrder {
            invoice_id: row.invoice_id,
            owner_id: row.owner_id,
            vehicle_id: row.vehicle_id,
            order_date: row.order_date,
        };
        Ok(RepairOrder::with_items(row.id, draft, tasks, parts)?)
    }
}

async fn insert_lines(tx: &mut Transaction<'_, Postgres>, order: &RepairOrder) -> AppResult<()> {
    for (line_no, task) in order.repair_tasks().iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO repair_tasks (id, repair_order_id, line_no, service_item_id, description, unit_price)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(task.id)
        .bind(order.id())
        .bind(line_no as i32)
        .bind(task.service_item_id)
        .bind(&task.description)
        .bind(task.unit_price)
        .execute(&mut **tx)
        .await
        .map_err(|e| database_error("Error saving repair task", e))?;
    }

    for (line_no, part) in order.replacement_parts().iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO replacement_parts (id, repair_order_id, line_no, part_name, unit_price)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(part.id)
        .bind(order.id())
        .bind(line_no as i32)
        .bind(&part.part_name)
        .bind(part.unit_price)
        .execute(&mut **tx)
        .await
        .map_err(|e| database_error("Error saving replacement part", e))?;
    }

    Ok(())
}

#[async_trait]
impl RepairOrderRepository for PgRepairOrderRepository {
    async fn insert(&self, order: &RepairOrder) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| database_error("Error starting transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO repair_orders (id, invoice_id, owner_id, vehicle_id, order_date)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(order.id())
        .bind(order.invoice_id())
        .bind(order.owner_id())
        .bind(order.vehicle_id())
        .bind(order.order_date())
        .execute(&mut *tx)
        .await
        .map_err(|e| database_error("Error creating repair order", e))?;

        insert_lines(&mut tx, order).await?;

        tx.commit()
            .await
            .map_err(|e| database_error("Error committing repair order", e))?;
        debug!(
            "💾 Orden {} guardada: {} tareas, {} repuestos",
            order.id(),
            order.repair_tasks().len(),
            order.replacement_parts().len()
        );
        Ok(())
    }

    async fn update(&self, order: &RepairOrder) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| database_error("Error starting transaction", e))?;

        let result = sqlx::query("UPDATE repair_orders SET order_date = $2 WHERE id = $1")
            .bind(order.id())
            .bind(order.order_date())
            .execute(&mut *tx)
            .await
            .map_err(|e| database_error("Error updating repair order", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Repair order not found".to_string()));
        }

        sqlx::query("DELETE FROM repair_tasks WHERE repair_order_id = $1")
            .bind(order.id())
            .execute(&mut *tx)
            .await
            .map_err(|e| database_error("Error clearing repair tasks", e))?;
        sqlx::query("DELETE FROM replacement_parts WHERE repair_order_id = $1")
            .bind(order.id())
            .execute(&mut *tx)
            .await
            .map_err(|e| database_error("Error clearing replacement parts", e))?;

        insert_lines(&mut tx, order).await?;

        tx.commit()
            .await
            .map_err(|e| database_error("Error committing repair order", e))?;
        debug!(
            "💾 Orden {} guardada: {} tareas, {} repuestos",
            order.id(),
            order.repair_tasks().len(),
            order.replacement_parts().len()
        );
        Ok(())
    }

    async fn find_by_id(&self, id: RepairOrderId) -> AppResult<Option<RepairOrder>> {
        let row = sqlx::query_as::<_, RepairOrderRow>(
            "SELECT id, invoice_id, owner_id, vehicle_id, order_date FROM repair_orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("Error finding repair order", e))?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_vehicle(&self, vehicle_id: VehicleId) -> AppResult<Vec<RepairOrder>> {
        let rows = sqlx::query_as::<_, RepairOrderRow>(
            r#"
            SELECT id, invoice_id, owner_id, vehicle_id, order_date
            FROM repair_orders
            WHERE vehicle_id = $1
            ORDER BY order_date DESC
            "#,
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("Error listing repair orders", e))?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            orders.push(self.hydrate(row).await?);
        }
        Ok(orders)
    }

    async fn record_settlement(
        &self,
        entry: &RepairHistoryEntry,
        transaction: &models::Transaction,
    ) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| database_error("Error starting transaction", e))?;

        // el historial va primero: su UNIQUE por orden corta antes de cobrar
        insert_history_entry(&mut *tx, entry).await?;
        insert_transaction(&mut *tx, transaction).await?;

        tx.commit()
            .await
            .map_err(|e| database_error("Error committing settlement", e))?;
        debug!(
            "💾 Liquidación de la orden {} guardada (transacción {})",
            entry.repair_order_id,
            transaction.id()
        );
        Ok(())
    }
}
