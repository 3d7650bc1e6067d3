use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use repair_shop::config::{DatabaseConfig, EnvironmentConfig};
use repair_shop::database::DatabaseConnection;
use repair_shop::repositories::PgEmployeeRepository;
use repair_shop::services::EmployeeService;
use repair_shop::utils::{Clock, SystemClock};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();
    let env_config = EnvironmentConfig::from_env()?;

    // Configurar logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("repair_shop={}", env_config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🔧 Repair Shop - entorno: {}", env_config.environment);

    // Inicializar base de datos
    let db_config = DatabaseConfig::from_env()?;
    let db_connection = match DatabaseConnection::connect(&db_config).await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    db_connection.health_check().await?;
    db_connection.run_migrations().await?;

    // Los empleados con fecha de fin vencida quedan inactivos al arrancar
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let employees = EmployeeService::new(
        Arc::new(PgEmployeeRepository::new(
            db_connection.pool().clone(),
            clock.clone(),
        )),
        clock,
    );
    let deactivated = employees.refresh_statuses().await?;

    info!("✅ Base de datos lista ({} empleados desactivados)", deactivated);
    Ok(())
}
