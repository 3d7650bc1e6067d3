//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas serializables para la capa de presentación.

use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

use crate::config::ConfigError;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Código estable del error, pensado para clientes
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DB_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e.to_string())
    }
}

/// Respuesta de error para la capa de presentación
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub code: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        let (error, message, details) = match err {
            AppError::Validation(e) => (
                "Validation Error",
                "The provided data is invalid".to_string(),
                Some(json!(e)),
            ),
            AppError::NotFound(msg) => ("Not Found", msg.clone(), None),
            AppError::Conflict(msg) => ("Conflict", msg.clone(), None),
            AppError::Database(msg) => (
                "Database Error",
                "An error occurred while accessing the database".to_string(),
                Some(json!({ "sql_error": msg })),
            ),
            AppError::Config(e) => (
                "Configuration Error",
                e.to_string(),
                None,
            ),
            AppError::Internal(msg) => (
                "Internal Error",
                "An unexpected error occurred".to_string(),
                Some(json!({ "internal_error": msg })),
            ),
        };

        Self {
            error: error.to_string(),
            message,
            details,
            code: err.code().to_string(),
        }
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de validación de un solo campo
pub fn validation_error(field: &'static str, error: ValidationError) -> AppError {
    let mut errors = ValidationErrors::new();
    errors.add(field, error);
    AppError::Validation(errors)
}

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de conflicto
pub fn conflict_error(resource: &str, field: &str, value: &str) -> AppError {
    AppError::Conflict(format!("{} with {} '{}' already exists", resource, field, value))
}

/// La base de datos rechazó la escritura por una restricción UNIQUE
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

/// Función helper para errores de base de datos con contexto
pub fn database_error(context: &str, e: sqlx::Error) -> AppError {
    AppError::Database(format!("{}: {}", context, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_response_lists_field() {
        let err = validation_error("amount", ValidationError::new("positive"));
        let response = ErrorResponse::from(&err);

        assert_eq!(response.code, "VALIDATION_ERROR");
        let details = response.details.expect("validation errors carry details");
        assert!(details.get("amount").is_some());
    }

    #[test]
    fn test_not_found_message() {
        let err = not_found_error("Vehicle", "abc");
        assert_eq!(err.to_string(), "Not found: Vehicle with id 'abc' not found");
        assert_eq!(ErrorResponse::from(&err).code, "NOT_FOUND");
    }

    #[test]
    fn test_conflict_message() {
        let err = conflict_error("Vehicle", "license_plate", "30A-12345");
        assert!(err.to_string().contains("30A-12345"));
        assert_eq!(err.code(), "CONFLICT");
    }
}
