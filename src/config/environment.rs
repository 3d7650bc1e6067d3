//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use std::env;
use std::str::FromStr;

use thiserror::Error;

/// Errores al leer la configuración
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Leer una variable obligatoria
pub(crate) fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

/// Leer y parsear una variable opcional, con valor por defecto
pub(crate) fn parsed_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub log_level: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl EnvironmentConfig {
    /// Cargar desde variables de entorno (ENVIRONMENT, LOG_LEVEL)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let environment = env::var("ENVIRONMENT")
            .map(|v| v.trim().to_ascii_lowercase())
            .unwrap_or(defaults.environment);
        let log_level = env::var("LOG_LEVEL").unwrap_or(defaults.log_level);

        if tracing::Level::from_str(&log_level).is_err() {
            return Err(ConfigError::Invalid {
                name: "LOG_LEVEL",
                value: log_level,
            });
        }

        Ok(Self {
            environment,
            log_level,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
