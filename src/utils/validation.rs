//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de campos.
//! Cada función devuelve un `ValidationError` con el código de la regla
//! violada; `field` y `collect` lo asocian al nombre del campo.

use std::borrow::Cow;
use std::fmt::Display;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use validator::{ValidationError, ValidationErrors};

fn with_message(mut error: ValidationError, message: String) -> ValidationError {
    error.message = Some(Cow::Owned(message));
    error
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("required");
        error.add_param("value".into(), &value.to_string());
        return Err(with_message(error, "value is required".to_string()));
    }
    Ok(())
}

/// Validar longitud máxima (en caracteres, no bytes)
pub fn validate_max_length(value: &str, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len > max {
        let mut error = ValidationError::new("length");
        error.add_param("max".into(), &max);
        error.add_param("actual".into(), &len);
        return Err(with_message(
            error,
            format!("must not exceed {} characters", max),
        ));
    }
    Ok(())
}

/// Validar que un valor esté en un rango específico (inclusivo)
pub fn validate_range<T: PartialOrd + Display + Serialize>(
    value: T,
    min: T,
    max: T,
) -> Result<(), ValidationError> {
    if value < min || value > max {
        let message = format!("must be between {} and {}", min, max);
        let mut error = ValidationError::new("range");
        error.add_param("min".into(), &min);
        error.add_param("max".into(), &max);
        error.add_param("actual".into(), &value);
        return Err(with_message(error, message));
    }
    Ok(())
}

/// Validar formato de email
pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    if !validator::validate_email(value) {
        let mut error = ValidationError::new("email");
        error.add_param("value".into(), &value.to_string());
        return Err(with_message(error, "invalid email address".to_string()));
    }
    Ok(())
}

/// Validar que un valor sea positivo
pub fn validate_positive<T: PartialOrd + Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value <= T::zero() {
        let mut error = ValidationError::new("positive");
        error.add_param("value".into(), &value);
        return Err(with_message(error, "must be > 0".to_string()));
    }
    Ok(())
}

/// Validar que un valor sea no negativo
pub fn validate_non_negative<T: PartialOrd + Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value < T::zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &value);
        return Err(with_message(error, "must be >= 0".to_string()));
    }
    Ok(())
}

/// Decimales permitidos en montos (columnas NUMERIC(18, 2))
pub const MONEY_SCALE: u32 = 2;

/// Límite exclusivo de un monto: 16 dígitos enteros
pub fn money_limit() -> Decimal {
    Decimal::from(10_000_000_000_000_000_i64)
}

/// Validar que un monto sea representable sin redondeo en NUMERIC(18, 2)
pub fn validate_money(value: &Decimal) -> Result<(), ValidationError> {
    let scale = value.normalize().scale();
    if scale > MONEY_SCALE {
        let mut error = ValidationError::new("money_scale");
        error.add_param("max".into(), &MONEY_SCALE);
        error.add_param("actual".into(), &scale);
        return Err(with_message(
            error,
            format!("must have at most {} decimal places", MONEY_SCALE),
        ));
    }
    if value.abs() >= money_limit() {
        let mut error = ValidationError::new("money_range");
        error.add_param("value".into(), value);
        return Err(with_message(
            error,
            format!("must be less than {}", money_limit()),
        ));
    }
    Ok(())
}

/// Validar que una fecha de inicio no sea posterior a la de fin
pub fn validate_date_order(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    match end {
        Some(end) if start > end => {
            let mut error = ValidationError::new("date_order");
            error.add_param("start".into(), &start.to_rfc3339());
            error.add_param("end".into(), &end.to_rfc3339());
            Err(with_message(
                error,
                "start date cannot be later than end date".to_string(),
            ))
        }
        _ => Ok(()),
    }
}

/// Asociar el resultado de una regla a un campo
pub fn field<T>(
    name: &'static str,
    result: Result<T, ValidationError>,
) -> Result<T, ValidationErrors> {
    result.map_err(|error| {
        let mut errors = ValidationErrors::new();
        errors.add(name, error);
        errors
    })
}

/// Agregar varios resultados por campo en un único `ValidationErrors`
pub fn collect<I>(checks: I) -> Result<(), ValidationErrors>
where
    I: IntoIterator<Item = (&'static str, Result<(), ValidationError>)>,
{
    let mut errors = ValidationErrors::new();
    for (name, result) in checks {
        if let Err(error) = result {
            errors.add(name, error);
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Fusionar un resultado derivado (`#[derive(Validate)]`) con reglas manuales
pub fn merge(
    derived: Result<(), ValidationErrors>,
    extra: Result<(), ValidationErrors>,
) -> Result<(), ValidationErrors> {
    match (derived, extra) {
        (Ok(()), Ok(())) => Ok(()),
        (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
        (Err(mut first), Err(second)) => {
            for (name, errors) in second.field_errors() {
                for error in errors {
                    first.add(name, error.clone());
                }
            }
            Err(first)
        }
    }
}

/// Normalizar un texto opcional: recortar y descartar cadenas vacías
pub fn trim_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_validate_not_empty() {
        assert!(validate_not_empty("Nguyen").is_ok());
        assert!(validate_not_empty("   ").is_err());
        assert!(validate_not_empty("").is_err());
    }

    #[test]
    fn test_validate_max_length_counts_chars() {
        assert!(validate_max_length("abc", 3).is_ok());
        assert!(validate_max_length("abcd", 3).is_err());
        // 3 caracteres, 6 bytes
        assert!(validate_max_length("ñáé", 3).is_ok());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range(1900, 1900, 2100).is_ok());
        assert!(validate_range(2100, 1900, 2100).is_ok());
        assert!(validate_range(1899, 1900, 2100).is_err());
        assert!(validate_range(-0.5, 0.0, 1_000_000.0).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("thu.le@garage.vn").is_ok());
        assert!(validate_email("invalid-email").is_err());
        assert!(validate_email("test@").is_err());
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive(Decimal::new(1, 2)).is_ok());
        assert!(validate_positive(Decimal::ZERO).is_err());
        assert!(validate_positive(Decimal::new(-5, 0)).is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative(Decimal::ZERO).is_ok());
        assert!(validate_non_negative(Decimal::new(-1, 0)).is_err());
    }

    #[test]
    fn test_validate_money() {
        assert!(validate_money(&Decimal::new(1, 2)).is_ok());
        assert!(validate_money(&Decimal::new(1_500, 3)).is_ok());
        assert!(validate_money(&Decimal::new(1, 3)).is_err());
        assert!(validate_money(&Decimal::new(5, 3)).is_err());

        let largest = Decimal::new(999_999_999_999_999_999, 2);
        assert!(validate_money(&largest).is_ok());
        assert!(validate_money(&money_limit()).is_err());
        assert!(validate_money(&Decimal::MAX).is_err());
    }

    #[test]
    fn test_field_keeps_value() {
        assert_eq!(field("year", Ok(2020)).unwrap(), 2020);
        let errors = field::<()>("year", Err(ValidationError::new("range"))).unwrap_err();
        assert!(errors.field_errors().contains_key("year"));
    }

    #[test]
    fn test_validate_date_order() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert!(validate_date_order(start, Some(end)).is_ok());
        assert!(validate_date_order(start, None).is_ok());
        assert!(validate_date_order(end, Some(start)).is_err());
    }

    #[test]
    fn test_collect_keys_errors_by_field() {
        let result = collect([
            ("name", validate_not_empty("")),
            ("email", validate_email("ok@example.com")),
            ("phone_number", validate_max_length("0123456789012345", 14)),
        ]);
        let errors = result.unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("phone_number"));
        assert!(!fields.contains_key("email"));
    }

    #[test]
    fn test_trim_optional() {
        assert_eq!(trim_optional(Some("  x ".to_string())), Some("x".to_string()));
        assert_eq!(trim_optional(Some("   ".to_string())), None);
        assert_eq!(trim_optional(None), None);
    }
}
