//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, validación
//! de campos y la fuente de tiempo inyectable.

pub mod clock;
pub mod errors;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use errors::{AppError, AppResult};
