//! Fuente de tiempo inyectable
//!
//! Los constructores del dominio reciben la fecha como parámetro; los
//! servicios y repositorios la obtienen de un `Clock` para que la
//! creación de registros sea determinista en tests.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};

/// Reloj del sistema
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Reloj real (UTC)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Reloj fijo, avanzable manualmente
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<RwLock<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(RwLock::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        let mut guard = self.now.write().unwrap_or_else(|e| e.into_inner());
        *guard = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.write().unwrap_or_else(|e| e.into_inner());
        *guard = *guard + by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_advances() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::days(2));
        assert_eq!(clock.now(), start + Duration::days(2));

        let shared = clock.clone();
        shared.set(start);
        assert_eq!(clock.now(), start);
    }
}
