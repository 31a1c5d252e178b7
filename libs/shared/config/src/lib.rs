use std::env;

use chrono::FixedOffset;
use tracing::warn;

/// Default clinic offset is UTC+05:00 (Asia/Karachi), matching the
/// civil timezone the clinic operates in. Weekday resolution for
/// bookings always happens in this offset, never in the caller's.
const DEFAULT_UTC_OFFSET_MINUTES: i32 = 300;
const DEFAULT_SLOT_INTERVAL_MINUTES: i64 = 30;
const DEFAULT_STORE_TIMEOUT_MS: u64 = 2000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub clinic_utc_offset_minutes: i32,
    pub slot_interval_minutes: i64,
    pub store_timeout_ms: u64,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                warn!("JWT_SECRET not set, using empty value");
                String::new()
            }),
            clinic_utc_offset_minutes: parse_env("CLINIC_UTC_OFFSET_MINUTES", DEFAULT_UTC_OFFSET_MINUTES),
            slot_interval_minutes: parse_env("SLOT_INTERVAL_MINUTES", DEFAULT_SLOT_INTERVAL_MINUTES),
            store_timeout_ms: parse_env("STORE_TIMEOUT_MS", DEFAULT_STORE_TIMEOUT_MS),
            port: parse_env("PORT", 3000),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.jwt_secret.is_empty()
    }

    /// The clinic's fixed civil timezone as a chrono offset.
    pub fn clinic_timezone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.clinic_utc_offset_minutes * 60)
            .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            clinic_utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            slot_interval_minutes: DEFAULT_SLOT_INTERVAL_MINUTES,
            store_timeout_ms: DEFAULT_STORE_TIMEOUT_MS,
            port: 3000,
        }
    }
}

fn parse_env<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} has an invalid value, using default", name);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timezone_is_karachi_offset() {
        let config = AppConfig::default();
        assert_eq!(config.clinic_timezone().local_minus_utc(), 5 * 3600);
    }

    #[test]
    fn default_slot_interval_is_thirty_minutes() {
        assert_eq!(AppConfig::default().slot_interval_minutes, 30);
    }
}
