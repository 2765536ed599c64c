//! Time source for the run timestamp

use chrono::{SecondsFormat, Utc};
use chrono_tz::Tz;

use crate::error::{CollectorError, Result};

/// Produces the timezone-qualified timestamp of a run
pub trait Clock: Send + Sync {
    /// Current time as ISO-8601 with UTC offset
    fn now_iso(&self) -> String;
}

/// Wall clock rendered in a fixed IANA timezone
#[derive(Debug, Clone, Copy)]
pub struct ZonedClock {
    tz: Tz,
}

impl ZonedClock {
    /// Create a clock for `timezone`, e.g. "Europe/Oslo"
    pub fn new(timezone: &str) -> Result<Self> {
        let tz = timezone
            .parse::<Tz>()
            .map_err(|_| CollectorError::InvalidTimezone {
                timezone: timezone.to_string(),
            })?;
        Ok(Self { tz })
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }
}

impl Clock for ZonedClock {
    fn now_iso(&self) -> String {
        Utc::now()
            .with_timezone(&self.tz)
            .to_rfc3339_opts(SecondsFormat::Micros, false)
    }
}

/// Clock that always returns the same timestamp (tests, replays)
#[derive(Debug, Clone)]
pub struct FixedClock(String);

impl FixedClock {
    pub fn new(time_stamp: impl Into<String>) -> Self {
        Self(time_stamp.into())
    }
}

impl Clock for FixedClock {
    fn now_iso(&self) -> String {
        self.0.clone()
    }
}
