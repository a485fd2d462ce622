//! Sources of "today" for resolution.
//!
//! The resolver itself never reads the system clock; callers either pass a
//! date directly or hand over a [`Clock`]. [`SystemClock`] reads the OS clock
//! (the local timezone, or a configured IANA zone) and [`FixedClock`] pins a
//! date for tests and reproducible tool runs.

use chrono::{Local, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::ResolverError;

/// Provides the current calendar date.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

/// Reads today's date from the OS clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    timezone: Option<Tz>,
}

impl SystemClock {
    /// Today in the process's local timezone.
    pub fn local() -> Self {
        Self { timezone: None }
    }

    /// Today as observed in an IANA timezone (e.g., `"Asia/Kolkata"`).
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::InvalidTimezone`] if the name is not a valid
    /// IANA timezone.
    pub fn in_timezone(name: &str) -> Result<Self, ResolverError> {
        let tz = parse_timezone(name)?;
        Ok(Self { timezone: Some(tz) })
    }

    pub fn timezone(&self) -> Option<Tz> {
        self.timezone
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        match self.timezone {
            Some(tz) => Utc::now().with_timezone(&tz).date_naive(),
            None => Local::now().date_naive(),
        }
    }
}

/// Always reports the same date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(NaiveDate);

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parse a `YYYY-MM-DD` date into a fixed clock.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::InvalidDate`] if the string is not a valid
    /// ISO 8601 calendar date.
    pub fn parse(s: &str) -> Result<Self, ResolverError> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|e| ResolverError::InvalidDate(format!("'{}': {}", s, e)))
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

fn parse_timezone(s: &str) -> Result<Tz, ResolverError> {
    s.trim()
        .parse::<Tz>()
        .map_err(|_| ResolverError::InvalidTimezone(format!("'{}'", s)))
}
