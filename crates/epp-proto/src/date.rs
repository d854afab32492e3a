//! Registry timestamps.

use std::{fmt, str::FromStr};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

use crate::error::ParseError;

/// Timestamp as reported by the registry (`crDate`, `exDate`, ...).
///
/// Registries send RFC 3339 (`2025-06-01T00:00:00.0Z`); some send only a
/// date. Both parse; a bare date is taken as midnight UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EppDate(DateTime<FixedOffset>);

impl EppDate {
    /// Wrap an existing timestamp.
    pub fn new(inner: DateTime<FixedOffset>) -> Self {
        Self(inner)
    }

    /// Calendar date as the registry sees it (offset preserved).
    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    /// `YYYY-MM-DD`, the form `curExpDate` and callers expect.
    pub fn date_string(&self) -> String {
        self.date().format("%Y-%m-%d").to_string()
    }

    /// Instant in UTC.
    pub fn to_utc(&self) -> DateTime<Utc> {
        self.0.with_timezone(&Utc)
    }

    /// Underlying timestamp.
    pub fn inner(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

impl From<DateTime<Utc>> for EppDate {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value.fixed_offset())
    }
}

impl FromStr for EppDate {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(parsed));
        }

        let invalid = || ParseError::InvalidValue { field: "date", value: s.to_string() };
        let prefix = s.get(..10).ok_or_else(invalid)?;
        let date = NaiveDate::parse_from_str(prefix, "%Y-%m-%d").map_err(|_| invalid())?;
        let utc = FixedOffset::east_opt(0).ok_or_else(invalid)?;
        Ok(Self(DateTime::from_naive_utc_and_offset(NaiveDateTime::from(date), utc)))
    }
}

impl fmt::Display for EppDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_with_fraction() {
        let date: EppDate = "2025-06-01T00:00:00.0Z".parse().unwrap();
        assert_eq!(date.date_string(), "2025-06-01");
    }

    #[test]
    fn parses_bare_date() {
        let date: EppDate = "2024-02-29".parse().unwrap();
        assert_eq!(date.date_string(), "2024-02-29");
        assert_eq!(date.to_utc().timestamp() % 86_400, 0);
    }

    #[test]
    fn date_part_keeps_registry_offset() {
        let date: EppDate = "2025-06-01T23:30:00+02:00".parse().unwrap();
        assert_eq!(date.date_string(), "2025-06-01");
    }

    #[test]
    fn garbage_rejected() {
        assert!("tomorrow".parse::<EppDate>().is_err());
        assert!("".parse::<EppDate>().is_err());
    }
}
