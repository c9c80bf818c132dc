//! Lenient parsing of transaction dates.
//!
//! Transactions have been written by several producers over time, so a stored
//! or submitted date may be a plain calendar date, an RFC 3339 timestamp or a
//! MySQL style date-time. Anything else is treated as a missing date.

use serde::{Deserializer, Serializer, de::Visitor};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, format_description::BorrowedFormatItem,
    format_description::well_known::Rfc3339, macros::format_description,
};

/// The canonical date format, e.g. "2024-01-15".
pub const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

const SQL_DATE_TIME_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Parse `raw` as a calendar date, returning `None` if it is not in a known format.
///
/// RFC 3339 timestamps keep the date in the timestamp's own offset, so
/// "2024-01-31T23:30:00-05:00" is 31 January.
pub fn parse_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();

    Date::parse(raw, DATE_FORMAT)
        .ok()
        .or_else(|| OffsetDateTime::parse(raw, &Rfc3339).ok().map(|dt| dt.date()))
        .or_else(|| {
            PrimitiveDateTime::parse(raw, SQL_DATE_TIME_FORMAT)
                .ok()
                .map(|dt| dt.date())
        })
}

/// Format a date as "YYYY-MM-DD".
pub fn format_date(date: Date) -> String {
    // Formatting a date with only date components cannot fail.
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

pub(crate) fn serialize<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match date {
        Some(date) => serializer.serialize_str(&format_date(*date)),
        None => serializer.serialize_none(),
    }
}

/// Deserialize an optional date without ever failing.
///
/// Values that are not strings, or strings that are not dates, become `None`
/// so a single bad date does not reject the whole record.
pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LenientDateVisitor)
}

struct LenientDateVisitor;

impl<'de> Visitor<'de> for LenientDateVisitor {
    type Value = Option<Date>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a date string")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(parse_date(value))
    }

    fn visit_none<E>(self) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(None)
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(None)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }

    fn visit_bool<E>(self, _: bool) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(None)
    }

    fn visit_i64<E>(self, _: i64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(None)
    }

    fn visit_u64<E>(self, _: u64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(None)
    }

    fn visit_f64<E>(self, _: f64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(None)
    }
}
