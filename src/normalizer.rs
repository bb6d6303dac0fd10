//! Timestamp normalization
//!
//! This module turns raw timestamps into calendar dates.
//! - Numbers are epoch offsets in the unit fixed by the registry entry
//! - Numeric strings are treated like numbers
//! - Other strings are parsed as RFC 3339 or common date/time layouts
//! - Time of day is dropped; the day boundary comes from the run configuration

use crate::config::DayBoundary;
use crate::error::QuantifyError;
use crate::types::{ActivityEvent, RawRecord, RawTimestamp, TimestampUnit};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Naive layouts tried, in order, for string timestamps without an offset
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Normalizer for converting raw timestamps to dates
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampNormalizer {
    day_boundary: DayBoundary,
}

impl TimestampNormalizer {
    pub fn new(day_boundary: DayBoundary) -> Self {
        Self { day_boundary }
    }

    /// Normalize a raw record into an activity event
    pub fn normalize_record(&self, record: &RawRecord) -> Result<ActivityEvent, QuantifyError> {
        let date = self.normalize(&record.timestamp, record.unit)?;
        Ok(ActivityEvent {
            category: record.category,
            date,
        })
    }

    /// Normalize a raw timestamp to a calendar date
    pub fn normalize(
        &self,
        timestamp: &RawTimestamp,
        unit: TimestampUnit,
    ) -> Result<NaiveDate, QuantifyError> {
        match timestamp {
            RawTimestamp::Integer(value) => self.date_from_epoch(*value, unit),
            RawTimestamp::Float(value) => {
                if !value.is_finite() {
                    return Err(unparseable(timestamp));
                }
                self.date_from_epoch(value.trunc() as i64, unit)
            }
            RawTimestamp::Text(text) => self.date_from_text(text.trim(), unit),
            RawTimestamp::Unsupported(_) => Err(unparseable(timestamp)),
        }
    }

    fn date_from_epoch(&self, value: i64, unit: TimestampUnit) -> Result<NaiveDate, QuantifyError> {
        // Zero and negative values are placeholders in the export, not 1970
        if value <= 0 {
            return Err(QuantifyError::UnparseableTimestamp(format!(
                "non-positive epoch value {}",
                value
            )));
        }

        let datetime = match unit {
            TimestampUnit::Seconds => DateTime::<Utc>::from_timestamp(value, 0),
            TimestampUnit::Milliseconds => DateTime::<Utc>::from_timestamp_millis(value),
        }
        .ok_or_else(|| {
            QuantifyError::UnparseableTimestamp(format!("epoch value {} out of range", value))
        })?;

        Ok(self.to_day(datetime))
    }

    fn date_from_text(&self, text: &str, unit: TimestampUnit) -> Result<NaiveDate, QuantifyError> {
        if let Ok(value) = text.parse::<i64>() {
            return self.date_from_epoch(value, unit);
        }

        if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
            return Ok(self.to_day(datetime.with_timezone(&Utc)));
        }

        // Wall-clock strings carry their own day; no boundary shift applies
        for format in NAIVE_DATETIME_FORMATS {
            if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
                return Ok(datetime.date());
            }
        }

        for format in NAIVE_DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(text, format) {
                return Ok(date);
            }
        }

        Err(QuantifyError::UnparseableTimestamp(format!("{:?}", text)))
    }

    fn to_day(&self, datetime: DateTime<Utc>) -> NaiveDate {
        match self.day_boundary {
            DayBoundary::Utc => datetime.date_naive(),
            DayBoundary::Local => day_in(datetime, &Local),
        }
    }
}

/// Calendar day of an instant as seen in `tz`
fn day_in<Tz: TimeZone>(datetime: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    datetime.with_timezone(tz).date_naive()
}

fn unparseable(timestamp: &RawTimestamp) -> QuantifyError {
    QuantifyError::UnparseableTimestamp(timestamp.to_string())
}
