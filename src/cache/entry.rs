//! Cache Entry Module
//!
//! Defines a single stored value together with its last write time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// == Constants ==
/// Milliseconds in one day.
pub const MS_IN_A_DAY: i64 = 24 * 60 * 60 * 1000;

// == Cache Entry ==
/// Represents a single cache entry with its payload and write timestamp.
///
/// Entries are replaced wholesale on every write; nothing patches them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    /// When the entry was last written
    #[serde(with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
    /// The stored payload
    pub data: T,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates an entry stamped with the current time.
    pub fn new(data: T) -> Self {
        Self::with_timestamp(data, Utc::now())
    }

    /// Creates an entry with an explicit write time.
    pub fn with_timestamp(data: T, updated_at: DateTime<Utc>) -> Self {
        Self { updated_at, data }
    }

    // == Age ==
    /// Milliseconds elapsed between the last write and `now`.
    pub fn age_ms(&self, now: DateTime<Utc>) -> i64 {
        (now - self.updated_at).num_milliseconds()
    }

    // == Is Expired ==
    /// Checks whether the entry is older than `max_age_days` at `now`.
    ///
    /// Fractional days are honored (`0.5` is twelve hours). Zero disables
    /// expiration, as do NaN and negative values, which validated options
    /// never carry. Otherwise the entry is expired only once its age strictly
    /// exceeds the threshold.
    pub fn is_expired_at(&self, max_age_days: f64, now: DateTime<Utc>) -> bool {
        if max_age_days.is_nan() || max_age_days <= 0.0 {
            return false;
        }
        self.age_ms(now) as f64 > max_age_days * MS_IN_A_DAY as f64
    }
}

/// ISO-8601 timestamps with millisecond precision and a `Z` suffix.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    #[test]
    fn test_entry_creation() {
        let before = Utc::now();
        let entry = CacheEntry::new("value");
        let after = Utc::now();

        assert_eq!(entry.data, "value");
        assert!(entry.updated_at >= before && entry.updated_at <= after);
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Utc::now();
        let just_over = CacheEntry::with_timestamp((), now - Duration::days(3) - Duration::milliseconds(1));
        let exactly = CacheEntry::with_timestamp((), now - Duration::days(3));
        let just_under = CacheEntry::with_timestamp((), now - Duration::days(3) + Duration::milliseconds(1));

        assert!(just_over.is_expired_at(3.0, now));
        assert!(!exactly.is_expired_at(3.0, now), "age equal to the threshold is not expired");
        assert!(!just_under.is_expired_at(3.0, now));
    }

    #[test]
    fn test_fractional_day_boundary() {
        let now = Utc::now();
        let half_day = Duration::hours(12);
        let just_over = CacheEntry::with_timestamp((), now - half_day - Duration::milliseconds(1));
        let exactly = CacheEntry::with_timestamp((), now - half_day);
        let just_under = CacheEntry::with_timestamp((), now - half_day + Duration::milliseconds(1));

        assert!(just_over.is_expired_at(0.5, now));
        assert!(!exactly.is_expired_at(0.5, now));
        assert!(!just_under.is_expired_at(0.5, now));

        let seven_hours = CacheEntry::with_timestamp((), now - Duration::hours(7));
        assert!(seven_hours.is_expired_at(0.25, now));
        assert!(!seven_hours.is_expired_at(0.3, now));
    }

    #[test]
    fn test_zero_days_never_expires() {
        let now = Utc::now();
        let ancient = CacheEntry::with_timestamp((), now - Duration::days(10_000));
        assert!(!ancient.is_expired_at(0.0, now));
        assert!(!ancient.is_expired_at(f64::NAN, now));
    }

    #[test]
    fn test_future_timestamp_is_fresh() {
        let now = Utc::now();
        let entry = CacheEntry::with_timestamp((), now + Duration::hours(1));
        assert!(entry.age_ms(now) < 0);
        assert!(!entry.is_expired_at(1.0, now));
    }

    #[test]
    fn test_serialized_shape() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let entry = CacheEntry::with_timestamp(json!({ "v": 1 }), at);

        let text = serde_json::to_string(&entry).unwrap();
        assert_eq!(text, r#"{"updatedAt":"2024-05-01T12:30:00.000Z","data":{"v":1}}"#);
    }

    #[test]
    fn test_deserialize_accepts_offsets() {
        let entry: CacheEntry<u8> =
            serde_json::from_str(r#"{"updatedAt":"2024-05-01T14:30:00+02:00","data":7}"#).unwrap();
        assert_eq!(entry.updated_at, Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap());
        assert_eq!(entry.data, 7);
    }

    #[test]
    fn test_deserialize_rejects_bad_timestamp() {
        let result = serde_json::from_str::<CacheEntry<u8>>(r#"{"updatedAt":"yesterday","data":7}"#);
        assert!(result.is_err());
    }
}
