//! Cache entry record

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// File extension of cache entries
pub const ENTRY_EXTENSION: &str = "json";

/// One cached diagnosis, stored as `<fingerprint>.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// When the diagnosis was stored (RFC 3339 / ISO-8601)
    pub created: DateTime<Utc>,

    /// Opaque diagnosis text
    pub result: String,
}

impl CacheEntry {
    pub fn new(result: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            created,
            result: result.into(),
        }
    }

    /// Expired once strictly older than `max_age_hours`
    pub fn is_expired(&self, max_age_hours: u64, now: DateTime<Utc>) -> bool {
        let max_age = i64::try_from(max_age_hours)
            .ok()
            .and_then(Duration::try_hours)
            .unwrap_or(Duration::MAX);
        now.signed_duration_since(self.created) > max_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let entry = CacheEntry::new("r", now - Duration::hours(24));
        assert!(!entry.is_expired(24, now));

        let entry = CacheEntry::new("r", now - Duration::hours(24) - Duration::seconds(1));
        assert!(entry.is_expired(24, now));
    }

    #[test]
    fn test_huge_max_age_never_expires() {
        let now = Utc::now();
        let entry = CacheEntry::new("r", now - Duration::days(3650));
        assert!(!entry.is_expired(u64::MAX, now));
    }

    #[test]
    fn test_serialized_form_has_iso_timestamp() {
        let created = DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let entry = CacheEntry::new("report text", created);
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["created"], "2026-01-02T03:04:05Z");
        assert_eq!(json["result"], "report text");

        let back: CacheEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }
}
