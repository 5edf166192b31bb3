//! Timezone resolution and UTC conversion for iCalendar date-times.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

use crate::value::{self, DateTimeForm};

/// Resolver for TZID parameters.
///
/// Maintains a cache of resolved timezones. Unresolvable identifiers fall
/// back to UTC: malformed TZIDs from third-party clients must not make an
/// otherwise well-formed event unreadable.
#[derive(Debug, Default)]
pub struct TimeZoneResolver {
    /// Cache of resolved IANA timezones by TZID.
    cache: HashMap<String, Tz>,
}

impl TimeZoneResolver {
    /// Creates a new timezone resolver.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// Resolves a timezone identifier to a `chrono_tz::Tz`.
    ///
    /// Common CalDAV TZID prefixes are stripped before IANA lookup.
    /// Unknown identifiers resolve to UTC.
    ///
    /// ## Side Effects
    /// Caches successful resolutions to avoid repeated parsing.
    pub fn resolve(&mut self, tzid: &str) -> Tz {
        if let Some(tz) = self.cache.get(tzid) {
            return *tz;
        }

        let normalized = normalize_tzid(tzid);
        let tz = match Tz::from_str(normalized) {
            Ok(tz) => tz,
            Err(_) => {
                tracing::debug!(tzid, "unresolvable TZID, falling back to UTC");
                Tz::UTC
            }
        };

        self.cache.insert(tzid.to_string(), tz);
        tz
    }

    /// Converts a local wall-clock time in the named timezone to UTC.
    ///
    /// Handles DST ambiguity: a time inside a gap is shifted forward by one
    /// hour; a time inside a fold resolves to the first occurrence
    /// (RFC 5545 §3.3.5).
    pub fn to_utc(&mut self, local: NaiveDateTime, tzid: &str) -> DateTime<Utc> {
        let tz = self.resolve(tzid);
        local_to_utc(local, tz)
    }

    /// Converts a parsed DATE-TIME value to an absolute UTC instant.
    ///
    /// Floating times are interpreted as UTC. Returns `None` if the
    /// wall-clock fields do not form a real datetime.
    pub fn instant(&mut self, dt: &value::DateTime) -> Option<DateTime<Utc>> {
        let naive = dt.to_naive()?;
        Some(match &dt.form {
            DateTimeForm::Utc | DateTimeForm::Floating => {
                DateTime::from_naive_utc_and_offset(naive, Utc)
            }
            DateTimeForm::Zoned { tzid } => self.to_utc(naive, tzid),
        })
    }
}

fn local_to_utc(local: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        // DST fold: first occurrence per RFC 5545 §3.3.5
        LocalResult::Ambiguous(first, _) => first.with_timezone(&Utc),
        // DST gap: shift forward past the transition
        LocalResult::None => local_to_utc(local + TimeDelta::hours(1), tz),
    }
}

/// Strips common CalDAV/Olson TZID prefixes before IANA lookup.
fn normalize_tzid(tzid: &str) -> &str {
    tzid.strip_prefix("/mozilla.org/20050126_1/")
        .or_else(|| tzid.strip_prefix("/mozilla.org/"))
        .or_else(|| tzid.strip_prefix("/softwarestudio.org/"))
        .or_else(|| tzid.strip_prefix('/'))
        .unwrap_or(tzid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn naive(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDateTime::new(
            NaiveDate::from_ymd_opt(y, mo, d).unwrap(),
            NaiveTime::from_hms_opt(h, mi, 0).unwrap(),
        )
    }

    #[test]
    fn resolve_standard_timezone() {
        let mut resolver = TimeZoneResolver::new();
        assert_eq!(resolver.resolve("America/New_York"), Tz::America__New_York);
    }

    #[test]
    fn resolve_unknown_falls_back_to_utc() {
        let mut resolver = TimeZoneResolver::new();
        assert_eq!(resolver.resolve("Not/A_Zone"), Tz::UTC);
    }

    #[test]
    fn resolve_mozilla_prefix() {
        let mut resolver = TimeZoneResolver::new();
        assert_eq!(
            resolver.resolve("/mozilla.org/20050126_1/Europe/Zurich"),
            Tz::Europe__Zurich
        );
    }

    #[test]
    fn resolve_caches() {
        let mut resolver = TimeZoneResolver::new();
        resolver.resolve("America/New_York");
        assert!(resolver.cache.contains_key("America/New_York"));
    }

    #[test]
    fn to_utc_winter() {
        let mut resolver = TimeZoneResolver::new();
        // EST is UTC-5 in January
        let utc = resolver.to_utc(naive(2024, 1, 15, 10, 0), "America/New_York");
        assert_eq!(utc, Utc.with_ymd_and_hms(2024, 1, 15, 15, 0, 0).unwrap());
    }

    #[test]
    fn to_utc_summer() {
        let mut resolver = TimeZoneResolver::new();
        // EDT is UTC-4 in July
        let utc = resolver.to_utc(naive(2024, 7, 15, 10, 0), "America/New_York");
        assert_eq!(utc, Utc.with_ymd_and_hms(2024, 7, 15, 14, 0, 0).unwrap());
    }

    #[test]
    fn to_utc_dst_gap_shifts_forward() {
        let mut resolver = TimeZoneResolver::new();
        // 2024-03-10 02:30 does not exist in New York (spring forward)
        let utc = resolver.to_utc(naive(2024, 3, 10, 2, 30), "America/New_York");
        assert_eq!(utc, Utc.with_ymd_and_hms(2024, 3, 10, 7, 30, 0).unwrap());
    }

    #[test]
    fn to_utc_dst_fold_takes_first() {
        let mut resolver = TimeZoneResolver::new();
        // 2024-11-03 01:30 occurs twice in New York; first is EDT (UTC-4)
        let utc = resolver.to_utc(naive(2024, 11, 3, 1, 30), "America/New_York");
        assert_eq!(utc, Utc.with_ymd_and_hms(2024, 11, 3, 5, 30, 0).unwrap());
    }

    #[test]
    fn instant_forms() {
        let mut resolver = TimeZoneResolver::new();

        let utc_dt = value::DateTime::utc(2024, 1, 15, 10, 0, 0);
        assert_eq!(
            resolver.instant(&utc_dt).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()
        );

        let floating = value::DateTime::floating(2024, 1, 15, 10, 0, 0);
        assert_eq!(
            resolver.instant(&floating).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()
        );

        let zoned = value::DateTime {
            form: DateTimeForm::Zoned {
                tzid: "Europe/Zurich".into(),
            },
            ..value::DateTime::floating(2024, 1, 15, 10, 0, 0)
        };
        assert_eq!(
            resolver.instant(&zoned).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap()
        );
    }
}
