//! Caller-facing limits, checked before events reach persistence or the
//! invitation builder.

use crate::error::WriteError;
use crate::model::{EventNotification, ICalEvent};

pub const MAX_SUMMARY_CHARS: usize = 255;
pub const MAX_LOCATION_CHARS: usize = 255;
pub const MAX_DESCRIPTION_CHARS: usize = 3000;
pub const MAX_ALARMS: usize = 10;
pub const MAX_RECURRENCE_COUNT: u32 = 49;
/// Latest acceptable UNTIL date, compared on the `YYYYMMDD` prefix.
pub const MAX_UNTIL_DATE: &str = "20381231";

/// Validates field lengths, alarm count and recurrence bounds.
///
/// ## Errors
/// Returns the first violated bound as a [`WriteError`].
pub fn validate_event(event: &ICalEvent) -> Result<(), WriteError> {
    if let Some(title) = &event.title {
        let len = title.chars().count();
        if len > MAX_SUMMARY_CHARS {
            return Err(WriteError::SummaryTooLong(len));
        }
    }
    if let Some(location) = &event.location {
        let len = location.chars().count();
        if len > MAX_LOCATION_CHARS {
            return Err(WriteError::LocationTooLong(len));
        }
    }
    if let Some(notes) = &event.notes {
        let len = notes.chars().count();
        if len > MAX_DESCRIPTION_CHARS {
            return Err(WriteError::DescriptionTooLong(len));
        }
    }
    if event.notifications.len() > MAX_ALARMS {
        return Err(WriteError::TooManyAlarms(event.notifications.len()));
    }

    if let Some(recurrence) = &event.recurrence {
        validate_rule(&recurrence.rule)?;
    }

    for notification in &event.notifications {
        validate_notification(notification)?;
    }
    Ok(())
}

/// Validates one notification's lead-time bounds: days < 7000,
/// hours < 1000, minutes < 10000, seconds must be zero.
///
/// ## Errors
/// Returns [`WriteError::InvalidNotificationLeadTime`] naming the field.
pub fn validate_notification(notification: &EventNotification) -> Result<(), WriteError> {
    let checks: [(&'static str, i64, i64); 3] = [
        ("days", notification.days, 7000),
        ("hours", notification.hours, 1000),
        ("minutes", notification.minutes, 10000),
    ];
    for (field, value, bound) in checks {
        if value < 0 || value >= bound {
            return Err(WriteError::InvalidNotificationLeadTime { field, value });
        }
    }
    if notification.seconds != 0 {
        return Err(WriteError::InvalidNotificationLeadTime {
            field: "seconds",
            value: notification.seconds,
        });
    }
    Ok(())
}

/// Per-frequency interval ceilings.
fn interval_bound(frequency: &str) -> Option<(&'static str, u32)> {
    match frequency {
        "DAILY" => Some(("DAILY", 999)),
        "WEEKLY" => Some(("WEEKLY", 4999)),
        "MONTHLY" => Some(("MONTHLY", 999)),
        "YEARLY" => Some(("YEARLY", 99)),
        _ => None,
    }
}

fn validate_rule(rule: &str) -> Result<(), WriteError> {
    let mut frequency = None;
    let mut interval: u32 = 1;
    let mut count = None;
    let mut until = None;

    for pair in rule.split(';') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_uppercase().as_str() {
            "FREQ" => frequency = Some(value.trim().to_ascii_uppercase()),
            "INTERVAL" => interval = value.trim().parse().unwrap_or(1),
            "COUNT" => count = value.trim().parse::<u32>().ok(),
            "UNTIL" => until = Some(value.trim().to_string()),
            _ => {}
        }
    }

    if let Some((name, max)) = frequency.as_deref().and_then(interval_bound) {
        if interval > max {
            return Err(WriteError::IntervalTooLarge {
                frequency: name,
                interval,
                max,
            });
        }
    }

    if let Some(count) = count {
        if !(1..=MAX_RECURRENCE_COUNT).contains(&count) {
            return Err(WriteError::CountOutOfRange(count));
        }
    }

    if let Some(until) = until {
        let date_prefix = until.get(..8).unwrap_or(until.as_str());
        if date_prefix > MAX_UNTIL_DATE {
            return Err(WriteError::UntilTooLate(until));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventRecurrence;
    use chrono::{TimeZone, Utc};

    fn event_with(f: impl FnOnce(&mut ICalEvent)) -> ICalEvent {
        let mut event = ICalEvent {
            ics_uid: "u@x".into(),
            local_event_id: "l".into(),
            api_event_id: None,
            calendar_id: "c".into(),
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            start_date_timezone_identifier: "UTC".into(),
            end_date: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            end_date_timezone_identifier: "UTC".into(),
            is_all_day: false,
            sequence: 0,
            created_time: None,
            title: None,
            location: None,
            notes: None,
            status: None,
            recurrence: None,
            recurrence_id: None,
            recurrence_id_timezone_identifier: None,
            recurrence_id_is_all_day: false,
            exdates: Vec::new(),
            exdates_timezone_identifiers: Vec::new(),
            main_event_recurrence: None,
            is_first_occurrence: false,
            is_last_occurrence: false,
            organizer: None,
            participants: Vec::new(),
            invitation_state: None,
            is_organizer: false,
            is_orphan_single_edit: false,
            shared_event_id: None,
            shared_key_packet: None,
            calendar_key_packet: None,
            address_key_packet: None,
            notifications: Vec::new(),
            ics: String::new(),
        };
        f(&mut event);
        event
    }

    #[test]
    fn summary_length_edges() {
        let ok = event_with(|e| e.title = Some("x".repeat(255)));
        assert!(validate_event(&ok).is_ok());

        let too_long = event_with(|e| e.title = Some("x".repeat(256)));
        assert_eq!(
            validate_event(&too_long).unwrap_err(),
            WriteError::SummaryTooLong(256)
        );
    }

    #[test]
    fn summary_counts_characters_not_bytes() {
        let ok = event_with(|e| e.title = Some("é".repeat(255)));
        assert!(validate_event(&ok).is_ok());
    }

    #[test]
    fn alarm_count_bound() {
        let n = EventNotification {
            days: 1,
            hours: 0,
            minutes: 0,
            seconds: 0,
        };
        let too_many = event_with(|e| e.notifications = vec![n; 11]);
        assert_eq!(
            validate_event(&too_many).unwrap_err(),
            WriteError::TooManyAlarms(11)
        );
    }

    #[test]
    fn interval_bounds_per_frequency() {
        let weekly_ok =
            event_with(|e| e.recurrence = Some(EventRecurrence::new("FREQ=WEEKLY;INTERVAL=4999")));
        assert!(validate_event(&weekly_ok).is_ok());

        let yearly_bad =
            event_with(|e| e.recurrence = Some(EventRecurrence::new("FREQ=YEARLY;INTERVAL=100")));
        assert_eq!(
            validate_event(&yearly_bad).unwrap_err(),
            WriteError::IntervalTooLarge {
                frequency: "YEARLY",
                interval: 100,
                max: 99
            }
        );
    }

    #[test]
    fn count_bounds() {
        let bad = event_with(|e| e.recurrence = Some(EventRecurrence::new("FREQ=DAILY;COUNT=50")));
        assert_eq!(
            validate_event(&bad).unwrap_err(),
            WriteError::CountOutOfRange(50)
        );

        let ok = event_with(|e| e.recurrence = Some(EventRecurrence::new("FREQ=DAILY;COUNT=49")));
        assert!(validate_event(&ok).is_ok());
    }

    #[test]
    fn until_bound() {
        let ok = event_with(|e| {
            e.recurrence = Some(EventRecurrence::new("FREQ=DAILY;UNTIL=20381231T000000Z"));
        });
        assert!(validate_event(&ok).is_ok());

        let bad = event_with(|e| {
            e.recurrence = Some(EventRecurrence::new("FREQ=DAILY;UNTIL=20390101T000000Z"));
        });
        assert!(matches!(
            validate_event(&bad).unwrap_err(),
            WriteError::UntilTooLate(_)
        ));
    }

    #[test]
    fn notification_bounds() {
        let ok = EventNotification {
            days: 6999,
            hours: 999,
            minutes: 9999,
            seconds: 0,
        };
        assert!(validate_notification(&ok).is_ok());

        let bad_seconds = EventNotification {
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 30,
        };
        assert_eq!(
            validate_notification(&bad_seconds).unwrap_err(),
            WriteError::InvalidNotificationLeadTime {
                field: "seconds",
                value: 30
            }
        );

        let bad_days = EventNotification {
            days: 7000,
            hours: 0,
            minutes: 0,
            seconds: 0,
        };
        assert!(validate_notification(&bad_days).is_err());
    }
}
