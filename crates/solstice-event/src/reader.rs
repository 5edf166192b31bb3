//! Materialization of raw iCalendar fragments into domain events.
//!
//! `parse_single_event` turns one single-VEVENT payload into one
//! [`ICalEvent`]; `parse_recurring_events` expands a root fragment plus its
//! single-edits into the occurrences visible in a window.

use chrono::{DateTime, TimeDelta, Utc};
use solstice_ical::timezone::TimeZoneResolver;
use solstice_ical::{Component, Property, Value, names, parse, serialize};

use crate::deps::ICalReaderDependencies;
use crate::email::canonicalize_email;
use crate::error::ContractViolation;
use crate::model::{
    AttendeeStatus, EventRecurrence, EventStatus, ICalAttendee, ICalEvent, ICalOrganizer,
};
use crate::participant::resolve_participant;
use crate::recurrence;

/// Materializer over single-VEVENT payloads.
pub struct ICalReader;

/// A date-time property resolved to an absolute instant plus its source
/// wall-clock frame.
struct ResolvedStamp {
    instant: DateTime<Utc>,
    timezone_identifier: String,
    is_all_day: bool,
}

impl ICalReader {
    /// Materializes exactly one event from one payload.
    ///
    /// ## Errors
    /// Returns a [`ContractViolation`] when the payload breaks the
    /// single-well-formed-VEVENT precondition: not one VEVENT, missing UID,
    /// missing DTSTART, or DTSTART/DTEND disagreeing on the all-day form.
    #[tracing::instrument(skip(deps), fields(local_event_id = %deps.local_event_id))]
    pub fn parse_single_event(
        deps: &ICalReaderDependencies,
    ) -> Result<ICalEvent, ContractViolation> {
        let ical = parse(&deps.ics)?;
        let vevent = single_vevent(ical.events())?;
        let mut resolver = TimeZoneResolver::new();

        let ics_uid = vevent
            .uid()
            .map(String::from)
            .ok_or(ContractViolation::MissingUid)?;

        // DTSTART is required; DTEND is derived when absent.
        let start = vevent
            .get_property(names::DTSTART)
            .and_then(|p| resolve_stamp(p, &mut resolver))
            .ok_or(ContractViolation::MissingDtStart)?;
        let end = resolve_end(vevent, &start, &mut resolver)?;

        let created_time = vevent
            .get_property(names::CREATED)
            .and_then(|p| resolve_stamp(p, &mut resolver))
            .map(|stamp| stamp.instant);

        let sequence = vevent
            .get_property(names::SEQUENCE)
            .and_then(Property::as_integer)
            .unwrap_or(0);

        // With several RRULEs the last parseable one wins.
        let recurrence = vevent
            .get_properties(names::RRULE)
            .into_iter()
            .filter_map(|p| p.value.as_recur())
            .next_back()
            .map(EventRecurrence::new);

        let recurrence_id = vevent
            .get_property(names::RECURRENCE_ID)
            .and_then(|p| resolve_stamp(p, &mut resolver));

        let (exdates, exdates_timezone_identifiers) =
            resolve_exdates(vevent, &start.timezone_identifier, &mut resolver);

        let organizer = vevent
            .get_property(names::ORGANIZER)
            .map(parse_organizer);
        let participants: Vec<ICalAttendee> = vevent
            .get_properties(names::ATTENDEE)
            .into_iter()
            .map(parse_attendee)
            .collect();

        let invitation_state =
            derive_invitation_state(organizer.as_ref(), &participants, deps);

        let event = ICalEvent {
            ics_uid,
            local_event_id: deps.local_event_id.clone(),
            api_event_id: deps.api_event_id.clone(),
            calendar_id: deps.calendar_id.clone(),
            start_date: start.instant,
            start_date_timezone_identifier: start.timezone_identifier,
            end_date: end.instant,
            end_date_timezone_identifier: end.timezone_identifier,
            is_all_day: start.is_all_day,
            sequence,
            created_time,
            title: text_property(vevent, names::SUMMARY),
            location: text_property(vevent, names::LOCATION),
            notes: text_property(vevent, names::DESCRIPTION),
            status: vevent
                .get_property(names::STATUS)
                .and_then(Property::as_text)
                .and_then(EventStatus::parse),
            recurrence,
            recurrence_id: recurrence_id.as_ref().map(|s| s.instant),
            recurrence_id_timezone_identifier: recurrence_id
                .as_ref()
                .map(|s| s.timezone_identifier.clone()),
            recurrence_id_is_all_day: recurrence_id.is_some_and(|s| s.is_all_day),
            exdates,
            exdates_timezone_identifiers,
            main_event_recurrence: None,
            is_first_occurrence: false,
            is_last_occurrence: false,
            organizer,
            participants,
            invitation_state,
            is_organizer: deps.is_organizer,
            is_orphan_single_edit: false,
            shared_event_id: deps.shared_event_id.clone(),
            shared_key_packet: deps.shared_key_packet.clone(),
            calendar_key_packet: deps.calendar_key_packet.clone(),
            address_key_packet: deps.address_key_packet.clone(),
            notifications: deps.notifications.clone(),
            // Normalized snapshot, even when the input was already canonical.
            ics: serialize(&ical),
        };

        tracing::debug!(uid = %event.ics_uid, all_day = event.is_all_day, "materialized event");
        Ok(event)
    }

    /// Expands one logical recurring event into its visible occurrences.
    ///
    /// Fragments are one candidate root plus zero or more single-edits, each
    /// with its own dependency bundle. Returns the events whose intervals
    /// fall within `[left, right)`.
    ///
    /// ## Errors
    /// Propagates any fragment's materialization failure; there is no
    /// partial result.
    #[tracing::instrument(skip(fragments), fields(fragment_count = fragments.len()))]
    pub fn parse_recurring_events(
        fragments: &[ICalReaderDependencies],
        left: DateTime<Utc>,
        right: DateTime<Utc>,
    ) -> Result<Vec<ICalEvent>, ContractViolation> {
        let events: Vec<ICalEvent> = fragments
            .iter()
            .map(Self::parse_single_event)
            .collect::<Result<_, _>>()?;

        let Some(root_index) = events.iter().position(|e| e.recurrence.is_some()) else {
            // No root: every fragment is an orphan single-edit.
            tracing::debug!("no root fragment found, returning orphans");
            return Ok(events
                .into_iter()
                .map(|mut event| {
                    event.is_orphan_single_edit = true;
                    event
                })
                .collect());
        };

        let root = &events[root_index];
        let Some(root_recurrence) = root.recurrence.clone() else {
            return Ok(Vec::new());
        };

        let set =
            recurrence::build_rrule_set(&root_recurrence.rule, root.start_date, &root.exdates)?;
        let mut timestamps = recurrence::occurrences_between(&set, left, right);

        let mut result: Vec<ICalEvent> = Vec::new();

        for (i, event) in events.iter().enumerate() {
            if i == root_index {
                continue;
            }
            let Some(recurrence_id) = event.recurrence_id else {
                continue;
            };

            if event.intersects(left, right) {
                let mut edit = event.clone();
                edit.main_event_recurrence = Some(root_recurrence.clone());
                result.push(edit);
            }
            // The edited occurrence must never also be generated.
            timestamps.retain(|ts| *ts != recurrence_id);
        }

        for timestamp in timestamps {
            result.push(root.clone_for_occurrence(timestamp));
        }

        // First/last flags are computed against the full series, not the
        // window: the window may truncate away the true first occurrence
        // while still showing events that need correct flags.
        let series_first = recurrence::first_occurrence(&set);
        let series_last = recurrence::last_occurrence(&set, root_recurrence.ends_never);
        for event in &mut result {
            let effective = event.recurrence_id.unwrap_or(event.start_date);
            event.is_first_occurrence = series_first == Some(effective);
            event.is_last_occurrence = series_last == Some(effective);
        }

        tracing::debug!(occurrences = result.len(), "expanded recurring series");
        Ok(result)
    }
}

fn single_vevent(events: Vec<&Component>) -> Result<&Component, ContractViolation> {
    match events.as_slice() {
        [] => Err(ContractViolation::MissingVEvent),
        [only] => Ok(*only),
        many => Err(ContractViolation::MultipleVEvents(many.len())),
    }
}

/// Resolves one date-time property to an absolute instant.
///
/// DATE values are all-day and anchored at UTC midnight. Times without a
/// TZID parameter are Zulu; unresolvable identifiers already fell back to
/// UTC inside the resolver.
fn resolve_stamp(prop: &Property, resolver: &mut TimeZoneResolver) -> Option<ResolvedStamp> {
    match &prop.value {
        Value::Date(date) => {
            let naive = date.to_naive()?.and_hms_opt(0, 0, 0)?;
            Some(ResolvedStamp {
                instant: DateTime::from_naive_utc_and_offset(naive, Utc),
                timezone_identifier: "UTC".to_string(),
                is_all_day: true,
            })
        }
        Value::DateTime(dt) => Some(ResolvedStamp {
            instant: resolver.instant(dt)?,
            timezone_identifier: dt.tzid().unwrap_or("UTC").to_string(),
            is_all_day: false,
        }),
        _ => None,
    }
}

/// Resolves DTEND, deriving it when absent: all-day events default to one
/// UTC calendar day, timed events to zero duration.
fn resolve_end(
    vevent: &Component,
    start: &ResolvedStamp,
    resolver: &mut TimeZoneResolver,
) -> Result<ResolvedStamp, ContractViolation> {
    if let Some(prop) = vevent.get_property(names::DTEND) {
        if let Some(end) = resolve_stamp(prop, resolver) {
            if end.is_all_day != start.is_all_day {
                return Err(ContractViolation::MismatchedAllDayFlags);
            }
            return Ok(end);
        }
        tracing::debug!("unreadable DTEND, deriving from DTSTART");
    }

    let instant = if start.is_all_day {
        start.instant + TimeDelta::days(1)
    } else {
        start.instant
    };
    Ok(ResolvedStamp {
        instant,
        timezone_identifier: start.timezone_identifier.clone(),
        is_all_day: start.is_all_day,
    })
}

/// Applies the EXDATE keep/convert/drop policy.
///
/// No explicit timezone: Zulu, kept. Same timezone as DTSTART: kept,
/// converted. A different timezone: dropped without signal. The asymmetry is
/// observed behavior and is preserved as-is.
fn resolve_exdates(
    vevent: &Component,
    start_tzid: &str,
    resolver: &mut TimeZoneResolver,
) -> (Vec<DateTime<Utc>>, Vec<String>) {
    let mut exdates = Vec::new();
    let mut identifiers = Vec::new();

    for prop in vevent.get_properties(names::EXDATE) {
        let prop_tzid = prop.tzid();
        match prop_tzid {
            None => {}
            Some(tzid) if tzid == start_tzid => {}
            Some(tzid) => {
                tracing::debug!(
                    exdate_tzid = tzid,
                    start_tzid,
                    "dropping cross-timezone EXDATE"
                );
                continue;
            }
        }
        let identifier = prop_tzid.unwrap_or("UTC").to_string();

        match &prop.value {
            Value::DateTime(dt) => {
                if let Some(instant) = resolver.instant(dt) {
                    exdates.push(instant);
                    identifiers.push(identifier);
                }
            }
            Value::DateTimeList(list) => {
                for dt in list {
                    if let Some(instant) = resolver.instant(dt) {
                        exdates.push(instant);
                        identifiers.push(identifier.clone());
                    }
                }
            }
            Value::Date(date) => {
                if let Some(naive) = date.to_naive().and_then(|d| d.and_hms_opt(0, 0, 0)) {
                    exdates.push(DateTime::from_naive_utc_and_offset(naive, Utc));
                    identifiers.push(identifier);
                }
            }
            Value::DateList(list) => {
                for date in list {
                    if let Some(naive) = date.to_naive().and_then(|d| d.and_hms_opt(0, 0, 0)) {
                        exdates.push(DateTime::from_naive_utc_and_offset(naive, Utc));
                        identifiers.push(identifier.clone());
                    }
                }
            }
            _ => {}
        }
    }

    (exdates, identifiers)
}

fn text_property(vevent: &Component, name: &str) -> Option<String> {
    vevent
        .get_property(name)
        .and_then(Property::as_text)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn mailto_email(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .get(..7)
        .filter(|prefix| prefix.eq_ignore_ascii_case("mailto:"))
        .map_or_else(|| trimmed.to_string(), |_| trimmed[7..].to_string())
}

fn parse_attendee(prop: &Property) -> ICalAttendee {
    ICalAttendee {
        email: mailto_email(&prop.raw_value),
        name: prop.get_param_value("CN").map(String::from),
        status: prop
            .get_param_value("PARTSTAT")
            .and_then(AttendeeStatus::parse)
            .unwrap_or_default(),
        role: prop.get_param_value("ROLE").map(String::from),
        rsvp: prop
            .get_param_value("RSVP")
            .is_some_and(|v| v.eq_ignore_ascii_case("TRUE")),
        token: prop.get_param_value("X-PM-TOKEN").map(String::from),
    }
}

fn parse_organizer(prop: &Property) -> ICalOrganizer {
    ICalOrganizer {
        email: mailto_email(&prop.raw_value),
        name: prop.get_param_value("CN").map(String::from),
        status: prop
            .get_param_value("PARTSTAT")
            .and_then(AttendeeStatus::parse),
    }
}

/// Derives the current user's invitation state.
///
/// If the user owns the organizer's address and the ORGANIZER line carries a
/// status, that status applies; otherwise the matching attendee's status;
/// otherwise unset.
fn derive_invitation_state(
    organizer: Option<&ICalOrganizer>,
    participants: &[ICalAttendee],
    deps: &ICalReaderDependencies,
) -> Option<AttendeeStatus> {
    if let Some(organizer) = organizer
        && let Some(status) = organizer.status
    {
        let canonical = canonicalize_email(&organizer.email);
        let user_is_organizer = deps
            .owned_addresses
            .iter()
            .any(|a| canonicalize_email(&a.email) == canonical);
        if user_is_organizer {
            return Some(status);
        }
    }

    resolve_participant(participants, &deps.owned_addresses).map(|p| p.attendee.status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OwnedAddress;
    use chrono::TimeZone;

    fn deps_for(ics: &str) -> ICalReaderDependencies {
        ICalReaderDependencies::bare("cal-1", "local-1", ics)
    }

    fn wrap_vevent(body: &str) -> String {
        format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\n{body}END:VEVENT\r\nEND:VCALENDAR\r\n"
        )
    }

    #[test]
    fn timed_event_without_dtend_is_zero_duration() {
        let ics = wrap_vevent("UID:e@x\r\nDTSTART:20240101T090000Z\r\n");
        let event = ICalReader::parse_single_event(&deps_for(&ics)).unwrap();

        assert_eq!(event.start_date, event.end_date);
        assert!(!event.is_all_day);
    }

    #[test]
    fn all_day_event_without_dtend_spans_one_day() {
        let ics = wrap_vevent("UID:e@x\r\nDTSTART:20240101\r\n");
        let event = ICalReader::parse_single_event(&deps_for(&ics)).unwrap();

        assert!(event.is_all_day);
        assert_eq!(
            event.end_date,
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn zoned_dtstart_converts_and_records_tzid() {
        let ics = wrap_vevent("UID:e@x\r\nDTSTART;TZID=Europe/Zurich:20240101T100000\r\n");
        let event = ICalReader::parse_single_event(&deps_for(&ics)).unwrap();

        assert_eq!(event.start_date_timezone_identifier, "Europe/Zurich");
        // CET is UTC+1 in January.
        assert_eq!(
            event.start_date,
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn mismatched_all_day_flags_is_fatal() {
        let ics = wrap_vevent("UID:e@x\r\nDTSTART:20240101\r\nDTEND:20240101T100000Z\r\n");
        let err = ICalReader::parse_single_event(&deps_for(&ics)).unwrap_err();
        assert!(matches!(err, ContractViolation::MismatchedAllDayFlags));
    }

    #[test]
    fn missing_uid_is_fatal() {
        let ics = wrap_vevent("DTSTART:20240101T090000Z\r\n");
        let err = ICalReader::parse_single_event(&deps_for(&ics)).unwrap_err();
        assert!(matches!(err, ContractViolation::MissingUid));
    }

    #[test]
    fn missing_dtstart_is_fatal() {
        let ics = wrap_vevent("UID:e@x\r\n");
        let err = ICalReader::parse_single_event(&deps_for(&ics)).unwrap_err();
        assert!(matches!(err, ContractViolation::MissingDtStart));
    }

    #[test]
    fn two_vevents_is_fatal() {
        let ics = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\n\
BEGIN:VEVENT\r\nUID:a@x\r\nDTSTART:20240101T090000Z\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nUID:b@x\r\nDTSTART:20240101T090000Z\r\nEND:VEVENT\r\n\
END:VCALENDAR\r\n";
        let err = ICalReader::parse_single_event(&deps_for(ics)).unwrap_err();
        assert!(matches!(err, ContractViolation::MultipleVEvents(2)));
    }

    #[test]
    fn recurrence_id_type_is_independent_of_dtstart() {
        // Timed DTSTART, all-day RECURRENCE-ID: the edit changed the form.
        let ics = wrap_vevent(
            "UID:e@x\r\nDTSTART:20240101T090000Z\r\nRECURRENCE-ID;VALUE=DATE:20240108\r\n",
        );
        let event = ICalReader::parse_single_event(&deps_for(&ics)).unwrap();

        assert!(!event.is_all_day);
        assert!(event.recurrence_id_is_all_day);
        assert_eq!(
            event.recurrence_id,
            Some(Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn exdate_policy_keep_and_drop() {
        let ics = wrap_vevent(
            "UID:e@x\r\n\
DTSTART;TZID=Europe/Zurich:20240101T100000\r\n\
EXDATE:20240108T090000Z\r\n\
EXDATE;TZID=Europe/Zurich:20240115T100000\r\n\
EXDATE;TZID=America/New_York:20240122T040000\r\n",
        );
        let event = ICalReader::parse_single_event(&deps_for(&ics)).unwrap();

        // Zulu kept, same-timezone kept, cross-timezone dropped.
        assert_eq!(event.exdates.len(), 2);
        assert_eq!(event.exdates_timezone_identifiers, vec!["UTC", "Europe/Zurich"]);
        assert_eq!(
            event.exdates[1],
            Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn invitation_state_from_matching_attendee() {
        let ics = wrap_vevent(
            "UID:e@x\r\nDTSTART:20240101T090000Z\r\n\
ORGANIZER:mailto:boss@example.com\r\n\
ATTENDEE;PARTSTAT=ACCEPTED:mailto:me@example.com\r\n",
        );
        let mut deps = deps_for(&ics);
        deps.owned_addresses = vec![OwnedAddress {
            id: "A".into(),
            email: "me@example.com".into(),
            order: 1,
            send: true,
        }];

        let event = ICalReader::parse_single_event(&deps).unwrap();
        assert_eq!(event.invitation_state, Some(AttendeeStatus::Accepted));
        assert_eq!(event.organizer.unwrap().email, "boss@example.com");
    }

    #[test]
    fn organizer_without_status_falls_back_to_attendee() {
        // The user organizes the event but ORGANIZER carries no PARTSTAT;
        // the state comes from the matching ATTENDEE line instead.
        let ics = wrap_vevent(
            "UID:e@x\r\nDTSTART:20240101T090000Z\r\n\
ORGANIZER:mailto:me@example.com\r\n\
ATTENDEE;PARTSTAT=ACCEPTED:mailto:me@example.com\r\n",
        );
        let mut deps = deps_for(&ics);
        deps.owned_addresses = vec![OwnedAddress {
            id: "A".into(),
            email: "me@example.com".into(),
            order: 1,
            send: true,
        }];

        let event = ICalReader::parse_single_event(&deps).unwrap();
        assert_eq!(event.invitation_state, Some(AttendeeStatus::Accepted));
    }

    #[test]
    fn last_of_multiple_rrules_wins() {
        let ics = wrap_vevent(
            "UID:e@x\r\nDTSTART:20240101T090000Z\r\n\
RRULE:FREQ=DAILY;COUNT=2\r\nRRULE:FREQ=WEEKLY;COUNT=5\r\n",
        );
        let event = ICalReader::parse_single_event(&deps_for(&ics)).unwrap();
        assert_eq!(event.recurrence.unwrap().rule, "FREQ=WEEKLY;COUNT=5");
    }

    #[test]
    fn ics_snapshot_is_set() {
        let ics = wrap_vevent("UID:e@x\r\nDTSTART:20240101T090000Z\r\nSUMMARY:Standup\r\n");
        let event = ICalReader::parse_single_event(&deps_for(&ics)).unwrap();

        assert!(event.ics.contains("BEGIN:VCALENDAR"));
        assert!(event.ics.contains("SUMMARY:Standup"));
        // Snapshot re-materializes to the same event.
        let mut deps = deps_for(&event.ics);
        deps.local_event_id = "local-1".into();
        let again = ICalReader::parse_single_event(&deps).unwrap();
        assert_eq!(again.ics_uid, event.ics_uid);
        assert_eq!(again.start_date, event.start_date);
        assert_eq!(again.title, event.title);
    }

    #[test]
    fn expansion_replaces_edited_occurrence() {
        let root = wrap_vevent(
            "UID:series@x\r\nDTSTART:20240101T090000Z\r\nRRULE:FREQ=WEEKLY;COUNT=5\r\n",
        );
        // Edit overrides the 3rd occurrence (Jan 15) and moves it an hour.
        let edit = wrap_vevent(
            "UID:series@x\r\nDTSTART:20240115T100000Z\r\nRECURRENCE-ID:20240115T090000Z\r\n",
        );
        let fragments = vec![deps_for(&root), deps_for(&edit)];

        let left = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let right = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let events = ICalReader::parse_recurring_events(&fragments, left, right).unwrap();

        assert_eq!(events.len(), 5);
        let mut starts: Vec<_> = events.iter().map(|e| e.start_date).collect();
        starts.sort();
        starts.dedup();
        assert_eq!(starts.len(), 5);
        // The edited occurrence carries the root's rule for display.
        let edited = events
            .iter()
            .find(|e| e.recurrence_id.is_some())
            .unwrap();
        assert_eq!(
            edited.main_event_recurrence.as_ref().unwrap().rule,
            "FREQ=WEEKLY;COUNT=5"
        );
    }

    #[test]
    fn expansion_without_root_yields_orphans() {
        let edit = wrap_vevent(
            "UID:series@x\r\nDTSTART:20240115T100000Z\r\nRECURRENCE-ID:20240115T090000Z\r\n",
        );
        let fragments = vec![deps_for(&edit)];

        let left = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let right = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let events = ICalReader::parse_recurring_events(&fragments, left, right).unwrap();

        assert_eq!(events.len(), 1);
        assert!(events[0].is_orphan_single_edit);
    }

    #[test]
    fn first_and_last_flags_survive_window_truncation() {
        let root = wrap_vevent(
            "UID:series@x\r\nDTSTART:20240101T090000Z\r\nRRULE:FREQ=WEEKLY;COUNT=3\r\n",
        );
        let fragments = vec![deps_for(&root)];

        // Window starts after the first occurrence.
        let left = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let right = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let events = ICalReader::parse_recurring_events(&fragments, left, right).unwrap();

        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| !e.is_first_occurrence));
        let last = events
            .iter()
            .find(|e| e.start_date == Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap())
            .unwrap();
        assert!(last.is_last_occurrence);
    }
}
