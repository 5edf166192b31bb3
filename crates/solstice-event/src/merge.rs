//! Reconciliation of two partial VEVENT fragments into one normalized text.
//!
//! The API may split one logical event across calls; this engine folds an
//! "old" and a "new" fragment together. Scalar field groups prefer old;
//! RRULE, VALARM and ATTENDEE blocks are taken wholesale from whichever
//! side has any (old preferred); EXDATE is unioned. The wholesale-vs-scalar
//! asymmetry is observed behavior, preserved as-is.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use solstice_ical::value::DateTime as IcalDateTime;
use solstice_ical::{Component, ICalendar, Property, names, parse, serialize};

use crate::error::ContractViolation;

/// Scalar groups resolved independently with "old wins when present".
const SCALAR_GROUPS: &[&str] = &[
    names::UID,
    names::SEQUENCE,
    names::STATUS,
    names::SUMMARY,
    names::LOCATION,
    names::DESCRIPTION,
    names::RECURRENCE_ID,
    names::ORGANIZER,
];

/// Merges two raw single-VEVENT fragments into one normalized fragment.
///
/// CREATED, LAST-MODIFIED and DTSTAMP are always regenerated to `now`.
/// An empty `new` fragment makes the merge a no-op returning `old`.
///
/// ## Errors
/// Returns a [`ContractViolation`] when either fragment does not contain
/// exactly one VEVENT.
#[tracing::instrument(skip(old, new))]
pub fn parse_and_merge(
    old: &str,
    new: &str,
    now: DateTime<Utc>,
) -> Result<String, ContractViolation> {
    if new.trim().is_empty() {
        return Ok(old.to_string());
    }

    let old_ical = parse(old)?;
    let new_ical = parse(new)?;
    let old_event = single_vevent(&old_ical)?;
    let new_event = single_vevent(&new_ical)?;

    let mut merged = Component::event();

    let stamp = IcalDateTime::from_utc(now);
    merged.add_property(Property::datetime(names::CREATED, stamp.clone()));
    merged.add_property(Property::datetime(names::LAST_MODIFIED, stamp.clone()));
    merged.add_property(Property::datetime(names::DTSTAMP, stamp));

    for name in SCALAR_GROUPS {
        copy_first_present(&mut merged, old_event, new_event, name);
    }

    // DTSTART and DTEND move as one pair: mixing sides could tear an
    // interval apart.
    let timing_side = if old_event.get_property(names::DTSTART).is_some() {
        old_event
    } else {
        new_event
    };
    for name in [names::DTSTART, names::DTEND] {
        for prop in timing_side.get_properties(name) {
            merged.add_property(prop.clone());
        }
    }

    // RRULE and ATTENDEE blocks come wholesale from one side, old
    // preferred; new's entries are ignored entirely once old has any.
    copy_first_present(&mut merged, old_event, new_event, names::RRULE);
    merge_exdates(&mut merged, old_event, new_event);
    copy_first_present(&mut merged, old_event, new_event, names::ATTENDEE);

    // VALARM children follow the same side-wins policy.
    let alarm_side = if old_event.alarms().is_empty() {
        new_event
    } else {
        old_event
    };
    for alarm in alarm_side.alarms() {
        merged.add_child(alarm.clone());
    }

    let mut result = ICalendar::default();
    result.add_event(merged);
    Ok(serialize(&result))
}

fn single_vevent(ical: &ICalendar) -> Result<&Component, ContractViolation> {
    let events = ical.events();
    match events.as_slice() {
        [] => Err(ContractViolation::MissingVEvent),
        [only] => Ok(*only),
        many => Err(ContractViolation::MultipleVEvents(many.len())),
    }
}

/// Copies one scalar group from old when present there, else from new.
fn copy_first_present(merged: &mut Component, old: &Component, new: &Component, name: &str) {
    let side = if old.get_property(name).is_some() {
        old
    } else {
        new
    };
    for prop in side.get_properties(name) {
        merged.add_property(prop.clone());
    }
}

/// Unions EXDATE properties from both sides.
///
/// Deduplication is by the literal value text, not the resolved instant:
/// the same instant written in two timezones stays as two entries.
fn merge_exdates(merged: &mut Component, old: &Component, new: &Component) {
    let mut seen: HashSet<String> = HashSet::new();
    for side in [old, new] {
        for prop in side.get_properties(names::EXDATE) {
            if seen.insert(prop.raw_value.clone()) {
                merged.add_property(prop.clone());
            }
        }
    }
}
