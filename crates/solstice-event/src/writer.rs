//! Serialization of domain events back to iCalendar text.
//!
//! Three surfaces: `snapshot_component` wraps an already-parsed component in
//! a fresh envelope, `VEventBuilder` produces a VEVENT for one build part,
//! and `write_invitation`/`write_snapshot` assemble complete documents.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono::{Datelike, Timelike};
use solstice_ical::timezone::TimeZoneResolver;
use solstice_ical::value::{Date, DateTime as IcalDateTime, DateTimeForm};
use solstice_ical::{Component, ComponentKind, ICalendar, Parameter, Property, names, serialize};

use crate::error::WriteError;
use crate::model::{ICalAttendee, ICalEvent, ICalOrganizer};

/// Which subset of the event a build produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildPart {
    /// Every field the domain model carries (persistence round-trips).
    AllParts,
    /// The responding attendee's view.
    Reply,
    /// An invitation, carrying the encryption session key reference.
    Invite { session_key: String },
    /// A cancellation notice.
    Cancel,
}

/// Invitation method for a complete outgoing document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvitationMethod {
    Request { session_key: String },
    Reply,
    Cancel,
}

impl InvitationMethod {
    const fn as_str(&self) -> &'static str {
        match self {
            Self::Request { .. } => "REQUEST",
            Self::Reply => "REPLY",
            Self::Cancel => "CANCEL",
        }
    }
}

/// Wraps a clone of an already-parsed component in one VCALENDAR envelope.
#[must_use]
pub fn snapshot_component(component: &Component) -> String {
    let mut ical = ICalendar::default();
    ical.root.add_child(component.clone());
    serialize(&ical)
}

/// Builds VEVENT components from one event, per build part.
pub struct VEventBuilder<'a> {
    event: &'a ICalEvent,
    now: DateTime<Utc>,
}

impl<'a> VEventBuilder<'a> {
    #[must_use]
    pub const fn new(event: &'a ICalEvent, now: DateTime<Utc>) -> Self {
        Self { event, now }
    }

    /// Builds the VEVENT for one part.
    ///
    /// `Ok(None)` means the part has no content for this event (a reply with
    /// no attendees, for instance) and is not an error.
    ///
    /// ## Errors
    /// Returns a [`WriteError`] when a required field for the part is
    /// missing or the event's dates are inconsistent.
    pub fn build(&self, part: &BuildPart) -> Result<Option<Component>, WriteError> {
        if self.event.start_date > self.event.end_date {
            return Err(WriteError::StartDateIsAfterEndDate);
        }

        match part {
            BuildPart::AllParts => Ok(Some(self.build_full()?)),
            BuildPart::Reply => self.build_reply(),
            BuildPart::Invite { session_key } => Ok(Some(self.build_invite(session_key)?)),
            BuildPart::Cancel => Ok(Some(self.build_cancel()?)),
        }
    }

    /// UID and DTSTAMP, stamped onto every non-empty build.
    fn stamped(&self) -> Component {
        let mut vevent = Component::event();
        vevent.add_property(Property::text(names::UID, &self.event.ics_uid));
        vevent.add_property(Property::datetime(
            names::DTSTAMP,
            IcalDateTime::from_utc(self.now),
        ));
        vevent
    }

    fn build_full(&self) -> Result<Component, WriteError> {
        let mut vevent = self.stamped();
        self.add_timing(&mut vevent)?;
        vevent.add_property(Property::integer(names::SEQUENCE, self.event.sequence));
        self.add_content(&mut vevent);
        self.add_recurrence(&mut vevent)?;
        self.add_organizer_and_attendees(&mut vevent)?;
        self.add_alarms(&mut vevent);
        if let Some(shared_event_id) = &self.event.shared_event_id {
            vevent.add_property(Property::text("X-PM-SHARED-EVENT-ID", shared_event_id));
        }
        Ok(vevent)
    }

    fn build_invite(&self, session_key: &str) -> Result<Component, WriteError> {
        let shared_event_id = self
            .event
            .shared_event_id
            .as_deref()
            .ok_or(WriteError::MissingSharedEventId)?;
        if self.event.shared_key_packet.is_none() {
            return Err(WriteError::MissingSharedKeyPacket);
        }

        let mut vevent = self.stamped();
        self.add_timing(&mut vevent)?;
        vevent.add_property(Property::integer(names::SEQUENCE, self.event.sequence));
        self.add_content(&mut vevent);
        self.add_recurrence(&mut vevent)?;
        self.add_organizer_and_attendees(&mut vevent)?;
        vevent.add_property(Property::text("X-PM-SHARED-EVENT-ID", shared_event_id));
        vevent.add_property(Property::text("X-PM-SESSION-KEY", session_key));
        Ok(vevent)
    }

    fn build_reply(&self) -> Result<Option<Component>, WriteError> {
        if self.event.participants.is_empty() {
            return Ok(None);
        }

        let mut vevent = self.stamped();
        self.add_timing(&mut vevent)?;
        if let Some(recurrence) = &self.event.recurrence {
            vevent.add_property(Property::recur(names::RRULE, &recurrence.rule));
        }
        self.add_recurrence_id(&mut vevent)?;
        vevent.add_property(Property::integer(names::SEQUENCE, self.event.sequence));
        if let Some(organizer) = &self.event.organizer {
            vevent.add_property(organizer_property(organizer)?);
        }
        if let Some(title) = &self.event.title {
            vevent.add_property(Property::text(names::SUMMARY, title));
        }
        if let Some(location) = &self.event.location {
            vevent.add_property(Property::text(names::LOCATION, location));
        }
        for attendee in &self.event.participants {
            vevent.add_property(attendee_property(attendee)?);
        }
        Ok(Some(vevent))
    }

    fn build_cancel(&self) -> Result<Component, WriteError> {
        let shared_event_id = self
            .event
            .shared_event_id
            .as_deref()
            .ok_or(WriteError::MissingSharedEventId)?;

        let mut vevent = self.stamped();
        self.add_timing(&mut vevent)?;
        vevent.add_property(Property::integer(names::SEQUENCE, self.event.sequence));
        self.add_recurrence_id(&mut vevent)?;
        if let Some(organizer) = &self.event.organizer {
            vevent.add_property(organizer_property(organizer)?);
        }
        for attendee in &self.event.participants {
            vevent.add_property(attendee_property(attendee)?);
        }
        vevent.add_property(Property::text("X-PM-SHARED-EVENT-ID", shared_event_id));
        Ok(vevent)
    }

    /// DTSTART, and DTEND unless the event is timed and zero-duration.
    fn add_timing(&self, vevent: &mut Component) -> Result<(), WriteError> {
        vevent.add_property(date_property(
            names::DTSTART,
            self.event.start_date,
            &self.event.start_date_timezone_identifier,
            self.event.is_all_day,
        )?);

        let zero_duration = !self.event.is_all_day && self.event.start_date == self.event.end_date;
        if !zero_duration {
            vevent.add_property(date_property(
                names::DTEND,
                self.event.end_date,
                &self.event.end_date_timezone_identifier,
                self.event.is_all_day,
            )?);
        }
        Ok(())
    }

    fn add_content(&self, vevent: &mut Component) {
        if let Some(title) = &self.event.title {
            vevent.add_property(Property::text(names::SUMMARY, title));
        }
        if let Some(location) = &self.event.location {
            vevent.add_property(Property::text(names::LOCATION, location));
        }
        if let Some(notes) = &self.event.notes {
            vevent.add_property(Property::text(names::DESCRIPTION, notes));
        }
        if let Some(status) = self.event.status {
            vevent.add_property(Property::text(names::STATUS, status.as_str()));
        }
    }

    fn add_recurrence(&self, vevent: &mut Component) -> Result<(), WriteError> {
        if let Some(recurrence) = &self.event.recurrence {
            vevent.add_property(Property::recur(names::RRULE, &recurrence.rule));
        }
        self.add_recurrence_id(vevent)?;

        for (instant, identifier) in self
            .event
            .exdates
            .iter()
            .zip(&self.event.exdates_timezone_identifiers)
        {
            // EXDATEs take the event's own form: DATE for all-day events,
            // DATE-TIME with a TZID otherwise.
            vevent.add_property(date_property(
                names::EXDATE,
                *instant,
                identifier,
                self.event.is_all_day,
            )?);
        }
        Ok(())
    }

    fn add_recurrence_id(&self, vevent: &mut Component) -> Result<(), WriteError> {
        if let Some(recurrence_id) = self.event.recurrence_id {
            let identifier = self
                .event
                .recurrence_id_timezone_identifier
                .as_deref()
                .unwrap_or("UTC");
            vevent.add_property(date_property(
                names::RECURRENCE_ID,
                recurrence_id,
                identifier,
                self.event.recurrence_id_is_all_day,
            )?);
        }
        Ok(())
    }

    fn add_organizer_and_attendees(&self, vevent: &mut Component) -> Result<(), WriteError> {
        if let Some(organizer) = &self.event.organizer {
            vevent.add_property(organizer_property(organizer)?);
        }
        for attendee in &self.event.participants {
            vevent.add_property(attendee_property(attendee)?);
        }
        Ok(())
    }

    fn add_alarms(&self, vevent: &mut Component) {
        for notification in &self.event.notifications {
            let mut alarm = Component::new(ComponentKind::Alarm);
            alarm.add_property(Property::text("ACTION", "DISPLAY"));
            alarm.add_property(Property::text("TRIGGER", notification.to_trigger()));
            vevent.add_child(alarm);
        }
    }
}

/// Writes a complete outgoing invitation document.
///
/// `Ok(None)` mirrors the builder's no-content result.
///
/// ## Errors
/// Propagates the builder's [`WriteError`]s.
pub fn write_invitation(
    event: &ICalEvent,
    method: &InvitationMethod,
    vtimezones: &[Component],
    now: DateTime<Utc>,
) -> Result<Option<String>, WriteError> {
    let part = match method {
        InvitationMethod::Request { session_key } => BuildPart::Invite {
            session_key: session_key.clone(),
        },
        InvitationMethod::Reply => BuildPart::Reply,
        InvitationMethod::Cancel => BuildPart::Cancel,
    };

    let Some(vevent) = VEventBuilder::new(event, now).build(&part)? else {
        return Ok(None);
    };

    let mut ical = ICalendar::default();
    ical.root
        .add_property(Property::text(names::METHOD, method.as_str()));
    ical.root
        .add_property(Property::text(names::CALSCALE, "GREGORIAN"));
    for vtimezone in vtimezones {
        ical.add_timezone(vtimezone.clone());
    }
    ical.add_event(vevent);
    Ok(Some(serialize(&ical)))
}

/// Writes the full persistence snapshot for one event.
///
/// ## Errors
/// Propagates the builder's [`WriteError`]s.
pub fn write_snapshot(event: &ICalEvent, now: DateTime<Utc>) -> Result<String, WriteError> {
    if event.start_date > event.end_date {
        return Err(WriteError::StartDateIsAfterEndDate);
    }
    let vevent = VEventBuilder::new(event, now).build_full()?;
    let mut ical = ICalendar::default();
    ical.add_event(vevent);
    Ok(serialize(&ical))
}

/// Renders one instant as a DATE or DATE-TIME property in its source frame.
///
/// All-day values become `VALUE=DATE` properties; timed UTC values use the
/// Zulu form; timed zoned values are converted to local wall-clock time and
/// carry a TZID parameter.
fn date_property(
    name: &str,
    instant: DateTime<Utc>,
    timezone_identifier: &str,
    is_all_day: bool,
) -> Result<Property, WriteError> {
    if is_all_day {
        return Ok(Property::date(name, Date::from_naive(instant.date_naive())));
    }

    if timezone_identifier.is_empty() || timezone_identifier == "UTC" {
        return Ok(Property::datetime(name, IcalDateTime::from_utc(instant)));
    }

    let mut resolver = TimeZoneResolver::new();
    let tz = resolver.resolve(timezone_identifier);
    let wall = instant.with_timezone(&tz).naive_local();
    let dt = wall_datetime(
        wall,
        DateTimeForm::Zoned {
            tzid: timezone_identifier.to_string(),
        },
    );
    Ok(Property::datetime(name, dt).with_param(Parameter::tzid(timezone_identifier)))
}

fn wall_datetime(naive: NaiveDateTime, form: DateTimeForm) -> IcalDateTime {
    IcalDateTime {
        year: u16::try_from(naive.year()).unwrap_or(0),
        month: u8::try_from(naive.month()).unwrap_or(1),
        day: u8::try_from(naive.day()).unwrap_or(1),
        hour: u8::try_from(naive.hour()).unwrap_or(0),
        minute: u8::try_from(naive.minute()).unwrap_or(0),
        second: u8::try_from(naive.second()).unwrap_or(0),
        form,
    }
}

fn organizer_property(organizer: &ICalOrganizer) -> Result<Property, WriteError> {
    if organizer.email.is_empty() {
        return Err(WriteError::FailedToBuildOrganizer);
    }
    let mut prop = Property::cal_address(names::ORGANIZER, format!("mailto:{}", organizer.email));
    if let Some(name) = &organizer.name {
        prop.add_param(Parameter::new("CN", name));
    }
    Ok(prop)
}

fn attendee_property(attendee: &ICalAttendee) -> Result<Property, WriteError> {
    if attendee.email.is_empty() {
        return Err(WriteError::FailedToBuildAttendee);
    }
    let mut prop = Property::cal_address(names::ATTENDEE, format!("mailto:{}", attendee.email));
    if let Some(name) = &attendee.name {
        prop.add_param(Parameter::new("CN", name));
    }
    prop.add_param(Parameter::new("PARTSTAT", attendee.status.as_str()));
    if let Some(role) = &attendee.role {
        prop.add_param(Parameter::new("ROLE", role));
    }
    if attendee.rsvp {
        prop.add_param(Parameter::new("RSVP", "TRUE"));
    }
    if let Some(token) = &attendee.token {
        prop.add_param(Parameter::new("X-PM-TOKEN", token));
    }
    Ok(prop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttendeeStatus, EventNotification, EventRecurrence};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn base_event() -> ICalEvent {
        ICalEvent {
            ics_uid: "uid-1@example.com".into(),
            local_event_id: "local-1".into(),
            api_event_id: None,
            calendar_id: "cal-1".into(),
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            start_date_timezone_identifier: "UTC".into(),
            end_date: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            end_date_timezone_identifier: "UTC".into(),
            is_all_day: false,
            sequence: 2,
            created_time: None,
            title: Some("Planning".into()),
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
        }
    }

    #[test]
    fn snapshot_contains_core_fields() {
        let event = base_event();
        let text = write_snapshot(&event, now()).unwrap();

        assert!(text.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(text.contains("UID:uid-1@example.com\r\n"));
        assert!(text.contains("DTSTAMP:20240601T120000Z\r\n"));
        assert!(text.contains("DTSTART:20240101T090000Z\r\n"));
        assert!(text.contains("DTEND:20240101T100000Z\r\n"));
        assert!(text.contains("SEQUENCE:2\r\n"));
        assert!(text.contains("SUMMARY:Planning\r\n"));
    }

    #[test]
    fn zero_duration_omits_dtend() {
        let mut event = base_event();
        event.end_date = event.start_date;
        let text = write_snapshot(&event, now()).unwrap();

        assert!(!text.contains("DTEND"));
    }

    #[test]
    fn all_day_uses_date_values() {
        let mut event = base_event();
        event.is_all_day = true;
        event.start_date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        event.end_date = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let text = write_snapshot(&event, now()).unwrap();

        assert!(text.contains("DTSTART;VALUE=DATE:20240101\r\n"));
        assert!(text.contains("DTEND;VALUE=DATE:20240102\r\n"));
    }

    #[test]
    fn zoned_times_carry_tzid() {
        let mut event = base_event();
        event.start_date_timezone_identifier = "Europe/Zurich".into();
        event.end_date_timezone_identifier = "Europe/Zurich".into();
        let text = write_snapshot(&event, now()).unwrap();

        // 09:00 UTC in January is 10:00 in Zurich.
        assert!(text.contains("DTSTART;TZID=Europe/Zurich:20240101T100000\r\n"));
    }

    #[test]
    fn start_after_end_is_rejected() {
        let mut event = base_event();
        event.end_date = event.start_date - chrono::TimeDelta::hours(1);
        assert_eq!(
            write_snapshot(&event, now()).unwrap_err(),
            WriteError::StartDateIsAfterEndDate
        );
    }

    #[test]
    fn reply_without_attendees_has_no_content() {
        let event = base_event();
        let built = VEventBuilder::new(&event, now())
            .build(&BuildPart::Reply)
            .unwrap();
        assert!(built.is_none());

        let text = write_invitation(&event, &InvitationMethod::Reply, &[], now()).unwrap();
        assert!(text.is_none());
    }

    #[test]
    fn invite_requires_sharing_fields() {
        let mut event = base_event();
        let part = BuildPart::Invite {
            session_key: "sk".into(),
        };

        assert_eq!(
            VEventBuilder::new(&event, now()).build(&part).unwrap_err(),
            WriteError::MissingSharedEventId
        );

        event.shared_event_id = Some("shared-1".into());
        assert_eq!(
            VEventBuilder::new(&event, now()).build(&part).unwrap_err(),
            WriteError::MissingSharedKeyPacket
        );

        event.shared_key_packet = Some("packet".into());
        let vevent = VEventBuilder::new(&event, now())
            .build(&part)
            .unwrap()
            .unwrap();
        assert_eq!(
            vevent.get_property("X-PM-SHARED-EVENT-ID").unwrap().raw_value,
            "shared-1"
        );
        assert_eq!(
            vevent.get_property("X-PM-SESSION-KEY").unwrap().raw_value,
            "sk"
        );
    }

    #[test]
    fn invitation_document_has_method_and_calscale() {
        let mut event = base_event();
        event.shared_event_id = Some("shared-1".into());
        event.shared_key_packet = Some("packet".into());

        let text = write_invitation(
            &event,
            &InvitationMethod::Request {
                session_key: "sk".into(),
            },
            &[],
            now(),
        )
        .unwrap()
        .unwrap();

        assert!(text.contains("METHOD:REQUEST\r\n"));
        assert!(text.contains("CALSCALE:GREGORIAN\r\n"));
    }

    #[test]
    fn cancel_carries_shared_event_id() {
        let mut event = base_event();
        event.shared_event_id = Some("shared-1".into());

        let text = write_invitation(&event, &InvitationMethod::Cancel, &[], now())
            .unwrap()
            .unwrap();
        assert!(text.contains("METHOD:CANCEL\r\n"));
        assert!(text.contains("X-PM-SHARED-EVENT-ID:shared-1\r\n"));
    }

    #[test]
    fn reply_carries_attendee_partstat() {
        let mut event = base_event();
        event.participants = vec![ICalAttendee {
            email: "me@example.com".into(),
            name: None,
            status: AttendeeStatus::Declined,
            role: None,
            rsvp: false,
            token: None,
        }];

        let text = write_invitation(&event, &InvitationMethod::Reply, &[], now())
            .unwrap()
            .unwrap();
        assert!(text.contains("ATTENDEE;PARTSTAT=DECLINED:mailto:me@example.com\r\n"));
    }

    #[test]
    fn reply_carries_timing_and_content() {
        let mut event = base_event();
        event.location = Some("Room 5".into());
        event.recurrence = Some(EventRecurrence::new("FREQ=WEEKLY"));
        event.participants = vec![ICalAttendee {
            email: "me@example.com".into(),
            name: None,
            status: AttendeeStatus::Accepted,
            role: None,
            rsvp: false,
            token: None,
        }];

        let text = write_invitation(&event, &InvitationMethod::Reply, &[], now())
            .unwrap()
            .unwrap();
        assert!(text.contains("DTSTART:20240101T090000Z\r\n"));
        assert!(text.contains("DTEND:20240101T100000Z\r\n"));
        assert!(text.contains("RRULE:FREQ=WEEKLY\r\n"));
        assert!(text.contains("SUMMARY:Planning\r\n"));
        assert!(text.contains("LOCATION:Room 5\r\n"));
    }

    #[test]
    fn all_day_exdates_use_date_form() {
        let mut event = base_event();
        event.is_all_day = true;
        event.start_date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        event.end_date = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        event.exdates = vec![Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap()];
        event.exdates_timezone_identifiers = vec!["UTC".into()];

        let text = write_snapshot(&event, now()).unwrap();
        assert!(text.contains("EXDATE;VALUE=DATE:20240108\r\n"));
        assert!(!text.contains("EXDATE;TZID"));
    }

    #[test]
    fn alarms_render_as_valarm_children() {
        let mut event = base_event();
        event.notifications = vec![EventNotification {
            days: 0,
            hours: 0,
            minutes: 15,
            seconds: 0,
        }];

        let text = write_snapshot(&event, now()).unwrap();
        assert!(text.contains("BEGIN:VALARM\r\nACTION:DISPLAY\r\nTRIGGER:-PT15M\r\nEND:VALARM\r\n"));
    }

    #[test]
    fn empty_organizer_email_is_reported() {
        let mut event = base_event();
        event.organizer = Some(ICalOrganizer {
            email: String::new(),
            name: None,
            status: None,
        });

        assert_eq!(
            write_snapshot(&event, now()).unwrap_err(),
            WriteError::FailedToBuildOrganizer
        );
    }

    #[test]
    fn snapshot_component_wraps_in_envelope() {
        let mut vevent = Component::event();
        vevent.add_property(Property::text("UID", "wrapped@x"));

        let text = snapshot_component(&vevent);
        assert!(text.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(text.contains("UID:wrapped@x\r\n"));
        assert!(text.ends_with("END:VCALENDAR\r\n"));
    }
}
