//! Resolution of "which attendee is me" against the user's owned addresses.

use crate::email::canonicalize_email;
use crate::model::{ICalAttendee, ICalParticipant, OwnedAddress};

/// Resolves the single participant representing the current user, or none.
///
/// The tie-break order is load-bearing: send-enabled addresses only,
/// matched by canonicalized email, sorted ascending by address order, then
/// stably re-sorted so answered attendees come first. Answered beats
/// unanswered; within each group the lowest address order wins.
#[must_use]
pub fn resolve_participant(
    attendees: &[ICalAttendee],
    addresses: &[OwnedAddress],
) -> Option<ICalParticipant> {
    let mut pairs: Vec<ICalParticipant> = addresses
        .iter()
        .filter(|address| address.send)
        .filter_map(|address| {
            let canonical = canonicalize_email(&address.email);
            let attendee = attendees
                .iter()
                .find(|a| canonicalize_email(&a.email) == canonical)?;
            Some(ICalParticipant {
                attendee: attendee.clone(),
                address: address.clone(),
            })
        })
        .collect();

    pairs.sort_by_key(|p| p.address.order);
    // Stable: order ties within each answer group survive.
    pairs.sort_by_key(|p| !p.attendee.status.is_answered());

    pairs.into_iter().next()
}
