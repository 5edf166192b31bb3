//! Bridge to the external recurrence engine (the `rrule` crate).

use chrono::{DateTime, Utc};
use rrule::{RRule, RRuleSet, Tz, Unvalidated};

use crate::error::ContractViolation;

/// Builds a validated rule set from raw RRULE text.
///
/// EXDATEs are applied to the set so excluded occurrences never surface.
///
/// ## Errors
/// Returns [`ContractViolation::UnparsableRecurrenceRule`] when the engine
/// rejects the rule; the caller guarantees well-formed fragments, so this is
/// the structural tier.
pub fn build_rrule_set(
    rule: &str,
    dtstart: DateTime<Utc>,
    exdates: &[DateTime<Utc>],
) -> Result<RRuleSet, ContractViolation> {
    let parsed = rule
        .parse::<RRule<Unvalidated>>()
        .map_err(|err| ContractViolation::UnparsableRecurrenceRule(err.to_string()))?;

    let mut set = parsed
        .build(dtstart.with_timezone(&Tz::UTC))
        .map_err(|err| ContractViolation::UnparsableRecurrenceRule(err.to_string()))?;

    if !exdates.is_empty() {
        let exdates_tz: Vec<DateTime<Tz>> = exdates
            .iter()
            .map(|dt| dt.with_timezone(&Tz::UTC))
            .collect();
        set = set.set_exdates(exdates_tz);
    }

    Ok(set)
}

/// UTC occurrence starts falling within `[left, right)`.
#[must_use]
pub fn occurrences_between(
    set: &RRuleSet,
    left: DateTime<Utc>,
    right: DateTime<Utc>,
) -> Vec<DateTime<Utc>> {
    // Bounds are widened by a second; the filter below owns the exact
    // half-open semantics.
    set.clone()
        .after((left - chrono::TimeDelta::seconds(1)).with_timezone(&Tz::UTC))
        .before(right.with_timezone(&Tz::UTC))
        .all(u16::MAX)
        .dates
        .into_iter()
        .map(|dt| dt.with_timezone(&Utc))
        .filter(|dt| *dt >= left && *dt < right)
        .collect()
}

/// The first occurrence of the unbounded series.
#[must_use]
pub fn first_occurrence(set: &RRuleSet) -> Option<DateTime<Utc>> {
    set.clone()
        .all(1)
        .dates
        .first()
        .map(|dt| dt.with_timezone(&Utc))
}

/// The last occurrence of the series, if it terminates.
///
/// A rule without COUNT or UNTIL has no last occurrence; neither does a
/// terminating series too large for the engine to enumerate.
#[must_use]
pub fn last_occurrence(set: &RRuleSet, ends_never: bool) -> Option<DateTime<Utc>> {
    if ends_never {
        return None;
    }

    let result = set.clone().all(u16::MAX);
    if result.limited {
        tracing::debug!("series too large to enumerate, skipping last-occurrence flag");
        return None;
    }
    result.dates.last().map(|dt| dt.with_timezone(&Utc))
}
