//! Expansion of recurring availability slots into concrete time windows.

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Utc, Weekday};
use rrule::{RRule, Tz, Unvalidated};

use crate::error::{ScheduleError, ScheduleResult};
use crate::model::time::resolve_local;
use crate::model::{AvailabilitySlot, SlotRecurrence};

/// One concrete window produced by a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

const fn byday(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// ## Summary
/// Builds the RFC 5545 rule text for a slot.
///
/// Monthly slots repeat on the first matching weekday of each month. Slots
/// without a recurrence produce a single occurrence.
///
/// ## Errors
/// Returns `ScheduleError::Validation` if the slot's day index is invalid.
pub fn rrule_text(slot: &AvailabilitySlot) -> ScheduleResult<String> {
    let day = byday(slot.weekday()?);
    let text = match slot.recurrence {
        Some(SlotRecurrence::Weekly) => format!("FREQ=WEEKLY;BYDAY={day}"),
        Some(SlotRecurrence::Biweekly) => format!("FREQ=WEEKLY;INTERVAL=2;BYDAY={day}"),
        Some(SlotRecurrence::Monthly) => format!("FREQ=MONTHLY;BYDAY=1{day}"),
        None => format!("FREQ=WEEKLY;COUNT=1;BYDAY={day}"),
    };
    tracing::trace!(slot_id = %slot.id, rrule = %text, "Built slot rule");
    Ok(text)
}

/// First date on or after `from` that falls on `weekday`.
fn first_on_or_after(from: NaiveDate, weekday: Weekday) -> NaiveDate {
    let ahead = (7 + weekday.num_days_from_monday() - from.weekday().num_days_from_monday()) % 7;
    from + TimeDelta::days(i64::from(ahead))
}

/// Biweekly slots run on weeks an even number of weeks away from this Monday.
fn biweekly_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}

/// ## Summary
/// Picks the rule's DTSTART date: the first slot weekday whose start instant
/// is not before `from`, moved one more week when a biweekly slot would
/// otherwise land on an off week.
///
/// ## Errors
/// Returns `ScheduleError::Validation` if the slot start does not exist in
/// `tz` on the candidate date.
fn anchor_date(
    slot: &AvailabilitySlot,
    from: DateTime<Utc>,
    tz: chrono_tz::Tz,
) -> ScheduleResult<NaiveDate> {
    let weekday = slot.weekday()?;
    let mut anchor = first_on_or_after(from.with_timezone(&tz).date_naive(), weekday);
    if resolve_local(anchor, slot.start_time, tz)? < from {
        anchor += TimeDelta::days(7);
    }
    if slot.recurrence == Some(SlotRecurrence::Biweekly) {
        let epoch = first_on_or_after(biweekly_epoch(), weekday);
        let weeks = (anchor - epoch).num_days() / 7;
        if weeks.rem_euclid(2) == 1 {
            anchor += TimeDelta::days(7);
        }
    }
    Ok(anchor)
}

/// ## Summary
/// Expands a slot into the windows that start inside `[from, to)`.
///
/// Wall-clock slot times are interpreted in `tz`, so a 09:00 slot stays at
/// 09:00 local time across DST changes. Biweekly slots keep the same weeks
/// whatever range is asked for. At most `limit` occurrences are returned.
///
/// ## Errors
/// Returns `ScheduleError::Validation` for an invalid slot or an empty range,
/// and `ScheduleError::Recurrence` if the rule cannot be built.
#[tracing::instrument(skip(slot), fields(slot_id = %slot.id, %from, %to))]
pub fn expand_slot(
    slot: &AvailabilitySlot,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    tz: chrono_tz::Tz,
    limit: u16,
) -> ScheduleResult<Vec<Occurrence>> {
    slot.validate()?;
    if to <= from {
        return Err(ScheduleError::Validation(format!(
            "expansion range {from} .. {to} is empty"
        )));
    }

    let anchor = anchor_date(slot, from, tz)?;
    let rule_tz = Tz::Tz(tz);
    let dt_start = resolve_local(anchor, slot.start_time, tz)?.with_timezone(&rule_tz);

    let rrule = rrule_text(slot)?
        .parse::<RRule<Unvalidated>>()
        .map_err(|err| ScheduleError::Recurrence(err.to_string()))?;
    let rrule_set = rrule
        .build(dt_start)
        .map_err(|err| ScheduleError::Recurrence(err.to_string()))?
        .after((from - TimeDelta::seconds(1)).with_timezone(&rule_tz))
        .before(to.with_timezone(&rule_tz));

    let result = rrule_set.all(limit);
    if result.limited {
        tracing::warn!(limit, "Slot expansion truncated");
    }

    let mut occurrences = Vec::with_capacity(result.dates.len());
    for date in result.dates {
        let start = date.with_timezone(&Utc);
        if start < from || start >= to {
            continue;
        }
        let end = resolve_local(date.date_naive(), slot.end_time, tz)?;
        occurrences.push(Occurrence { start, end });
    }
    tracing::trace!(count = occurrences.len(), "Expanded slot");
    Ok(occurrences)
}
