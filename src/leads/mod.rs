//! Lead write-through — ledger, staff calendar, and unit forwarding.

pub mod calendar;
pub mod ledger;
pub mod router;

pub use calendar::{FollowUpCalendar, FollowUpEvent};
pub use ledger::{LeadLedger, LeadStats};
pub use router::{UnitForward, UnitRouter, plan_forward};

use chrono::{DateTime, FixedOffset, NaiveTime, TimeZone, Utc};

/// Brasília time (UTC-3, no daylight saving).
const LOCAL_OFFSET: FixedOffset = match FixedOffset::west_opt(3 * 3600) {
    Some(offset) => offset,
    None => panic!("invalid local offset"),
};

pub fn local_offset() -> FixedOffset {
    LOCAL_OFFSET
}

/// `dd/mm/yyyy HH:MM` in local time, as staff read it.
pub fn format_local_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&local_offset())
        .format("%d/%m/%Y %H:%M")
        .to_string()
}

/// Start of the local calendar day containing `now`, in UTC.
pub fn local_day_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let offset = local_offset();
    let local_midnight = now
        .with_timezone(&offset)
        .date_naive()
        .and_time(NaiveTime::MIN);
    offset
        .from_local_datetime(&local_midnight)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_start_respects_local_offset() {
        // 01:00 UTC on the 11th is still the 10th in Brasília.
        let now = Utc.with_ymd_and_hms(2026, 3, 11, 1, 0, 0).unwrap();
        let start = local_day_start(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 10, 3, 0, 0).unwrap());
    }
}
