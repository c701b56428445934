//! Calendar rules shared by every booking surface: the same-day cutoff, the
//! morning/afternoon split and the on-the-hour appointment time.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

use crate::domain::AvailabilitySlot;

/// From this local hour on, today is no longer bookable.
pub const SAME_DAY_CUTOFF_HOUR: u32 = 17;
/// First hour that belongs to the afternoon section.
pub const AFTERNOON_START_HOUR: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPeriod {
    Morning,
    Afternoon,
}

impl DayPeriod {
    pub fn of_hour(hour: u8) -> Self {
        if hour < AFTERNOON_START_HOUR {
            DayPeriod::Morning
        } else {
            DayPeriod::Afternoon
        }
    }
}

/// Availability slot ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourSlot {
    pub hour: u8,
    pub hour_formatted: String,
    pub available: bool,
}

impl From<AvailabilitySlot> for HourSlot {
    fn from(slot: AvailabilitySlot) -> Self {
        Self {
            hour: slot.hour,
            hour_formatted: format_hour(slot.hour),
            available: slot.available,
        }
    }
}

pub fn format_hour(hour: u8) -> String {
    format!("{hour:02}:00")
}

/// Slots of `availability` falling in `period`, in source order.
pub fn slots_in_period(availability: &[AvailabilitySlot], period: DayPeriod) -> Vec<HourSlot> {
    availability
        .iter()
        .filter(|slot| DayPeriod::of_hour(slot.hour) == period)
        .map(|slot| HourSlot::from(*slot))
        .collect()
}

/// Earliest selectable date: `now` itself, or the same time tomorrow once the
/// local hour reaches the cutoff.
pub fn minimum_bookable_date<Tz: TimeZone>(now: DateTime<Tz>) -> DateTime<Tz> {
    if now.hour() >= SAME_DAY_CUTOFF_HOUR {
        now + Duration::days(1)
    } else {
        now
    }
}

/// `date`'s calendar day at `hour:00:00`, resolved in `date`'s zone so the
/// offset is the one in force on that day. `None` for an hour outside 0..=23
/// or a local time the zone skips; a repeated local time takes the earlier
/// instant.
pub fn appointment_time<Tz: TimeZone>(date: &DateTime<Tz>, hour: u8) -> Option<DateTime<Tz>> {
    let naive = date.date_naive().and_hms_opt(u32::from(hour), 0, 0)?;
    date.timezone().from_local_datetime(&naive).earliest()
}

/// `day` at the wall-clock time of `now`, in `now`'s zone.
pub fn same_time_on<Tz: TimeZone>(now: &DateTime<Tz>, day: NaiveDate) -> Option<DateTime<Tz>> {
    now.timezone()
        .from_local_datetime(&day.and_time(now.time()))
        .earliest()
}
