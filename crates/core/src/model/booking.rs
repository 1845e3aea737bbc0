use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::{BookingId, ReaderId, ServiceId, UserId};
use crate::money::Money;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BookingError {
    #[error("opening hour must be before closing hour")]
    InvalidHours,

    #[error("slot length must be > 0")]
    InvalidSlotLength,

    #[error("{0} is not an available slot")]
    UnknownSlot(NaiveTime),

    #[error("{date} is outside the booking window ({first} to {last})")]
    OutsideWindow {
        date: NaiveDate,
        first: NaiveDate,
        last: NaiveDate,
    },

    #[error("slot {0} has already started")]
    SlotInPast(DateTime<Utc>),
}

//
// ─── POLICY ────────────────────────────────────────────────────────────────────
//

/// Rules for which times a scheduled reading may be booked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingPolicy {
    open_hour: u32,
    close_hour: u32,
    slot_minutes: u32,
    session_minutes: u32,
    horizon_days: u32,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            open_hour: 9,
            close_hour: 21,
            slot_minutes: 30,
            session_minutes: 30,
            horizon_days: 30,
        }
    }
}

impl BookingPolicy {
    /// # Errors
    ///
    /// Returns `BookingError::InvalidHours` unless `open_hour < close_hour <= 24`,
    /// and `BookingError::InvalidSlotLength` for zero-length slots or sessions.
    pub fn new(
        open_hour: u32,
        close_hour: u32,
        slot_minutes: u32,
        session_minutes: u32,
        horizon_days: u32,
    ) -> Result<Self, BookingError> {
        if open_hour >= close_hour || close_hour > 24 {
            return Err(BookingError::InvalidHours);
        }
        if slot_minutes == 0 || session_minutes == 0 {
            return Err(BookingError::InvalidSlotLength);
        }
        Ok(Self {
            open_hour,
            close_hour,
            slot_minutes,
            session_minutes,
            horizon_days,
        })
    }

    #[must_use]
    pub fn session_minutes(&self) -> u32 {
        self.session_minutes
    }

    #[must_use]
    pub fn horizon_days(&self) -> u32 {
        self.horizon_days
    }

    /// Slot start times from opening up to (not including) closing.
    #[must_use]
    pub fn slots(&self) -> Vec<TimeSlot> {
        let open = self.open_hour * 60;
        let close = self.close_hour * 60;
        (open..close)
            .step_by(self.slot_minutes as usize)
            .filter_map(|minute| NaiveTime::from_hms_opt(minute / 60, minute % 60, 0))
            .map(TimeSlot)
            .collect()
    }

    /// Check a requested date and slot and return the UTC start instant.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::UnknownSlot`, `BookingError::OutsideWindow` or
    /// `BookingError::SlotInPast` when the request breaks a rule.
    pub fn validate(
        &self,
        now: DateTime<Utc>,
        date: NaiveDate,
        slot: TimeSlot,
    ) -> Result<DateTime<Utc>, BookingError> {
        if !self.slots().contains(&slot) {
            return Err(BookingError::UnknownSlot(slot.0));
        }

        let first = now.date_naive();
        let last = first + Duration::days(i64::from(self.horizon_days));
        if date < first || date > last {
            return Err(BookingError::OutsideWindow { date, first, last });
        }

        let start = Utc.from_utc_datetime(&date.and_time(slot.0));
        if start <= now {
            return Err(BookingError::SlotInPast(start));
        }
        Ok(start)
    }
}

/// Start time of a bookable slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeSlot(NaiveTime);

impl TimeSlot {
    #[must_use]
    pub fn new(start: NaiveTime) -> Self {
        Self(start)
    }

    #[must_use]
    pub fn start(&self) -> NaiveTime {
        self.0
    }

    /// 12-hour label, e.g. `9:30 AM`.
    #[must_use]
    pub fn label(&self) -> String {
        self.0.format("%-I:%M %p").to_string()
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl std::str::FromStr for TimeSlot {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M").map(Self)
    }
}

//
// ─── BOOKING ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Scheduled,
    Completed,
    Cancelled,
}

/// A prepaid reading scheduled for a future slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub client_id: UserId,
    pub reader_id: ReaderId,
    pub service_id: ServiceId,
    pub status: BookingStatus,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn slot(raw: &str) -> TimeSlot {
        raw.parse().unwrap()
    }

    #[test]
    fn default_policy_has_24_half_hour_slots() {
        let slots = BookingPolicy::default().slots();
        assert_eq!(slots.len(), 24);
        assert_eq!(slots.first().unwrap().to_string(), "09:00");
        assert_eq!(slots.last().unwrap().to_string(), "20:30");
        assert_eq!(slots[1].label(), "9:30 AM");
    }

    #[test]
    fn rejects_bad_policy() {
        assert_eq!(
            BookingPolicy::new(21, 9, 30, 30, 30).unwrap_err(),
            BookingError::InvalidHours
        );
        assert_eq!(
            BookingPolicy::new(9, 21, 0, 30, 30).unwrap_err(),
            BookingError::InvalidSlotLength
        );
    }

    #[test]
    fn validate_accepts_tomorrow() {
        let policy = BookingPolicy::default();
        let now = fixed_now();
        let tomorrow = now.date_naive() + Duration::days(1);
        let start = policy.validate(now, tomorrow, slot("10:30")).unwrap();
        assert_eq!(start.date_naive(), tomorrow);
        assert_eq!(start.time(), NaiveTime::from_hms_opt(10, 30, 0).unwrap());
    }

    #[test]
    fn validate_rejects_unknown_slot_and_window() {
        let policy = BookingPolicy::default();
        let now = fixed_now();
        let tomorrow = now.date_naive() + Duration::days(1);
        assert!(matches!(
            policy.validate(now, tomorrow, slot("10:15")),
            Err(BookingError::UnknownSlot(_))
        ));
        assert!(matches!(
            policy.validate(now, tomorrow, slot("21:00")),
            Err(BookingError::UnknownSlot(_))
        ));

        let too_far = now.date_naive() + Duration::days(31);
        assert!(matches!(
            policy.validate(now, too_far, slot("10:00")),
            Err(BookingError::OutsideWindow { .. })
        ));

        let yesterday = now.date_naive() - Duration::days(1);
        assert!(matches!(
            policy.validate(now, yesterday, slot("10:00")),
            Err(BookingError::OutsideWindow { .. })
        ));
    }

    #[test]
    fn validate_rejects_started_slot_today() {
        // fixed_now() is 22:13 UTC, after the last slot of the day.
        let policy = BookingPolicy::default();
        let now = fixed_now();
        assert!(matches!(
            policy.validate(now, now.date_naive(), slot("20:30")),
            Err(BookingError::SlotInPast(_))
        ));
    }
}
