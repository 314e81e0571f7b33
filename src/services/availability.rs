use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Booking;

/// The daily `[open, close)` hour range every slot must fit inside.
/// All slot arithmetic is in whole hours.
#[derive(Debug, Clone, Copy)]
pub struct OperatingWindow {
    pub open_hour: u32,
    pub close_hour: u32,
}

impl Default for OperatingWindow {
    fn default() -> Self {
        Self {
            open_hour: 10,
            close_hour: 22,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub start_time: String,
    pub end_time: String,
}

impl TimeSlot {
    pub fn from_hours(start_hour: u32, end_hour: u32) -> Self {
        Self {
            start_time: format!("{start_hour:02}:00"),
            end_time: format!("{end_hour:02}:00"),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("invalid time: {0}")]
    InvalidTime(String),

    #[error("invalid interval: {start} is not before {end}")]
    InvalidInterval { start: String, end: String },
}

/// Validate a zero-padded "HH:mm" string and return (hour, minute).
pub fn validate_time(s: &str) -> Result<(u32, u32), AvailabilityError> {
    let invalid = || AvailabilityError::InvalidTime(s.to_string());

    let (h, m) = s.split_once(':').ok_or_else(invalid)?;
    if h.len() != 2 || m.len() != 2 {
        return Err(invalid());
    }
    let hour: u32 = h.parse().map_err(|_| invalid())?;
    let minute: u32 = m.parse().map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok((hour, minute))
}

/// Half-open interval overlap on "HH:mm" strings. Lexical comparison is
/// sound because every time shares the zero-padded format. Intervals that
/// merely touch at a boundary do not overlap.
pub fn overlaps(a_start: &str, a_end: &str, b_start: &str, b_end: &str) -> bool {
    a_start < b_end && a_end > b_start
}

/// The most recently delivered full view of all booking records.
#[derive(Debug, Clone)]
pub struct BookingSnapshot {
    pub bookings: Vec<Booking>,
    pub loading: bool,
}

impl BookingSnapshot {
    /// Initial state, before the store has delivered anything.
    pub fn loading() -> Self {
        Self {
            bookings: Vec::new(),
            loading: true,
        }
    }

    pub fn ready(bookings: Vec<Booking>) -> Self {
        Self {
            bookings,
            loading: false,
        }
    }

    /// Does `[start_time, end_time)` on `date` collide with any booking?
    ///
    /// While the snapshot is still loading this conservatively reports
    /// every slot as booked, so a slow initial load can never let a
    /// double-booking through.
    pub fn is_slot_booked(
        &self,
        date: NaiveDate,
        start_time: &str,
        end_time: &str,
    ) -> Result<bool, AvailabilityError> {
        validate_time(start_time)?;
        validate_time(end_time)?;
        if start_time >= end_time {
            return Err(AvailabilityError::InvalidInterval {
                start: start_time.to_string(),
                end: end_time.to_string(),
            });
        }

        if self.loading {
            return Ok(true);
        }
        Ok(self.conflicts(date, start_time, end_time))
    }

    // Internal scan over well-formed input.
    fn conflicts(&self, date: NaiveDate, start_time: &str, end_time: &str) -> bool {
        self.bookings.iter().any(|b| {
            b.date == date && overlaps(&b.start_time, &b.end_time, start_time, end_time)
        })
    }

    /// Every free slot on the fixed hourly grid for the given duration,
    /// in ascending start-time order. Recomputed fresh on each call.
    pub fn available_slots(
        &self,
        window: OperatingWindow,
        date: NaiveDate,
        duration_hours: u32,
    ) -> Vec<TimeSlot> {
        if duration_hours == 0 || self.loading {
            return Vec::new();
        }

        let mut slots = Vec::new();
        for hour in window.open_hour..window.close_hour {
            let end_hour = hour + duration_hours;
            if end_hour > window.close_hour {
                continue;
            }
            let slot = TimeSlot::from_hours(hour, end_hour);
            if !self.conflicts(date, &slot.start_time, &slot.end_time) {
                slots.push(slot);
            }
        }
        slots
    }
}
