//! Day counter, play/pause state and calendar arithmetic.
//!
//! The counter is the only simulation clock: every pose is a pure function of
//! it. It always lives in `[0, cycle)`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::api::error::EngineError;

/// Calendar shaping the animated cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    /// Length of one lunar/display month in days.
    pub days_per_month: f64,
    /// Length of one orbit of the Sun in days.
    pub days_per_year: f64,
    /// Years covered by one full pass along the Earth path.
    pub years: u32,
}

impl Calendar {
    /// 12 × 30-day months, four years per cycle.
    pub const THIRTY_DAY_MONTHS: Calendar = Calendar {
        days_per_month: 30.0,
        days_per_year: 360.0,
        years: 4,
    };

    /// Synodic month over a Julian year, one year per cycle.
    pub const JULIAN: Calendar = Calendar {
        days_per_month: 29.53,
        days_per_year: 365.25,
        years: 1,
    };

    pub fn validate(&self) -> Result<(), EngineError> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if !ok(self.days_per_month) || !ok(self.days_per_year) || self.years == 0 {
            return Err(EngineError::InvalidCalendar(format!(
                "month {} / year {} / years {} must all be positive",
                self.days_per_month, self.days_per_year, self.years
            )));
        }
        Ok(())
    }

    /// Total animated range in days.
    pub fn cycle_days(&self) -> f64 {
        self.days_per_year * self.years as f64
    }

    /// Wrap an arbitrary day value into `[0, cycle)`.
    pub fn wrap(&self, day: f64) -> f64 {
        let cycle = self.cycle_days();
        let wrapped = day.rem_euclid(cycle);
        // rem_euclid of a tiny negative number can round up to exactly `cycle`.
        if wrapped >= cycle { 0.0 } else { wrapped }
    }

    /// Break a day counter into a 1-based display date.
    pub fn date(&self, day: f64) -> CalendarDate {
        let day = day.max(0.0);
        let year = (day / self.days_per_year).floor() as u32;
        let month = ((day % self.days_per_year) / self.days_per_month).floor() as u32;
        let day_of_month = (day % self.days_per_month).floor() as u32;
        CalendarDate {
            year: year + 1,
            month: month + 1,
            day: day_of_month + 1,
        }
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::THIRTY_DAY_MONTHS
    }
}

/// 1-based calendar position shown in the time label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDate {
    pub year: u32,
    pub month: u32,
    pub day: u32,
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Year {}, Month {}, Day {}", self.year, self.month, self.day)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    #[default]
    Paused,
    Playing,
}

/// Whether scrubbing the time slider asks for a redraw straight away or
/// leaves it to the next scheduled frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrubRedraw {
    #[default]
    Immediate,
    NextFrame,
}

/// The simulation clock.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeState {
    calendar: Calendar,
    day: f64,
    play: PlayState,
    /// Days added per simulation tick.
    speed: f64,
    max_speed: f64,
}

impl TimeState {
    pub fn new(calendar: Calendar, speed: f64, max_speed: f64) -> Result<Self, EngineError> {
        calendar.validate()?;
        let max_speed = if max_speed.is_finite() && max_speed > 0.0 { max_speed } else { 1.0 };
        let mut state = Self {
            calendar,
            day: 0.0,
            play: PlayState::Paused,
            speed: 0.0,
            max_speed,
        };
        state.set_speed(speed);
        Ok(state)
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn day(&self) -> f64 {
        self.day
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn play_state(&self) -> PlayState {
        self.play
    }

    pub fn is_playing(&self) -> bool {
        self.play == PlayState::Playing
    }

    pub fn cycle_days(&self) -> f64 {
        self.calendar.cycle_days()
    }

    /// Flip between Paused and Playing. Returns the new state.
    pub fn toggle(&mut self) -> PlayState {
        self.play = match self.play {
            PlayState::Paused => PlayState::Playing,
            PlayState::Playing => PlayState::Paused,
        };
        self.play
    }

    pub fn play(&mut self) {
        self.play = PlayState::Playing;
    }

    pub fn pause(&mut self) {
        self.play = PlayState::Paused;
    }

    /// Force Paused and zero the counter.
    pub fn reset(&mut self) {
        self.play = PlayState::Paused;
        self.day = 0.0;
    }

    /// One simulation tick: advance by `speed` and wrap. No-op while paused.
    /// Returns whether the counter moved.
    pub fn advance(&mut self) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.day = self.calendar.wrap(self.day + self.speed);
        true
    }

    /// Absolute assignment from the time slider, regardless of play state.
    /// Non-finite input is ignored; everything else is clamped to the slider
    /// range and wrapped.
    pub fn scrub(&mut self, day: f64) -> bool {
        if !day.is_finite() {
            log::warn!("ignoring non-finite scrub value {day}");
            return false;
        }
        let clamped = day.clamp(0.0, self.cycle_days());
        self.day = self.calendar.wrap(clamped);
        true
    }

    /// Set the per-tick increment. Negative values play backwards; magnitude is
    /// capped at `max_speed`. Non-finite input is ignored.
    pub fn set_speed(&mut self, speed: f64) -> bool {
        if !speed.is_finite() {
            log::warn!("ignoring non-finite speed {speed}");
            return false;
        }
        self.speed = speed.clamp(-self.max_speed, self.max_speed);
        true
    }

    /// Fraction of the full cycle elapsed, in `[0, 1)`.
    pub fn cycle_progress(&self) -> f64 {
        self.day / self.cycle_days()
    }

    /// Fraction of the current month elapsed, in `[0, 1)`.
    pub fn month_progress(&self) -> f64 {
        let month = self.calendar.days_per_month;
        self.day.rem_euclid(month) / month
    }

    pub fn date(&self) -> CalendarDate {
        self.calendar.date(self.day)
    }
}
