//! Calendar source for partition rollover.

use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDate};

/// Tells the store which day it is.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// The local calendar date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock that only moves when told to. Clones share the same date.
#[derive(Debug, Clone)]
pub struct ManualClock {
    date: Arc<Mutex<NaiveDate>>,
}

impl ManualClock {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Arc::new(Mutex::new(date)),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        *self.date.lock().unwrap_or_else(|e| e.into_inner()) = date;
    }

    /// Move forward by one day.
    pub fn advance(&self) {
        let mut date = self.date.lock().unwrap_or_else(|e| e.into_inner());
        let next = date.succ_opt().unwrap_or(*date);
        *date = next;
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        *self.date.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_date() {
        let clock = ManualClock::new(NaiveDate::from_ymd_opt(2022, 12, 31).unwrap());
        let other = clock.clone();

        clock.advance();
        assert_eq!(other.today(), NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());

        other.set(NaiveDate::from_ymd_opt(2022, 10, 5).unwrap());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2022, 10, 5).unwrap());
    }
}
