//! Seven-day calendar window for placing lessons.
//!
//! The calendar renders one week at a time, clamped to the schedule's date
//! bounds. All values are calendar days (`NaiveDate`), which is the
//! normalized local-midnight form; there is no time-of-day residue to
//! mis-compare.

use chrono::{Days, NaiveDate};

pub const WINDOW_DAYS: u64 = 7;

/// One visible week of the allocation calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekWindow {
    current_week_start: NaiveDate,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

impl WeekWindow {
    /// Open the window on the schedule's first day, or on `today` while the
    /// start date is still unset.
    pub fn new(start_date: Option<NaiveDate>, end_date: Option<NaiveDate>, today: NaiveDate) -> Self {
        Self {
            current_week_start: start_date.unwrap_or(today),
            start_date,
            end_date,
        }
    }

    pub fn current_week_start(&self) -> NaiveDate {
        self.current_week_start
    }

    /// Adopt new schedule bounds. A changed start date re-anchors the window
    /// to it; `today` anchors when the start date was cleared.
    pub fn set_date_range(
        &mut self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        today: NaiveDate,
    ) {
        if start_date != self.start_date {
            self.current_week_start = start_date.unwrap_or(today);
        }
        self.start_date = start_date;
        self.end_date = end_date;
    }

    /// Days of the current week that fall inside the schedule period. Weeks
    /// at the period boundary yield fewer than seven days.
    pub fn week_days(&self) -> Vec<NaiveDate> {
        (0..WINDOW_DAYS)
            .filter_map(|offset| self.current_week_start.checked_add_days(Days::new(offset)))
            .filter(|day| {
                let after_start = self.start_date.is_none_or(|s| *day >= s);
                let before_end = self.end_date.is_none_or(|e| *day <= e);
                after_start && before_end
            })
            .collect()
    }

    pub fn can_go_previous(&self) -> bool {
        match self.start_date {
            Some(start) => self.current_week_start > start,
            None => true,
        }
    }

    pub fn can_go_next(&self) -> bool {
        match self.end_date {
            Some(end) => self
                .current_week_start
                .checked_add_days(Days::new(WINDOW_DAYS))
                .is_some_and(|next| next <= end),
            None => true,
        }
    }

    /// Page one week back, never moving the anchor before the start date.
    pub fn navigate_previous(&mut self) {
        let Some(previous) = self.current_week_start.checked_sub_days(Days::new(WINDOW_DAYS))
        else {
            return;
        };
        self.current_week_start = match self.start_date {
            Some(start) if previous < start => start,
            _ => previous,
        };
    }

    /// Page one week forward; a step past the end date is a no-op.
    pub fn navigate_next(&mut self) {
        let Some(next) = self.current_week_start.checked_add_days(Days::new(WINDOW_DAYS)) else {
            return;
        };
        if let Some(end) = self.end_date {
            if next > end {
                return;
            }
        }
        self.current_week_start = next;
    }
}
