mod holidays;

pub use holidays::{Jurisdiction, UnknownJurisdiction};

use crate::project::Project;
use chrono::{Datelike, NaiveDate, Weekday};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// Working-day calendar for a set of jurisdictions.
///
/// A date is non-working when it falls on a non-working weekday, on a custom
/// holiday, or on a public holiday in *any* of the configured jurisdictions.
#[derive(Debug, Clone)]
pub struct WorkCalendar {
    jurisdictions: Vec<Jurisdiction>,
    holidays: HashSet<NaiveDate>,
    non_working_days: HashSet<Weekday>,
    rule_cache: RefCell<HashMap<(Jurisdiction, i32), HashSet<NaiveDate>>>,
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self::for_jurisdictions(["US"])
    }
}

impl WorkCalendar {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Mon-Fri calendar with no public holidays.
    pub fn weekends_only() -> Self {
        Self {
            jurisdictions: Vec::new(),
            holidays: HashSet::new(),
            non_working_days: HashSet::from([Weekday::Sat, Weekday::Sun]),
            rule_cache: RefCell::new(HashMap::new()),
        }
    }

    /// Build a Mon-Fri calendar observing the holidays of every recognised
    /// code. Unknown codes contribute nothing.
    pub fn for_jurisdictions<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut calendar = Self::weekends_only();
        for code in codes {
            let code = code.as_ref();
            match code.parse::<Jurisdiction>() {
                Ok(jurisdiction) => {
                    if !calendar.jurisdictions.contains(&jurisdiction) {
                        calendar.jurisdictions.push(jurisdiction);
                    }
                }
                Err(err) => tracing::debug!(code, %err, "ignoring jurisdiction"),
            }
        }
        calendar
    }

    pub fn for_project(project: &Project) -> Self {
        let mut calendar = Self::for_jurisdictions(&project.jurisdictions);
        calendar.add_holidays(&project.custom_holidays);
        calendar
    }

    pub fn jurisdictions(&self) -> &[Jurisdiction] {
        &self.jurisdictions
    }

    /// Add a single holiday
    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.holidays.insert(date);
    }

    /// Add multiple holidays at once
    pub fn add_holidays(&mut self, dates: &[NaiveDate]) {
        self.holidays.extend(dates);
    }

    /// Set custom working days (e.g., Mon-Sat for 6-day weeks).
    /// An empty set is rejected and leaves the calendar unchanged.
    pub fn set_working_days(&mut self, days: &[Weekday]) {
        if days.is_empty() {
            tracing::warn!("calendar needs at least one working day; keeping current week");
            return;
        }
        self.non_working_days.clear();
        for day in Self::ALL_WEEKDAYS {
            if !days.contains(&day) {
                self.non_working_days.insert(day);
            }
        }
    }

    /// Working week of the first `days` weekdays from Monday; 5 is Mon-Fri.
    pub fn set_week_length(&mut self, days: u32) {
        let len = usize::try_from(days)
            .unwrap_or(usize::MAX)
            .min(Self::ALL_WEEKDAYS.len());
        self.set_working_days(&Self::ALL_WEEKDAYS[..len]);
    }

    pub fn is_weekend(&self, date: NaiveDate) -> bool {
        self.non_working_days.contains(&date.weekday())
    }

    /// True when any configured jurisdiction (or the custom list) observes
    /// a holiday on `date`.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        if self.holidays.contains(&date) {
            return true;
        }
        // Holiday rules look across year boundaries; the edge years of the
        // date range have no jurisdiction holidays.
        if !Self::has_public_holidays(date) {
            return false;
        }
        self.jurisdictions.iter().any(|&jurisdiction| {
            if jurisdiction.uses_rule_table() {
                self.rule_holiday(jurisdiction, date)
            } else {
                jurisdiction.settlement_holiday(date)
            }
        })
    }

    fn has_public_holidays(date: NaiveDate) -> bool {
        date.year() > NaiveDate::MIN.year() && date.year() < NaiveDate::MAX.year()
    }

    fn rule_holiday(&self, jurisdiction: Jurisdiction, date: NaiveDate) -> bool {
        let year = date.year();
        let mut cache = self.rule_cache.borrow_mut();
        cache
            .entry((jurisdiction, year))
            .or_insert_with(|| jurisdiction.rule_holidays(year))
            .contains(&date)
    }

    pub fn is_non_working(&self, date: NaiveDate) -> bool {
        self.is_weekend(date) || self.is_holiday(date)
    }

    /// Check if a date is available for scheduling
    pub fn is_available(&self, date: NaiveDate) -> bool {
        !self.is_non_working(date)
    }

    /// `date` itself when it is a working day, otherwise the first working day after it.
    /// Saturates at `NaiveDate::MAX`; see [`checked_roll_forward`](Self::checked_roll_forward).
    pub fn roll_forward(&self, date: NaiveDate) -> NaiveDate {
        self.checked_roll_forward(date).unwrap_or(NaiveDate::MAX)
    }

    /// `None` when no working day exists before the end of the date range.
    pub fn checked_roll_forward(&self, date: NaiveDate) -> Option<NaiveDate> {
        let mut current = date;
        while self.is_non_working(current) {
            current = current.succ_opt()?;
        }
        Some(current)
    }

    /// Find the next available date after a given date
    pub fn next_available(&self, from: NaiveDate) -> NaiveDate {
        from.succ_opt()
            .map_or(NaiveDate::MAX, |next| self.roll_forward(next))
    }

    /// Find a date N available days ahead. Saturates at `NaiveDate::MAX`.
    pub fn find_next_available(&self, from: NaiveDate, days_ahead: i64) -> NaiveDate {
        self.checked_find_next_available(from, days_ahead)
            .unwrap_or(NaiveDate::MAX)
    }

    /// `None` when the walk would step past the end of the date range.
    pub fn checked_find_next_available(&self, from: NaiveDate, days_ahead: i64) -> Option<NaiveDate> {
        // Each working day is at least one calendar day.
        if days_ahead > (NaiveDate::MAX - from).num_days() {
            return None;
        }
        let mut current = from;
        let mut count = 0;

        while count < days_ahead {
            current = current.succ_opt()?;
            if self.is_available(current) {
                count += 1;
            }
        }
        Some(current)
    }

    /// Working days in the half-open span `(start, end]`; zero when `end <= start`.
    ///
    /// This is the inverse of [`find_next_available`](Self::find_next_available):
    /// stepping `n` working days from `start` lands on a date `end` with
    /// `business_days_between(start, end) == n`.
    pub fn business_days_between(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        match start.succ_opt() {
            Some(first) if end > start => self.count_available_days(first, end),
            _ => 0,
        }
    }

    /// Count available days in a date range
    pub fn count_available_days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        let mut count = 0;
        let mut current = start;

        while current <= end {
            if self.is_available(current) {
                count += 1;
            }
            let Some(next) = current.succ_opt() else {
                break;
            };
            current = next;
        }
        count
    }

    /// Holidays that fall on otherwise-working weekdays within `[start, end]`.
    pub fn weekday_holidays_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let mut current = start;

        while current <= end {
            if !self.is_weekend(current) && self.is_holiday(current) {
                days.push(current);
            }
            let Some(next) = current.succ_opt() else {
                break;
            };
            current = next;
        }
        days
    }
}

/// Whether `date` is a weekend or a holiday in any of the given jurisdiction codes.
pub fn is_non_working<S: AsRef<str>>(date: NaiveDate, jurisdictions: &[S]) -> bool {
    WorkCalendar::for_jurisdictions(jurisdictions).is_non_working(date)
}
