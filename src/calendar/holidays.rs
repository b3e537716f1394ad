use bdays::HolidayCalendar;
use bdays::calendars::brazil::BRSettlement;
use bdays::calendars::us::USSettlement;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A public-holiday jurisdiction a project office can sit in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Jurisdiction {
    #[serde(rename = "US")]
    UnitedStates,
    #[serde(rename = "BR")]
    Brazil,
    #[serde(rename = "PT")]
    Portugal,
    #[serde(rename = "GB")]
    UnitedKingdom,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown jurisdiction code '{0}'")]
pub struct UnknownJurisdiction(pub String);

impl Jurisdiction {
    pub const ALL: [Jurisdiction; 4] = [
        Jurisdiction::UnitedStates,
        Jurisdiction::Brazil,
        Jurisdiction::Portugal,
        Jurisdiction::UnitedKingdom,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Jurisdiction::UnitedStates => "US",
            Jurisdiction::Brazil => "BR",
            Jurisdiction::Portugal => "PT",
            Jurisdiction::UnitedKingdom => "GB",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Jurisdiction::UnitedStates => "United States",
            Jurisdiction::Brazil => "Brazil",
            Jurisdiction::Portugal => "Portugal",
            Jurisdiction::UnitedKingdom => "United Kingdom",
        }
    }

    /// Jurisdictions whose holidays come from the rule tables below rather
    /// than from a settlement calendar.
    pub(crate) fn uses_rule_table(self) -> bool {
        matches!(self, Jurisdiction::Portugal | Jurisdiction::UnitedKingdom)
    }

    pub(crate) fn settlement_holiday(self, date: NaiveDate) -> bool {
        match self {
            Jurisdiction::UnitedStates => USSettlement.is_holiday(date),
            Jurisdiction::Brazil => BRSettlement.is_holiday(date),
            Jurisdiction::Portugal | Jurisdiction::UnitedKingdom => false,
        }
    }

    pub(crate) fn rule_holidays(self, year: i32) -> HashSet<NaiveDate> {
        match self {
            Jurisdiction::Portugal => portugal_holidays(year),
            Jurisdiction::UnitedKingdom => england_holidays(year),
            Jurisdiction::UnitedStates | Jurisdiction::Brazil => HashSet::new(),
        }
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Jurisdiction {
    type Err = UnknownJurisdiction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "US" | "USA" => Ok(Jurisdiction::UnitedStates),
            "BR" | "BRA" => Ok(Jurisdiction::Brazil),
            "PT" | "PRT" => Ok(Jurisdiction::Portugal),
            "GB" | "UK" | "GBR" => Ok(Jurisdiction::UnitedKingdom),
            _ => Err(UnknownJurisdiction(s.to_string())),
        }
    }
}

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Easter Sunday (Gregorian), anonymous computus.
pub(crate) fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    ymd(year, month as u32, day as u32)
}

/// Find the nth occurrence of a weekday in a month
pub(crate) fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u32) -> Option<NaiveDate> {
    let mut date = ymd(year, month, 1)?;
    let mut count = 0;
    while date.month() == month {
        if date.weekday() == weekday {
            count += 1;
            if count == n {
                return Some(date);
            }
        }
        date = date + Duration::days(1);
    }
    None
}

/// Find the last occurrence of a weekday in a month
pub(crate) fn last_weekday(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let mut date = if month == 12 {
        ymd(year + 1, 1, 1)?
    } else {
        ymd(year, month + 1, 1)?
    };
    date = date - Duration::days(1);
    while date.weekday() != weekday {
        date = date - Duration::days(1);
    }
    Some(date)
}

fn portugal_holidays(year: i32) -> HashSet<NaiveDate> {
    let fixed = [
        (1, 1),
        (4, 25),
        (5, 1),
        (6, 10),
        (8, 15),
        (10, 5),
        (11, 1),
        (12, 1),
        (12, 8),
        (12, 25),
    ];
    let mut days: HashSet<NaiveDate> = fixed
        .iter()
        .filter_map(|&(month, day)| ymd(year, month, day))
        .collect();

    if let Some(easter) = easter_sunday(year) {
        // Good Friday, Easter Sunday, Corpus Christi
        days.insert(easter - Duration::days(2));
        days.insert(easter);
        days.insert(easter + Duration::days(60));
    }
    days
}

/// England & Wales bank holidays, including substitute days.
fn england_holidays(year: i32) -> HashSet<NaiveDate> {
    let mut days = HashSet::new();

    if let Some(new_year) = ymd(year, 1, 1) {
        let observed = match new_year.weekday() {
            Weekday::Sat => new_year + Duration::days(2),
            Weekday::Sun => new_year + Duration::days(1),
            _ => new_year,
        };
        days.insert(observed);
    }

    if let Some(easter) = easter_sunday(year) {
        days.insert(easter - Duration::days(2));
        days.insert(easter + Duration::days(1));
    }

    days.extend(nth_weekday(year, 5, Weekday::Mon, 1));
    days.extend(last_weekday(year, 5, Weekday::Mon));
    days.extend(last_weekday(year, 8, Weekday::Mon));

    if let Some(christmas) = ymd(year, 12, 25) {
        let offsets: [i64; 2] = match christmas.weekday() {
            Weekday::Fri => [0, 3],
            Weekday::Sat => [2, 3],
            Weekday::Sun => [1, 2],
            _ => [0, 1],
        };
        for offset in offsets {
            days.insert(christmas + Duration::days(offset));
        }
    }
    days
}
