use std::fmt::Display;

use chrono::{Month, Weekday};

use crate::error::{BikeshareError, Result};
use crate::registry::City;

/// Keyword that disables a month or day filter.
pub const ALL: &str = "all";

pub const CITIES: [&str; 3] = ["chicago", "new york city", "washington"];

pub const MONTHS: [&str; 7] = [
    "january", "february", "march", "april", "may", "june", ALL,
];

pub const DAYS: [&str; 8] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
    ALL,
];

/// The fixed value sets a selection is validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enumeration {
    City,
    Month,
    Day,
}

impl Enumeration {
    pub fn allowed(&self) -> &'static [&'static str] {
        match self {
            Enumeration::City => &CITIES,
            Enumeration::Month => &MONTHS,
            Enumeration::Day => &DAYS,
        }
    }
}

impl Display for Enumeration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Enumeration::City => "city",
            Enumeration::Month => "month",
            Enumeration::Day => "day",
        };
        write!(f, "{name}")
    }
}

/// Validates `candidate` against `enumeration`, ignoring case and surrounding whitespace.
/// Returns the canonical lower-case spelling.
pub fn normalize(enumeration: Enumeration, candidate: &str) -> Result<&'static str> {
    let wanted = candidate.trim().to_lowercase();
    enumeration
        .allowed()
        .iter()
        .copied()
        .find(|allowed| *allowed == wanted)
        .ok_or_else(|| BikeshareError::InvalidSelection {
            enumeration,
            value: candidate.to_string(),
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthFilter {
    All,
    Only(Month),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayFilter {
    All,
    Only(Weekday),
}

impl MonthFilter {
    pub fn parse(candidate: &str) -> Result<Self> {
        let month = normalize(Enumeration::Month, candidate)?;
        if month == ALL {
            return Ok(MonthFilter::All);
        }
        // Position within january..june is the calendar month minus one.
        let index = MONTHS
            .iter()
            .position(|m| *m == month)
            .and_then(|i| u8::try_from(i + 1).ok())
            .and_then(|n| Month::try_from(n).ok())
            .ok_or_else(|| BikeshareError::InvalidSelection {
                enumeration: Enumeration::Month,
                value: candidate.to_string(),
            })?;
        Ok(MonthFilter::Only(index))
    }

    pub fn matches(&self, month: Month) -> bool {
        match self {
            MonthFilter::All => true,
            MonthFilter::Only(wanted) => *wanted == month,
        }
    }
}

impl DayFilter {
    pub fn parse(candidate: &str) -> Result<Self> {
        let day = normalize(Enumeration::Day, candidate)?;
        if day == ALL {
            return Ok(DayFilter::All);
        }
        day.parse::<Weekday>()
            .map(DayFilter::Only)
            .map_err(|_| BikeshareError::InvalidSelection {
                enumeration: Enumeration::Day,
                value: candidate.to_string(),
            })
    }

    pub fn matches(&self, day: Weekday) -> bool {
        match self {
            DayFilter::All => true,
            DayFilter::Only(wanted) => *wanted == day,
        }
    }
}

impl Display for MonthFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonthFilter::All => write!(f, "{ALL}"),
            MonthFilter::Only(month) => write!(f, "{}", month.name().to_lowercase()),
        }
    }
}

impl Display for DayFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayFilter::All => write!(f, "{ALL}"),
            DayFilter::Only(day) => write!(f, "{}", weekday_name(*day).to_lowercase()),
        }
    }
}

/// A validated (city, month, day) triple driving one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterCriteria {
    pub city: City,
    pub month: MonthFilter,
    pub day: DayFilter,
}

impl FilterCriteria {
    pub fn parse(city: &str, month: &str, day: &str) -> Result<Self> {
        let city = normalize(Enumeration::City, city)?;
        Ok(FilterCriteria {
            city: City::from_key(city)?,
            month: MonthFilter::parse(month)?,
            day: DayFilter::parse(day)?,
        })
    }
}

impl Display for FilterCriteria {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "city: {}, month: {}, day: {}", self.city, self.month, self.day)
    }
}

/// Full English weekday name, e.g. "Monday".
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
