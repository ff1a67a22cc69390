use chrono::{Datelike, Month, NaiveDateTime, Timelike, Weekday};
use serde::Serialize;

use crate::defaults::DEFAULT_PREVIEW_ROWS;
use crate::registry::City;
use crate::selection::{DayFilter, MonthFilter};

/// One trip as read from a city's source file.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct TripRecord {
    /// 1-based data row in the source file (the header is not counted).
    pub row: usize,
    pub start_time: NaiveDateTime,
    pub end_time: Option<String>,
    pub start_station: String,
    pub end_station: String,
    /// Seconds.
    pub trip_duration: f64,
    pub user_type: Option<String>,
    pub gender: Option<String>,
    pub birth_year: Option<i32>,
    #[serde(skip)]
    month: Month,
    #[serde(skip)]
    day_of_week: Weekday,
    #[serde(skip)]
    hour: u32,
}

/// Source columns of a trip, before its derived columns are computed.
#[derive(Debug, Clone)]
pub struct TripFields {
    pub start_time: NaiveDateTime,
    pub end_time: Option<String>,
    pub start_station: String,
    pub end_station: String,
    pub trip_duration: f64,
    pub user_type: Option<String>,
    pub gender: Option<String>,
    pub birth_year: Option<i32>,
}

impl TripRecord {
    pub fn new(row: usize, fields: TripFields) -> TripRecord {
        let start = fields.start_time;
        // `month()` is always within 1..=12
        let month = u8::try_from(start.month())
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .unwrap_or(Month::January);
        TripRecord {
            row,
            start_time: start,
            end_time: fields.end_time,
            start_station: fields.start_station,
            end_station: fields.end_station,
            trip_duration: fields.trip_duration,
            user_type: fields.user_type,
            gender: fields.gender,
            birth_year: fields.birth_year,
            month,
            day_of_week: start.weekday(),
            hour: start.hour(),
        }
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn day_of_week(&self) -> Weekday {
        self.day_of_week
    }

    /// Start hour, 0..=23.
    pub fn hour(&self) -> u32 {
        self.hour
    }

    /// Checks the derived month and weekday against both filters.
    #[must_use]
    pub fn matches(&self, month: MonthFilter, day: DayFilter) -> bool {
        month.matches(self.month) && day.matches(self.day_of_week)
    }
}

/// Which optional columns the source header carried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub has_end_time: bool,
    pub has_gender: bool,
    pub has_birth_year: bool,
}

/// The trips of one city, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    city: City,
    schema: Schema,
    trips: Vec<TripRecord>,
}

impl Dataset {
    pub fn new(city: City, schema: Schema, trips: Vec<TripRecord>) -> Dataset {
        Dataset {
            city,
            schema,
            trips,
        }
    }

    pub fn city(&self) -> City {
        self.city
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    pub fn trips(&self) -> &[TripRecord] {
        &self.trips
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    /// Keeps only the trips passing both filters. Order is preserved.
    #[must_use]
    pub fn filtered(mut self, month: MonthFilter, day: DayFilter) -> Dataset {
        self.trips.retain(|trip| trip.matches(month, day));
        self
    }

    /// Up to `DEFAULT_PREVIEW_ROWS` trips starting at `offset`.
    pub fn preview(&self, offset: usize) -> &[TripRecord] {
        self.page(offset, DEFAULT_PREVIEW_ROWS)
    }

    /// Up to `len` trips starting at `offset`. Empty when `offset` is past the end.
    pub fn page(&self, offset: usize, len: usize) -> &[TripRecord] {
        let start = offset.min(self.trips.len());
        let end = offset.saturating_add(len).min(self.trips.len());
        &self.trips[start..end]
    }
}
