use std::sync::Mutex;

use crate::data::{TripFields, TripRecord};
use crate::loader::parse_timestamp;

// Global mutex to ensure tests run one at a time
// This prevents race conditions when tests change the working directory or environment
pub static TEST_MUTEX: Mutex<()> = Mutex::new(());

pub fn trip(
    row: usize,
    start_time: &str,
    start_station: &str,
    end_station: &str,
    trip_duration: f64,
    user_type: &str,
) -> TripRecord {
    TripRecord::new(
        row,
        TripFields {
            start_time: parse_timestamp(start_time).expect("valid test timestamp"),
            end_time: None,
            start_station: start_station.to_string(),
            end_station: end_station.to_string(),
            trip_duration,
            user_type: Some(user_type.to_string()),
            gender: None,
            birth_year: None,
        },
    )
}

pub fn trip_with_demographics(
    row: usize,
    user_type: &str,
    gender: Option<&str>,
    birth_year: Option<i32>,
) -> TripRecord {
    let mut record = trip(row, "2017-04-03 12:00:00", "S", "E", 60.0, user_type);
    record.gender = gender.map(str::to_string);
    record.birth_year = birth_year;
    record
}
