use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDateTime;
use log::{debug, info};
use serde::Deserialize;

use crate::data::{Dataset, Schema, TripFields, TripRecord};
use crate::error::{BikeshareError, Result};
use crate::registry::{City, DatasetRegistry};
use crate::selection::{DayFilter, FilterCriteria, MonthFilter};

pub const START_TIME: &str = "Start Time";
pub const END_TIME: &str = "End Time";
pub const TRIP_DURATION: &str = "Trip Duration";
pub const START_STATION: &str = "Start Station";
pub const END_STATION: &str = "End Station";
pub const USER_TYPE: &str = "User Type";
pub const GENDER: &str = "Gender";
pub const BIRTH_YEAR: &str = "Birth Year";

const REQUIRED_COLUMNS: [&str; 5] = [
    START_TIME,
    TRIP_DURATION,
    START_STATION,
    END_STATION,
    USER_TYPE,
];

/// Tried in order. Fractional seconds are optional in the first two.
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Columns not listed here (e.g. an unnamed leading index) are ignored.
#[derive(Debug, Deserialize)]
struct RawTrip {
    #[serde(rename = "Start Time")]
    start_time: String,
    #[serde(rename = "End Time", default)]
    end_time: Option<String>,
    #[serde(rename = "Trip Duration")]
    trip_duration: f64,
    #[serde(rename = "Start Station")]
    start_station: String,
    #[serde(rename = "End Station")]
    end_station: String,
    #[serde(rename = "User Type", default)]
    user_type: Option<String>,
    #[serde(rename = "Gender", default)]
    gender: Option<String>,
    #[serde(rename = "Birth Year", default)]
    birth_year: Option<f64>,
}

/// Parses a start or end time. Returns `None` when no known layout matches.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

fn malformed(row: usize, reason: String) -> BikeshareError {
    BikeshareError::MalformedRecord { row, reason }
}

fn checked_duration(row: usize, seconds: f64) -> Result<f64> {
    if seconds.is_finite() {
        Ok(seconds)
    } else {
        Err(malformed(row, format!("{TRIP_DURATION} '{seconds}' is not a number")))
    }
}

/// Birth years are stored as floats by the upstream exports ("1992.0").
fn checked_birth_year(row: usize, year: Option<f64>) -> Result<Option<i32>> {
    let Some(year) = year else {
        return Ok(None);
    };
    let whole = year.is_finite()
        && year.fract() == 0.0
        && year >= f64::from(i32::MIN)
        && year <= f64::from(i32::MAX);
    if !whole {
        return Err(malformed(
            row,
            format!("{BIRTH_YEAR} '{year}' is not a whole year"),
        ));
    }
    // Range checked above.
    Ok(Some(year as i32))
}

fn to_record(row: usize, raw: RawTrip) -> Result<TripRecord> {
    let start_time = parse_timestamp(&raw.start_time)
        .ok_or_else(|| malformed(row, format!("unparseable {START_TIME} '{}'", raw.start_time)))?;
    let trip_duration = checked_duration(row, raw.trip_duration)?;
    let birth_year = checked_birth_year(row, raw.birth_year)?;

    Ok(TripRecord::new(
        row,
        TripFields {
            start_time,
            end_time: raw.end_time,
            start_station: raw.start_station,
            end_station: raw.end_station,
            trip_duration,
            user_type: raw.user_type,
            gender: raw.gender,
            birth_year,
        },
    ))
}

/// Reads every trip of `city` from `reader`. `source` only labels errors.
///
/// The whole read fails on the first row whose start time or numeric columns
/// cannot be parsed.
pub fn read_trips<R: Read>(city: City, reader: R, source: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| BikeshareError::DataSourceUnavailable {
            path: source.to_path_buf(),
            reason: format!("cannot read header: {e}"),
        })?
        .clone();

    let has_column = |name: &str| headers.iter().any(|h| h == name);

    if let Some(missing) = REQUIRED_COLUMNS.iter().find(|c| !has_column(c)) {
        return Err(BikeshareError::DataSourceUnavailable {
            path: source.to_path_buf(),
            reason: format!("missing column '{missing}'"),
        });
    }

    let schema = Schema {
        has_end_time: has_column(END_TIME),
        has_gender: has_column(GENDER),
        has_birth_year: has_column(BIRTH_YEAR),
    };

    let mut trips = Vec::new();
    for (index, result) in reader.deserialize::<RawTrip>().enumerate() {
        let row = index + 1;
        let raw = result.map_err(|e| BikeshareError::MalformedRecord {
            row,
            reason: e.to_string(),
        })?;
        trips.push(to_record(row, raw)?);
    }

    debug!("Read {} trips for {city} ({schema:?})", trips.len());

    Ok(Dataset::new(city, schema, trips))
}

/// Reads the source of `city` and applies the month and day filters.
pub fn load_filtered(
    registry: &DatasetRegistry,
    city: City,
    month: MonthFilter,
    day: DayFilter,
) -> Result<Dataset> {
    let path = registry.path_for(city);
    info!("Loading trips for {city} from {}", path.display());

    let file = File::open(&path).map_err(|e| BikeshareError::DataSourceUnavailable {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let dataset = read_trips(city, file, &path)?;
    let total = dataset.len();
    let dataset = dataset.filtered(month, day);
    debug!(
        "Kept {} of {total} trips for month: {month}, day: {day}",
        dataset.len()
    );

    Ok(dataset)
}

/// Loads the trips selected by validated criteria.
pub fn load(registry: &DatasetRegistry, criteria: &FilterCriteria) -> Result<Dataset> {
    load_filtered(registry, criteria.city, criteria.month, criteria.day)
}

/// Loads by raw city, month and day strings.
///
/// The city is resolved through the registry and fails with
/// [`BikeshareError::UnknownCity`]; month and day fail with
/// [`BikeshareError::InvalidSelection`].
pub fn load_selection(
    registry: &DatasetRegistry,
    city: &str,
    month: &str,
    day: &str,
) -> Result<Dataset> {
    let city = City::from_key(&city.trim().to_lowercase())?;
    load_filtered(
        registry,
        city,
        MonthFilter::parse(month)?,
        DayFilter::parse(day)?,
    )
}
