//! The statistics computed over a filtered [`Dataset`].
//!
//! Every report is a pure function of the dataset. Aggregates over zero trips
//! fail with [`BikeshareError::EmptyDataset`] instead of producing defaults.

use chrono::{Month, Weekday};
use serde::{Serialize, Serializer};

use crate::data::{Dataset, TripRecord};
use crate::error::{BikeshareError, Result};
use crate::selection::weekday_name;
use crate::stats::{summarize_durations, ModeReduction, Tally};

fn serialize_month<S: Serializer>(month: &Month, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(month.name())
}

fn serialize_weekday<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(weekday_name(*day))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeReport {
    #[serde(serialize_with = "serialize_month")]
    pub most_common_month: Month,
    #[serde(serialize_with = "serialize_weekday")]
    pub most_common_day: Weekday,
    pub most_common_hour: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationReport {
    pub most_common_start: String,
    pub most_common_end: String,
    /// (start, end) pair with the most trips
    pub most_common_trip: (String, String),
    pub most_common_trip_count: usize,
    /// Summed duration of the trips along `most_common_trip`.
    pub most_common_trip_total_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationReport {
    pub total_seconds: f64,
    pub mean_seconds: f64,
    pub shortest_seconds: f64,
    pub longest_seconds: f64,
    pub trips: usize,
}

/// Birth year figures. All `None` when no trip recorded a birth year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BirthYearReport {
    pub earliest: Option<i32>,
    pub most_recent: Option<i32>,
    pub most_common: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserReport {
    /// Descending by count; blank user types are not counted.
    pub user_types: Vec<(String, usize)>,
    /// Absent when the source has no gender column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genders: Option<Vec<(String, usize)>>,
    /// Absent when the source has no birth year column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_years: Option<BirthYearReport>,
}

/// All aggregate reports of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub trips: usize,
    pub time: TimeReport,
    pub stations: StationReport,
    pub duration: DurationReport,
    pub users: UserReport,
}

fn ensure_not_empty(dataset: &Dataset, report: &'static str) -> Result<()> {
    if dataset.is_empty() {
        return Err(BikeshareError::EmptyDataset { report });
    }
    Ok(())
}

fn empty(report: &'static str) -> BikeshareError {
    BikeshareError::EmptyDataset { report }
}

/// Most common month, weekday and start hour.
pub fn time_stats(dataset: &Dataset) -> Result<TimeReport> {
    ensure_not_empty(dataset, "time of travel")?;
    let trips = dataset.trips();
    Ok(TimeReport {
        most_common_month: trips
            .iter()
            .map(TripRecord::month)
            .mode()
            .ok_or_else(|| empty("time of travel"))?,
        most_common_day: trips
            .iter()
            .map(TripRecord::day_of_week)
            .mode()
            .ok_or_else(|| empty("time of travel"))?,
        most_common_hour: trips
            .iter()
            .map(TripRecord::hour)
            .mode()
            .ok_or_else(|| empty("time of travel"))?,
    })
}

/// Most used start and end stations and the most frequent combination of both.
pub fn station_stats(dataset: &Dataset) -> Result<StationReport> {
    ensure_not_empty(dataset, "station popularity")?;
    let trips = dataset.trips();

    let start = trips
        .iter()
        .map(|t| t.start_station.as_str())
        .mode()
        .ok_or_else(|| empty("station popularity"))?;
    let end = trips
        .iter()
        .map(|t| t.end_station.as_str())
        .mode()
        .ok_or_else(|| empty("station popularity"))?;

    let pairs: Tally<(&str, &str)> = trips
        .iter()
        .map(|t| (t.start_station.as_str(), t.end_station.as_str()))
        .collect();
    let (&(from, to), count) = pairs.mode().ok_or_else(|| empty("station popularity"))?;
    let trip_total = trips
        .iter()
        .filter(|t| t.start_station == from && t.end_station == to)
        .map(|t| t.trip_duration)
        .sum();

    Ok(StationReport {
        most_common_start: start.to_string(),
        most_common_end: end.to_string(),
        most_common_trip: (from.to_string(), to.to_string()),
        most_common_trip_count: count,
        most_common_trip_total_seconds: trip_total,
    })
}

/// Total and mean travel time.
pub fn trip_duration_stats(dataset: &Dataset) -> Result<DurationReport> {
    let summary = summarize_durations(dataset.trips().iter().map(|t| t.trip_duration))
        .ok_or_else(|| empty("trip duration"))?;
    Ok(DurationReport {
        total_seconds: summary.total,
        mean_seconds: summary.mean,
        shortest_seconds: summary.shortest,
        longest_seconds: summary.longest,
        trips: summary.len,
    })
}

fn counts_of<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<(String, usize)> {
    values
        .flatten()
        .value_counts()
        .into_iter()
        .map(|(value, count)| (value.to_string(), count))
        .collect()
}

/// User type counts, and gender counts and birth years where the source has them.
pub fn user_stats(dataset: &Dataset) -> Result<UserReport> {
    ensure_not_empty(dataset, "user demographics")?;
    let trips = dataset.trips();
    let schema = dataset.schema();

    let user_types = counts_of(trips.iter().map(|t| t.user_type.as_deref()));

    let genders = schema
        .has_gender
        .then(|| counts_of(trips.iter().map(|t| t.gender.as_deref())));

    let birth_years = schema.has_birth_year.then(|| {
        let years = trips.iter().filter_map(|t| t.birth_year);
        BirthYearReport {
            earliest: years.clone().min(),
            most_recent: years.clone().max(),
            most_common: years.mode(),
        }
    });

    Ok(UserReport {
        user_types,
        genders,
        birth_years,
    })
}

/// Up to five raw trips starting at `offset`; empty past the end.
pub fn preview(dataset: &Dataset, offset: usize) -> &[TripRecord] {
    dataset.preview(offset)
}

/// Computes every aggregate report, or the first error. Never returns partial results.
pub fn compute_all(dataset: &Dataset) -> Result<AnalysisReport> {
    Ok(AnalysisReport {
        trips: dataset.len(),
        time: time_stats(dataset)?,
        stations: station_stats(dataset)?,
        duration: trip_duration_stats(dataset)?,
        users: user_stats(dataset)?,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data::Schema;
    use crate::registry::City;
    use crate::selection::{DayFilter, MonthFilter};
    use crate::test_utils::{trip, trip_with_demographics};

    fn full_schema() -> Schema {
        Schema {
            has_end_time: false,
            has_gender: true,
            has_birth_year: true,
        }
    }

    /// The three-trip example: two Monday trips in May, one Friday trip in June.
    fn example() -> Dataset {
        let trips = vec![
            trip(1, "2017-05-01 08:00:00", "A", "B", 300.0, "Subscriber"),
            trip(2, "2017-05-01 09:00:00", "A", "C", 600.0, "Customer"),
            trip(3, "2017-06-02 10:00:00", "A", "B", 450.0, "Subscriber"),
        ];
        Dataset::new(City::Chicago, Schema::default(), trips)
    }

    #[test]
    fn end_to_end_example() {
        let ds = example().filtered(MonthFilter::All, DayFilter::Only(Weekday::Mon));
        assert_eq!(ds.len(), 2);

        let report = compute_all(&ds).unwrap();
        assert_eq!(report.trips, 2);
        assert_eq!(report.time.most_common_month, Month::May);
        assert_eq!(report.time.most_common_day, Weekday::Mon);
        assert_eq!(report.time.most_common_hour, 8);
        assert_eq!(report.stations.most_common_start, "A");
        assert_eq!(
            report.stations.most_common_trip,
            ("A".to_string(), "B".to_string())
        );
        assert_eq!(report.stations.most_common_trip_count, 1);
        // Only the Monday A -> B trip counts toward the pair total.
        assert_eq!(report.stations.most_common_trip_total_seconds, 300.0);
        assert_eq!(report.duration.total_seconds, 900.0);
        assert_eq!(report.duration.mean_seconds, 450.0);
        assert_eq!(
            report.users.user_types,
            vec![("Subscriber".to_string(), 1), ("Customer".to_string(), 1)]
        );
        assert_eq!(report.users.genders, None);
        assert_eq!(report.users.birth_years, None);
    }

    #[test]
    fn unfiltered_example() {
        let report = compute_all(&example()).unwrap();
        assert_eq!(report.stations.most_common_trip_count, 2);
        assert_eq!(report.stations.most_common_trip_total_seconds, 750.0);
        assert_eq!(report.stations.most_common_end, "B");
        assert_eq!(report.duration.total_seconds, 1350.0);
        assert_eq!(
            report.users.user_types,
            vec![("Subscriber".to_string(), 2), ("Customer".to_string(), 1)]
        );
    }

    #[test]
    fn every_aggregate_fails_on_empty_dataset() {
        let ds = Dataset::new(City::Washington, full_schema(), vec![]);

        assert!(matches!(
            time_stats(&ds),
            Err(BikeshareError::EmptyDataset { .. })
        ));
        assert!(matches!(
            station_stats(&ds),
            Err(BikeshareError::EmptyDataset { .. })
        ));
        assert!(matches!(
            trip_duration_stats(&ds),
            Err(BikeshareError::EmptyDataset { .. })
        ));
        assert!(matches!(
            user_stats(&ds),
            Err(BikeshareError::EmptyDataset { .. })
        ));
        assert!(matches!(
            compute_all(&ds),
            Err(BikeshareError::EmptyDataset { .. })
        ));
        assert!(preview(&ds, 0).is_empty());
    }

    #[test]
    fn ties_resolve_to_first_row() {
        let trips = vec![
            trip(1, "2017-03-07 17:00:00", "Y", "Q", 10.0, "Customer"),
            trip(2, "2017-02-06 08:00:00", "X", "P", 10.0, "Subscriber"),
            trip(3, "2017-02-06 08:00:00", "X", "P", 10.0, "Subscriber"),
            trip(4, "2017-03-07 17:00:00", "Y", "Q", 10.0, "Customer"),
        ];
        let ds = Dataset::new(City::Chicago, Schema::default(), trips);

        for _ in 0..5 {
            let time = time_stats(&ds).unwrap();
            assert_eq!(time.most_common_month, Month::March);
            assert_eq!(time.most_common_day, Weekday::Tue);
            assert_eq!(time.most_common_hour, 17);

            let stations = station_stats(&ds).unwrap();
            assert_eq!(stations.most_common_start, "Y");
            assert_eq!(stations.most_common_end, "Q");
            assert_eq!(
                stations.most_common_trip,
                ("Y".to_string(), "Q".to_string())
            );

            let users = user_stats(&ds).unwrap();
            assert_eq!(users.user_types[0].0, "Customer");
        }
    }

    #[test]
    fn demographics_when_columns_exist() {
        let trips = vec![
            trip_with_demographics(1, "Subscriber", Some("Male"), Some(1980)),
            trip_with_demographics(2, "Subscriber", Some("Female"), Some(1992)),
            trip_with_demographics(3, "Customer", None, None),
            trip_with_demographics(4, "Subscriber", Some("Female"), Some(1992)),
            trip_with_demographics(5, "Subscriber", Some("Male"), Some(1961)),
        ];
        let ds = Dataset::new(City::Chicago, full_schema(), trips);
        let users = user_stats(&ds).unwrap();

        assert_eq!(
            users.user_types,
            vec![("Subscriber".to_string(), 4), ("Customer".to_string(), 1)]
        );
        assert_eq!(
            users.genders,
            Some(vec![("Male".to_string(), 2), ("Female".to_string(), 2)])
        );
        assert_eq!(
            users.birth_years,
            Some(BirthYearReport {
                earliest: Some(1961),
                most_recent: Some(1992),
                most_common: Some(1992),
            })
        );
    }

    #[test]
    fn birth_year_column_without_values() {
        let trips = vec![trip_with_demographics(1, "Customer", None, None)];
        let ds = Dataset::new(City::NewYorkCity, full_schema(), trips);
        let users = user_stats(&ds).unwrap();
        assert_eq!(users.genders, Some(vec![]));
        assert_eq!(
            users.birth_years,
            Some(BirthYearReport {
                earliest: None,
                most_recent: None,
                most_common: None,
            })
        );
    }

    #[test]
    fn absent_columns_have_no_section() {
        let report = compute_all(&example()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        let users = json.get("users").unwrap();
        assert!(users.get("user_types").is_some());
        assert!(users.get("genders").is_none());
        assert!(users.get("birth_years").is_none());
        assert_eq!(json["time"]["most_common_month"], "May");
        assert_eq!(json["time"]["most_common_day"], "Monday");
    }

    #[test]
    fn reports_do_not_mutate_dataset() {
        let ds = example();
        let before = ds.clone();
        let first = compute_all(&ds).unwrap();
        let _ = preview(&ds, 1);
        let second = compute_all(&ds).unwrap();
        assert_eq!(ds, before);
        assert_eq!(first, second);
    }
}
