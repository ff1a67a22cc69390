use std::time::Duration;

use human_repr::HumanDuration;
use itertools::Itertools;
use readable::num::{Float, Unsigned};
use serde::Serialize;

use crate::data::{Schema, TripRecord};
use crate::reports::{
    AnalysisReport, BirthYearReport, DurationReport, StationReport, TimeReport, UserReport,
};
use crate::selection::{weekday_name, FilterCriteria};

pub const SEPARATOR: &str = "----------------------------------------";

/// Section headings, in print order.
pub const TIME_HEADING: &str = "Calculating The Most Frequent Times of Travel...";
pub const STATION_HEADING: &str = "Calculating The Most Popular Stations and Trip...";
pub const DURATION_HEADING: &str = "Calculating Trip Duration...";
pub const USER_HEADING: &str = "Calculating User Stats...";

fn human_seconds(seconds: f64) -> String {
    match Duration::try_from_secs_f64(seconds) {
        Ok(d) => d.human_duration().to_string(),
        Err(_) => format!("{seconds}s"),
    }
}

pub fn render_time(report: &TimeReport) -> String {
    format!(
        "The most common month is: {}\nThe most common day of the week is: {}\nThe most common start hour is: {}\n",
        report.most_common_month.name(),
        weekday_name(report.most_common_day),
        report.most_common_hour,
    )
}

pub fn render_stations(report: &StationReport) -> String {
    let (from, to) = &report.most_common_trip;
    format!(
        "The most commonly used start station is: {}\nThe most commonly used end station is: {}\nThe most frequent combination of start and end stations is: {from} -> {to} ({} trips)\nTotal time on that trip: {} seconds ({})\n",
        report.most_common_start,
        report.most_common_end,
        Unsigned::from(report.most_common_trip_count),
        Float::from(report.most_common_trip_total_seconds),
        human_seconds(report.most_common_trip_total_seconds),
    )
}

pub fn render_duration(report: &DurationReport) -> String {
    format!(
        "Total travel time: {} seconds ({})\nMean travel time: {} seconds ({})\nShortest trip: {} seconds, longest trip: {} seconds\n",
        Float::from(report.total_seconds),
        human_seconds(report.total_seconds),
        Float::from(report.mean_seconds),
        human_seconds(report.mean_seconds),
        Float::from(report.shortest_seconds),
        Float::from(report.longest_seconds),
    )
}

fn render_counts(title: &str, counts: &[(String, usize)]) -> String {
    if counts.is_empty() {
        return format!("{title}:\n  (none recorded)\n");
    }
    let width = counts.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    let rows = counts
        .iter()
        .map(|(name, count)| format!("  {name:<width$}  {}\n", Unsigned::from(*count)))
        .collect::<String>();
    format!("{title}:\n{rows}")
}

fn render_birth_years(years: &BirthYearReport) -> String {
    match (years.earliest, years.most_recent, years.most_common) {
        (Some(earliest), Some(most_recent), Some(most_common)) => format!(
            "Earliest year of birth: {earliest}\nMost recent year of birth: {most_recent}\nMost common year of birth: {most_common}\n"
        ),
        _ => "No year of birth recorded.\n".to_string(),
    }
}

pub fn render_users(report: &UserReport) -> String {
    let mut out = render_counts("User Types", &report.user_types);

    if let Some(genders) = &report.genders {
        out.push('\n');
        out.push_str(&render_counts("Gender Counts", genders));
    }

    if let Some(years) = &report.birth_years {
        out.push('\n');
        out.push_str(&render_birth_years(years));
    }
    out
}

/// Raw trips as a simple table. Optional columns follow the dataset schema.
pub fn render_preview(rows: &[TripRecord], schema: Schema) -> String {
    let mut header = vec!["Row", "Start Time"];
    if schema.has_end_time {
        header.push("End Time");
    }
    header.extend(["Trip Duration", "Start Station", "End Station", "User Type"]);
    if schema.has_gender {
        header.push("Gender");
    }
    if schema.has_birth_year {
        header.push("Birth Year");
    }

    let mut out = header.iter().join(" | ");
    out.push('\n');

    for trip in rows {
        let mut cells = vec![
            trip.row.to_string(),
            trip.start_time.format("%Y-%m-%d %H:%M:%S").to_string(),
        ];
        if schema.has_end_time {
            cells.push(trip.end_time.clone().unwrap_or_default());
        }
        cells.extend([
            trip.trip_duration.to_string(),
            trip.start_station.clone(),
            trip.end_station.clone(),
            trip.user_type.clone().unwrap_or_default(),
        ]);
        if schema.has_gender {
            cells.push(trip.gender.clone().unwrap_or_default());
        }
        if schema.has_birth_year {
            cells.push(trip.birth_year.map(|y| y.to_string()).unwrap_or_default());
        }
        out.push_str(&cells.iter().join(" | "));
        out.push('\n');
    }
    out
}

/// One report section: heading, body, elapsed time and separator.
pub fn render_section(heading: &str, body: &str, elapsed: Option<Duration>) -> String {
    let timing = elapsed
        .map(|elapsed| format!("\nThis took {}.\n", elapsed.human_duration()))
        .unwrap_or_default();
    format!("\n{heading}\n\n{body}{timing}{SEPARATOR}\n")
}

/// All four sections without timings.
pub fn render_report(report: &AnalysisReport) -> String {
    [
        render_section(TIME_HEADING, &render_time(&report.time), None),
        render_section(STATION_HEADING, &render_stations(&report.stations), None),
        render_section(DURATION_HEADING, &render_duration(&report.duration), None),
        render_section(USER_HEADING, &render_users(&report.users), None),
    ]
    .concat()
}

fn no_rows(rows: &&[TripRecord]) -> bool {
    rows.is_empty()
}

#[derive(Debug, Serialize)]
pub struct ReportDocument<'a> {
    pub city: String,
    pub month: String,
    pub day: String,
    pub report: &'a AnalysisReport,
    #[serde(skip_serializing_if = "no_rows")]
    pub preview: &'a [TripRecord],
}

impl<'a> ReportDocument<'a> {
    pub fn new(
        criteria: &FilterCriteria,
        report: &'a AnalysisReport,
        preview: &'a [TripRecord],
    ) -> Self {
        ReportDocument {
            city: criteria.city.to_string(),
            month: criteria.month.to_string(),
            day: criteria.day.to_string(),
            report,
            preview,
        }
    }
}
