use std::io::{BufRead, Write};
use std::time::{Duration, Instant};

use anyhow::Result;
use log::warn;

use crate::config::Settings;
use crate::data::Dataset;
use crate::error::BikeshareError;
use crate::loader;
use crate::registry::{City, DatasetRegistry};
use crate::reporting::{
    self, DURATION_HEADING, SEPARATOR, STATION_HEADING, TIME_HEADING, USER_HEADING,
};
use crate::reports::{self, AnalysisReport};
use crate::selection::{normalize, DayFilter, Enumeration, FilterCriteria, MonthFilter};

const CITY_PROMPT: &str =
    "Which city would you like to analyze? (chicago, new york city, washington): ";
const MONTH_PROMPT: &str =
    "Which month would you like to filter by? (january, february, ..., june or 'all' for no filter): ";
const DAY_PROMPT: &str =
    "Which day would you like to filter by? (monday, tuesday, ..., sunday or 'all' for no filter): ";
const INVALID_INPUT: &str = "Invalid input. Please try again.";

/// Per-report computation times, in print order.
struct Timings {
    time: Duration,
    stations: Duration,
    duration: Duration,
    users: Duration,
}

fn timed<T>(f: impl FnOnce() -> Result<T, BikeshareError>) -> Result<(T, Duration), BikeshareError> {
    let start = Instant::now();
    let value = f()?;
    Ok((value, start.elapsed()))
}

fn compute_timed(dataset: &Dataset) -> Result<(AnalysisReport, Timings), BikeshareError> {
    let (time, time_elapsed) = timed(|| reports::time_stats(dataset))?;
    let (stations, stations_elapsed) = timed(|| reports::station_stats(dataset))?;
    let (duration, duration_elapsed) = timed(|| reports::trip_duration_stats(dataset))?;
    let (users, users_elapsed) = timed(|| reports::user_stats(dataset))?;
    Ok((
        AnalysisReport {
            trips: dataset.len(),
            time,
            stations,
            duration,
            users,
        },
        Timings {
            time: time_elapsed,
            stations: stations_elapsed,
            duration: duration_elapsed,
            users: users_elapsed,
        },
    ))
}

/// The interactive prompt, load, report and restart loop.
///
/// End of input at any prompt ends the session without an error.
pub struct Session<R, W> {
    input: R,
    output: W,
    registry: DatasetRegistry,
    page_size: usize,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W, settings: &Settings) -> Self {
        Session {
            input,
            output,
            registry: settings.registry(),
            page_size: settings.preview_rows,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Reads one answer. `None` on end of input.
    fn prompt(&mut self, question: &str) -> Result<Option<String>> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        Ok(self
            .prompt(question)?
            .is_some_and(|answer| answer.eq_ignore_ascii_case("yes")))
    }

    /// Asks until the answer belongs to `enumeration`.
    fn ask(&mut self, enumeration: Enumeration, question: &str) -> Result<Option<&'static str>> {
        loop {
            let Some(answer) = self.prompt(question)? else {
                return Ok(None);
            };
            match normalize(enumeration, &answer) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => {
                    log::debug!("{e}");
                    writeln!(self.output, "{INVALID_INPUT}")?;
                }
            }
        }
    }

    fn select(&mut self) -> Result<Option<FilterCriteria>> {
        writeln!(self.output, "Hello! Let's explore some US bikeshare data!")?;

        let Some(city) = self.ask(Enumeration::City, CITY_PROMPT)? else {
            return Ok(None);
        };
        let Some(month) = self.ask(Enumeration::Month, MONTH_PROMPT)? else {
            return Ok(None);
        };
        let Some(day) = self.ask(Enumeration::Day, DAY_PROMPT)? else {
            return Ok(None);
        };
        writeln!(self.output, "{SEPARATOR}")?;

        Ok(Some(FilterCriteria {
            city: City::from_key(city)?,
            month: MonthFilter::parse(month)?,
            day: DayFilter::parse(day)?,
        }))
    }

    /// Pages through raw trips while the user keeps answering yes.
    fn display_data(&mut self, dataset: &Dataset) -> Result<()> {
        let first = format!(
            "\nDo you want to check the first {} rows of the dataset? Enter yes or no: ",
            self.page_size
        );
        let another = format!(
            "\nDo you want to check another {} rows? Enter yes or no: ",
            self.page_size
        );

        let mut offset = 0;
        let mut question = first;
        while self.confirm(&question)? {
            let rows = dataset.page(offset, self.page_size);
            if rows.is_empty() {
                writeln!(self.output, "No more trips to show.")?;
                break;
            }
            write!(
                self.output,
                "{}",
                reporting::render_preview(rows, dataset.schema())
            )?;
            offset += rows.len();
            question = another.clone();
        }
        Ok(())
    }

    fn report_failure(&mut self, error: &BikeshareError) -> Result<()> {
        warn!("Analysis aborted: {error}");
        writeln!(
            self.output,
            "\nNo statistics for this selection ({} stage failed): {error}",
            error.stage()
        )?;
        Ok(())
    }

    /// One load and report cycle. Core errors are shown and end this run only.
    pub fn analyze(&mut self, criteria: &FilterCriteria) -> Result<()> {
        let dataset = match loader::load(&self.registry, criteria) {
            Ok(dataset) => dataset,
            Err(e) => return self.report_failure(&e),
        };

        let (report, timings) = match compute_timed(&dataset) {
            Ok(computed) => computed,
            Err(e) => return self.report_failure(&e),
        };

        self.display_data(&dataset)?;

        let sections = [
            reporting::render_section(
                TIME_HEADING,
                &reporting::render_time(&report.time),
                Some(timings.time),
            ),
            reporting::render_section(
                STATION_HEADING,
                &reporting::render_stations(&report.stations),
                Some(timings.stations),
            ),
            reporting::render_section(
                DURATION_HEADING,
                &reporting::render_duration(&report.duration),
                Some(timings.duration),
            ),
            reporting::render_section(
                USER_HEADING,
                &reporting::render_users(&report.users),
                Some(timings.users),
            ),
        ];
        for section in sections {
            write!(self.output, "{section}")?;
        }
        Ok(())
    }

    pub fn run(&mut self) -> Result<()> {
        loop {
            let Some(criteria) = self.select()? else {
                return Ok(());
            };
            log::info!("Analyzing {criteria}");
            self.analyze(&criteria)?;

            if !self.confirm("\nWould you like to restart? Enter yes or no.\n")? {
                return Ok(());
            }
        }
    }
}
