use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::CommandFactory;
use clap::{error::ErrorKind::InvalidValue, Parser};
use env_logger::Env;
use log::Level;

use crate::config::Settings;
use crate::error::BikeshareError;
use crate::loader;
use crate::registry::City;
use crate::reporting::{self, ReportDocument};
use crate::reports;
use crate::selection::FilterCriteria;
use crate::session::Session;
use bikeshare_cli_types::{Cli, CliSelection, Commands, OutputFormat};

pub fn handle_calls() -> Result<()> {
    let cli = Cli::parse();
    let logger_level = match cli.verbose {
        0 => Level::Warn,
        1 => Level::Info,
        2 => Level::Debug,
        _ => Level::Trace,
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(logger_level.as_str())).init();

    let settings = Settings::load(cli.data_dir.as_deref());

    match cli.command.unwrap_or(Commands::Explore {}) {
        Commands::Explore {} => explore(&settings),
        Commands::Report {
            selection,
            format,
            preview,
        } => report(&settings, &selection, format, preview),
        Commands::Config {} => show_config_info(&settings),
    }
}

fn explore(settings: &Settings) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    Session::new(stdin.lock(), stdout.lock(), settings).run()
}

fn with_stage<T>(result: Result<T, BikeshareError>) -> Result<T> {
    result.map_err(|e| {
        let stage = e.stage();
        anyhow::Error::new(e).context(format!("{stage} stage failed"))
    })
}

/// One non-interactive run. Bad selections are reported as usage errors.
fn report(
    settings: &Settings,
    selection: &CliSelection,
    format: OutputFormat,
    preview: usize,
) -> Result<()> {
    let criteria = match FilterCriteria::parse(&selection.city, &selection.month, &selection.day) {
        Ok(criteria) => criteria,
        Err(e) => Cli::command().error(InvalidValue, e.to_string()).exit(),
    };
    log::info!("Reporting on {criteria}");

    let dataset = with_stage(loader::load(&settings.registry(), &criteria))?;
    let report = with_stage(reports::compute_all(&dataset))?;
    let rows = dataset.page(0, preview);

    let mut out = io::stdout().lock();
    match format {
        OutputFormat::Text => {
            writeln!(out, "{criteria} ({} trips)", report.trips)?;
            write!(out, "{}", reporting::render_report(&report))?;
            if !rows.is_empty() {
                write!(out, "\n{}", reporting::render_preview(rows, dataset.schema()))?;
            }
        }
        OutputFormat::Json => {
            let document = ReportDocument::new(&criteria, &report, rows);
            serde_json::to_writer_pretty(&mut out, &document)
                .context("Failed to serialize report")?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Show where trip data and configuration are read from
fn show_config_info(settings: &Settings) -> Result<()> {
    println!("Bikeshare Configuration Information");
    println!("===================================");

    println!("Data directory: {}", settings.data_dir.display());
    println!("Preview rows: {}", settings.preview_rows);

    if settings.sources.is_empty() {
        println!("Config files: none found");
    } else {
        println!("Config files:");
        for source in &settings.sources {
            println!("  {}", source.display());
        }
    }

    println!("\nCity data:");
    let registry = settings.registry();
    for city in City::ALL {
        let path = registry.path_for(city);
        let state = if path.is_file() { "exists" } else { "not found" };
        println!("  {:<14} {} ({state})", city.key(), path.display());
    }

    Ok(())
}
