use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use serde_json::Value;
use tempfile::{tempdir, TempDir};

const CHICAGO: &str = "\
Start Time,End Time,Trip Duration,Start Station,End Station,User Type,Gender,Birth Year
2017-05-01 08:00:00,2017-05-01 08:05:00,300,A,B,Subscriber,Male,1990.0
2017-05-01 09:00:00,2017-05-01 09:10:00,600,A,C,Customer,,
2017-06-02 10:00:00,2017-06-02 10:07:30,450,A,B,Subscriber,Female,1985.0
";

const WASHINGTON: &str = "\
Start Time,End Time,Trip Duration,Start Station,End Station,User Type
2017-06-21 08:36:34,2017-06-21 08:44:43,489.066,14th & Belmont St NW,15th & K St NW,Subscriber
";

fn data_dir() -> TempDir {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("chicago.csv"), CHICAGO).unwrap();
    fs::write(dir.path().join("washington.csv"), WASHINGTON).unwrap();
    dir
}

/// Runs the binary with no user or project config in reach.
fn bikeshare(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_bikeshare"));
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join("config"))
        .env_remove("BIKESHARE_DATA__DIRECTORY")
        .env_remove("BIKESHARE_DISPLAY__PREVIEW_ROWS")
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(dir);
    cmd
}

fn run(dir: &Path, args: &[&str]) -> Output {
    let output = bikeshare(dir).args(args).output().unwrap();
    println!("{}", String::from_utf8_lossy(&output.stdout));
    eprintln!("{}", String::from_utf8_lossy(&output.stderr));
    output
}

#[test]
fn report_text_for_mondays() {
    let dir = data_dir();
    let output = run(dir.path(), &["report", "--city", "Chicago", "--day", "monday"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("city: chicago, month: all, day: monday (2 trips)"));
    assert!(stdout.contains("The most common month is: May"));
    assert!(stdout.contains("The most commonly used start station is: A"));
    assert!(stdout.contains("A -> B"));
    assert!(stdout.contains("Gender Counts:"));
    assert!(!stdout.contains("This took"));
}

#[test]
fn report_json_for_mondays() {
    let dir = data_dir();
    let output = run(
        dir.path(),
        &["report", "-c", "chicago", "-d", "Monday", "-f", "json"],
    );
    assert!(output.status.success());

    let document: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(document["city"], "chicago");
    assert_eq!(document["month"], "all");
    assert_eq!(document["day"], "monday");

    let report = &document["report"];
    assert_eq!(report["trips"], 2);
    assert_eq!(report["time"]["most_common_month"], "May");
    assert_eq!(report["time"]["most_common_day"], "Monday");
    assert_eq!(report["stations"]["most_common_start"], "A");
    assert_eq!(report["stations"]["most_common_trip"][0], "A");
    assert_eq!(report["stations"]["most_common_trip"][1], "B");
    assert_eq!(report["stations"]["most_common_trip_total_seconds"], 300.0);
    assert_eq!(report["duration"]["total_seconds"], 900.0);
    assert_eq!(report["duration"]["mean_seconds"], 450.0);
    assert_eq!(report["users"]["user_types"].as_array().unwrap().len(), 2);
    assert_eq!(report["users"]["birth_years"]["earliest"], 1990);
    assert!(document.get("preview").is_none());
}

#[test]
fn report_json_without_demographics() {
    let dir = data_dir();
    let output = run(
        dir.path(),
        &["report", "--city", "washington", "--format", "json", "-n", "5"],
    );
    assert!(output.status.success());

    let document: Value = serde_json::from_slice(&output.stdout).unwrap();
    let users = &document["report"]["users"];
    assert!(users.get("genders").is_none());
    assert!(users.get("birth_years").is_none());
    assert_eq!(document["preview"].as_array().unwrap().len(), 1);
    assert_eq!(document["preview"][0]["start_station"], "14th & Belmont St NW");
}

#[test]
fn report_with_preview_rows() {
    let dir = data_dir();
    let output = run(dir.path(), &["report", "--city", "chicago", "--preview", "2"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Row | Start Time"));
    assert!(stdout.contains("1 | 2017-05-01 08:00:00"));
    assert!(stdout.contains("2 | 2017-05-01 09:00:00"));
    assert!(!stdout.contains("3 | 2017-06-02 10:00:00"));
}

#[test]
fn invalid_month_is_a_usage_error() {
    let dir = data_dir();
    let output = run(dir.path(), &["report", "--city", "chicago", "--month", "july"]);
    assert_eq!(output.status.code(), Some(2));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("july"));
    assert!(stderr.contains("january"));
}

#[test]
fn unknown_city_is_a_usage_error() {
    let dir = data_dir();
    let output = run(dir.path(), &["report", "--city", "boston"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn empty_selection_fails() {
    let dir = data_dir();
    let output = run(dir.path(), &["report", "--city", "chicago", "--month", "march"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("compute stage failed"));
}

#[test]
fn missing_data_file_fails() {
    let dir = data_dir();
    let output = run(dir.path(), &["report", "--city", "new york city"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("load stage failed"));
    assert!(stderr.contains("new_york_city.csv"));
}

#[test]
fn malformed_row_fails() {
    let dir = data_dir();
    fs::write(
        dir.path().join("chicago.csv"),
        format!("{CHICAGO}not a time,,300,A,B,Subscriber,,\n"),
    )
    .unwrap();

    let output = run(dir.path(), &["report", "--city", "chicago"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("row 4"));
}

#[test]
fn config_lists_city_files() {
    let dir = data_dir();
    let output = run(dir.path(), &["config"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Config files: none found"));
    assert!(stdout.contains("chicago.csv (exists)"));
    assert!(stdout.contains("new_york_city.csv (not found)"));
}

#[test]
fn project_config_renames_city_file() {
    let dir = data_dir();
    fs::rename(
        dir.path().join("chicago.csv"),
        dir.path().join("divvy_2017.csv"),
    )
    .unwrap();
    fs::write(
        dir.path().join(".bikeshareconfig"),
        "[cities]\nchicago = \"divvy_2017.csv\"\n",
    )
    .unwrap();

    let output = run(dir.path(), &["report", "--city", "chicago"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("(3 trips)"));
}

#[test]
fn interactive_session_from_stdin() {
    let dir = data_dir();
    let mut child = bikeshare(dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"washington\nfebruary\nall\nyes\nchicago\nmay\nall\nyes\nno\nno\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    // February has no Washington trips, so only the Chicago run prints statistics.
    assert!(stdout.contains("compute stage failed"));
    assert!(stdout.contains("1 | 2017-05-01 08:00:00"));
    assert!(stdout.contains("The most common month is: May"));
    assert!(stdout.contains("This took"));
    assert_eq!(stdout.matches("Would you like to restart?").count(), 2);
}
