use std::fmt::Display;
use std::path::PathBuf;

use crate::selection::Enumeration;

/// Pipeline stage an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Selection,
    Load,
    Compute,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Selection => "selection",
            Stage::Load => "load",
            Stage::Compute => "compute",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BikeshareError {
    #[error("Unknown city '{city}'. Expected one of: chicago, new york city, washington")]
    UnknownCity { city: String },

    #[error("Invalid {enumeration} '{value}'. Expected one of: {}", enumeration.allowed().join(", "))]
    InvalidSelection {
        enumeration: Enumeration,
        value: String,
    },

    #[error("Cannot read trip data from {}: {reason}", path.display())]
    DataSourceUnavailable { path: PathBuf, reason: String },

    #[error("Malformed record at data row {row}: {reason}")]
    MalformedRecord { row: usize, reason: String },

    #[error("No trips left to compute the {report} report over")]
    EmptyDataset { report: &'static str },
}

impl BikeshareError {
    /// Selection errors are recoverable by asking again. Everything else ends the run.
    pub fn stage(&self) -> Stage {
        match self {
            BikeshareError::InvalidSelection { .. } => Stage::Selection,
            BikeshareError::UnknownCity { .. }
            | BikeshareError::DataSourceUnavailable { .. }
            | BikeshareError::MalformedRecord { .. } => Stage::Load,
            BikeshareError::EmptyDataset { .. } => Stage::Compute,
        }
    }
}

pub type Result<T, E = BikeshareError> = std::result::Result<T, E>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn stages() {
        let cases = vec![
            (
                BikeshareError::UnknownCity {
                    city: "boston".to_string(),
                },
                Stage::Load,
            ),
            (
                BikeshareError::InvalidSelection {
                    enumeration: Enumeration::Month,
                    value: "july".to_string(),
                },
                Stage::Selection,
            ),
            (
                BikeshareError::MalformedRecord {
                    row: 3,
                    reason: "bad".to_string(),
                },
                Stage::Load,
            ),
            (
                BikeshareError::EmptyDataset { report: "time" },
                Stage::Compute,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.stage(), expected, "Failed for error: {error}");
        }
    }

    #[test]
    fn invalid_selection_names_enumeration() {
        let error = BikeshareError::InvalidSelection {
            enumeration: Enumeration::Day,
            value: "funday".to_string(),
        };
        let message = error.to_string();
        assert!(message.starts_with("Invalid day 'funday'"));
        assert!(message.contains("monday"));
        assert!(message.contains("all"));
    }
}
