use std::collections::HashMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};

use crate::error::{BikeshareError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum City {
    Chicago,
    NewYorkCity,
    Washington,
}

/// City key, configuration slug and default file name of every known dataset.
const CITY_DATA: [(City, &str, &str, &str); 3] = [
    (City::Chicago, "chicago", "chicago", "chicago.csv"),
    (
        City::NewYorkCity,
        "new york city",
        "new_york_city",
        "new_york_city.csv",
    ),
    (City::Washington, "washington", "washington", "washington.csv"),
];

impl City {
    pub const ALL: [City; 3] = [City::Chicago, City::NewYorkCity, City::Washington];

    /// Looks up a normalized (lower-case) city key.
    pub fn from_key(key: &str) -> Result<City> {
        CITY_DATA
            .iter()
            .find(|(_, k, _, _)| *k == key)
            .map(|(city, _, _, _)| *city)
            .ok_or_else(|| BikeshareError::UnknownCity {
                city: key.to_string(),
            })
    }

    fn entry(&self) -> &'static (City, &'static str, &'static str, &'static str) {
        match self {
            City::Chicago => &CITY_DATA[0],
            City::NewYorkCity => &CITY_DATA[1],
            City::Washington => &CITY_DATA[2],
        }
    }

    pub fn key(&self) -> &'static str {
        self.entry().1
    }

    /// Key under `[cities]` in configuration files.
    pub fn slug(&self) -> &'static str {
        self.entry().2
    }

    pub fn default_file_name(&self) -> &'static str {
        self.entry().3
    }
}

impl Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Maps cities to the files their trips are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRegistry {
    data_dir: PathBuf,
    overrides: HashMap<City, PathBuf>,
}

impl DatasetRegistry {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        DatasetRegistry {
            data_dir: data_dir.into(),
            overrides: HashMap::new(),
        }
    }

    /// Replaces the file of one city. Relative paths are taken relative to the data directory.
    pub fn with_file(mut self, city: City, file: impl Into<PathBuf>) -> Self {
        self.overrides.insert(city, file.into());
        self
    }

    pub fn path_for(&self, city: City) -> PathBuf {
        let file = self
            .overrides
            .get(&city)
            .map(PathBuf::as_path)
            .unwrap_or_else(|| Path::new(city.default_file_name()));
        // An absolute `file` replaces the data directory in `join`.
        self.data_dir.join(file)
    }

    /// Resolves a city key to its source file.
    pub fn resolve(&self, key: &str) -> Result<PathBuf> {
        City::from_key(key).map(|city| self.path_for(city))
    }
}

impl Default for DatasetRegistry {
    fn default() -> Self {
        DatasetRegistry::new(crate::defaults::DEFAULT_DATA_DIRECTORY)
    }
}
