use config::{Config, ConfigError, Environment, File, FileFormat};
use std::{
    collections::HashMap,
    env,
    path::{Path, PathBuf},
};

use crate::defaults::{
    default_preview_rows, DEFAULT_DATA_DIRECTORY, ENV_PREFIX, PROJECT_CONFIG_FILE_NAME,
    USER_CONFIG_DIR_NAME,
};
use crate::registry::{City, DatasetRegistry};

/// User config (XDG_CONFIG_HOME or ~/.config/bikeshare/config.toml)
fn user_config_path() -> Option<PathBuf> {
    if let Ok(xdg_config_home) = env::var("XDG_CONFIG_HOME") {
        return Some(
            Path::new(&xdg_config_home)
                .join(USER_CONFIG_DIR_NAME)
                .join("config.toml"),
        );
    }
    dirs_next::home_dir().map(|home| {
        home.join(".config")
            .join(USER_CONFIG_DIR_NAME)
            .join("config.toml")
    })
}

/// Search upward from the working directory for `.bikeshareconfig`
fn find_project_config() -> Option<PathBuf> {
    let mut current_dir = env::current_dir().ok()?;
    loop {
        let candidate = current_dir.join(PROJECT_CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current_dir.pop() {
            return None;
        }
    }
}

/// Read layered configuration (user -> project -> environment), later sources win.
pub fn read_config_from(user: Option<&Path>, project: Option<&Path>) -> Result<Config, ConfigError> {
    let mut builder = Config::builder();

    for path in [user, project].into_iter().flatten() {
        builder = builder.add_source(
            File::from(path.to_path_buf())
                .format(FileFormat::Toml)
                .required(false),
        );
    }

    builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
}

pub fn read_hierarchical_config() -> Result<Config, ConfigError> {
    read_config_from(
        user_config_path().as_deref(),
        find_project_config().as_deref(),
    )
}

/// The user and project configuration files that exist, lowest precedence first.
pub fn config_sources() -> Vec<PathBuf> {
    [user_config_path(), find_project_config()]
        .into_iter()
        .flatten()
        .filter(|p| p.is_file())
        .collect()
}

/// Effective settings after applying defaults, config files, environment and CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub city_files: HashMap<City, PathBuf>,
    pub preview_rows: usize,
    /// Configuration files that exist and were read.
    pub sources: Vec<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_dir: PathBuf::from(DEFAULT_DATA_DIRECTORY),
            city_files: HashMap::new(),
            preview_rows: default_preview_rows(),
            sources: Vec::new(),
        }
    }
}

impl Settings {
    /// Applies the values present in `config` over the defaults. Invalid values are ignored.
    pub fn from_config(config: &Config) -> Settings {
        let mut settings = Settings::default();

        if let Ok(dir) = config.get_string("data.directory") {
            settings.data_dir = PathBuf::from(dir);
        }

        for city in City::ALL {
            if let Ok(file) = config.get_string(&format!("cities.{}", city.slug())) {
                settings.city_files.insert(city, PathBuf::from(file));
            }
        }

        match config.get_int("display.preview_rows") {
            Ok(rows) if rows > 0 => settings.preview_rows = rows as usize,
            Ok(rows) => log::warn!("Ignoring display.preview_rows = {rows}, must be positive"),
            Err(_) => {}
        }

        settings
    }

    /// Settings used by the CLI. A `data_dir` from the command line wins over everything else.
    pub fn load(cli_data_dir: Option<&Path>) -> Settings {
        let mut settings = match read_hierarchical_config() {
            Ok(config) => Settings::from_config(&config),
            Err(e) => {
                // Log the error but don't fail - fall back to defaults
                log::debug!("Could not read hierarchical config: {}", e);
                Settings::default()
            }
        };

        settings.sources = config_sources();

        if let Some(dir) = cli_data_dir {
            settings.data_dir = dir.to_path_buf();
        }

        log::debug!("Effective settings: {settings:?}");
        settings
    }

    pub fn registry(&self) -> DatasetRegistry {
        self.city_files
            .iter()
            .fold(DatasetRegistry::new(&self.data_dir), |registry, (city, file)| {
                registry.with_file(*city, file)
            })
    }
}
