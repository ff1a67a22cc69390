//! Centralized default values for bikeshare configuration.
//!
//! These are the fallback values used when neither the CLI, the environment
//! nor a configuration file provides a setting.

// ============================================================================
// Data Source Defaults
// ============================================================================

/// Directory searched for the per-city trip files.
///
/// Relative to the working directory of the process.
pub const DEFAULT_DATA_DIRECTORY: &str = ".";

// ============================================================================
// Display Defaults
// ============================================================================

/// Number of raw trips shown per page of the row preview.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

// ============================================================================
// Configuration Locations
// ============================================================================

/// Project configuration file, searched upward from the working directory.
pub const PROJECT_CONFIG_FILE_NAME: &str = ".bikeshareconfig";

/// Directory below the user's config home holding `config.toml`.
pub const USER_CONFIG_DIR_NAME: &str = "bikeshare";

/// Prefix of environment variables overriding configuration keys.
pub const ENV_PREFIX: &str = "BIKESHARE";

/// Returns the default number of rows per preview page.
#[inline]
pub const fn default_preview_rows() -> usize {
    DEFAULT_PREVIEW_ROWS
}
