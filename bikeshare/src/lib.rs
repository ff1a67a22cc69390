pub mod cli;
pub mod config;
pub mod data;
pub mod defaults;
pub mod error;
pub mod loader;
pub mod registry;
pub mod reporting;
pub mod reports;
pub mod selection;
pub mod session;
pub mod stats;

#[cfg(test)]
mod test_utils;
