use anyhow::Result;
use bikeshare::cli;

// Main entry point
fn main() -> Result<()> {
    cli::handle_calls()
}
