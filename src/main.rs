//! confstack: print layered configuration
//!
//! Merges config files, environment variables and command-line overrides the
//! same way the library does for typed config objects, and prints the result.

use anyhow::Result;

mod cli;

fn main() -> Result<()> {
    cli::run()
}
