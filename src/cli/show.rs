//! Show command implementation

use anyhow::Result;
use clap::Args;

use super::utils::{render, OutputFormat, SourceArgs};

#[derive(Args)]
pub struct ShowArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub sources: SourceArgs,
}

pub fn run(args: ShowArgs) -> Result<()> {
    let values = args.sources.load()?;
    tracing::debug!(keys = values.as_mapping().len(), "Merged configuration");
    println!("{}", render(&values.to_value(), args.format)?);
    Ok(())
}
