//! Get command implementation

use anyhow::Result;
use clap::Args;
use serde_json::Value;

use super::utils::{render, OutputFormat, SourceArgs};

#[derive(Args)]
pub struct GetArgs {
    /// Dotted key to print, e.g. `server.port`
    #[arg(value_name = "KEY")]
    pub key: String,

    /// Output format for tables and lists (scalars print as plain text)
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub sources: SourceArgs,
}

pub fn run(args: GetArgs) -> Result<()> {
    let values = args.sources.load()?;
    let Some(value) = values.get(&args.key) else {
        anyhow::bail!("Key not found: {}", args.key);
    };

    match value {
        Value::String(s) => println!("{}", s),
        Value::Object(_) | Value::Array(_) => println!("{}", render(value, args.format)?),
        other => println!("{}", other),
    }
    Ok(())
}
