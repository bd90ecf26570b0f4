use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use sas2mongo::cli::Cli;
use sas2mongo::logging::init_logging;
use sas2mongo::run::run;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_logging(args.debug)?;

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => Cli::command().error(ErrorKind::ValueValidation, e).exit(),
    };

    // Dry runs own stdout for the document stream.
    let dry_run = config.dry_run;
    let summary = run(config).await?;
    if dry_run {
        eprintln!("✅ Processed records: {}", summary.processed);
    } else {
        println!("✅ Processed records: {}", summary.processed);
    }
    Ok(())
}
