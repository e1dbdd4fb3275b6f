use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::instrument;

mod setup;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "bkup",
    version,
    about = "Back up a directory tree, keeping prior versions of changed files",
    long_about = "`bkup` mirrors a source directory into `<backup>/Current/` and moves
superseded copies into `<backup>/Archive/`, tagged with their minute-resolution
modification stamp (YYMMDDHHMM).

A file is copied when it has no backup counterpart yet, or when its
modification time is strictly newer than the backup's once both are rounded
down to the minute. Everything else is left alone, so re-running right after
a successful pass copies nothing.

On first use (no config file) an interactive setup asks for the source and
backup directories and builds the ignore list.

Note: ignore entries match by SUBSTRING against the full directory path. An
entry `/home/me/src/logs` also ignores `/home/me/src/logs_archive`; end the
entry with a separator or pick more specific text to avoid that."
)]
struct Args {
    // Configuration
    /// Path to the configuration file
    #[arg(
        long,
        value_name = "PATH",
        default_value = common::config::DEFAULT_CONFIG_PATH,
        help_heading = "Configuration"
    )]
    config: std::path::PathBuf,

    /// Path to the run log appended to after each pass
    #[arg(
        long,
        value_name = "PATH",
        default_value = common::runlog::DEFAULT_LOG_PATH,
        help_heading = "Configuration"
    )]
    log: std::path::PathBuf,

    /// Skip the pre-run confirmation
    #[arg(short = 'y', long = "yes", help_heading = "Configuration")]
    yes: bool,

    // Progress & output
    /// Verbose level: -v INFO / -vv DEBUG / -vvv TRACE (default: ERROR)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, help_heading = "Progress & output")]
    verbose: u8,

    /// Print summary at the end
    #[arg(long, help_heading = "Progress & output")]
    summary: bool,

    /// Quiet mode, don't report errors
    #[arg(short = 'q', long = "quiet", help_heading = "Progress & output")]
    quiet: bool,
}

#[instrument]
async fn async_main(args: Args) -> Result<common::Summary> {
    println!("Welcome to bkup!");
    let config = match common::config::read_config(&args.config).await {
        Ok(config) => config,
        Err(common::ConfigError::NotConfigured(_)) => setup::run_wizard(&args.config).await?,
        Err(error) => return Err(error.into()),
    };
    config.ensure_layout().await?;
    if !args.yes && !setup::confirm_run(&config).await? {
        println!("Backup cancelled.");
        return Ok(common::Summary::default());
    }
    match common::run_backup(&config).await {
        Ok(summary) => {
            common::runlog::append_entry(&args.log, summary.total_copied()).await?;
            println!("Backup complete. {} files copied.", summary.total_copied());
            Ok(summary)
        }
        Err(error) => {
            tracing::error!("{:#}", &error);
            if args.summary {
                return Err(anyhow!("bkup encountered errors\n\n{}", &error.summary));
            }
            Err(anyhow!("bkup encountered errors"))
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let output = common::OutputConfig {
        quiet: args.quiet,
        verbose: args.verbose,
        print_summary: args.summary,
    };
    let func = {
        let args = args.clone();
        || async_main(args)
    };
    if common::run(output, func).is_none() {
        std::process::exit(1);
    }
    Ok(())
}
