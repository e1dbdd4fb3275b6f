//! Shared library for the `bkup` backup tool
//!
//! The binary crate wires these pieces together:
//!
//! - [`config`] - on-disk configuration and the source/backup path mapping
//! - [`filter`] - substring-based ignore list
//! - [`walk`] - source-tree enumeration
//! - [`modtime`] - minute-quantized modification stamps
//! - [`sync`] - the decision engine and the backup pass itself
//! - [`runlog`] - append-only record of completed runs

pub mod config;
pub mod copy;
pub mod filter;
pub mod modtime;
pub mod runlog;
pub mod sync;
#[cfg(test)]
pub mod testutils;
pub mod walk;

pub use config::{Config, ConfigError};
pub use sync::{run_backup, Summary};

/// Output and logging configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Suppress error output
    pub quiet: bool,
    /// Verbosity level: 0=ERROR, 1=INFO, 2=DEBUG, 3=TRACE
    pub verbose: u8,
    /// Print summary statistics at the end
    pub print_summary: bool,
}

fn init_tracing(output: &OutputConfig) {
    let default_level = match output.verbose {
        0 => "error",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Set up tracing, build the runtime and drive `func` to completion.
///
/// Backup passes are deliberately sequential (one file at a time, in walk
/// order), so the runtime is single-threaded. Returns `None` after logging
/// when the operation failed; callers turn that into a non-zero exit.
pub fn run<Fut>(output: OutputConfig, func: impl FnOnce() -> Fut) -> Option<Summary>
where
    Fut: std::future::Future<Output = anyhow::Result<Summary>>,
{
    init_tracing(&output);
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            if !output.quiet {
                eprintln!("failed to build the runtime: {}", error);
            }
            return None;
        }
    };
    match runtime.block_on(func()) {
        Ok(summary) => {
            if output.print_summary {
                println!("{}", &summary);
            }
            Some(summary)
        }
        Err(error) => {
            if !output.quiet {
                eprintln!("{:#}", error);
            }
            None
        }
    }
}
