//! `dotlink` binary: parse arguments, set up logging, run the subcommand.
use std::io::IsTerminal as _;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

use dotlink::cli::{Cli, Command};
use dotlink::commands;
use dotlink::logging::{Logger, console_filter, init_subscriber};

/// Console level selected by `-v`, `-q`, and `-Q`.
///
/// Warnings always reach the console.
const fn console_level(cli: &Cli) -> LevelFilter {
    if cli.super_quiet || cli.quiet {
        LevelFilter::WARN
    } else if cli.verbose > 0 {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    match &args.command {
        Command::Apply(opts) => {
            let color = if opts.no_color {
                false
            } else {
                opts.force_color || std::io::stdout().is_terminal()
            };
            init_subscriber(console_filter(console_level(&args), args.quiet), color, "apply");
            let log = Arc::new(Logger::new("apply"));

            ctrlc::set_handler(|| {
                tracing::error!("Operation aborted");
                std::process::exit(1);
            })?;

            commands::apply::run(opts, args.verbose, &log)
        }
        Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
