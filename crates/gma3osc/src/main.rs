mod cmd;
mod exit;
mod logging;
mod output;

use std::path::PathBuf;

use clap::Parser;
use gma3osc_surface::SurfaceConfig;

use crate::cmd::Command;
use crate::exit::{surface_error, CliResult};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "gma3osc", version, about = "grandMA3 OSC control surface tool")]
struct Cli {
    /// Surface configuration file (JSON).
    #[arg(long, value_name = "FILE", global = true, env = "GMA3OSC_CONFIG")]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level for the gma3osc crates (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// Extra filter directives, e.g. `gma3osc_frame=trace`.
    #[arg(long, value_name = "DIRECTIVES", global = true, env = "GMA3OSC_LOG")]
    log_filter: Option<String>,

    #[command(subcommand)]
    command: Command,
}

fn load_config(path: Option<&PathBuf>) -> CliResult<SurfaceConfig> {
    match path {
        Some(path) => SurfaceConfig::from_path(path)
            .map_err(|err| surface_error(&format!("failed loading {}", path.display()), err)),
        None => Ok(SurfaceConfig::default()),
    }
}

fn main() {
    let cli = Cli::parse();

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = init_logging(cli.log_format, cli.log_level, cli.log_filter.as_deref())
        .and_then(|()| load_config(cli.config.as_ref()))
        .and_then(|config| cmd::run(cli.command, &config, format));

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
