use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

use crate::exit::{CliError, CliResult, USAGE};

/// Library crates whose events follow `--log-level`.
const SURFACE_CRATES: [&str; 4] = [
    "gma3osc",
    "gma3osc_transport",
    "gma3osc_frame",
    "gma3osc_surface",
];

/// Level for everything outside the gma3osc crates.
const FOREIGN_LEVEL: &str = "warn";

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Filter directives for `level` plus per-crate overrides.
///
/// `overrides` uses `EnvFilter` syntax, e.g. `gma3osc_frame=trace` to see every
/// dispatched frame while the surface stays at `info`. An override replaces the
/// default directive for the same target.
pub fn filter_directives(level: LogLevel, overrides: Option<&str>) -> String {
    let extra: Vec<&str> = overrides
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|directive| !directive.is_empty())
        .collect();
    let overridden = |target: &str| {
        extra
            .iter()
            .any(|directive| directive.split('=').next() == Some(target))
    };

    let mut directives = Vec::with_capacity(SURFACE_CRATES.len() + extra.len() + 1);
    directives.push(FOREIGN_LEVEL.to_string());
    for target in SURFACE_CRATES {
        if !overridden(target) {
            directives.push(format!("{target}={}", level.as_str()));
        }
    }
    directives.extend(extra.iter().map(|directive| directive.to_string()));
    directives.join(",")
}

/// Install the stderr subscriber. Stdout stays reserved for command output.
///
/// Fails with a usage error when `overrides` is not a valid filter.
pub fn init_logging(format: LogFormat, level: LogLevel, overrides: Option<&str>) -> CliResult<()> {
    let directives = filter_directives(level, overrides);
    let filter = EnvFilter::try_new(&directives)
        .map_err(|err| CliError::new(USAGE, format!("invalid log filter {directives:?}: {err}")))?;

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true);

    // A subscriber may already be installed (tests); keep that one.
    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
    Ok(())
}
