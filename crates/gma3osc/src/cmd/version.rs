use gma3osc_frame::{Protocol, MAX_ADDRESS_LEN, MAX_STRING_LEN, OSC_MESSAGE_SIZE};
use gma3osc_surface::MAX_LABEL_LEN;
use serde::Serialize;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Debug, Serialize)]
struct TransportInfo {
    name: &'static str,
    default_port: u16,
}

#[derive(Debug, Serialize)]
struct Limits {
    address: usize,
    string: usize,
    message: usize,
    label: usize,
}

/// What this build can talk to.
#[derive(Debug, Serialize)]
struct VersionReport {
    name: &'static str,
    version: &'static str,
    target: &'static str,
    transports: Vec<TransportInfo>,
    async_slip_codec: bool,
    limits: Limits,
}

impl VersionReport {
    fn collect() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            target: option_env!("GMA3OSC_BUILD_TARGET").unwrap_or("unknown"),
            transports: Protocol::ALL
                .into_iter()
                .map(|protocol| TransportInfo {
                    name: protocol.as_str(),
                    default_port: protocol.default_port(),
                })
                .collect(),
            async_slip_codec: cfg!(feature = "async"),
            limits: Limits {
                address: MAX_ADDRESS_LEN,
                string: MAX_STRING_LEN,
                message: OSC_MESSAGE_SIZE,
                label: MAX_LABEL_LEN,
            },
        }
    }

    fn lines(&self) -> Vec<String> {
        let transports: Vec<String> = self
            .transports
            .iter()
            .map(|t| format!("{}:{}", t.name, t.default_port))
            .collect();
        vec![
            format!("name: {}", self.name),
            format!("version: {}", self.version),
            format!("target: {}", self.target),
            format!("transports: {}", transports.join(", ")),
            format!("async_slip_codec: {}", self.async_slip_codec),
            format!(
                "limits: address={}, string={}, message={}, label={}",
                self.limits.address, self.limits.string, self.limits.message, self.limits.label
            ),
        ]
    }
}

pub fn run(args: VersionArgs, format: OutputFormat) -> CliResult<i32> {
    if !args.extended {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    let report = VersionReport::collect();
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(&report).unwrap_or_else(|_| "{}".to_string())
        ),
        _ => {
            for line in report.lines() {
                println!("{line}");
            }
        }
    }
    Ok(SUCCESS)
}
