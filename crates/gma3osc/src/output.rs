use std::io::{IsTerminal, Write};
use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use gma3osc_frame::ParsedMessage;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    address: &'a str,
    relative_address: &'a str,
    tag: &'a str,
    string: &'a str,
    int1: i32,
    int2: i32,
    float: f32,
    hierarchy: &'a [i32],
    from: Option<String>,
    size: usize,
    timestamp: String,
}

/// Print one accepted inbound message.
pub fn print_message(
    message: &ParsedMessage,
    packet: &[u8],
    from: Option<SocketAddr>,
    format: OutputFormat,
) {
    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                address: &message.address,
                relative_address: message.relative_address(),
                tag: &message.tag,
                string: &message.string_arg,
                int1: message.int_arg_1,
                int2: message.int_arg_2,
                float: message.float_arg,
                hierarchy: &message.hierarchy,
                from: from.map(|addr| addr.to_string()),
                size: packet.len(),
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ADDRESS", "TAG", "STRING", "INT1", "INT2", "FLOAT"])
                .add_row(vec![
                    message.address.clone(),
                    message.tag.clone(),
                    message.string_arg.clone(),
                    message.int_arg_1.to_string(),
                    message.int_arg_2.to_string(),
                    message.float_arg.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{} {} string={:?} int1={} int2={} float={} hierarchy={:?}",
                message.address,
                message.tag,
                message.string_arg,
                message.int_arg_1,
                message.int_arg_2,
                message.float_arg,
                message.hierarchy
            );
        }
        OutputFormat::Raw => print_raw(packet),
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    address: &'a str,
    size: usize,
    slip: bool,
    hex: String,
}

/// Print an encoded outbound frame.
pub fn print_frame(address: &str, wire: &[u8], slip: bool, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                address,
                size: wire.len(),
                slip,
                hex: hex(wire),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["OFFSET", "HEX", "ASCII"]);
            for (index, word) in wire.chunks(4).enumerate() {
                table.add_row(vec![
                    format!("{:04}", index * 4),
                    hex_spaced(word),
                    ascii(word),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", hex_spaced(wire)),
        OutputFormat::Raw => print_raw(wire),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn hex(data: &[u8]) -> String {
    data.iter().map(|byte| format!("{byte:02x}")).collect()
}

fn hex_spaced(data: &[u8]) -> String {
    data.iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn ascii(data: &[u8]) -> String {
    data.iter()
        .map(|&byte| {
            if byte.is_ascii_graphic() || byte == b' ' {
                byte as char
            } else {
                '.'
            }
        })
        .collect()
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
