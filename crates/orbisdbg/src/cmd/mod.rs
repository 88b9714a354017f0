use std::time::Duration;

use clap::{Args, Subcommand};
use orbisdbg_session::DebugSession;
use orbisdbg_transport::{DebugStream, DEFAULT_PORT};

use crate::exit::{session_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod elf;
pub mod info;
pub mod maps;
pub mod notify;
pub mod peek;
pub mod poke;
pub mod ps;
pub mod reboot;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show an on-screen notification.
    Notify(NotifyArgs),
    /// Reboot the console.
    Reboot(ConsoleArgs),
    /// List running processes.
    Ps(ConsoleArgs),
    /// Show the memory mappings of a process.
    Maps(MapsArgs),
    /// Show process information.
    Info(InfoArgs),
    /// Read process memory.
    Peek(PeekArgs),
    /// Write process memory.
    Poke(PokeArgs),
    /// Load an ELF image into a process.
    Elf(ElfArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Notify(args) => notify::run(args, format),
        Command::Reboot(args) => reboot::run(args, format),
        Command::Ps(args) => ps::run(args, format),
        Command::Maps(args) => maps::run(args, format),
        Command::Info(args) => info::run(args, format),
        Command::Peek(args) => peek::run(args, format),
        Command::Poke(args) => poke::run(args, format),
        Command::Elf(args) => elf::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ConsoleArgs {
    /// Console address (IP, or IP:PORT to override the default port 744).
    pub console: String,
    /// Connection timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

impl ConsoleArgs {
    /// Open a debug session against the addressed console.
    pub fn open(&self) -> CliResult<DebugSession<DebugStream, DebugStream>> {
        let (host, port) = parse_console(&self.console)?;
        let timeout = parse_duration(&self.timeout)?;
        DebugSession::connect_timeout(host, port, timeout)
            .map_err(|err| session_error("connect failed", err))
    }
}

#[derive(Args, Debug)]
pub struct NotifyArgs {
    #[command(flatten)]
    pub console: ConsoleArgs,
    /// Notification text.
    #[arg(long, short = 'm')]
    pub message: String,
    /// Notification kind (selects the on-screen icon).
    #[arg(long, default_value = "222")]
    pub kind: u32,
}

#[derive(Args, Debug)]
pub struct MapsArgs {
    #[command(flatten)]
    pub console: ConsoleArgs,
    /// Target process id.
    #[arg(long, short = 'p')]
    pub pid: i32,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub console: ConsoleArgs,
    /// Target process id.
    #[arg(long, short = 'p')]
    pub pid: i32,
}

#[derive(Args, Debug)]
pub struct PeekArgs {
    #[command(flatten)]
    pub console: ConsoleArgs,
    /// Target process id.
    #[arg(long, short = 'p')]
    pub pid: i32,
    /// Address to read from (hex with 0x prefix, or decimal).
    #[arg(long)]
    pub addr: String,
    /// Number of bytes to read.
    #[arg(long)]
    pub len: u32,
    /// Write the bytes to a file instead of hexdumping.
    #[arg(long, value_name = "FILE")]
    pub out: Option<std::path::PathBuf>,
}

#[derive(Args, Debug)]
pub struct PokeArgs {
    #[command(flatten)]
    pub console: ConsoleArgs,
    /// Target process id.
    #[arg(long, short = 'p')]
    pub pid: i32,
    /// Address to write to (hex with 0x prefix, or decimal).
    #[arg(long)]
    pub addr: String,
    /// Bytes to write, as a hex string (e.g. "deadbeef").
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,
    /// Read the bytes to write from a file.
    #[arg(long, conflicts_with = "data")]
    pub file: Option<std::path::PathBuf>,
}

#[derive(Args, Debug)]
pub struct ElfArgs {
    #[command(flatten)]
    pub console: ConsoleArgs,
    /// ELF image to upload.
    pub path: std::path::PathBuf,
    /// Target process id.
    #[arg(long, short = 'p')]
    pub pid: i32,
}

#[derive(Args, Debug, Default)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Split `HOST[:PORT]` into its parts, defaulting to the payload port.
///
/// Anything with more than one colon (an IPv6 literal) is taken as a bare
/// host.
pub fn parse_console(input: &str) -> CliResult<(&str, u16)> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "console address must not be empty"));
    }

    if input.matches(':').count() == 1 {
        let (host, port) = input.split_once(':').unwrap();
        if host.is_empty() {
            return Err(CliError::new(
                USAGE,
                format!("invalid console address: {input}"),
            ));
        }
        let port: u16 = port
            .parse()
            .map_err(|_| CliError::new(USAGE, format!("invalid port in address: {input}")))?;
        return Ok((host, port));
    }

    Ok((input, DEFAULT_PORT))
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported duration unit: {unit}"),
        )),
    }
}

/// Parse an address argument: `0x`-prefixed hex or plain decimal.
pub fn parse_address(input: &str) -> CliResult<u64> {
    let input = input.trim();
    let parsed = match input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| CliError::new(USAGE, format!("invalid address: {input}")))
}

/// Parse a hex byte string; whitespace between bytes is allowed.
pub fn parse_hex_bytes(input: &str) -> CliResult<Vec<u8>> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() || cleaned.len() % 2 != 0 {
        return Err(CliError::new(
            USAGE,
            "hex data must be a non-empty even number of hex digits",
        ));
    }
    (0..cleaned.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&cleaned[i..i + 2], 16)
                .map_err(|_| CliError::new(USAGE, format!("invalid hex data: {input}")))
        })
        .collect()
}
