mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "orbisdbg", version, about = "Console debug payload client")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_notify_subcommand() {
        let cli = Cli::try_parse_from([
            "orbisdbg",
            "notify",
            "192.168.1.20",
            "--message",
            "hello from the couch",
        ])
        .expect("notify args should parse");

        assert!(matches!(cli.command, Command::Notify(_)));
    }

    #[test]
    fn parses_ps_subcommand() {
        let cli = Cli::try_parse_from(["orbisdbg", "ps", "192.168.1.20:744"])
            .expect("ps args should parse");
        assert!(matches!(cli.command, Command::Ps(_)));
    }

    #[test]
    fn parses_peek_with_hex_address() {
        let cli = Cli::try_parse_from([
            "orbisdbg",
            "peek",
            "192.168.1.20",
            "--pid",
            "41",
            "--addr",
            "0x401000",
            "--len",
            "64",
        ])
        .expect("peek args should parse");
        assert!(matches!(cli.command, Command::Peek(_)));
    }

    #[test]
    fn rejects_conflicting_poke_payload_args() {
        let err = Cli::try_parse_from([
            "orbisdbg",
            "poke",
            "192.168.1.20",
            "--pid",
            "41",
            "--addr",
            "0x401000",
            "--data",
            "deadbeef",
            "--file",
            "/tmp/patch.bin",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_global_format_flag() {
        let cli = Cli::try_parse_from(["orbisdbg", "--format", "json", "reboot", "192.168.1.20"])
            .expect("global format should parse");
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
        assert!(matches!(cli.command, Command::Reboot(_)));
    }
}
