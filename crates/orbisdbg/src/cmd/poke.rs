use crate::cmd::{parse_address, parse_hex_bytes, PokeArgs};
use crate::exit::{io_error, session_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::OutputFormat;

pub fn run(args: PokeArgs, format: OutputFormat) -> CliResult<i32> {
    let addr = parse_address(&args.addr)?;
    let data = resolve_payload(&args)?;
    let mut session = args.console.open()?;

    let status = session
        .write_memory(args.pid, addr, &data)
        .map_err(|err| session_error("memory write failed", err))?;

    if let OutputFormat::Json = format {
        println!(
            r#"{{"schema_id":"https://schemas.orbisdbg.dev/cli/v1/poke.schema.json","written":{},"status":{}}}"#,
            data.len(),
            status.as_u32()
        );
    } else {
        println!("wrote {} bytes at {addr:#x}", data.len());
    }

    Ok(SUCCESS)
}

fn resolve_payload(args: &PokeArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return parse_hex_bytes(data);
    }
    if let Some(path) = &args.file {
        return std::fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Err(CliError::new(USAGE, "either --data or --file is required"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::ConsoleArgs;

    fn args_with(data: Option<String>, file: Option<std::path::PathBuf>) -> PokeArgs {
        PokeArgs {
            console: ConsoleArgs {
                console: "127.0.0.1".to_string(),
                timeout: "5s".to_string(),
            },
            pid: 1,
            addr: "0x1000".to_string(),
            data,
            file,
        }
    }

    #[test]
    fn payload_from_hex_data() {
        let args = args_with(Some("cafe".to_string()), None);
        assert_eq!(resolve_payload(&args).unwrap(), vec![0xCA, 0xFE]);
    }

    #[test]
    fn payload_requires_a_source() {
        let args = args_with(None, None);
        let err = resolve_payload(&args).unwrap_err();
        assert_eq!(err.code, USAGE);
    }
}
