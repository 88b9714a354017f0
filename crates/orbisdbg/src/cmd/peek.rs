use crate::cmd::{parse_address, PeekArgs};
use crate::exit::{io_error, session_error, CliResult, SUCCESS};
use crate::output::{print_hexdump, print_raw, OutputFormat};

pub fn run(args: PeekArgs, format: OutputFormat) -> CliResult<i32> {
    let addr = parse_address(&args.addr)?;
    let mut session = args.console.open()?;

    let data = session
        .read_memory(args.pid, addr, args.len)
        .map_err(|err| session_error("memory read failed", err))?;

    if let Some(path) = &args.out {
        std::fs::write(path, &data)
            .map_err(|err| io_error(&format!("failed writing {}", path.display()), err))?;
        return Ok(SUCCESS);
    }

    match format {
        OutputFormat::Raw => print_raw(&data),
        _ => print_hexdump(addr, &data),
    }

    Ok(SUCCESS)
}
