use crate::cmd::MapsArgs;
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::{print_memory_maps, OutputFormat};

pub fn run(args: MapsArgs, format: OutputFormat) -> CliResult<i32> {
    let mut session = args.console.open()?;

    let entries = session
        .process_maps(args.pid)
        .map_err(|err| session_error("process maps failed", err))?;
    print_memory_maps(args.pid, &entries, format);

    Ok(SUCCESS)
}
