use crate::cmd::ConsoleArgs;
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::{print_process_list, OutputFormat};

pub fn run(args: ConsoleArgs, format: OutputFormat) -> CliResult<i32> {
    let mut session = args.open()?;

    let entries = session
        .process_list()
        .map_err(|err| session_error("process list failed", err))?;
    print_process_list(&entries, format);

    Ok(SUCCESS)
}
