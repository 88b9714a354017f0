use crate::cmd::InfoArgs;
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::{print_process_info, OutputFormat};

pub fn run(args: InfoArgs, format: OutputFormat) -> CliResult<i32> {
    let mut session = args.console.open()?;

    let info = session
        .process_info(args.pid)
        .map_err(|err| session_error("process info failed", err))?;
    print_process_info(&info, format);

    Ok(SUCCESS)
}
