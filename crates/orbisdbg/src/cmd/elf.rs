use tracing::info;

use crate::cmd::ElfArgs;
use crate::exit::{io_error, session_error, CliResult, SUCCESS};
use crate::output::{print_load_address, OutputFormat};

pub fn run(args: ElfArgs, format: OutputFormat) -> CliResult<i32> {
    let image = std::fs::read(&args.path)
        .map_err(|err| io_error(&format!("failed reading {}", args.path.display()), err))?;
    info!(path = %args.path.display(), len = image.len(), "uploading elf image");

    let mut session = args.console.open()?;
    let addr = session
        .load_elf(args.pid, &image)
        .map_err(|err| session_error("elf load failed", err))?;

    print_load_address(args.pid, addr, format);

    Ok(SUCCESS)
}
