use crate::cmd::ConsoleArgs;
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::OutputFormat;

pub fn run(args: ConsoleArgs, format: OutputFormat) -> CliResult<i32> {
    let mut session = args.open()?;

    // Fire-and-forget: the console drops the link before acknowledging.
    session
        .reboot()
        .map_err(|err| session_error("reboot failed", err))?;

    if let OutputFormat::Json = format {
        println!(
            r#"{{"schema_id":"https://schemas.orbisdbg.dev/cli/v1/reboot.schema.json","sent":true}}"#
        );
    } else {
        println!("reboot issued");
    }

    Ok(SUCCESS)
}
