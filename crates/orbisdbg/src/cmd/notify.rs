use tracing::info;

use crate::cmd::NotifyArgs;
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::OutputFormat;

pub fn run(args: NotifyArgs, format: OutputFormat) -> CliResult<i32> {
    let mut session = args.console.open()?;

    let status = session
        .notify(args.kind, &args.message)
        .map_err(|err| session_error("notify failed", err))?;
    info!(status = status.as_u32(), "notification acknowledged");

    if let OutputFormat::Json = format {
        println!(
            r#"{{"schema_id":"https://schemas.orbisdbg.dev/cli/v1/notify.schema.json","status":{}}}"#,
            status.as_u32()
        );
    } else {
        println!("notified: {}", args.message);
    }

    Ok(SUCCESS)
}
