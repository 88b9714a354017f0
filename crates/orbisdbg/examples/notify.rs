//! Send an on-screen notification to a console.
//!
//! Usage: cargo run --example notify -- <console-ip> [message]

use orbisdbg::session::DebugSession;
use orbisdbg::transport::DEFAULT_PORT;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let host = args.next().ok_or("usage: notify <console-ip> [message]")?;
    let message = args
        .next()
        .unwrap_or_else(|| "Hello from orbisdbg".to_string());

    let mut session = DebugSession::connect(&host, DEFAULT_PORT)?;
    session.notify(222, &message)?;
    println!("notified {host}: {message}");

    Ok(())
}
