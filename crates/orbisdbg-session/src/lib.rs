//! Debug session engine for the console payload protocol.
//!
//! This is the "just works" layer. Open a [`DebugSession`] against a
//! console, then call one method per remote operation: notifications,
//! process lists, memory maps, memory read/write, ELF loading, reboot.
//!
//! One session owns one connection, and every operation takes `&mut self`:
//! the protocol has no request ids, so a second command issued before the
//! first completes would corrupt framing for both. After any error the
//! stream must be assumed desynchronized — drop the session and connect
//! again.

pub mod command;
pub mod error;
pub mod session;

pub use command::Command;
pub use error::{Result, SessionError};
pub use session::DebugSession;
