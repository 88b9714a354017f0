//! TCP transport for the console debug payload protocol.
//!
//! Provides the byte-stream connection everything else builds on: connect
//! to the payload server on the console, read/write with optional
//! timeouts, close. This is the lowest layer of orbisdbg. The protocol
//! itself lives one layer up and only sees [`DebugStream`] as a
//! `Read + Write` pair.

pub mod error;
pub mod stream;
pub mod tcp;

pub use error::{Result, TransportError};
pub use stream::DebugStream;
pub use tcp::{connect, connect_timeout, DEFAULT_PORT};
