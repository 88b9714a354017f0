//! Remote-debugging client for the console debug payload server.
//!
//! orbisdbg speaks the payload server's binary command protocol over TCP:
//! on-screen notifications, process lists, memory maps, memory
//! read/write, ELF loading, reboot.
//!
//! # Crate Structure
//!
//! - [`transport`] — TCP byte-stream transport ([`transport::DebugStream`])
//! - [`wire`] — command/response wire codec and typed records
//! - [`session`] — one-connection debug session with one method per
//!   remote operation

/// Re-export transport types.
pub mod transport {
    pub use orbisdbg_transport::*;
}

/// Re-export wire-protocol types.
pub mod wire {
    pub use orbisdbg_wire::*;
}

/// Re-export session types.
pub mod session {
    pub use orbisdbg_session::*;
}
