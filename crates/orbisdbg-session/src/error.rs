/// Errors that can occur in session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] orbisdbg_transport::TransportError),

    /// Wire-protocol error.
    #[error("wire error: {0}")]
    Wire(#[from] orbisdbg_wire::WireError),

    /// A notification message contains an interior NUL byte.
    ///
    /// The wire format is NUL-terminated, so the console would silently
    /// truncate the message; rejected before anything is written.
    #[error("notification message contains an interior NUL byte")]
    InteriorNul,
}

pub type Result<T> = std::result::Result<T, SessionError>;
