/// Errors that can occur while encoding commands or decoding responses.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// A command header contains an invalid magic number.
    #[error("invalid packet magic (expected 0xFFAABBCC)")]
    InvalidMagic,

    /// A command header carries an opcode outside the known command set.
    #[error("unknown opcode 0x{0:08X}")]
    UnknownOpcode(u32),

    /// A payload exceeds what the header's 32-bit size field (or the
    /// configured cap) can carry. Detected before any bytes are written.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A list response declared more entries than the configured maximum.
    #[error("response declares {count} entries, max {max}")]
    TooManyEntries { count: u32, max: usize },

    /// The 4-byte status acknowledgement did not arrive in full.
    #[error("status acknowledgement truncated ({got} of 4 bytes)")]
    StatusTruncated { got: usize },

    /// A response payload ended before its promised length.
    ///
    /// Distinct from [`WireError::ConnectionClosed`] so callers can tell
    /// "peer sent less than promised" from "connection dropped".
    #[error("response truncated ({got} of {expected} bytes)")]
    Truncated { expected: usize, got: usize },

    /// The connection closed at a phase boundary, before any payload byte.
    #[error("connection closed")]
    ConnectionClosed,

    /// An I/O error occurred while reading or writing.
    #[error("wire I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WireError>;
