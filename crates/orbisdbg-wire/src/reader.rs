use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};
use orbisdbg_transport::DebugStream;

use crate::codec::WireConfig;
use crate::error::{Result, WireError};

/// Size of the status acknowledgement that follows every command phase.
pub const STATUS_SIZE: usize = 4;

/// The 4-byte acknowledgement read after a command phase.
///
/// The protocol defines no success/failure encoding — receipt of all four
/// bytes is the only completion signal the server gives. The raw value is
/// kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusAck(pub u32);

impl StatusAck {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Reads exact-count response data from any `Read` stream.
///
/// The protocol has no delimiters; every read is for a known byte count
/// and anything short is an error, never a retry. Callers get complete
/// payloads or a failure.
pub struct ResponseReader<T> {
    inner: T,
    config: WireConfig,
}

impl<T: Read> ResponseReader<T> {
    /// Create a response reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, WireConfig::default())
    }

    /// Create a response reader with explicit configuration.
    pub fn with_config(inner: T, config: WireConfig) -> Self {
        Self { inner, config }
    }

    /// Read the 4-byte status acknowledgement (blocking).
    ///
    /// Must fully drain the acknowledgement before any response payload is
    /// consumed; a short read here leaves the stream desynchronized and is
    /// surfaced as [`WireError::StatusTruncated`].
    pub fn read_status(&mut self) -> Result<StatusAck> {
        let mut buf = [0u8; STATUS_SIZE];
        let mut filled = 0usize;
        while filled < STATUS_SIZE {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => return Err(WireError::StatusTruncated { got: filled }),
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(WireError::Io(err)),
            }
        }
        Ok(StatusAck(u32::from_le_bytes(buf)))
    }

    /// Read exactly `len` response bytes (blocking).
    ///
    /// EOF before the first byte is [`WireError::ConnectionClosed`]; EOF
    /// mid-payload is [`WireError::Truncated`] — the peer promised more
    /// than it sent.
    pub fn read_exact(&mut self, len: usize) -> Result<Bytes> {
        if len > self.config.max_payload_size {
            return Err(WireError::PayloadTooLarge {
                size: len,
                max: self.config.max_payload_size,
            });
        }

        let mut buf = BytesMut::zeroed(len);
        let mut filled = 0usize;
        while filled < len {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(if filled == 0 {
                        WireError::ConnectionClosed
                    } else {
                        WireError::Truncated {
                            expected: len,
                            got: filled,
                        }
                    });
                }
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(WireError::Io(err)),
            }
        }
        Ok(buf.freeze())
    }

    /// Read a 4-byte little-endian unsigned integer (list counts).
    pub fn read_u32_le(&mut self) -> Result<u32> {
        let data = self.read_exact(4)?;
        Ok(u32::from_le_bytes(data[..].try_into().unwrap()))
    }

    /// Read an 8-byte little-endian unsigned integer (load addresses).
    pub fn read_u64_le(&mut self) -> Result<u64> {
        let data = self.read_exact(8)?;
        Ok(u64::from_le_bytes(data[..].try_into().unwrap()))
    }

    /// Validate a list entry count declared by the peer.
    pub fn check_entry_count(&self, count: u32) -> Result<()> {
        if count as usize > self.config.max_list_entries {
            return Err(WireError::TooManyEntries {
                count,
                max: self.config.max_list_entries,
            });
        }
        Ok(())
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current reader configuration.
    pub fn config(&self) -> &WireConfig {
        &self.config
    }
}

impl ResponseReader<DebugStream> {
    /// Create a response reader for a [`DebugStream`] and apply the read
    /// timeout from config.
    pub fn with_config_stream(inner: DebugStream, config: WireConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_wire_error)?;
        Ok(Self::with_config(inner, config))
    }
}

pub(crate) fn transport_to_wire_error(err: orbisdbg_transport::TransportError) -> WireError {
    match err {
        orbisdbg_transport::TransportError::Io(io) => WireError::Io(io),
        orbisdbg_transport::TransportError::Connect { source, .. } => WireError::Io(source),
        other => WireError::Io(std::io::Error::other(other.to_string())),
    }
}
