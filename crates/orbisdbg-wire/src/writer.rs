use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use orbisdbg_transport::DebugStream;
use tracing::trace;

use crate::codec::{encode_header, WireConfig};
use crate::error::{Result, WireError};
use crate::opcode::Opcode;
use crate::reader::transport_to_wire_error;

const INITIAL_BUFFER_CAPACITY: usize = 256;

/// Writes command packets to any `Write` stream.
///
/// Header and first-phase payload go out in a single buffered write;
/// second-phase bulk data (memory-write values, ELF images) is streamed
/// separately via [`CommandWriter::send_raw`].
pub struct CommandWriter<T> {
    inner: T,
    buf: BytesMut,
    config: WireConfig,
}

impl<T: Write> CommandWriter<T> {
    /// Create a command writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, WireConfig::default())
    }

    /// Create a command writer with explicit configuration.
    pub fn with_config(inner: T, config: WireConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Encode and send a command packet (blocking).
    ///
    /// `declared_len` is the size announced in the header; `payload` is
    /// what actually follows it. They differ for notify, whose header
    /// declares only the fixed argument block.
    pub fn send(&mut self, opcode: Opcode, declared_len: usize, payload: &[u8]) -> Result<()> {
        self.buf.clear();
        encode_header(opcode, declared_len, &mut self.buf)?;
        self.buf.extend_from_slice(payload);
        trace!(
            command = %opcode,
            declared_len,
            payload_len = payload.len(),
            "sending command packet"
        );
        self.write_buffered()?;
        self.flush()
    }

    /// Send a raw second-phase payload (blocking).
    ///
    /// No size cap applies here: by the time bulk data goes out, the
    /// header has already announced its length, and refusing mid-command
    /// would leave the stream desynchronized. Representability is
    /// validated before the header is sent.
    pub fn send_raw(&mut self, payload: &[u8]) -> Result<()> {
        self.buf.clear();
        self.buf.extend_from_slice(payload);
        self.write_buffered()?;
        self.flush()
    }

    fn write_buffered(&mut self) -> Result<()> {
        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(WireError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(WireError::Io(err)),
            }
        }
        Ok(())
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(WireError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current writer configuration.
    pub fn config(&self) -> &WireConfig {
        &self.config
    }
}

impl CommandWriter<DebugStream> {
    /// Create a command writer for a [`DebugStream`] and apply the write
    /// timeout from config.
    pub fn with_config_stream(inner: DebugStream, config: WireConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(transport_to_wire_error)?;
        Ok(Self::with_config(inner, config))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::codec::HEADER_SIZE;

    #[test]
    fn send_writes_header_then_payload() {
        let mut writer = CommandWriter::new(Cursor::new(Vec::<u8>::new()));
        writer
            .send(Opcode::ProcessMaps, 4, &10u32.to_le_bytes())
            .unwrap();

        let wire = writer.into_inner().into_inner();
        assert_eq!(wire.len(), HEADER_SIZE + 4);
        assert_eq!(&wire[0..4], &[0xCC, 0xBB, 0xAA, 0xFF]);
        assert_eq!(&wire[4..8], &[0x04, 0x00, 0xAA, 0xBD]);
        assert_eq!(&wire[8..12], &4u32.to_le_bytes());
        assert_eq!(&wire[12..16], &10u32.to_le_bytes());
    }

    #[test]
    fn declared_len_is_independent_of_payload() {
        let mut writer = CommandWriter::new(Cursor::new(Vec::<u8>::new()));
        // notify declares 8 but ships 8 + message + NUL
        writer
            .send(Opcode::Notify, 8, b"\xDE\x00\x00\x00\x03\x00\x00\x00hi\x00")
            .unwrap();

        let wire = writer.into_inner().into_inner();
        assert_eq!(&wire[8..12], &8u32.to_le_bytes());
        assert_eq!(wire.len(), HEADER_SIZE + 11);
    }

    #[test]
    fn send_raw_passes_bytes_through() {
        let mut writer = CommandWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.send_raw(&[1, 2, 3, 4]).unwrap();

        let wire = writer.into_inner().into_inner();
        assert_eq!(wire, vec![1, 2, 3, 4]);
    }

    #[test]
    fn connection_closed_when_write_returns_zero() {
        struct ZeroWriter;

        impl Write for ZeroWriter {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Ok(0)
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut writer = CommandWriter::new(ZeroWriter);
        let err = writer.send(Opcode::Reboot, 0, &[]).unwrap_err();
        assert!(matches!(err, WireError::ConnectionClosed));
    }

    #[test]
    fn handles_interrupted_write_and_flush() {
        struct InterruptedWriteThenFlush {
            wrote_once: bool,
            flush_interrupted: bool,
            data: Vec<u8>,
        }

        impl Write for InterruptedWriteThenFlush {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                if !self.wrote_once {
                    self.wrote_once = true;
                    return Err(std::io::Error::from(ErrorKind::Interrupted));
                }
                self.data.extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                if !self.flush_interrupted {
                    self.flush_interrupted = true;
                    return Err(std::io::Error::from(ErrorKind::Interrupted));
                }
                Ok(())
            }
        }

        let mut writer = CommandWriter::new(InterruptedWriteThenFlush {
            wrote_once: false,
            flush_interrupted: false,
            data: Vec::new(),
        });
        writer.send(Opcode::ProcessList, 0, &[]).unwrap();

        let inner = writer.into_inner();
        assert_eq!(inner.data.len(), HEADER_SIZE);
    }

    #[test]
    fn partial_writes_resume_at_offset() {
        struct OneBytePerWrite {
            data: Vec<u8>,
        }

        impl Write for OneBytePerWrite {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                if buf.is_empty() {
                    return Ok(0);
                }
                self.data.push(buf[0]);
                Ok(1)
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut writer = CommandWriter::new(OneBytePerWrite { data: Vec::new() });
        writer
            .send(Opcode::MemoryRead, 16, &[0xEE; 16])
            .unwrap();

        let inner = writer.into_inner();
        assert_eq!(inner.data.len(), HEADER_SIZE + 16);
        assert_eq!(&inner.data[0..4], &[0xCC, 0xBB, 0xAA, 0xFF]);
        assert_eq!(&inner.data[12..], &[0xEE; 16]);
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut writer = CommandWriter::new(Cursor::new(Vec::<u8>::new()));

        let _ = writer.get_ref();
        let _ = writer.get_mut();
        let _ = writer.config();
        let _inner = writer.into_inner();
    }
}
