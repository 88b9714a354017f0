use std::io::{Read, Write};
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use orbisdbg_transport::DebugStream;
use orbisdbg_wire::{
    decode_memory_map, decode_process_info, decode_process_list, CommandWriter, MemoryMapEntry,
    ProcessEntry, ProcessInfo, ResponseReader, StatusAck, WireConfig, MEMORY_MAP_ENTRY_SIZE,
    PROCESS_ENTRY_SIZE, PROCESS_INFO_SIZE,
};
use tracing::debug;

use crate::command::Command;
use crate::error::Result;

/// A debug session against one console.
///
/// Owns the connection exclusively; every operation takes `&mut self` and
/// runs to completion (or failure) before the next can start, which is
/// exactly the serialization the protocol requires. Generic over the
/// stream halves so tests can drive it with in-memory streams.
pub struct DebugSession<R, W> {
    reader: ResponseReader<R>,
    writer: CommandWriter<W>,
}

impl DebugSession<DebugStream, DebugStream> {
    /// Connect to a console with default configuration.
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        Self::connect_with_config(host, port, WireConfig::default())
    }

    /// Connect to a console with explicit wire configuration.
    ///
    /// The stream is cloned into independent reader/writer halves; wire
    /// timeouts from the config are applied to each half.
    pub fn connect_with_config(host: &str, port: u16, config: WireConfig) -> Result<Self> {
        let stream = orbisdbg_transport::connect(host, port)?;
        Self::from_stream(stream, config)
    }

    /// Connect with a single timeout covering connection establishment and
    /// every subsequent read/write.
    pub fn connect_timeout(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let stream = orbisdbg_transport::connect_timeout(host, port, timeout)?;
        let config = WireConfig {
            read_timeout: Some(timeout),
            write_timeout: Some(timeout),
            ..WireConfig::default()
        };
        Self::from_stream(stream, config)
    }

    fn from_stream(stream: DebugStream, config: WireConfig) -> Result<Self> {
        let reader_stream = stream.try_clone()?;
        let reader = ResponseReader::with_config_stream(reader_stream, config.clone())?;
        let writer = CommandWriter::with_config_stream(stream, config)?;
        Ok(Self::from_parts(reader, writer))
    }

    /// Close the connection.
    ///
    /// Idempotent; the session is unusable afterwards.
    pub fn close(&self) -> Result<()> {
        self.reader.get_ref().close()?;
        Ok(())
    }
}

impl<R: Read, W: Write> DebugSession<R, W> {
    /// Assemble a session from pre-built stream halves.
    pub fn from_parts(reader: ResponseReader<R>, writer: CommandWriter<W>) -> Self {
        Self { reader, writer }
    }

    /// Tear the session apart into its stream halves.
    pub fn into_parts(self) -> (ResponseReader<R>, CommandWriter<W>) {
        (self.reader, self.writer)
    }

    /// Show an on-screen notification on the console.
    ///
    /// `kind` selects the notification icon (the stock client uses 222).
    pub fn notify(&mut self, kind: u32, message: &str) -> Result<StatusAck> {
        let cmd = Command::Notify { kind, message };
        self.submit(&cmd)?;
        let status = self.reader.read_status()?;
        debug!(kind, len = message.len(), "notification delivered");
        Ok(status)
    }

    /// Reboot the console.
    ///
    /// Fire-and-forget: this is the one command with no status
    /// acknowledgement — the console tears the connection down before it
    /// could reply, so reading would fail spuriously. Only write failures
    /// surface.
    pub fn reboot(&mut self) -> Result<()> {
        self.submit(&Command::Reboot)?;
        debug!("reboot issued");
        Ok(())
    }

    /// Enumerate running processes.
    pub fn process_list(&mut self) -> Result<Vec<ProcessEntry>> {
        self.submit(&Command::ProcessList)?;
        self.reader.read_status()?;
        let data = self.read_entry_block(PROCESS_ENTRY_SIZE)?;
        let entries = decode_process_list(&data)?;
        debug!(count = entries.len(), "process list received");
        Ok(entries)
    }

    /// Enumerate the memory mappings of a process.
    pub fn process_maps(&mut self, pid: i32) -> Result<Vec<MemoryMapEntry>> {
        self.submit(&Command::ProcessMaps { pid })?;
        self.reader.read_status()?;
        let data = self.read_entry_block(MEMORY_MAP_ENTRY_SIZE)?;
        let entries = decode_memory_map(&data)?;
        debug!(pid, count = entries.len(), "memory maps received");
        Ok(entries)
    }

    /// Fetch the process-info record.
    ///
    /// The full 184-byte record is consumed from the stream to keep
    /// framing aligned even though only the leading fields are parsed.
    pub fn process_info(&mut self, pid: i32) -> Result<ProcessInfo> {
        self.submit(&Command::ProcessInfo { pid })?;
        self.reader.read_status()?;
        let data = self.reader.read_exact(PROCESS_INFO_SIZE)?;
        let info = decode_process_info(&data)?;
        debug!(pid, name = %info.name, "process info received");
        Ok(info)
    }

    /// Read `len` bytes of process memory at `addr`.
    pub fn read_memory(&mut self, pid: i32, addr: u64, len: u32) -> Result<Bytes> {
        // A response beyond the cap could never be consumed; reject before
        // the command is on the wire and the stream is committed.
        let max = self.reader.config().max_payload_size;
        if len as usize > max {
            return Err(orbisdbg_wire::WireError::PayloadTooLarge {
                size: len as usize,
                max,
            }
            .into());
        }
        self.submit(&Command::MemoryRead { pid, addr, len })?;
        self.reader.read_status()?;
        let data = self.reader.read_exact(len as usize)?;
        debug!(pid, addr, len, "memory read");
        Ok(data)
    }

    /// Write bytes into process memory at `addr`.
    pub fn write_memory(&mut self, pid: i32, addr: u64, data: &[u8]) -> Result<StatusAck> {
        self.submit(&Command::MemoryWrite { pid, addr, data })?;
        self.writer.send_raw(data)?;
        let status = self.reader.read_status()?;
        debug!(pid, addr, len = data.len(), "memory written");
        Ok(status)
    }

    /// Upload an ELF image into a process and return its load address.
    ///
    /// Two phases, each acknowledged separately: the announcement (pid +
    /// image length), then the raw image bytes. The 8-byte load address
    /// follows the second acknowledgement.
    pub fn load_elf(&mut self, pid: i32, image: &[u8]) -> Result<u64> {
        self.submit(&Command::LoadElf { pid, image })?;
        self.reader.read_status()?;

        self.writer.send_raw(image)?;
        self.reader.read_status()?;

        let addr = self.reader.read_u64_le()?;
        debug!(pid, len = image.len(), addr, "elf loaded");
        Ok(addr)
    }

    /// Serialize and write a command header plus first-phase payload.
    fn submit(&mut self, cmd: &Command<'_>) -> Result<()> {
        let mut payload = BytesMut::new();
        cmd.encode_payload(&mut payload)?;
        self.writer.send(cmd.opcode(), cmd.declared_len(), &payload)?;
        Ok(())
    }

    /// Read a count-prefixed entry block in one read.
    ///
    /// A zero count reads nothing further — the response carries no entry
    /// bytes and must not be waited on.
    fn read_entry_block(&mut self, stride: usize) -> Result<Bytes> {
        let count = self.reader.read_u32_le()?;
        self.reader.check_entry_count(count)?;
        if count == 0 {
            return Ok(Bytes::new());
        }
        Ok(self.reader.read_exact(count as usize * stride)?)
    }
}
