//! The closed set of operations a session can issue.
//!
//! Each variant maps to an explicit (opcode, declared header size,
//! first-phase payload) triple. Keeping the mapping in one exhaustive
//! `match` per method means a new command cannot be added without the
//! compiler pointing at every table that must learn about it.

use bytes::{BufMut, BytesMut};
use orbisdbg_wire::{Opcode, WireError};

use crate::error::{Result, SessionError};

/// Fixed argument block for memory read/write: pid + address + length.
pub const MEMORY_ARGS_SIZE: usize = 16;

/// Fixed argument block for notify: kind + message length.
pub const NOTIFY_ARGS_SIZE: usize = 8;

/// Fixed argument block for the ELF announcement phase: pid + image length.
pub const ELF_ARGS_SIZE: usize = 8;

/// A command to the payload server.
///
/// Bulk second-phase data (memory-write values, ELF images) is not part of
/// the variant payload encoding; the session streams it separately after
/// the header phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Show an on-screen notification of the given kind.
    Notify { kind: u32, message: &'a str },
    /// Reboot the console.
    Reboot,
    /// Enumerate running processes.
    ProcessList,
    /// Enumerate the memory mappings of a process.
    ProcessMaps { pid: i32 },
    /// Fetch the fixed process-info record.
    ProcessInfo { pid: i32 },
    /// Read `len` bytes of process memory at `addr`.
    MemoryRead { pid: i32, addr: u64, len: u32 },
    /// Write bytes into process memory at `addr`.
    MemoryWrite { pid: i32, addr: u64, data: &'a [u8] },
    /// Announce an ELF upload of `image` into the process.
    LoadElf { pid: i32, image: &'a [u8] },
}

impl Command<'_> {
    /// The wire opcode for this command.
    pub fn opcode(&self) -> Opcode {
        match self {
            Command::Notify { .. } => Opcode::Notify,
            Command::Reboot => Opcode::Reboot,
            Command::ProcessList => Opcode::ProcessList,
            Command::ProcessMaps { .. } => Opcode::ProcessMaps,
            Command::ProcessInfo { .. } => Opcode::ProcessInfo,
            Command::MemoryRead { .. } => Opcode::MemoryRead,
            Command::MemoryWrite { .. } => Opcode::MemoryWrite,
            Command::LoadElf { .. } => Opcode::LoadElf,
        }
    }

    /// The payload size declared in the command header.
    ///
    /// Notify declares only its fixed argument block even though the
    /// message bytes follow it on the wire; the server reads the message
    /// length from the argument block, not the header.
    pub fn declared_len(&self) -> usize {
        match self {
            Command::Notify { .. } => NOTIFY_ARGS_SIZE,
            Command::Reboot | Command::ProcessList => 0,
            Command::ProcessMaps { .. } | Command::ProcessInfo { .. } => 4,
            Command::MemoryRead { .. } | Command::MemoryWrite { .. } => MEMORY_ARGS_SIZE,
            Command::LoadElf { .. } => ELF_ARGS_SIZE,
        }
    }

    /// Encode the first-phase payload that follows the header.
    ///
    /// Validates caller-supplied sizes before anything is encoded.
    pub fn encode_payload(&self, dst: &mut BytesMut) -> Result<()> {
        match *self {
            Command::Notify { kind, message } => {
                if message.as_bytes().contains(&0) {
                    return Err(SessionError::InteriorNul);
                }
                let msg_len = checked_wire_len(message.len(), 1)?;
                dst.reserve(NOTIFY_ARGS_SIZE + message.len() + 1);
                dst.put_u32_le(kind);
                dst.put_u32_le(msg_len);
                dst.put_slice(message.as_bytes());
                dst.put_u8(0);
            }
            Command::Reboot | Command::ProcessList => {}
            Command::ProcessMaps { pid } | Command::ProcessInfo { pid } => {
                dst.put_i32_le(pid);
            }
            Command::MemoryRead { pid, addr, len } => {
                dst.reserve(MEMORY_ARGS_SIZE);
                dst.put_i32_le(pid);
                dst.put_u64_le(addr);
                dst.put_u32_le(len);
            }
            Command::MemoryWrite { pid, addr, data } => {
                let len = checked_wire_len(data.len(), 0)?;
                dst.reserve(MEMORY_ARGS_SIZE);
                dst.put_i32_le(pid);
                dst.put_u64_le(addr);
                dst.put_u32_le(len);
            }
            Command::LoadElf { pid, image } => {
                let len = checked_wire_len(image.len(), 0)?;
                dst.reserve(ELF_ARGS_SIZE);
                dst.put_i32_le(pid);
                dst.put_u32_le(len);
            }
        }
        Ok(())
    }

    /// Whether a status acknowledgement follows the command phase.
    pub fn expects_status(&self) -> bool {
        self.opcode().expects_status()
    }
}

/// Convert a caller-supplied length (plus a fixed overhead such as the
/// notify NUL terminator) into the wire's 32-bit length field.
fn checked_wire_len(len: usize, overhead: usize) -> Result<u32> {
    let total = len
        .checked_add(overhead)
        .filter(|&t| t <= u32::MAX as usize)
        .ok_or(WireError::PayloadTooLarge {
            size: len,
            max: u32::MAX as usize - overhead,
        })?;
    Ok(total as u32)
}
