//! Typed records decoded from response payloads.
//!
//! All decoding here is pure: the session reads the raw bytes in one
//! exact-count read, then these functions slice at fixed strides. Name
//! fields are fixed-width ASCII, NUL-terminated; decoding truncates at the
//! first NUL and ignores whatever trails it.

use crate::error::{Result, WireError};

/// Stride of one process-list entry: 32-byte name + 4-byte pid.
pub const PROCESS_ENTRY_SIZE: usize = 36;

/// Stride of one memory-map entry: 32-byte name + 3×8-byte addresses +
/// 2-byte protection flags.
pub const MEMORY_MAP_ENTRY_SIZE: usize = 58;

/// Size of the fixed process-info record. Only the first 36 bytes carry
/// parsed fields; the rest is reserved but must be consumed to keep the
/// stream aligned.
pub const PROCESS_INFO_SIZE: usize = 184;

/// Size of the ELF load result: one 8-byte little-endian address.
pub const ELF_RESULT_SIZE: usize = 8;

/// Width of fixed name fields.
const NAME_FIELD_SIZE: usize = 32;

/// Mapping is readable.
pub const PROT_READ: u16 = 0x1;
/// Mapping is writable.
pub const PROT_WRITE: u16 = 0x2;
/// Mapping is executable.
pub const PROT_EXEC: u16 = 0x4;

/// One entry of a process-list response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    /// Process name, truncated at the first NUL.
    pub name: String,
    /// Process id.
    pub pid: i32,
}

/// One entry of a process-maps response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryMapEntry {
    /// Mapping name, truncated at the first NUL.
    pub name: String,
    /// Start address.
    pub start: u64,
    /// End address (exclusive).
    pub end: u64,
    /// File offset backing the mapping.
    pub offset: u64,
    /// Protection flags (`PROT_READ | PROT_WRITE | PROT_EXEC`).
    pub prot: u16,
}

impl MemoryMapEntry {
    pub fn is_readable(&self) -> bool {
        self.prot & PROT_READ != 0
    }

    pub fn is_writable(&self) -> bool {
        self.prot & PROT_WRITE != 0
    }

    pub fn is_executable(&self) -> bool {
        self.prot & PROT_EXEC != 0
    }

    /// Mapping size in bytes.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// `rwx`-style rendering of the protection bits.
    pub fn prot_string(&self) -> String {
        let mut s = String::with_capacity(3);
        s.push(if self.is_readable() { 'r' } else { '-' });
        s.push(if self.is_writable() { 'w' } else { '-' });
        s.push(if self.is_executable() { 'x' } else { '-' });
        s
    }
}

/// The parsed prefix of a process-info response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    /// Process id.
    pub pid: i32,
    /// Process name, truncated at the first NUL.
    pub name: String,
}

/// Decode a fixed-width NUL-terminated name field.
fn decode_fixed_str(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

fn exact_multiple(data: &[u8], stride: usize) -> Result<usize> {
    if data.len() % stride != 0 {
        return Err(WireError::Truncated {
            expected: data.len().next_multiple_of(stride),
            got: data.len(),
        });
    }
    Ok(data.len() / stride)
}

/// Decode a process-list payload: `count × 36` bytes, sliced at 36-byte
/// strides.
pub fn decode_process_list(data: &[u8]) -> Result<Vec<ProcessEntry>> {
    let count = exact_multiple(data, PROCESS_ENTRY_SIZE)?;
    let mut entries = Vec::with_capacity(count);
    for chunk in data.chunks_exact(PROCESS_ENTRY_SIZE) {
        entries.push(ProcessEntry {
            name: decode_fixed_str(&chunk[..NAME_FIELD_SIZE]),
            pid: i32::from_le_bytes(chunk[32..36].try_into().unwrap()),
        });
    }
    Ok(entries)
}

/// Decode a process-maps payload: `count × 58` bytes, sliced at 58-byte
/// strides.
pub fn decode_memory_map(data: &[u8]) -> Result<Vec<MemoryMapEntry>> {
    let count = exact_multiple(data, MEMORY_MAP_ENTRY_SIZE)?;
    let mut entries = Vec::with_capacity(count);
    for chunk in data.chunks_exact(MEMORY_MAP_ENTRY_SIZE) {
        entries.push(MemoryMapEntry {
            name: decode_fixed_str(&chunk[..NAME_FIELD_SIZE]),
            start: u64::from_le_bytes(chunk[32..40].try_into().unwrap()),
            end: u64::from_le_bytes(chunk[40..48].try_into().unwrap()),
            offset: u64::from_le_bytes(chunk[48..56].try_into().unwrap()),
            prot: u16::from_le_bytes(chunk[56..58].try_into().unwrap()),
        });
    }
    Ok(entries)
}

/// Decode the fixed 184-byte process-info record.
///
/// Only the leading pid and name are parsed; the caller must still have
/// consumed all 184 bytes from the stream.
pub fn decode_process_info(data: &[u8]) -> Result<ProcessInfo> {
    if data.len() != PROCESS_INFO_SIZE {
        return Err(WireError::Truncated {
            expected: PROCESS_INFO_SIZE,
            got: data.len(),
        });
    }
    Ok(ProcessInfo {
        pid: i32::from_le_bytes(data[0..4].try_into().unwrap()),
        name: decode_fixed_str(&data[4..36]),
    })
}
