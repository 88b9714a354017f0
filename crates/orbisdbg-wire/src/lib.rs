//! Command/response wire protocol for the console debug payload server.
//!
//! This is the core value-add layer of orbisdbg. Every command starts with
//! a fixed 12-byte header:
//! - A 4-byte little-endian magic (`0xFFAABBCC`) for stream sanity
//! - A 4-byte little-endian opcode from a closed command set
//! - A 4-byte little-endian declared payload size
//!
//! After each command phase the server acknowledges with exactly 4 bytes.
//! Response payloads are fixed-width, position-dependent records with no
//! delimiters — a single short read desynchronizes the session, so every
//! read here is exact-count or an error.

pub mod codec;
pub mod error;
pub mod opcode;
pub mod reader;
pub mod records;
pub mod writer;

pub use codec::{
    decode_header, encode_header, CommandHeader, WireConfig, DEFAULT_MAX_LIST_ENTRIES,
    DEFAULT_MAX_PAYLOAD, HEADER_SIZE, MAGIC,
};
pub use error::{Result, WireError};
pub use opcode::Opcode;
pub use reader::{ResponseReader, StatusAck, STATUS_SIZE};
pub use records::{
    decode_memory_map, decode_process_info, decode_process_list, MemoryMapEntry, ProcessEntry,
    ProcessInfo, ELF_RESULT_SIZE, MEMORY_MAP_ENTRY_SIZE, PROCESS_ENTRY_SIZE, PROCESS_INFO_SIZE,
};
pub use writer::CommandWriter;
