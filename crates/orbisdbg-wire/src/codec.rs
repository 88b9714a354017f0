use bytes::{Buf, BufMut, BytesMut};

use crate::error::{Result, WireError};
use crate::opcode::Opcode;

/// Command header: magic (4) + opcode (4) + payload size (4) = 12 bytes.
pub const HEADER_SIZE: usize = 12;

/// Packet magic, written little-endian (wire bytes `CC BB AA FF`).
pub const MAGIC: u32 = 0xFFAA_BBCC;

/// Default maximum response payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// Default maximum entry count accepted in a list response.
pub const DEFAULT_MAX_LIST_ENTRIES: usize = 8192;

/// A parsed command header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandHeader {
    /// The requested operation.
    pub opcode: Opcode,
    /// Payload size declared by the sender.
    ///
    /// For most commands this counts the argument bytes that follow the
    /// header; notify declares only its fixed argument block, not the
    /// message bytes.
    pub payload_len: u32,
}

/// Encode a command header into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────┬────────────┬─────────────┐
/// │ Magic (4B LE)│ Opcode     │ Payload size │
/// │ 0xFFAABBCC   │ (4B LE)    │ (4B LE)      │
/// └──────────────┴────────────┴─────────────┘
/// ```
///
/// Rejects payload sizes the 32-bit size field cannot represent, before
/// anything is written.
pub fn encode_header(opcode: Opcode, payload_len: usize, dst: &mut BytesMut) -> Result<()> {
    if payload_len > u32::MAX as usize {
        return Err(WireError::PayloadTooLarge {
            size: payload_len,
            max: u32::MAX as usize,
        });
    }
    dst.reserve(HEADER_SIZE);
    dst.put_u32_le(MAGIC);
    dst.put_u32_le(opcode.as_u32());
    dst.put_u32_le(payload_len as u32);
    Ok(())
}

/// Decode a command header from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't hold a complete header yet.
/// On success, consumes the header bytes from the buffer. Used by tests
/// and scripted fake-console harnesses; the client itself only encodes.
pub fn decode_header(src: &mut BytesMut) -> Result<Option<CommandHeader>> {
    if src.len() < HEADER_SIZE {
        return Ok(None); // Need more data
    }

    let magic = u32::from_le_bytes(src[0..4].try_into().unwrap());
    if magic != MAGIC {
        return Err(WireError::InvalidMagic);
    }

    let opcode = Opcode::from_u32(u32::from_le_bytes(src[4..8].try_into().unwrap()))?;
    let payload_len = u32::from_le_bytes(src[8..12].try_into().unwrap());

    src.advance(HEADER_SIZE);

    Ok(Some(CommandHeader {
        opcode,
        payload_len,
    }))
}

/// Limits and timeouts applied to a session's wire traffic.
///
/// The protocol trusts declared lengths for framing, but counts and sizes
/// come from the remote peer; these caps bound what a corrupted or hostile
/// response can make the client allocate.
#[derive(Debug, Clone)]
pub struct WireConfig {
    /// Maximum response payload size in bytes. Default: 16 MiB.
    pub max_payload_size: usize,
    /// Maximum entry count accepted in a list response. Default: 8192.
    pub max_list_entries: usize,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            max_list_entries: DEFAULT_MAX_LIST_ENTRIES,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip_all_opcodes() {
        for op in Opcode::ALL {
            let mut buf = BytesMut::new();
            encode_header(op, 16, &mut buf).unwrap();
            assert_eq!(buf.len(), HEADER_SIZE);

            let header = decode_header(&mut buf).unwrap().unwrap();
            assert_eq!(header.opcode, op);
            assert_eq!(header.payload_len, 16);
            assert!(buf.is_empty());
        }
    }

    #[test]
    fn header_wire_layout() {
        let mut buf = BytesMut::new();
        encode_header(Opcode::Notify, 8, &mut buf).unwrap();

        // magic, LE
        assert_eq!(&buf[0..4], &[0xCC, 0xBB, 0xAA, 0xFF]);
        // opcode 0xBDDD0004, LE
        assert_eq!(&buf[4..8], &[0x04, 0x00, 0xDD, 0xBD]);
        // declared size, LE
        assert_eq!(&buf[8..12], &[0x08, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn decode_incomplete_header() {
        let mut buf = BytesMut::from(&[0xCC, 0xBB, 0xAA][..]);
        let result = decode_header(&mut buf).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn decode_invalid_magic() {
        let mut buf = BytesMut::from(&[0u8; HEADER_SIZE][..]);
        let result = decode_header(&mut buf);
        assert!(matches!(result, Err(WireError::InvalidMagic)));
    }

    #[test]
    fn decode_unknown_opcode() {
        let mut buf = BytesMut::new();
        buf.put_u32_le(MAGIC);
        buf.put_u32_le(0x1234_5678);
        buf.put_u32_le(0);

        let result = decode_header(&mut buf);
        assert!(matches!(result, Err(WireError::UnknownOpcode(0x1234_5678))));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn encode_rejects_unrepresentable_size() {
        let mut buf = BytesMut::new();
        let err = encode_header(Opcode::MemoryWrite, u32::MAX as usize + 1, &mut buf).unwrap_err();
        assert!(matches!(err, WireError::PayloadTooLarge { .. }));
        assert!(buf.is_empty(), "nothing may be written on rejection");
    }

    #[test]
    fn zero_length_payload() {
        let mut buf = BytesMut::new();
        encode_header(Opcode::ProcessList, 0, &mut buf).unwrap();

        let header = decode_header(&mut buf).unwrap().unwrap();
        assert_eq!(header.opcode, Opcode::ProcessList);
        assert_eq!(header.payload_len, 0);
    }

    #[test]
    fn decode_consumes_exactly_one_header() {
        let mut buf = BytesMut::new();
        encode_header(Opcode::ProcessMaps, 4, &mut buf).unwrap();
        buf.put_u32_le(10); // trailing payload stays in the buffer

        let header = decode_header(&mut buf).unwrap().unwrap();
        assert_eq!(header.opcode, Opcode::ProcessMaps);
        assert_eq!(buf.len(), 4);
    }
}
