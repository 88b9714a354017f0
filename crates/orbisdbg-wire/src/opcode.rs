//! The closed set of commands the payload server understands.
//!
//! Opcodes are 4-byte constants. The `0xBDAA____` family targets a
//! process, the `0xBDDD____` family targets the console itself.

use crate::error::{Result, WireError};

/// A remote operation requested by a command packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Enumerate running processes.
    ProcessList,
    /// Read process memory.
    MemoryRead,
    /// Write process memory.
    MemoryWrite,
    /// Enumerate a process's memory mappings.
    ProcessMaps,
    /// Upload and execute an ELF image in a process.
    LoadElf,
    /// Fetch the fixed process-info record.
    ProcessInfo,
    /// Reboot the console.
    Reboot,
    /// Show an on-screen notification.
    Notify,
}

impl Opcode {
    /// Every opcode, for exhaustive table-driven tests.
    pub const ALL: [Opcode; 8] = [
        Opcode::ProcessList,
        Opcode::MemoryRead,
        Opcode::MemoryWrite,
        Opcode::ProcessMaps,
        Opcode::LoadElf,
        Opcode::ProcessInfo,
        Opcode::Reboot,
        Opcode::Notify,
    ];

    /// The 4-byte wire constant for this command.
    pub fn as_u32(self) -> u32 {
        match self {
            Opcode::ProcessList => 0xBDAA_0001,
            Opcode::MemoryRead => 0xBDAA_0002,
            Opcode::MemoryWrite => 0xBDAA_0003,
            Opcode::ProcessMaps => 0xBDAA_0004,
            Opcode::LoadElf => 0xBDAA_0007,
            Opcode::ProcessInfo => 0xBDAA_000A,
            Opcode::Reboot => 0xBDDD_0001,
            Opcode::Notify => 0xBDDD_0004,
        }
    }

    /// Map a wire constant back to an opcode.
    pub fn from_u32(raw: u32) -> Result<Self> {
        match raw {
            0xBDAA_0001 => Ok(Opcode::ProcessList),
            0xBDAA_0002 => Ok(Opcode::MemoryRead),
            0xBDAA_0003 => Ok(Opcode::MemoryWrite),
            0xBDAA_0004 => Ok(Opcode::ProcessMaps),
            0xBDAA_0007 => Ok(Opcode::LoadElf),
            0xBDAA_000A => Ok(Opcode::ProcessInfo),
            0xBDDD_0001 => Ok(Opcode::Reboot),
            0xBDDD_0004 => Ok(Opcode::Notify),
            other => Err(WireError::UnknownOpcode(other)),
        }
    }

    /// Human-readable command name for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Opcode::ProcessList => "proc-list",
            Opcode::MemoryRead => "proc-read",
            Opcode::MemoryWrite => "proc-write",
            Opcode::ProcessMaps => "proc-maps",
            Opcode::LoadElf => "proc-elf",
            Opcode::ProcessInfo => "proc-info",
            Opcode::Reboot => "console-reboot",
            Opcode::Notify => "console-notify",
        }
    }

    /// Whether the server acknowledges this command with a status read.
    ///
    /// Reboot is the one exception: the console tears the connection down
    /// before it could reply, so no status follows the header.
    pub fn expects_status(self) -> bool {
        !matches!(self, Opcode::Reboot)
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_constants_roundtrip() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::from_u32(op.as_u32()).unwrap(), op);
        }
    }

    #[test]
    fn unknown_opcode_rejected() {
        let err = Opcode::from_u32(0xDEAD_BEEF).unwrap_err();
        assert!(matches!(err, WireError::UnknownOpcode(0xDEAD_BEEF)));
    }

    #[test]
    fn only_reboot_skips_status() {
        for op in Opcode::ALL {
            assert_eq!(op.expects_status(), op != Opcode::Reboot);
        }
    }

    #[test]
    fn names_are_distinct() {
        let mut names: Vec<_> = Opcode::ALL.iter().map(|op| op.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Opcode::ALL.len());
    }
}
