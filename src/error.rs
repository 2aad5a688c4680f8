//! The two error classes from the error-handling design: fatal emulator
//! traps (corrupt ROM / emulator bug) and host/setup failures. Both are
//! reported with a diagnostic and a non-zero exit code; neither is
//! recoverable.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmuError {
    #[error("attempt to read memory at {0:#06x}, at or above the 0x4000 mirror boundary")]
    MemoryReadOutOfBounds(u16),

    #[error("attempt to write memory at {0:#06x} outside writable RAM (ROM is read-only, mirror region is unmapped)")]
    MemoryWriteProtected(u16),

    #[error("unimplemented opcode {opcode:#04x} ({mnemonic}) at {pc:#06x}")]
    UnimplementedOpcode {
        opcode: u8,
        mnemonic: &'static str,
        pc: u16,
    },

    #[error("failed to read ROM file {path}: {source}")]
    RomLoad {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ROM is too large: {size} bytes will not fit before the 0x4000 mirror boundary at base offset {base_offset:#06x}")]
    RomTooLarge { size: usize, base_offset: u16 },

    #[error("failed to initialize host presentation surface: {0}")]
    Surface(String),
}
