/*!
Error types shared by the CPU core, the device bus and the storage layer.

Only two conditions stop emulation at runtime: an instruction word with no
defined behavior and an overflowing interrupt queue. Both surface from
`Cpu::step` as `CpuError`. Storage faults are local to the floppy
controller, which turns them into CPU-visible result codes.
*/

use thiserror::Error;

/// Fatal emulation errors returned by the CPU facade.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CpuError {
    /// The word fetched at `pc` does not decode to a defined instruction.
    #[error("invalid opcode {word:#06x} at {pc:#06x}")]
    InvalidOpcode { pc: u16, word: u16 },

    /// A 257th interrupt was queued while 256 were already pending.
    #[error("interrupt queue overflow while queueing message {message:#06x}")]
    QueueOverflow { message: u16 },

    /// Devices can only be attached before the first `step`.
    #[error("cannot attach device '{name}' after execution has started")]
    AttachAfterStart { name: &'static str },

    /// A typed device lookup found a device of a different type in the slot.
    #[error("device in slot {slot} is not of the requested type")]
    DeviceType { slot: usize },
}

/// Faults reported by `Disk` implementations.
#[derive(Debug, Error)]
pub enum DiskError {
    #[error("sector {0} is out of range")]
    SectorOutOfRange(u16),

    #[error("disk i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Invalid runtime configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} has an invalid value")]
    InvalidEnv(&'static str),
}
