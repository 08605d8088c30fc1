#![doc = r#"
Saturn: a DCPU-16 emulator library.

This crate exposes the emulator core and its peripherals for use by
binaries and tests.

Modules:
- cpu: DCPU-16 core (facade + state + decode + dispatch + execute modules)
- bus: memory, the `Device` trait and the ordered device list
- devices: Clock, Keyboard, LEM1802, M35FD and SPED-3 peripherals
- disk: `Disk` trait with in-memory and file-backed images
- config: runtime configuration (clock speed)
- error: error types

In tests, instruction assemblers and a recording device are available
under `crate::test_utils`.
"#]

pub mod bus;
pub mod config;
pub mod cpu;
pub mod devices;
pub mod disk;
pub mod error;

// Re-export commonly used types at the crate root for convenience.
pub use bus::{Device, DeviceContext, DeviceInfo, Memory};
pub use config::Config;
pub use cpu::{Cpu, Register};
pub use disk::{Disk, FileDisk, MemDisk};
pub use error::{ConfigError, CpuError, DiskError};

// Shared test utilities (only compiled for tests)
#[cfg(test)]
pub mod test_utils;
