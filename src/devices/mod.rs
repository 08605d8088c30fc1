/*!
Peripheral implementations.

Each peripheral is an independent state machine implementing `Device`:
- clock: generic clock, periodic tick interrupts
- keyboard: generic keyboard, typed-key FIFO and pressed-key queries
- lem1802: LEM1802 text-mode display, renders to an RGB frame
- m35fd: M35FD floppy controller, asynchronous sector reads and writes
- sped3: SPED-3 suspended particle (vector) display

All time-based behavior counts `on_cycle` calls and is scaled by the
configured clock speed.
*/

pub mod clock;
pub mod keyboard;
pub mod lem1802;
pub mod m35fd;
pub mod sped3;

pub use clock::Clock;
pub use keyboard::Keyboard;
pub use lem1802::{Frame, Lem1802, Rgb};
pub use m35fd::M35fd;
pub use sped3::{Sped3, Vertex};
