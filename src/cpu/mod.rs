/*!
cpu::mod - Public façade for the DCPU-16 core.

Layout:

```text
core/           - `Cpu`, the facade owning `CpuState` and the `Bus`.
state.rs        - Registers, interrupt queue and flags.
regs.rs         - General register enum and operand-code mapping.
decode.rs       - Instruction word classification.
addressing.rs   - Operand resolution (with PC/SP side effects).
cycles.rs       - Base cycle costs.
execute.rs      - ALU and condition semantics.
dispatch/       - Step orchestration, interrupts and opcode family handlers.
```

The public surface is the `Cpu` facade. Internal module layout may change.

Usage:
```rust
use saturn::Cpu;

let mut cpu = Cpu::new();
cpu.load(&[0x7C01, 0xDEAD]); // SET A, 0xDEAD
cpu.step().unwrap();
cpu.step().unwrap();
assert_eq!(cpu.reg(saturn::Register::A), 0xDEAD);
```
*/

pub mod addressing;
pub mod core;
pub mod cycles;
pub mod decode;
pub(crate) mod dispatch;
pub mod execute;
pub mod regs;
pub mod state;


pub use crate::cpu::core::Cpu;
pub use crate::cpu::regs::Register;
pub use crate::cpu::state::{CpuState, MAX_QUEUED_INTERRUPTS};
