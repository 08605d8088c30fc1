/*!
control_flow.rs - Special opcodes that move PC or touch interrupt state

```text
JSR a   push PC, PC <- a
INT a   software interrupt with message a
IAG a   a <- IA
IAS a   IA <- a
RFI a   queueing off, pop A, pop PC (a is read and ignored)
IAQ a   queueing on if a != 0, off otherwise
```

INT clears the interrupt guard before raising so the interrupt can take
effect within the same step instead of being queued behind itself.
*/

use crate::bus::ram::Memory;
use crate::cpu::addressing::{Operand, read, write};
use crate::cpu::decode::SpecialOp;
use crate::cpu::dispatch::raise;
use crate::cpu::regs::Register;
use crate::cpu::state::CpuState;
use crate::error::CpuError;

pub(crate) fn handle(
    op: SpecialOp,
    a: Operand,
    state: &mut CpuState,
    mem: &mut Memory,
) -> Result<bool, CpuError> {
    match op {
        SpecialOp::Jsr => {
            let target = read(a, state, mem);
            let ret = state.pc;
            state.push(mem, ret);
            state.pc = target;
        }
        SpecialOp::Int => {
            let message = read(a, state, mem);
            state.guard = false;
            raise(state, mem, message)?;
        }
        SpecialOp::Iag => {
            let ia = state.ia;
            write(a, state, mem, ia);
        }
        SpecialOp::Ias => state.ia = read(a, state, mem),
        SpecialOp::Rfi => {
            state.queueing = false;
            let saved_a = state.pop(mem);
            state.set_reg(Register::A, saved_a);
            state.pc = state.pop(mem);
        }
        SpecialOp::Iaq => state.queueing = read(a, state, mem) != 0,
        _ => return Ok(false),
    }
    Ok(true)
}
