//! Issue stage (specification §4.2): the register-renaming front end.
//!
//! Grounded on the teacher's `core/pipeline/scoreboard.rs` rename-and-bind
//! pattern, extended here to also allocate a reorder-buffer slot and a
//! reservation station atomically, matching `original_source/main.cpp`'s
//! `issue()` (one instruction fetched, renamed, and dispatched per cycle,
//! blocked on ROB or RS-family exhaustion).

use crate::model::Opcode;

use super::controller::PipelineContext;
use super::rob::RobEntryKind;
use super::rs::RsFamily;

/// Attempts to issue the instruction at the current PC. No-ops if the
/// fetch queue is empty, the ROB is full, or the target RS family has no
/// free slot.
pub fn run(ctx: &mut PipelineContext) {
    let Some(idx) = ctx.fetch_index() else { return };
    if ctx.rob.is_full() {
        return;
    }
    let opcode = ctx.program[idx].opcode;
    let family = RsFamily::for_opcode(opcode);
    let Some(slot) = ctx.rs_pool.find_free(family) else {
        return;
    };

    let pc_on_issue = ctx.program[idx].address;
    let dest_reg = dest_register(ctx, idx, opcode);
    let kind = RobEntryKind::for_opcode(opcode);
    let tag = ctx
        .rob
        .allocate(kind, pc_on_issue, idx, dest_reg)
        .expect("free-slot check above guarantees this succeeds");

    match opcode {
        Opcode::Beq => {
            let imm = i64::from(ctx.program[idx].rs2_imm);
            let target = (pc_on_issue as i64 + 1 + imm) as u64;
            ctx.rob.set_br_target(tag, target);
        }
        Opcode::Call => {
            ctx.rob.set_br_target(tag, ctx.program[idx].rs2_imm as u64);
        }
        _ => {}
    }

    if let Some(reg) = dest_reg {
        ctx.scoreboard.set_producer(reg, tag);
    }

    let (vj, qj, vk, qk, a) = resolve_operands(ctx, idx, opcode);
    let exec_latency = ctx.config.exec_latencies.get(family);
    ctx.rs_pool.family_mut(family)[slot].occupy(opcode, Some(tag), vj, qj, vk, qk, a, exec_latency, idx);

    ctx.program[idx].timing.issue = Some(ctx.cycle);
    ctx.program[idx].rob_idx = Some(tag);

    tracing::trace!(stage = "issue", cycle = ctx.cycle, pc = pc_on_issue, rob_tag = tag, ?opcode);

    ctx.pc += 1;
}

fn dest_register(ctx: &PipelineContext, idx: usize, opcode: Opcode) -> Option<usize> {
    match opcode {
        Opcode::Load | Opcode::Add | Opcode::Sub | Opcode::Nand | Opcode::Mul => Some(ctx.program[idx].rd as usize),
        Opcode::Call => Some(1),
        Opcode::Store | Opcode::Beq | Opcode::Ret => None,
    }
}

/// Looks up register `r`'s value, renaming it to a pending ROB tag if its
/// producer hasn't written back yet.
fn rename(ctx: &PipelineContext, r: usize) -> (u16, Option<u16>) {
    match ctx.scoreboard.get_producer(r) {
        None => (ctx.regs.read(r), None),
        Some(tag) => {
            if ctx.rob.is_ready(tag) {
                (ctx.rob.value_of(tag), None)
            } else {
                (0, Some(tag))
            }
        }
    }
}

/// Resolves `(Vj, Qj, Vk, Qk, A)` for the instruction at `idx`, per the
/// per-opcode operand layout in specification §4.1.
fn resolve_operands(ctx: &PipelineContext, idx: usize, opcode: Opcode) -> (u16, Option<u16>, u16, Option<u16>, i32) {
    let instr = &ctx.program[idx];
    match opcode {
        Opcode::Load => {
            let (vj, qj) = rename(ctx, instr.rs1 as usize);
            (vj, qj, 0, None, instr.rs2_imm)
        }
        Opcode::Store => {
            let (vj, qj) = rename(ctx, instr.rs1 as usize);
            let (vk, qk) = rename(ctx, instr.rd as usize);
            (vj, qj, vk, qk, instr.rs2_imm)
        }
        Opcode::Beq => {
            let (vj, qj) = rename(ctx, instr.rd as usize);
            let (vk, qk) = rename(ctx, instr.rs1 as usize);
            (vj, qj, vk, qk, instr.rs2_imm)
        }
        Opcode::Add | Opcode::Sub | Opcode::Nand | Opcode::Mul => {
            let (vj, qj) = rename(ctx, instr.rs1 as usize);
            let (vk, qk) = rename(ctx, instr.rs2_imm as usize);
            (vj, qj, vk, qk, 0)
        }
        Opcode::Call => (0, None, 0, None, 0),
        Opcode::Ret => {
            let (vj, qj) = rename(ctx, 1);
            (vj, qj, 0, None, 0)
        }
    }
}
