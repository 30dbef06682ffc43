//! Write stage: common-data-bus arbitration and broadcast (specification
//! §4.4).
//!
//! Grounded on the teacher's `core/pipeline/backend/shared/writeback.rs`
//! (single in-order writeback slot broadcasting to waiting consumers) and
//! `original_source/main.cpp`'s CDB arbitration (oldest finished unit wins;
//! a STORE whose data operand is still pending yields the bus rather than
//! letting a younger unit take it).

use crate::model::Opcode;

use super::controller::PipelineContext;
use super::rs::RsFamily;

/// Runs the Write stage for one cycle: ages every finished-but-delayed
/// reservation station, then lets at most one fully-delayed entry broadcast
/// its result over the CDB.
pub fn run(ctx: &mut PipelineContext) {
    // Selection reads each finished RS's write-delay as of the start of
    // this cycle: an entry whose delay only reaches zero by this cycle's
    // decrement still yields the bus this cycle, and becomes selectable
    // starting next cycle.
    let winner = select_writer(ctx);

    decrement_write_delays(ctx);

    let Some((family, slot)) = winner else {
        return;
    };

    let rs = ctx.rs_pool.family(family)[slot];
    if family == RsFamily::Store && rs.qk.is_some() {
        // Data operand still pending; the CDB stays idle this cycle rather
        // than letting a younger unit jump the queue.
        return;
    }

    let value = compute_value(ctx, family, &rs);
    let tag = rs.rob_dest.expect("busy RS always carries a ROB destination");

    if family == RsFamily::Store {
        let addr = effective_address(rs.vj, rs.a);
        ctx.rob.set_store_addr(tag, addr);
    }

    let commit_latency = ctx.config.commit_latencies.get(family);
    ctx.rob.complete(tag, value, commit_latency);
    broadcast(ctx, tag, value);

    ctx.program[rs.program_index].timing.write = Some(ctx.cycle);
    tracing::trace!(stage = "write", cycle = ctx.cycle, rob_tag = tag, value, ?family, "cdb broadcast");
    ctx.rs_pool.family_mut(family)[slot].release();
}

fn decrement_write_delays(ctx: &mut PipelineContext) {
    for family in RsFamily::ALL {
        for rs in ctx.rs_pool.family_mut(family) {
            if rs.busy && rs.exec_finished() && rs.write_delay > 0 {
                rs.write_delay -= 1;
            }
        }
    }
}

/// Picks, among reservation stations finished executing with `write_delay
/// == 0` and no recorded write cycle yet, the one whose owning instruction
/// has the oldest (smallest) address.
fn select_writer(ctx: &PipelineContext) -> Option<(RsFamily, usize)> {
    let mut best: Option<(RsFamily, usize, u64)> = None;
    for family in RsFamily::ALL {
        for (slot, rs) in ctx.rs_pool.family(family).iter().enumerate() {
            if !rs.busy || !rs.exec_finished() || rs.write_delay != 0 {
                continue;
            }
            if ctx.program[rs.program_index].timing.write.is_some() {
                continue;
            }
            let addr = ctx.program[rs.program_index].address;
            if best.is_none_or(|(_, _, best_addr)| addr < best_addr) {
                best = Some((family, slot, addr));
            }
        }
    }
    best.map(|(family, slot, _)| (family, slot))
}

fn effective_address(base: u16, offset: i32) -> u32 {
    let sum = i64::from(base) + i64::from(offset);
    sum.rem_euclid(1 << 16) as u32
}

fn compute_value(ctx: &PipelineContext, family: RsFamily, rs: &super::rs::ReservationStation) -> u16 {
    match family {
        RsFamily::Load => {
            let addr = effective_address(rs.vj, rs.a);
            ctx.memory.read(addr)
        }
        RsFamily::Store => rs.vk,
        RsFamily::Branch => u16::from(rs.vj == rs.vk),
        RsFamily::AddSub => match rs.opcode {
            Some(Opcode::Add) => rs.vj.wrapping_add(rs.vk),
            Some(Opcode::Sub) => rs.vj.wrapping_sub(rs.vk),
            _ => unreachable!("AddSub family only ever holds ADD/SUB"),
        },
        RsFamily::Nand => !(rs.vj & rs.vk),
        RsFamily::Mul => rs.vj.wrapping_mul(rs.vk),
        RsFamily::Call | RsFamily::Ret => 0,
    }
}

fn broadcast(ctx: &mut PipelineContext, tag: u16, value: u16) {
    for family in RsFamily::ALL {
        for rs in ctx.rs_pool.family_mut(family) {
            if !rs.busy {
                continue;
            }
            if rs.qj == Some(tag) {
                rs.vj = value;
                rs.qj = None;
            }
            if rs.qk == Some(tag) {
                rs.vk = value;
                rs.qk = None;
            }
        }
    }
}
