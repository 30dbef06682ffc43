//! Execute stage (specification §4.3).
//!
//! Grounded on the teacher's `core/pipeline/backend` staging (resolve
//! operands, tick a per-instruction countdown, record the cycle the
//! countdown reaches zero) generalized from the teacher's single in-order
//! functional unit to one countdown per busy reservation station.

use super::controller::PipelineContext;
use super::rs::RsFamily;

/// Advances every busy reservation station by one cycle: resolves any
/// operand tags the ROB has since marked ready, then starts or continues
/// execution.
pub fn run(ctx: &mut PipelineContext) {
    let cycle = ctx.cycle;
    for family in RsFamily::ALL {
        let is_store = family == RsFamily::Store;
        for rs in ctx.rs_pool.family_mut(family) {
            if !rs.busy {
                continue;
            }

            if let Some(tag) = rs.qj {
                if ctx.rob.is_ready(tag) {
                    rs.vj = ctx.rob.value_of(tag);
                    rs.qj = None;
                }
            }
            if let Some(tag) = rs.qk {
                if ctx.rob.is_ready(tag) {
                    rs.vk = ctx.rob.value_of(tag);
                    rs.qk = None;
                }
            }

            // STORE may start once its base address (Qj) resolves; the data
            // operand (Qk) may still be pending and must resolve no later
            // than writeback.
            let operands_ready = if is_store { rs.qj.is_none() } else { rs.qj.is_none() && rs.qk.is_none() };

            let just_finished = if !rs.started {
                if !operands_ready {
                    false
                } else {
                    rs.started = true;
                    ctx.program[rs.program_index].timing.exec_start = Some(cycle);
                    rs.exec_remaining -= 1;
                    rs.exec_remaining == 0
                }
            } else if rs.exec_remaining > 0 {
                rs.exec_remaining -= 1;
                rs.exec_remaining == 0
            } else {
                false
            };

            if just_finished {
                ctx.program[rs.program_index].timing.exec_end = Some(cycle);
                rs.write_delay = super::rs::RsPool::seed_write_delay(family);
                tracing::trace!(stage = "execute", cycle, ?family, program_index = rs.program_index, "exec_end");
            }
        }
    }
}
