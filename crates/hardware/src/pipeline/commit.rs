//! Commit stage (specification §4.5).
//!
//! Only the ROB head may commit, and it may do so several times in one
//! cycle if earlier entries already finished their commit-latency
//! countdown while waiting behind an older, still-busy head — grounded on
//! the teacher's `core/pipeline/backend/shared/commit.rs`, whose in-order
//! retirement loop this generalizes from "always exactly one functional
//! unit" to "drain whatever is ready at the head, one ROB slot at a time".

use crate::stats::CommittedTiming;

use super::controller::PipelineContext;
use super::rob::RobEntryKind;

/// Runs the Commit stage for one cycle.
pub fn run(ctx: &mut PipelineContext) {
    loop {
        let Some(head) = ctx.rob.head() else { break };
        if !head.ready {
            break;
        }
        if head.commit_remaining > 0 {
            ctx.rob.head_mut().expect("checked non-empty above").commit_remaining -= 1;
            break;
        }

        let tag = ctx.rob.head_tag().expect("checked non-empty above");
        let entry = *ctx.rob.head().expect("checked non-empty above");
        apply_effects(ctx, tag, &entry);
        record_timing(ctx, &entry);
        tracing::debug!(stage = "commit", cycle = ctx.cycle, rob_tag = tag, ?entry.kind, program_index = entry.program_index);
        ctx.rob.release_head();
    }
}

fn apply_effects(ctx: &mut PipelineContext, tag: u16, entry: &super::rob::RobEntry) {
    match entry.kind {
        RobEntryKind::Reg => {
            let reg = entry.dest as usize;
            ctx.regs.write(reg, entry.value);
            ctx.scoreboard.clear_if_match(reg, tag);
        }
        RobEntryKind::Store => {
            ctx.memory.write(entry.dest, entry.value);
        }
        RobEntryKind::Br => {
            ctx.stats.branch_count += 1;
            let taken = entry.value == 1;
            if taken {
                ctx.stats.mispredictions += 1;
                let target = entry.br_target.expect("BEQ always sets br_target at issue");
                ctx.flush_to(tag, target);
            }
        }
        RobEntryKind::Call => {
            let reg = entry.dest as usize;
            let return_addr = (entry.pc_on_issue + 1) as u16;
            ctx.regs.write(reg, return_addr);
            ctx.scoreboard.clear_if_match(reg, tag);
            let target = entry.br_target.expect("CALL always sets br_target at issue");
            ctx.flush_to(tag, target);
        }
        RobEntryKind::Ret => {
            let target = ctx.regs.read(1);
            ctx.flush_to(tag, u64::from(target));
        }
    }
}

fn record_timing(ctx: &mut PipelineContext, entry: &super::rob::RobEntry) {
    let cycle = ctx.cycle;
    let instr = &mut ctx.program[entry.program_index];
    instr.timing.commit = Some(cycle);
    let timing = instr.timing;
    ctx.timeline.push(CommittedTiming {
        program_index: instr.program_index,
        address: instr.address,
        issue: timing.issue.expect("committed instruction was issued"),
        exec_start: timing.exec_start.expect("committed instruction executed"),
        exec_end: timing.exec_end.expect("committed instruction executed"),
        write: timing.write.expect("committed instruction wrote back"),
        commit: cycle,
    });
    ctx.stats.committed += 1;
    ctx.program[entry.program_index].clear_in_flight();
}
