//! `PipelineContext`: owns every piece of per-cycle simulator state and
//! drives the fixed Execute → Write → Commit → Issue stage order
//! (specification §4.8), chosen so a result produced in a cycle is never
//! visible to an earlier stage until the following cycle.
//!
//! Grounded on the teacher's `core/pipeline/mod.rs`, which plays the same
//! "owns everything, exposes one `tick`" role for its in-order backend.

use crate::config::Config;
use crate::error::SimError;
use crate::model::{Instruction, Memory, RegisterFile, Scoreboard};
use crate::stats::{CommittedTiming, SimReport, SimStats};

use super::rob::Rob;
use super::rs::RsPool;
use super::{cdb, commit, execute, issue};

/// All mutable state for one simulation run.
pub struct PipelineContext {
    pub(crate) config: Config,
    pub(crate) memory: Memory,
    pub(crate) regs: RegisterFile,
    pub(crate) scoreboard: Scoreboard,
    pub(crate) rs_pool: RsPool,
    pub(crate) rob: Rob,
    pub(crate) program: Vec<Instruction>,
    start_address: u64,
    pub(crate) pc: u64,
    pub(crate) cycle: u64,
    pub(crate) stats: SimStats,
    pub(crate) timeline: Vec<CommittedTiming>,
}

impl PipelineContext {
    /// Builds a fresh pipeline context for a decoded program and a
    /// pre-seeded memory image.
    pub fn new(config: Config, program: Vec<Instruction>, start_address: u64, memory: Memory) -> Self {
        let regs = RegisterFile::new(config.register_count);
        let scoreboard = Scoreboard::new(config.register_count);
        let rs_pool = RsPool::new(&config.rs_sizes);
        let rob = Rob::new(config.rob_size);
        Self {
            config,
            memory,
            regs,
            scoreboard,
            rs_pool,
            rob,
            program,
            start_address,
            pc: start_address,
            cycle: 0,
            stats: SimStats::default(),
            timeline: Vec::new(),
        }
    }

    /// Index into `program` of the instruction at the current PC, or
    /// `None` if the PC has run off the end of the decoded program (the
    /// fetch queue is empty).
    pub(crate) fn fetch_index(&self) -> Option<usize> {
        let offset = self.pc.checked_sub(self.start_address)?;
        let idx = usize::try_from(offset).ok()?;
        (idx < self.program.len()).then_some(idx)
    }

    /// `true` once nothing remains in flight and nothing remains to fetch:
    /// the simulation has fully drained.
    pub fn is_halted(&self) -> bool {
        self.fetch_index().is_none() && self.rob.is_empty()
    }

    /// Runs one cycle: Execute, then Write (CDB arbitration), then Commit,
    /// then Issue.
    pub fn tick(&mut self) {
        self.cycle += 1;
        execute::run(self);
        cdb::run(self);
        commit::run(self);
        issue::run(self);
    }

    /// Performs a speculative flush triggered by the ROB entry at
    /// `trigger_tag` committing as a taken branch, a CALL, or a RET:
    /// clears every busy RS/ROB entry strictly younger than the trigger,
    /// drops their register-rename bindings, resets their owning
    /// instructions' timing, and redirects the PC.
    pub(crate) fn flush_to(&mut self, trigger_tag: u16, new_pc: u64) {
        let cleared_rob = self.rob.flush_after(trigger_tag);
        for entry in &cleared_rob {
            if let Some(reg) = entry.dest_reg {
                self.scoreboard.clear_if_match(reg, entry.tag);
            }
            self.program[entry.program_index].clear_in_flight();
        }

        let trigger_addr = self
            .rob
            .head()
            .expect("trigger entry is still the head until commit releases it")
            .pc_on_issue;
        let addresses: Vec<u64> = self.program.iter().map(|instr| instr.address).collect();
        let cleared_rs = self.rs_pool.flush_younger_than(trigger_addr, |idx| addresses[idx]);
        for idx in cleared_rs {
            self.program[idx].clear_in_flight();
        }

        tracing::debug!(
            stage = "flush",
            cycle = self.cycle,
            trigger_tag,
            new_pc,
            "speculative recovery"
        );

        self.pc = new_pc;
    }

    /// Runs the simulation to completion, returning the final report, or
    /// `SimError::Runaway` (carrying a partial report) if `max_cycles` is
    /// exceeded before the pipeline drains.
    pub fn run(mut self) -> Result<SimReport, SimError> {
        let max_cycles = self.config.max_cycles;
        while !self.is_halted() {
            self.tick();
            if self.cycle >= max_cycles && !self.is_halted() {
                return Err(SimError::Runaway {
                    max_cycles,
                    partial: Box::new(self.snapshot_report()),
                });
            }
        }
        Ok(self.snapshot_report())
    }

    fn snapshot_report(&self) -> SimReport {
        let mut stats = self.stats;
        stats.cycles = self.cycle;
        SimReport {
            stats,
            timeline: self.timeline.clone(),
            registers: self.regs.snapshot(),
            memory: self.memory.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Opcode;

    fn program(ops: &[(u64, Opcode, i32, i32, i32)]) -> Vec<Instruction> {
        ops.iter()
            .enumerate()
            .map(|(i, &(addr, op, a, b, c))| Instruction::new(i, addr, op, a, b, c))
            .collect()
    }

    #[test]
    fn halts_on_empty_program() {
        let ctx = PipelineContext::new(Config::default(), Vec::new(), 0, Memory::new(16));
        assert!(ctx.is_halted());
    }

    #[test]
    fn single_add_commits() {
        // ADD r1, r0, r0 at address 0.
        let prog = program(&[(0, Opcode::Add, 1, 0, 0)]);
        let mut ctx = PipelineContext::new(Config::default(), prog, 0, Memory::new(16));
        let report = loop {
            if ctx.is_halted() {
                break ctx.snapshot_report();
            }
            ctx.tick();
        };
        assert_eq!(report.stats.committed, 1);
        assert_eq!(report.registers[1], 0);
    }
}
