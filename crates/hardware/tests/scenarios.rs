//! End-to-end pipeline scenarios, run through the whole `PipelineContext`
//! rather than a single stage in isolation. These mirror the concrete
//! scenarios named in the specification's testable-properties section
//! (ALU pipelining, RAW forwarding, LOAD/STORE ordering, taken-branch
//! flush, CALL/RET round trip, ROB-full stall).

use tomasulo_core::config::Config;
use tomasulo_core::error::SimError;
use tomasulo_core::model::{Instruction, Memory, Opcode};
use tomasulo_core::PipelineContext;

fn instr(idx: usize, addr: u64, opcode: Opcode, rd: i32, rs1: i32, rs2_imm: i32) -> Instruction {
    Instruction::new(idx, addr, opcode, rd, rs1, rs2_imm)
}

/// ALU pipelining: two dependent ADDs producing zero.
#[test]
fn s1_alu_pipelining() {
    let program = vec![
        instr(0, 0, Opcode::Add, 1, 0, 0), // R1 = R0 + R0
        instr(1, 1, Opcode::Add, 2, 1, 1), // R2 = R1 + R1
    ];
    let ctx = PipelineContext::new(Config::default(), program, 0, Memory::new(64));
    let report = ctx.run().expect("program halts");

    assert_eq!(report.stats.committed, 2);
    assert_eq!(report.stats.branch_count, 0);
    assert_eq!(report.registers[1], 0);
    assert_eq!(report.registers[2], 0);
}

/// RAW forwarding through the CDB: each instruction's operand is produced
/// by the one immediately before it.
#[test]
fn s2_raw_forwarding() {
    let program = vec![
        instr(0, 0, Opcode::Add, 1, 0, 0), // R1 = R0 + R0
        instr(1, 1, Opcode::Mul, 2, 1, 1), // R2 = R1 * R1
        instr(2, 2, Opcode::Add, 3, 2, 2), // R3 = R2 + R2
    ];
    let ctx = PipelineContext::new(Config::default(), program, 0, Memory::new(64));
    let report = ctx.run().expect("program halts");

    assert_eq!(report.stats.committed, 3);
    assert_eq!(report.registers[1], 0);
    assert_eq!(report.registers[2], 0);
    assert_eq!(report.registers[3], 0);
    // MUL's 12-cycle execute latency alone guarantees sub-1.0 IPC here.
    assert!(report.stats.ipc() < 1.0);
}

/// LOAD/STORE ordering: a loaded value is forwarded through a register and
/// stored back to a different address.
#[test]
fn s3_load_store_ordering() {
    let mut memory = Memory::new(64);
    memory.seed(10, 7);

    let program = vec![
        instr(0, 0, Opcode::Load, 1, 0, 10),  // R1 = M[R0 + 10] = 7
        instr(1, 1, Opcode::Store, 1, 0, 11), // M[R0 + 11] = R1
    ];
    let ctx = PipelineContext::new(Config::default(), program, 0, memory);
    let report = ctx.run().expect("program halts");

    assert_eq!(report.stats.committed, 2);
    assert_eq!(report.registers[1], 7);
    assert_eq!(report.memory[10], 7);
    assert_eq!(report.memory[11], 7);
}

/// Taken branch flush: a speculatively issued successor is discarded and
/// never commits.
#[test]
fn s4_taken_branch_flush() {
    let program = vec![
        instr(0, 0, Opcode::Add, 1, 0, 0),  // R1 = R0 + R0 = 0
        instr(1, 1, Opcode::Beq, 1, 0, 1),  // BEQ R1, R0, +1 -- taken, target = 1+1+1 = 3
        instr(2, 2, Opcode::Nand, 2, 0, 0), // speculative, on the not-taken path; must be flushed
        instr(3, 3, Opcode::Add, 3, 0, 0),  // branch target: R3 = R0 + R0 = 0
    ];
    let ctx = PipelineContext::new(Config::default(), program, 0, Memory::new(64));
    let report = ctx.run().expect("program halts");

    assert_eq!(report.stats.branch_count, 1);
    assert_eq!(report.stats.mispredictions, 1);
    assert_eq!(report.stats.committed, 3); // the NAND never commits
    assert_eq!(report.registers[2], 0); // untouched, not NAND's ~(0&0) = 0xFFFF
    assert_eq!(report.registers[3], 0);
}

/// CALL/RET round trip: CALL stashes the return address in R1 and
/// redirects to the target; RET redirects back from R1. Both commit
/// without being treated as a (BEQ-only) branch or misprediction.
#[test]
fn s5_call_ret_round_trip() {
    let program = vec![
        instr(0, 0, Opcode::Call, 0, 0, 5), // CALL target address 5
        instr(1, 1, Opcode::Add, 2, 0, 0),  // speculative filler on the fallthrough path
        instr(2, 2, Opcode::Add, 2, 0, 0),
        instr(3, 3, Opcode::Add, 2, 0, 0),
        instr(4, 4, Opcode::Add, 2, 0, 0),
        instr(5, 5, Opcode::Ret, 0, 0, 0), // RET back to R1
    ];
    let mut config = Config::default();
    config.max_cycles = 40; // this program loops forever (RET lands back on the filler); bound it
    let ctx = PipelineContext::new(config, program, 0, Memory::new(64));

    let err = ctx.run().expect_err("infinite CALL/RET loop must hit the runaway guard");
    let SimError::Runaway { partial, .. } = err else {
        panic!("expected a Runaway error");
    };

    assert_eq!(partial.registers[1], 1); // return address = pc_on_issue(0) + 1
    assert_eq!(partial.stats.branch_count, 0); // CALL/RET never count as BEQ branches
    assert_eq!(partial.stats.mispredictions, 0);
    assert!(partial.stats.committed >= 2); // at least the CALL and the first RET
}

/// ROB-full stall: with the reservation-station family deliberately
/// oversized, the ROB's fixed capacity is the only structural limiter, and
/// the ninth independent instruction must wait for the first to commit.
#[test]
fn s6_rob_full_stall() {
    let mut config = Config::default();
    config.rs_sizes.add_sub = 16; // isolate the ROB limit from RS-family exhaustion
    assert_eq!(config.rob_size, 8);

    let program: Vec<Instruction> = (0..9)
        .map(|i| {
            let dest = (i % 7) + 1;
            instr(i as usize, i as u64, Opcode::Add, dest, 0, 0)
        })
        .collect();

    let ctx = PipelineContext::new(config, program, 0, Memory::new(64));
    let report = ctx.run().expect("program halts");

    assert_eq!(report.stats.committed, 9);
    let issue_cycles: Vec<u64> = report
        .timeline
        .iter()
        .map(|t| t.issue)
        .collect();
    assert_eq!(issue_cycles.len(), 9);

    // The first eight issue back-to-back, one per cycle.
    for w in issue_cycles[..8].windows(2) {
        assert_eq!(w[1], w[0] + 1);
    }
    // The ninth must wait for the ROB to free a slot -- strictly more than
    // one cycle past the eighth, never earlier.
    assert!(issue_cycles[8] > issue_cycles[7] + 1);
}
