//! Decoded instruction record and opcode encoding.
//!
//! The core never parses assembly text; it consumes instructions already in
//! this shape (see `crate::loader::program`, which is the only producer of
//! `Instruction` values).

/// The nine fixed opcodes, encoded exactly as specification §3 defines them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// `dest=rd, src1=rs1 (base), src2=immediate offset`.
    Load = 1,
    /// `dest-slot=rs2 (data), src1=rs1 (base), src2=immediate offset`.
    Store = 2,
    /// `dest-slot=rs1, src1=rs2, src2=immediate`; target = `pc_on_issue + 1 + imm`.
    Beq = 3,
    /// `dest=rd, src1=rs1, src2=rs2`.
    Add = 4,
    /// `dest=rd, src1=rs1, src2=rs2`.
    Sub = 5,
    /// `dest=rd, src1=rs1, src2=rs2`.
    Nand = 6,
    /// `dest=rd, src1=rs1, src2=rs2`.
    Mul = 7,
    /// `src2=absolute target`; logical dest is R1 (return address).
    Call = 8,
    /// Reads R1; no destination.
    Ret = 9,
}

impl Opcode {
    /// Decodes the fixed integer encoding from the program-file format.
    /// Returns `None` for any value outside `1..=9`.
    pub fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            1 => Self::Load,
            2 => Self::Store,
            3 => Self::Beq,
            4 => Self::Add,
            5 => Self::Sub,
            6 => Self::Nand,
            7 => Self::Mul,
            8 => Self::Call,
            9 => Self::Ret,
            _ => return None,
        })
    }

    /// Returns `true` for instructions that write an architectural register
    /// at commit (LOAD, ADD/SUB/NAND/MUL, CALL — which writes R1).
    pub fn writes_register(self) -> bool {
        matches!(
            self,
            Self::Load | Self::Add | Self::Sub | Self::Nand | Self::Mul | Self::Call
        )
    }
}

/// Per-dynamic-instance timing annotations.
///
/// Each field is written exactly once per stage and reset to `None` on
/// speculative flush — the instruction record itself is reused for any
/// subsequent re-fetch of the same static instruction along the
/// now-current control-flow path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timing {
    /// Cycle the instruction was issued.
    pub issue: Option<u64>,
    /// Cycle execution began.
    pub exec_start: Option<u64>,
    /// Cycle execution finished.
    pub exec_end: Option<u64>,
    /// Cycle the result was written to the CDB.
    pub write: Option<u64>,
    /// Cycle the instruction committed.
    pub commit: Option<u64>,
}

impl Timing {
    /// Resets every annotation to `None`, as required on speculative flush.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A decoded instruction with its timing annotations for the current dynamic
/// instance (if any is currently in flight).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// 0-based index into the static program, in program-file order.
    pub program_index: usize,
    /// Instruction address, sequentially assigned by the loader starting at
    /// the program's declared start address.
    pub address: u64,
    /// The fixed opcode.
    pub opcode: Opcode,
    /// Raw operand slot `a`; meaning depends on `opcode` (see `Opcode` docs
    /// and specification §4.1).
    pub rd: i32,
    /// Raw operand slot `b`.
    pub rs1: i32,
    /// Raw operand slot `c` (source register or immediate, depending on
    /// opcode).
    pub rs2_imm: i32,
    /// Timing annotations for the instance currently in flight, if any.
    pub timing: Timing,
    /// ROB index occupied by the in-flight instance, if any.
    pub rob_idx: Option<u16>,
}

impl Instruction {
    /// Constructs a freshly decoded, not-yet-issued instruction.
    pub fn new(program_index: usize, address: u64, opcode: Opcode, rd: i32, rs1: i32, rs2_imm: i32) -> Self {
        Self {
            program_index,
            address,
            opcode,
            rd,
            rs1,
            rs2_imm,
            timing: Timing::default(),
            rob_idx: None,
        }
    }

    /// Clears timing annotations and the ROB index, as required when this
    /// instruction's in-flight instance is discarded by a speculative flush.
    pub fn clear_in_flight(&mut self) {
        self.timing.reset();
        self.rob_idx = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_all_nine_opcodes() {
        for (code, expected) in [
            (1, Opcode::Load),
            (2, Opcode::Store),
            (3, Opcode::Beq),
            (4, Opcode::Add),
            (5, Opcode::Sub),
            (6, Opcode::Nand),
            (7, Opcode::Mul),
            (8, Opcode::Call),
            (9, Opcode::Ret),
        ] {
            assert_eq!(Opcode::from_code(code), Some(expected));
        }
        assert_eq!(Opcode::from_code(0), None);
        assert_eq!(Opcode::from_code(10), None);
    }

    #[test]
    fn clear_in_flight_resets_timing_and_rob_idx() {
        let mut instr = Instruction::new(0, 0, Opcode::Add, 1, 0, 0);
        instr.timing.issue = Some(3);
        instr.timing.commit = Some(9);
        instr.rob_idx = Some(2);

        instr.clear_in_flight();

        assert_eq!(instr.timing, Timing::default());
        assert_eq!(instr.rob_idx, None);
    }
}
