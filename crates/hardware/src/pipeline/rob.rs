//! The reorder buffer: a circular, in-order commit queue.
//!
//! Grounded on the teacher's `core/pipeline/rob.rs` (`Rob` as a `Vec<RobEntry>`
//! plus `head`/`tail`/`count`, `allocate`/`retire_head`/`flush_after`) —
//! reused near-verbatim, with the teacher's monotonic `RobTag(u32)` replaced
//! by a plain `u16` physical slot index (decided in DESIGN.md: this
//! specification's "ROB index" is the circular-buffer slot itself, so a
//! flush only ever needs to shrink `tail` back to just past the trigger,
//! never renumber survivors).

use crate::model::Opcode;

/// What kind of architectural effect a ROB entry produces at commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobEntryKind {
    /// Writes a general register (LOAD, ADD/SUB/NAND/MUL).
    Reg,
    /// Writes a memory word.
    Store,
    /// Conditional branch; may redirect the PC.
    Br,
    /// Unconditional call; writes R1 and redirects the PC.
    Call,
    /// Unconditional return; redirects the PC from R1's architectural value.
    Ret,
}

impl RobEntryKind {
    /// Maps an opcode to the ROB entry kind it allocates.
    pub fn for_opcode(opcode: Opcode) -> Self {
        match opcode {
            Opcode::Load | Opcode::Add | Opcode::Sub | Opcode::Nand | Opcode::Mul => Self::Reg,
            Opcode::Store => Self::Store,
            Opcode::Beq => Self::Br,
            Opcode::Call => Self::Call,
            Opcode::Ret => Self::Ret,
        }
    }
}

/// A single reorder-buffer entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobEntry {
    /// Whether this slot holds an in-flight instruction.
    pub busy: bool,
    /// The architectural effect this entry produces at commit.
    pub kind: RobEntryKind,
    /// Register index (`Reg`/`Call`) or memory address (`Store`, set at
    /// writeback once the effective address is computed).
    pub dest: u32,
    /// Result value: register value (`Reg`), word to store (`Store`), or
    /// the BEQ comparison outcome encoded as 0/1 (`Br`). Unused by
    /// `Call`/`Ret`.
    pub value: u16,
    /// Set at writeback; required before this entry may commit.
    pub ready: bool,
    /// Program index of the owning static instruction.
    pub program_index: usize,
    /// Address of the owning instruction at the moment it was issued —
    /// the ordering key used by speculative flush.
    pub pc_on_issue: u64,
    /// Redirect target for `Br` (only when taken) and `Call`. `Ret`
    /// resolves its target from the register file directly at commit.
    pub br_target: Option<u64>,
    /// Cycles remaining after writeback before this entry may commit.
    pub commit_remaining: u32,
}

impl Default for RobEntry {
    fn default() -> Self {
        Self {
            busy: false,
            kind: RobEntryKind::Reg,
            dest: 0,
            value: 0,
            ready: false,
            program_index: 0,
            pc_on_issue: 0,
            br_target: None,
            commit_remaining: 0,
        }
    }
}

/// One entry cleared by a speculative flush, returned so the caller can
/// clear register-rename bindings and reset the owning instruction's timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushedRobEntry {
    /// The freed ROB slot.
    pub tag: u16,
    /// Program index of the instruction that owned it.
    pub program_index: usize,
    /// If this entry writes a register, the register index.
    pub dest_reg: Option<usize>,
}

/// The reorder buffer: a fixed-capacity circular queue committed strictly
/// in order from `head`.
#[derive(Debug, Clone)]
pub struct Rob {
    entries: Vec<RobEntry>,
    head: usize,
    tail: usize,
    count: usize,
}

impl Rob {
    /// Creates an empty ROB with the given slot capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![RobEntry::default(); capacity],
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Total slot capacity.
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Number of busy slots.
    pub fn len(&self) -> usize {
        self.count
    }

    /// `true` if no slot is busy.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// `true` if every slot is busy.
    pub fn is_full(&self) -> bool {
        self.count == self.entries.len()
    }

    /// Allocates the next free slot at `tail` for a freshly issued
    /// instruction. Returns the slot index (the ROB "tag"), or `None` if
    /// full.
    pub fn allocate(
        &mut self,
        kind: RobEntryKind,
        pc_on_issue: u64,
        program_index: usize,
        dest_reg: Option<usize>,
    ) -> Option<u16> {
        if self.is_full() {
            return None;
        }
        let tag = self.tail;
        self.entries[tag] = RobEntry {
            busy: true,
            kind,
            dest: dest_reg.map_or(0, |r| r as u32),
            value: 0,
            ready: false,
            program_index,
            pc_on_issue,
            br_target: None,
            commit_remaining: 0,
        };
        self.tail = (self.tail + 1) % self.entries.len();
        self.count += 1;
        Some(tag as u16)
    }

    /// Sets the branch/call redirect target computed at issue.
    pub fn set_br_target(&mut self, tag: u16, target: u64) {
        self.entries[tag as usize].br_target = Some(target);
    }

    /// Records the effective address computed for a STORE at writeback.
    pub fn set_store_addr(&mut self, tag: u16, addr: u32) {
        self.entries[tag as usize].dest = addr;
    }

    /// Marks an entry ready at writeback, recording its result value and the
    /// commit-latency countdown to apply once it reaches the head.
    pub fn complete(&mut self, tag: u16, value: u16, commit_remaining: u32) {
        let entry = &mut self.entries[tag as usize];
        entry.value = value;
        entry.ready = true;
        entry.commit_remaining = commit_remaining;
    }

    /// `true` if `tag` denotes a currently busy, ready entry.
    pub fn is_ready(&self, tag: u16) -> bool {
        let entry = &self.entries[tag as usize];
        debug_assert!(entry.busy, "reg_tag referenced a non-busy ROB slot");
        entry.ready
    }

    /// Result value of a ready entry.
    pub fn value_of(&self, tag: u16) -> u16 {
        let entry = &self.entries[tag as usize];
        debug_assert!(entry.busy, "reg_tag referenced a non-busy ROB slot");
        entry.value
    }

    /// The head entry, if any.
    pub fn head(&self) -> Option<&RobEntry> {
        if self.is_empty() {
            None
        } else {
            Some(&self.entries[self.head])
        }
    }

    /// The head entry's tag, if any.
    pub fn head_tag(&self) -> Option<u16> {
        if self.is_empty() {
            None
        } else {
            Some(self.head as u16)
        }
    }

    /// Mutable access to the head entry, if any.
    pub fn head_mut(&mut self) -> Option<&mut RobEntry> {
        if self.count == 0 {
            None
        } else {
            Some(&mut self.entries[self.head])
        }
    }

    /// Pops the head entry unconditionally, advancing `head` and
    /// decrementing `count`. The caller must already have verified the head
    /// is ready with `commit_remaining == 0`.
    pub fn release_head(&mut self) -> RobEntry {
        let entry = self.entries[self.head];
        self.entries[self.head] = RobEntry::default();
        self.head = (self.head + 1) % self.entries.len();
        self.count -= 1;
        entry
    }

    /// Clears every busy entry strictly after `trigger_tag` in commit order
    /// (i.e. every entry between the trigger and `tail`, exclusive of the
    /// trigger itself), shrinking `tail` back to just past it.
    ///
    /// `trigger_tag` is always the current head: only the head may ever
    /// resolve a branch/call/return, so every other busy entry is
    /// necessarily younger in program order (specification §4.7).
    pub fn flush_after(&mut self, trigger_tag: u16) -> Vec<FlushedRobEntry> {
        let cap = self.entries.len();
        let mut cleared = Vec::new();
        let mut idx = (trigger_tag as usize + 1) % cap;
        while idx != self.tail {
            let entry = self.entries[idx];
            if entry.busy {
                let dest_reg = matches!(entry.kind, RobEntryKind::Reg | RobEntryKind::Call).then_some(entry.dest as usize);
                cleared.push(FlushedRobEntry {
                    tag: idx as u16,
                    program_index: entry.program_index,
                    dest_reg,
                });
                self.entries[idx] = RobEntry::default();
            }
            idx = (idx + 1) % cap;
        }
        self.tail = (trigger_tag as usize + 1) % cap;
        self.count = 1;
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_wraps_and_reports_full() {
        let mut rob = Rob::new(2);
        let t0 = rob.allocate(RobEntryKind::Reg, 0, 0, Some(1)).unwrap();
        let t1 = rob.allocate(RobEntryKind::Reg, 1, 1, Some(2)).unwrap();
        assert_eq!((t0, t1), (0, 1));
        assert!(rob.is_full());
        assert_eq!(rob.allocate(RobEntryKind::Reg, 2, 2, Some(3)), None);
    }

    #[test]
    fn release_head_advances_in_order() {
        let mut rob = Rob::new(2);
        rob.allocate(RobEntryKind::Reg, 0, 0, Some(1)).unwrap();
        rob.allocate(RobEntryKind::Reg, 1, 1, Some(2)).unwrap();
        let released = rob.release_head();
        assert_eq!(released.program_index, 0);
        assert_eq!(rob.head_tag(), Some(1));
        assert_eq!(rob.len(), 1);
    }

    #[test]
    fn flush_after_clears_younger_entries_and_keeps_trigger() {
        let mut rob = Rob::new(4);
        let t0 = rob.allocate(RobEntryKind::Br, 10, 0, None).unwrap();
        rob.allocate(RobEntryKind::Reg, 11, 1, Some(3)).unwrap();
        rob.allocate(RobEntryKind::Reg, 12, 2, Some(4)).unwrap();

        let cleared = rob.flush_after(t0);

        assert_eq!(cleared.len(), 2);
        assert_eq!(cleared[0].dest_reg, Some(3));
        assert_eq!(cleared[1].dest_reg, Some(4));
        assert_eq!(rob.len(), 1);
        assert_eq!(rob.head_tag(), Some(t0));
        // The freed slots can be reallocated immediately.
        let reused = rob.allocate(RobEntryKind::Reg, 20, 5, Some(1)).unwrap();
        assert_eq!(reused, 1);
    }

    #[test]
    fn complete_then_commit_roundtrip() {
        let mut rob = Rob::new(2);
        let tag = rob.allocate(RobEntryKind::Reg, 0, 0, Some(3)).unwrap();
        assert!(!rob.is_ready(tag));
        rob.complete(tag, 42, 1);
        assert!(rob.is_ready(tag));
        assert_eq!(rob.value_of(tag), 42);
        rob.head_mut().unwrap().commit_remaining -= 1;
        let released = rob.release_head();
        assert_eq!(released.value, 42);
    }
}
