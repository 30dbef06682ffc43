//! Architectural register file and the register status (rename) table.
//!
//! Grounded on the teacher's tag-based `Scoreboard` (one ROB-tag slot per
//! register, `set_producer`/`get_producer`/`clear_if_match`/`flush`), with
//! `clear_if_match`'s "only clear if the tag still matches" rule carried
//! over verbatim — it is exactly specification §3's "a reg_tag binding is
//! created at Issue ... cleared at Commit if still equal to the committing
//! ROB index" invariant.

/// Eight (or `register_count`) 16-bit architectural registers. R0 is
/// hardwired to zero: reads always return 0, writes to it are no-ops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    values: Vec<u16>,
}

impl RegisterFile {
    /// Creates a zero-initialized register file with `count` registers.
    pub fn new(count: usize) -> Self {
        Self {
            values: vec![0; count],
        }
    }

    /// Reads register `r`. R0 always reads as 0.
    pub fn read(&self, r: usize) -> u16 {
        if r == 0 { 0 } else { self.values[r] }
    }

    /// Writes register `r`. Writing R0 is a no-op.
    pub fn write(&mut self, r: usize, value: u16) {
        if r != 0 {
            self.values[r] = value;
        }
    }

    /// Returns the full register file, in index order (`values[0]` is
    /// always 0).
    pub fn snapshot(&self) -> Vec<u16> {
        self.values.clone()
    }
}

/// Tag-based register status table: maps each architectural register to the
/// ROB index of its latest pending writer, or `None` if the register file
/// holds the current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scoreboard {
    reg_tag: Vec<Option<u16>>,
}

impl Scoreboard {
    /// Creates a scoreboard with `count` registers, all clear.
    pub fn new(count: usize) -> Self {
        Self {
            reg_tag: vec![None; count],
        }
    }

    /// Marks register `r` as having a pending writer at ROB index `tag`.
    /// No-op for R0 (hardwired zero, never renamed).
    pub fn set_producer(&mut self, r: usize, tag: u16) {
        if r != 0 {
            self.reg_tag[r] = Some(tag);
        }
    }

    /// Returns the ROB index of register `r`'s pending writer, if any.
    pub fn get_producer(&self, r: usize) -> Option<u16> {
        if r == 0 { None } else { self.reg_tag[r] }
    }

    /// Clears register `r`'s pending-writer tag, but only if it still equals
    /// `tag` — a newer rename of the same register (WAW) must not have its
    /// tag clobbered by an older instruction's commit.
    pub fn clear_if_match(&mut self, r: usize, tag: u16) {
        if r != 0 && self.reg_tag[r] == Some(tag) {
            self.reg_tag[r] = None;
        }
    }

    /// Clears every pending-writer tag referencing ROB index `tag`,
    /// regardless of which register it is bound to.
    ///
    /// Used during a speculative flush to drop bindings into flushed ROB
    /// entries (specification §4.7's "rebuild by compaction"); since
    /// multiple registers can never share a live tag at once, this is
    /// equivalent to, but more direct than, a per-register `clear_if_match`
    /// for every register.
    pub fn clear_tag(&mut self, tag: u16) {
        for slot in &mut self.reg_tag {
            if *slot == Some(tag) {
                *slot = None;
            }
        }
    }

    /// Clears every pending-writer tag (used when flushing all in-flight
    /// state).
    pub fn clear_all(&mut self) {
        for slot in &mut self.reg_tag {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn r0_hardwired_zero() {
        let mut regs = RegisterFile::new(8);
        regs.write(0, 123);
        assert_eq!(regs.read(0), 0);
    }

    #[test]
    fn write_then_read() {
        let mut regs = RegisterFile::new(8);
        regs.write(3, 77);
        assert_eq!(regs.read(3), 77);
    }

    #[test]
    fn scoreboard_clear_if_match_respects_waw() {
        let mut sb = Scoreboard::new(8);
        sb.set_producer(1, 2);
        sb.set_producer(1, 5); // newer instruction renames R1 again
        sb.clear_if_match(1, 2); // stale commit of the older producer
        assert_eq!(sb.get_producer(1), Some(5));
        sb.clear_if_match(1, 5);
        assert_eq!(sb.get_producer(1), None);
    }

    #[test]
    fn scoreboard_r0_never_tagged() {
        let mut sb = Scoreboard::new(8);
        sb.set_producer(0, 3);
        assert_eq!(sb.get_producer(0), None);
    }

    #[test]
    fn clear_tag_drops_any_register_pointing_at_it() {
        let mut sb = Scoreboard::new(8);
        sb.set_producer(2, 9);
        sb.set_producer(4, 9);
        sb.set_producer(5, 1);
        sb.clear_tag(9);
        assert_eq!(sb.get_producer(2), None);
        assert_eq!(sb.get_producer(4), None);
        assert_eq!(sb.get_producer(5), Some(1));
    }
}
