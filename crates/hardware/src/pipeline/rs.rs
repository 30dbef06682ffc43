//! Reservation stations, partitioned by functional-unit family.
//!
//! Grounded on `original_source/main.cpp`'s `RS` struct and
//! `RS_sets: vector<pair<string, vector<RS>>>` plus its
//! `find_free_rs_for_opcode` (first-free-by-index tie-break). This is an
//! original structure — the teacher's own backend is strictly in-order and
//! has no reservation stations at all — but borrows the teacher's
//! named-field-per-unit idiom (`config::CacheHierarchyConfig`'s `l1_i`/
//! `l1_d`/`l2`/`l3` fields) in place of the original's stringly-keyed
//! `vector<pair<string, ...>>`.

use crate::config::RsFamilySizes;
use crate::model::Opcode;

/// The eight functional-unit families named in specification §2/§4.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RsFamily {
    /// LOAD.
    Load,
    /// STORE.
    Store,
    /// BR/BEQ.
    Branch,
    /// ADD/SUB (share one family per the configuration table).
    AddSub,
    /// NAND.
    Nand,
    /// MUL.
    Mul,
    /// CALL.
    Call,
    /// RET.
    Ret,
}

impl RsFamily {
    /// Every family, in a fixed order used for pool construction and
    /// whole-pool iteration.
    pub const ALL: [Self; 8] = [
        Self::Load,
        Self::Store,
        Self::Branch,
        Self::AddSub,
        Self::Nand,
        Self::Mul,
        Self::Call,
        Self::Ret,
    ];

    /// Maps an opcode to the functional-unit family that executes it.
    pub fn for_opcode(opcode: Opcode) -> Self {
        match opcode {
            Opcode::Load => Self::Load,
            Opcode::Store => Self::Store,
            Opcode::Beq => Self::Branch,
            Opcode::Add | Opcode::Sub => Self::AddSub,
            Opcode::Nand => Self::Nand,
            Opcode::Mul => Self::Mul,
            Opcode::Call => Self::Call,
            Opcode::Ret => Self::Ret,
        }
    }

    /// `true` for the family whose writeback seeds `write_delay = 0`
    /// (STORE; every other family seeds `write_delay = 1`, per
    /// specification §4.3).
    fn is_store(self) -> bool {
        matches!(self, Self::Store)
    }
}

/// A single reservation-station slot.
///
/// Invariant (specification §3): if `busy` and a `q*` field is `None`, the
/// matching `v*` field holds the final operand value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReservationStation {
    /// Whether this slot holds an in-flight instruction.
    pub busy: bool,
    /// The opcode of the owning instruction (`None` when idle).
    pub opcode: Option<Opcode>,
    /// ROB index this instruction will write its result to.
    pub rob_dest: Option<u16>,
    /// First operand value (valid when `qj` is `None`).
    pub vj: u16,
    /// Second operand value (valid when `qk` is `None`).
    pub vk: u16,
    /// ROB index producing the first operand, or `None` if `vj` is final.
    pub qj: Option<u16>,
    /// ROB index producing the second operand, or `None` if `vk` is final.
    pub qk: Option<u16>,
    /// Address/immediate operand (LOAD/STORE offset).
    pub a: i32,
    /// Remaining execution cycles.
    pub exec_remaining: u32,
    /// Whether execution has begun (both required tags resolved at least
    /// once).
    pub started: bool,
    /// Cycles remaining before this entry may compete for the CDB, seeded
    /// at the cycle execution finishes (0 for STORE, 1 otherwise).
    pub write_delay: u32,
    /// Program index of the owning instruction (valid while `busy`).
    pub program_index: usize,
}

impl ReservationStation {
    /// Occupies this slot for a freshly issued instruction.
    #[allow(clippy::too_many_arguments)]
    pub fn occupy(
        &mut self,
        opcode: Opcode,
        rob_dest: Option<u16>,
        vj: u16,
        qj: Option<u16>,
        vk: u16,
        qk: Option<u16>,
        a: i32,
        exec_latency: u32,
        program_index: usize,
    ) {
        self.busy = true;
        self.opcode = Some(opcode);
        self.rob_dest = rob_dest;
        self.vj = vj;
        self.qj = qj;
        self.vk = vk;
        self.qk = qk;
        self.a = a;
        self.exec_remaining = exec_latency;
        self.started = false;
        self.write_delay = 0;
        self.program_index = program_index;
    }

    /// Releases this slot back to the free pool.
    pub fn release(&mut self) {
        *self = Self::default();
    }

    /// `true` once execution has finished (whether or not this entry has
    /// written back yet).
    pub fn exec_finished(&self) -> bool {
        self.busy && self.started && self.exec_remaining == 0
    }
}

/// The reservation-station pool: one `Vec` per functional-unit family, sized
/// by `Config::rs_sizes`.
#[derive(Debug, Clone)]
pub struct RsPool {
    load: Vec<ReservationStation>,
    store: Vec<ReservationStation>,
    branch: Vec<ReservationStation>,
    add_sub: Vec<ReservationStation>,
    nand: Vec<ReservationStation>,
    mul: Vec<ReservationStation>,
    call: Vec<ReservationStation>,
    ret: Vec<ReservationStation>,
}

impl RsPool {
    /// Builds a pool with per-family slot counts from `sizes`.
    pub fn new(sizes: &RsFamilySizes) -> Self {
        let slots = |n: usize| vec![ReservationStation::default(); n];
        Self {
            load: slots(sizes.get(RsFamily::Load)),
            store: slots(sizes.get(RsFamily::Store)),
            branch: slots(sizes.get(RsFamily::Branch)),
            add_sub: slots(sizes.get(RsFamily::AddSub)),
            nand: slots(sizes.get(RsFamily::Nand)),
            mul: slots(sizes.get(RsFamily::Mul)),
            call: slots(sizes.get(RsFamily::Call)),
            ret: slots(sizes.get(RsFamily::Ret)),
        }
    }

    /// Immutable access to one family's slots.
    pub fn family(&self, family: RsFamily) -> &[ReservationStation] {
        match family {
            RsFamily::Load => &self.load,
            RsFamily::Store => &self.store,
            RsFamily::Branch => &self.branch,
            RsFamily::AddSub => &self.add_sub,
            RsFamily::Nand => &self.nand,
            RsFamily::Mul => &self.mul,
            RsFamily::Call => &self.call,
            RsFamily::Ret => &self.ret,
        }
    }

    /// Mutable access to one family's slots.
    pub fn family_mut(&mut self, family: RsFamily) -> &mut Vec<ReservationStation> {
        match family {
            RsFamily::Load => &mut self.load,
            RsFamily::Store => &mut self.store,
            RsFamily::Branch => &mut self.branch,
            RsFamily::AddSub => &mut self.add_sub,
            RsFamily::Nand => &mut self.nand,
            RsFamily::Mul => &mut self.mul,
            RsFamily::Call => &mut self.call,
            RsFamily::Ret => &mut self.ret,
        }
    }

    /// Returns the index of the first free slot in `family`, by ascending
    /// index (the documented tie-break rule).
    pub fn find_free(&self, family: RsFamily) -> Option<usize> {
        self.family(family).iter().position(|rs| !rs.busy)
    }

    /// Seeds `write_delay` for a slot that has just finished execution,
    /// per the family's writeback-delay rule (0 for STORE, 1 otherwise).
    pub fn seed_write_delay(family: RsFamily) -> u32 {
        u32::from(!family.is_store())
    }

    /// Clears every busy slot whose owning instruction's address is
    /// strictly greater than `trigger_addr` (specification §4.7 step 1).
    /// Returns the program indices of every cleared instruction so the
    /// caller can reset their timing annotations.
    pub fn flush_younger_than(&mut self, trigger_addr: u64, addr_of: impl Fn(usize) -> u64) -> Vec<usize> {
        let mut cleared = Vec::new();
        for family in RsFamily::ALL {
            for rs in self.family_mut(family) {
                if rs.busy && addr_of(rs.program_index) > trigger_addr {
                    cleared.push(rs.program_index);
                    rs.release();
                }
            }
        }
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_free_is_first_by_index() {
        let mut pool = RsPool::new(&RsFamilySizes::default());
        assert_eq!(pool.find_free(RsFamily::AddSub), Some(0));
        pool.family_mut(RsFamily::AddSub)[0].busy = true;
        assert_eq!(pool.find_free(RsFamily::AddSub), Some(1));
    }

    #[test]
    fn family_exhaustion_reports_none() {
        let mut pool = RsPool::new(&RsFamilySizes::default());
        for rs in pool.family_mut(RsFamily::Mul) {
            rs.busy = true;
        }
        assert_eq!(pool.find_free(RsFamily::Mul), None);
    }

    #[test]
    fn flush_younger_than_clears_strictly_greater_addresses() {
        let mut pool = RsPool::new(&RsFamilySizes::default());
        pool.family_mut(RsFamily::AddSub)[0].busy = true;
        pool.family_mut(RsFamily::AddSub)[0].program_index = 0;
        pool.family_mut(RsFamily::AddSub)[1].busy = true;
        pool.family_mut(RsFamily::AddSub)[1].program_index = 1;

        let addr_of = |idx: usize| idx as u64;
        let cleared = pool.flush_younger_than(0, addr_of);

        assert_eq!(cleared, vec![1]);
        assert!(pool.family(RsFamily::AddSub)[0].busy);
        assert!(!pool.family(RsFamily::AddSub)[1].busy);
    }
}
