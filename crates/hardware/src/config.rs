//! Configuration system for the Tomasulo pipeline simulator.
//!
//! This module defines the structures that parameterize the simulator. It
//! provides:
//! 1. **Defaults:** the functional-unit family sizes and latencies from the
//!    specification's configuration table.
//! 2. **Structures:** a flat `Config` plus per-family size/latency tables
//!    keyed by [`RsFamily`].
//!
//! Configuration is supplied as JSON by the CLI (`--config`) or via
//! `Config::default()`, which reproduces the specification's table exactly.

use serde::Deserialize;

use crate::pipeline::rs::RsFamily;

/// Default configuration constants for the simulator.
///
/// These are the functional-unit family sizes and latencies documented in
/// the specification's configuration table; they are the values used when
/// no `--config` file is supplied.
mod defaults {
    /// Reorder buffer capacity (in-flight instruction slots).
    pub const ROB_SIZE: usize = 8;
    /// Architectural register count (R0..R7).
    pub const REGISTER_COUNT: usize = 8;
    /// Memory image size in 16-bit words.
    pub const MEMORY_WORDS: usize = 64_000;
    /// Runaway guard: cycles after which the simulation aborts.
    pub const MAX_CYCLES: u64 = 1_000_000;

    /// Reservation station counts per functional-unit family.
    pub const RS_LOAD: usize = 2;
    pub const RS_STORE: usize = 1;
    pub const RS_BRANCH: usize = 2;
    pub const RS_ADD_SUB: usize = 4;
    pub const RS_NAND: usize = 2;
    pub const RS_MUL: usize = 1;
    pub const RS_CALL: usize = 1;
    pub const RS_RET: usize = 1;

    /// Execution latency (cycles) per functional-unit family.
    pub const EXEC_LOAD: u32 = 6;
    pub const EXEC_STORE: u32 = 1;
    pub const EXEC_BRANCH: u32 = 1;
    pub const EXEC_ADD_SUB: u32 = 2;
    pub const EXEC_NAND: u32 = 1;
    pub const EXEC_MUL: u32 = 12;
    pub const EXEC_CALL: u32 = 1;
    pub const EXEC_RET: u32 = 1;

    /// Commit latency (cycles) per functional-unit family.
    pub const COMMIT_LOAD: u32 = 1;
    pub const COMMIT_STORE: u32 = 4;
    pub const COMMIT_BRANCH: u32 = 1;
    pub const COMMIT_ADD_SUB: u32 = 1;
    pub const COMMIT_NAND: u32 = 1;
    pub const COMMIT_MUL: u32 = 1;
    pub const COMMIT_CALL: u32 = 1;
    pub const COMMIT_RET: u32 = 1;
}

/// Per-family reservation-station slot counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RsFamilySizes {
    /// LOAD family slot count.
    #[serde(default = "RsFamilySizes::default_load")]
    pub load: usize,
    /// STORE family slot count.
    #[serde(default = "RsFamilySizes::default_store")]
    pub store: usize,
    /// BR/BEQ family slot count.
    #[serde(default = "RsFamilySizes::default_branch")]
    pub branch: usize,
    /// ADD/SUB family slot count.
    #[serde(default = "RsFamilySizes::default_add_sub")]
    pub add_sub: usize,
    /// NAND family slot count.
    #[serde(default = "RsFamilySizes::default_nand")]
    pub nand: usize,
    /// MUL family slot count.
    #[serde(default = "RsFamilySizes::default_mul")]
    pub mul: usize,
    /// CALL family slot count.
    #[serde(default = "RsFamilySizes::default_call")]
    pub call: usize,
    /// RET family slot count.
    #[serde(default = "RsFamilySizes::default_ret")]
    pub ret: usize,
}

impl RsFamilySizes {
    fn default_load() -> usize {
        defaults::RS_LOAD
    }
    fn default_store() -> usize {
        defaults::RS_STORE
    }
    fn default_branch() -> usize {
        defaults::RS_BRANCH
    }
    fn default_add_sub() -> usize {
        defaults::RS_ADD_SUB
    }
    fn default_nand() -> usize {
        defaults::RS_NAND
    }
    fn default_mul() -> usize {
        defaults::RS_MUL
    }
    fn default_call() -> usize {
        defaults::RS_CALL
    }
    fn default_ret() -> usize {
        defaults::RS_RET
    }

    /// Returns the slot count for the given family.
    pub fn get(&self, family: RsFamily) -> usize {
        match family {
            RsFamily::Load => self.load,
            RsFamily::Store => self.store,
            RsFamily::Branch => self.branch,
            RsFamily::AddSub => self.add_sub,
            RsFamily::Nand => self.nand,
            RsFamily::Mul => self.mul,
            RsFamily::Call => self.call,
            RsFamily::Ret => self.ret,
        }
    }
}

impl Default for RsFamilySizes {
    fn default() -> Self {
        Self {
            load: defaults::RS_LOAD,
            store: defaults::RS_STORE,
            branch: defaults::RS_BRANCH,
            add_sub: defaults::RS_ADD_SUB,
            nand: defaults::RS_NAND,
            mul: defaults::RS_MUL,
            call: defaults::RS_CALL,
            ret: defaults::RS_RET,
        }
    }
}

/// Per-family cycle counts, reused for both execution and commit latency
/// tables (same shape, different values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RsFamilyLatencies {
    /// LOAD family latency.
    #[serde(default = "RsFamilyLatencies::default_load")]
    pub load: u32,
    /// STORE family latency.
    #[serde(default = "RsFamilyLatencies::default_store")]
    pub store: u32,
    /// BR/BEQ family latency.
    #[serde(default = "RsFamilyLatencies::default_branch")]
    pub branch: u32,
    /// ADD/SUB family latency.
    #[serde(default = "RsFamilyLatencies::default_add_sub")]
    pub add_sub: u32,
    /// NAND family latency.
    #[serde(default = "RsFamilyLatencies::default_nand")]
    pub nand: u32,
    /// MUL family latency.
    #[serde(default = "RsFamilyLatencies::default_mul")]
    pub mul: u32,
    /// CALL family latency.
    #[serde(default = "RsFamilyLatencies::default_call")]
    pub call: u32,
    /// RET family latency.
    #[serde(default = "RsFamilyLatencies::default_ret")]
    pub ret: u32,
}

impl RsFamilyLatencies {
    fn default_load() -> u32 {
        defaults::EXEC_LOAD
    }
    fn default_store() -> u32 {
        defaults::EXEC_STORE
    }
    fn default_branch() -> u32 {
        defaults::EXEC_BRANCH
    }
    fn default_add_sub() -> u32 {
        defaults::EXEC_ADD_SUB
    }
    fn default_nand() -> u32 {
        defaults::EXEC_NAND
    }
    fn default_mul() -> u32 {
        defaults::EXEC_MUL
    }
    fn default_call() -> u32 {
        defaults::EXEC_CALL
    }
    fn default_ret() -> u32 {
        defaults::EXEC_RET
    }

    /// Builds the default execution-latency table (specification §4.6,
    /// exec-latency column).
    pub fn default_exec() -> Self {
        Self {
            load: defaults::EXEC_LOAD,
            store: defaults::EXEC_STORE,
            branch: defaults::EXEC_BRANCH,
            add_sub: defaults::EXEC_ADD_SUB,
            nand: defaults::EXEC_NAND,
            mul: defaults::EXEC_MUL,
            call: defaults::EXEC_CALL,
            ret: defaults::EXEC_RET,
        }
    }

    /// Builds the default commit-latency table (specification §4.6,
    /// commit-latency column).
    pub fn default_commit() -> Self {
        Self {
            load: defaults::COMMIT_LOAD,
            store: defaults::COMMIT_STORE,
            branch: defaults::COMMIT_BRANCH,
            add_sub: defaults::COMMIT_ADD_SUB,
            nand: defaults::COMMIT_NAND,
            mul: defaults::COMMIT_MUL,
            call: defaults::COMMIT_CALL,
            ret: defaults::COMMIT_RET,
        }
    }

    /// Returns the latency for the given family.
    pub fn get(&self, family: RsFamily) -> u32 {
        match family {
            RsFamily::Load => self.load,
            RsFamily::Store => self.store,
            RsFamily::Branch => self.branch,
            RsFamily::AddSub => self.add_sub,
            RsFamily::Nand => self.nand,
            RsFamily::Mul => self.mul,
            RsFamily::Call => self.call,
            RsFamily::Ret => self.ret,
        }
    }
}

/// Root configuration structure containing all simulator settings.
///
/// Configuration is supplied as JSON via `--config` or `Config::default()`
/// reproduces the specification's configuration table.
///
/// # Examples
///
/// ```
/// use tomasulo_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.rob_size, 8);
/// assert_eq!(config.rs_sizes.mul, 1);
/// ```
///
/// Deserializing a partial override from JSON:
///
/// ```
/// use tomasulo_core::config::Config;
///
/// let json = r#"{ "max_cycles": 500 }"#;
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.max_cycles, 500);
/// assert_eq!(config.rob_size, 8);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Reservation-station slot counts, one per functional-unit family.
    #[serde(default)]
    pub rs_sizes: RsFamilySizes,
    /// Execution latencies (cycles), one per functional-unit family.
    #[serde(default = "RsFamilyLatencies::default_exec")]
    pub exec_latencies: RsFamilyLatencies,
    /// Commit latencies (cycles), one per functional-unit family.
    #[serde(default = "RsFamilyLatencies::default_commit")]
    pub commit_latencies: RsFamilyLatencies,
    /// Reorder buffer capacity.
    #[serde(default = "Config::default_rob_size")]
    pub rob_size: usize,
    /// Architectural register count.
    #[serde(default = "Config::default_register_count")]
    pub register_count: usize,
    /// Memory image size, in 16-bit words.
    #[serde(default = "Config::default_memory_words")]
    pub memory_words: usize,
    /// Runaway guard: cycle count after which simulation aborts with an error.
    #[serde(default = "Config::default_max_cycles")]
    pub max_cycles: u64,
}

impl Config {
    fn default_rob_size() -> usize {
        defaults::ROB_SIZE
    }

    fn default_register_count() -> usize {
        defaults::REGISTER_COUNT
    }

    fn default_memory_words() -> usize {
        defaults::MEMORY_WORDS
    }

    fn default_max_cycles() -> u64 {
        defaults::MAX_CYCLES
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rs_sizes: RsFamilySizes::default(),
            exec_latencies: RsFamilyLatencies::default_exec(),
            commit_latencies: RsFamilyLatencies::default_commit(),
            rob_size: defaults::ROB_SIZE,
            register_count: defaults::REGISTER_COUNT,
            memory_words: defaults::MEMORY_WORDS,
            max_cycles: defaults::MAX_CYCLES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_spec_table() {
        let cfg = Config::default();
        assert_eq!(cfg.rs_sizes.get(RsFamily::Load), 2);
        assert_eq!(cfg.rs_sizes.get(RsFamily::Store), 1);
        assert_eq!(cfg.rs_sizes.get(RsFamily::Branch), 2);
        assert_eq!(cfg.rs_sizes.get(RsFamily::AddSub), 4);
        assert_eq!(cfg.rs_sizes.get(RsFamily::Nand), 2);
        assert_eq!(cfg.rs_sizes.get(RsFamily::Mul), 1);
        assert_eq!(cfg.rs_sizes.get(RsFamily::Call), 1);
        assert_eq!(cfg.rs_sizes.get(RsFamily::Ret), 1);

        assert_eq!(cfg.exec_latencies.get(RsFamily::Load), 6);
        assert_eq!(cfg.exec_latencies.get(RsFamily::Store), 1);
        assert_eq!(cfg.exec_latencies.get(RsFamily::Mul), 12);
        assert_eq!(cfg.commit_latencies.get(RsFamily::Store), 4);
        assert_eq!(cfg.rob_size, 8);
    }

    #[test]
    fn deserializes_partial_override() {
        let json = r#"{ "rob_size": 16 }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.rob_size, 16);
        assert_eq!(cfg.rs_sizes.get(RsFamily::Load), 2);
    }
}
