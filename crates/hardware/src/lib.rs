//! Tomasulo out-of-order pipeline simulator.
//!
//! This crate implements a cycle-accurate simulator of a Tomasulo-style
//! out-of-order processor with a Reorder Buffer (ROB), speculative
//! execution past unresolved branches, and in-order commit. It provides:
//! 1. **Model:** instruction records, a word-addressable memory image, the
//!    architectural register file, and the register status (rename) table.
//! 2. **Pipeline:** reservation stations, the ROB, common-data-bus
//!    writeback arbitration, and the four-stage `PipelineContext::tick()`
//!    controller (Execute → Write → Commit → Issue) with speculative-flush
//!    recovery on taken branches, CALL, and RET.
//! 3. **Loader:** parsers for the program-file and memory-file formats.
//! 4. **Config/Errors/Stats:** configuration constants, the error
//!    taxonomy, and pure performance-metric data.
//!
//! This crate performs no I/O beyond what the loader functions are handed
//! and never calls `std::process::exit`; the CLI binary (`tomasulo-sim`) is
//! the reporter and process boundary.

/// Simulator configuration: RS family sizes/latencies, ROB size, `max_cycles`.
pub mod config;
/// Error taxonomy for input/loader failures and runaway simulation.
pub mod error;
/// Program-file and memory-file loaders.
pub mod loader;
/// Data model: instruction records, memory image, registers, scoreboard.
pub mod model;
/// Pipeline engine: reservation stations, ROB, CDB, stage logic, controller.
pub mod pipeline;
/// Simulation statistics: cycles, IPC, branch count, mispredictions.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Error type returned by loaders and by a runaway simulation.
pub use crate::error::SimError;
/// Top-level pipeline state; construct with `PipelineContext::new`.
pub use crate::pipeline::controller::PipelineContext;
/// Final simulation report: per-instruction timing, architectural state, metrics.
pub use crate::stats::SimReport;
