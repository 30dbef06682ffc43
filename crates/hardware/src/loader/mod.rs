//! Program-file and memory-file parsers.
//!
//! Grounded on the teacher's `sim/loader.rs` role (the only code in the
//! crate that touches the filesystem) but reworked into fallible,
//! `Result`-returning functions: per `crate::lib`'s error-handling design,
//! the core never calls `process::exit`, so malformed input becomes a
//! [`crate::error::SimError`] for the caller (the CLI) to report.

/// Memory-image file parser (`address value` pairs).
pub mod memory_image;
/// Program-file parser (start address, then `opcode a b c` lines).
pub mod program;

pub use memory_image::{load_memory_file, parse_memory_image};
pub use program::{load_program_file, parse_program};

/// Strips a trailing `#` or `//` comment from a line, whichever starts
/// first; returns the line unchanged if neither is present.
fn strip_comment(line: &str) -> &str {
    let hash = line.find('#');
    let slashes = line.find("//");
    match (hash, slashes) {
        (Some(h), Some(s)) => &line[..h.min(s)],
        (Some(h), None) => &line[..h],
        (None, Some(s)) => &line[..s],
        (None, None) => line,
    }
}
