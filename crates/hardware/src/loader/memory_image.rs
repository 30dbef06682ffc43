//! Memory-image file parser.
//!
//! Format: one `address value` pair per significant line. Values are stored
//! modulo 2^16; addresses outside the configured word range are silently
//! ignored (specification §6). `#` and `//` comments and blank lines are
//! stripped exactly as in `crate::loader::program`.

use std::fs;
use std::path::Path;

use crate::error::SimError;
use crate::model::Memory;

/// Reads and parses a memory-image file from disk into a freshly created
/// [`Memory`] of `word_count` words.
pub fn load_memory_file(path: &Path, word_count: usize) -> Result<Memory, SimError> {
    let text = fs::read_to_string(path).map_err(|source| SimError::MemoryFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_memory_image(&text, word_count)
}

/// Parses memory-image text already in memory into a freshly created
/// [`Memory`] of `word_count` words.
pub fn parse_memory_image(text: &str, word_count: usize) -> Result<Memory, SimError> {
    let mut memory = Memory::new(word_count);

    for (line_no, raw) in text.lines().enumerate() {
        let trimmed = super::strip_comment(raw).trim();
        if trimmed.is_empty() {
            continue;
        }

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if fields.len() != 2 {
            return Err(SimError::MalformedMemory {
                line: line_no + 1,
                reason: format!("expected `address value`, found {trimmed:?}"),
            });
        }

        let addr: u64 = fields[0].parse().map_err(|_| SimError::MalformedMemory {
            line: line_no + 1,
            reason: format!("{:?} is not a valid address", fields[0]),
        })?;
        let raw_value: i64 = fields[1].parse().map_err(|_| SimError::MalformedMemory {
            line: line_no + 1,
            reason: format!("{:?} is not a valid integer value", fields[1]),
        })?;
        let value = raw_value.rem_euclid(1 << 16) as u16;

        memory.seed(addr, value);
    }

    Ok(memory)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_address_value_pairs() {
        let text = "# seed data\n10 7\n11 65536\n"; // 65536 mod 2^16 == 0
        let mem = parse_memory_image(text, 16).unwrap();
        assert_eq!(mem.read(10), 7);
        assert_eq!(mem.read(11), 0);
    }

    #[test]
    fn out_of_range_addresses_are_ignored() {
        let text = "1000 42\n";
        let mem = parse_memory_image(text, 16).unwrap();
        assert_eq!(mem.snapshot(), vec![0; 16]);
    }

    #[test]
    fn negative_values_wrap_modulo_2_16() {
        let text = "0 -1\n";
        let mem = parse_memory_image(text, 4).unwrap();
        assert_eq!(mem.read(0), 0xFFFF);
    }

    #[test]
    fn rejects_malformed_line() {
        let text = "0 1 2\n";
        let err = parse_memory_image(text, 4).unwrap_err();
        assert!(matches!(err, SimError::MalformedMemory { line: 1, .. }));
    }
}
