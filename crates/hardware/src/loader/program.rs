//! Program-file parser.
//!
//! Format: the first significant line is a single integer, the start
//! address; every following significant line is `opcode a b c`, with
//! addresses assigned sequentially from the start address. `#` and `//`
//! introduce comments; blank lines are ignored.

use std::fs;
use std::path::Path;

use crate::error::SimError;
use crate::model::{Instruction, Opcode};

/// Reads and parses a program file from disk.
pub fn load_program_file(path: &Path) -> Result<(u64, Vec<Instruction>), SimError> {
    let text = fs::read_to_string(path).map_err(|source| SimError::ProgramFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_program(&text)
}

/// Parses program-file text already in memory.
pub fn parse_program(text: &str) -> Result<(u64, Vec<Instruction>), SimError> {
    let mut lines = significant_lines(text);

    let (first_line_no, first_line) = lines.next().ok_or_else(|| SimError::MalformedProgram {
        line: 1,
        reason: "program file has no start-address line".to_string(),
    })?;
    let start_address: u64 = first_line.parse().map_err(|_| SimError::MalformedProgram {
        line: first_line_no,
        reason: format!("expected a start address integer, found {first_line:?}"),
    })?;

    let mut program = Vec::new();
    let mut address = start_address;
    for (line_no, line) in lines {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 4 {
            return Err(SimError::MalformedProgram {
                line: line_no,
                reason: format!("expected `opcode a b c`, found {line:?}"),
            });
        }

        let parse_int = |s: &str| -> Result<i64, SimError> {
            s.parse().map_err(|_| SimError::MalformedProgram {
                line: line_no,
                reason: format!("{s:?} is not an integer"),
            })
        };
        let code = parse_int(fields[0])?;
        let opcode = Opcode::from_code(code).ok_or_else(|| SimError::MalformedProgram {
            line: line_no,
            reason: format!("opcode {code} is outside the valid range 1..=9"),
        })?;
        let rd = parse_int(fields[1])? as i32;
        let rs1 = parse_int(fields[2])? as i32;
        let rs2_imm = parse_int(fields[3])? as i32;

        program.push(Instruction::new(program.len(), address, opcode, rd, rs1, rs2_imm));
        address += 1;
    }

    Ok((start_address, program))
}

/// Yields `(1-based line number, comment-stripped trimmed text)` for every
/// non-blank line.
fn significant_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines().enumerate().filter_map(|(i, raw)| {
        let trimmed = super::strip_comment(raw).trim();
        (!trimmed.is_empty()).then_some((i + 1, trimmed))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_start_address_and_instructions() {
        let text = "\
            # a tiny program\n\
            0\n\
            4 1 0 0  // ADD r1, r0, r0\n\
            9 0 0 0\n\
        ";
        let (start, program) = parse_program(text).unwrap();
        assert_eq!(start, 0);
        assert_eq!(program.len(), 2);
        assert_eq!(program[0].opcode, Opcode::Add);
        assert_eq!(program[0].address, 0);
        assert_eq!(program[1].opcode, Opcode::Ret);
        assert_eq!(program[1].address, 1);
    }

    #[test]
    fn rejects_unknown_opcode() {
        let text = "0\n99 0 0 0\n";
        let err = parse_program(text).unwrap_err();
        assert!(matches!(err, SimError::MalformedProgram { line: 2, .. }));
    }

    #[test]
    fn rejects_wrong_field_count() {
        let text = "0\n4 1 0\n";
        let err = parse_program(text).unwrap_err();
        assert!(matches!(err, SimError::MalformedProgram { line: 2, .. }));
    }

    #[test]
    fn addresses_assigned_sequentially_from_start() {
        let text = "100\n9 0 0 0\n9 0 0 0\n9 0 0 0\n";
        let (_, program) = parse_program(text).unwrap();
        assert_eq!(program.iter().map(|i| i.address).collect::<Vec<_>>(), vec![100, 101, 102]);
    }
}
