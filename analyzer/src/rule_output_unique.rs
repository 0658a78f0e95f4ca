//! Validation rule that each device is the target of at most one `OUT`.
//!
//! A device driven by two `OUT` instructions (a double coil) takes the
//! value of whichever rung runs last.
//!
//! ## Passes
//!
//! ```text
//! LD  X0
//! OUT Y10
//! LD  X1
//! OUT Y11
//! ```
//!
//! ## Fails
//!
//! ```text
//! LD  X0
//! OUT Y10
//! LD  X1
//! OUT Y10
//! ```
use std::collections::HashSet;

use ilgen_dsl::mnemonic::{InstructionRow, Opcode};
use ilgen_problems::Problem;

use crate::issue::Issue;
use crate::result::RuleResult;
use crate::stages::ValidationContext;

pub fn apply(rows: &[InstructionRow], _context: &ValidationContext) -> RuleResult {
    let mut seen = HashSet::new();
    let mut issues = vec![];

    for row in rows {
        if row.opcode() != Some(Opcode::Out) || row.has_blank_operand() {
            continue;
        }
        let device = row.operand.trim().to_ascii_uppercase();
        if !seen.insert(device) {
            issues.push(
                Issue::warn(row, Problem::DuplicateOutput)
                    .with_detail(format!("device {}", row.operand.trim())),
            );
        }
    }

    if !issues.is_empty() {
        return Err(issues);
    }
    Ok(())
}
