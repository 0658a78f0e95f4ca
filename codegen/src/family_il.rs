//! Lowers the "IL" family: conditions that refer to the bit of another
//! interlock.

use ilgen_dsl::diagnostic::Diagnostic;
use ilgen_dsl::mnemonic::Opcode;
use ilgen_dsl::model::Polarity;
use ilgen_problems::Problem;

use crate::compile::ConditionScope;
use crate::emit::Instruction;

/// `AND` (polarity on) or `ANI` (polarity off) of the referenced bit.
pub(crate) fn reference(scope: &ConditionScope) -> Result<Vec<Instruction>, Diagnostic> {
    let device = scope
        .condition
        .referenced_device()
        .ok_or_else(|| scope.problem(Problem::MissingReference))?;

    let opcode = match scope.condition.polarity {
        Polarity::On => Opcode::And,
        Polarity::Off => Opcode::Ani,
    };
    Ok(vec![Instruction::new(opcode, device)])
}

/// `ANI` of the first IO operand.
///
/// IO-gated interlocks are taken as normally closed: the polarity stored on
/// the operand and any further operands are not used.
pub(crate) fn io_gated(scope: &ConditionScope) -> Result<Vec<Instruction>, Diagnostic> {
    let first = scope
        .ios
        .first()
        .map(|io| io.address.trim())
        .filter(|address| !address.is_empty())
        .ok_or_else(|| {
            scope
                .problem(Problem::MissingIoOperand)
                .with_context("position", 0)
        })?;
    Ok(vec![Instruction::new(Opcode::Ani, first)])
}
