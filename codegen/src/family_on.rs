//! Lowers the "ON" family: conditions that compare IO points directly.
//!
//! Operands are always taken in ascending index order. The multi-operand
//! forms open their own branch with `LD` and close it with a block
//! instruction so that they combine with the precondition prefix.

use ilgen_dsl::diagnostic::Diagnostic;
use ilgen_dsl::mnemonic::Opcode;
use ilgen_problems::Problem;

use crate::compile::ConditionScope;
use crate::emit::Instruction;

/// Single IO operand: `AND` or `ANI` of the first operand.
pub(crate) fn single(
    scope: &ConditionScope,
    opcode: Opcode,
) -> Result<Vec<Instruction>, Diagnostic> {
    let first = operand(scope, 0)?;
    Ok(vec![Instruction::new(opcode, first)])
}

/// The first operand, or the negation of the second.
pub(crate) fn dual_negated_pair(scope: &ConditionScope) -> Result<Vec<Instruction>, Diagnostic> {
    let first = operand(scope, 0)?;
    let second = operand(scope, 1)?;
    Ok(vec![
        Instruction::new(Opcode::Ld, first),
        Instruction::new(Opcode::Ori, second),
        Instruction::bare(Opcode::Anb),
    ])
}

/// Both operands on, or both operands off.
pub(crate) fn or_dual(scope: &ConditionScope) -> Result<Vec<Instruction>, Diagnostic> {
    let first = operand(scope, 0)?;
    let second = operand(scope, 1)?;
    Ok(vec![
        Instruction::new(Opcode::Ld, first),
        Instruction::new(Opcode::And, second),
        Instruction::new(Opcode::Ldi, first),
        Instruction::new(Opcode::Ani, second),
        Instruction::bare(Opcode::Orb),
        Instruction::bare(Opcode::Anb),
    ])
}

/// The first operand, or the negation of any other operand.
///
/// A single operand degenerates into a plain `AND`.
pub(crate) fn or_many(scope: &ConditionScope) -> Result<Vec<Instruction>, Diagnostic> {
    let first = operand(scope, 0)?;
    if scope.ios.len() == 1 {
        return Ok(vec![Instruction::new(Opcode::And, first)]);
    }

    let mut instructions = vec![Instruction::new(Opcode::Ld, first)];
    for position in 1..scope.ios.len() {
        instructions.push(Instruction::new(Opcode::Ori, operand(scope, position)?));
    }
    instructions.push(Instruction::bare(Opcode::Orb));
    Ok(instructions)
}

/// Returns the address of the operand at the position (in index order).
fn operand<'a>(scope: &ConditionScope<'a>, position: usize) -> Result<&'a str, Diagnostic> {
    scope
        .ios
        .get(position)
        .copied()
        .map(|io| io.address.trim())
        .filter(|address| !address.is_empty())
        .ok_or_else(|| {
            scope
                .problem(Problem::MissingIoOperand)
                .with_context("position", position)
        })
}

#[cfg(test)]
mod tests {
    use ilgen_dsl::model::ConditionKind;
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::test_helpers::{condition, cylinder, io, render, with_scope};

    fn lower(
        kind: ConditionKind,
        addresses: &[&str],
        f: fn(&ConditionScope) -> Result<Vec<Instruction>, Diagnostic>,
    ) -> Result<Vec<String>, Diagnostic> {
        let ios = addresses
            .iter()
            .enumerate()
            .map(|(index, address)| io(index as u32, address))
            .collect();
        let cond = condition(100, 1, kind, "M100", ios);
        with_scope(&cylinder(vec![]), &cond, &[], |scope| {
            f(scope).map(|instructions| render(&instructions))
        })
    }

    fn and_single(scope: &ConditionScope) -> Result<Vec<Instruction>, Diagnostic> {
        single(scope, Opcode::And)
    }

    fn ani_single(scope: &ConditionScope) -> Result<Vec<Instruction>, Diagnostic> {
        single(scope, Opcode::Ani)
    }

    #[test]
    fn single_when_normal_then_and() {
        let rows = lower(ConditionKind::On, &["X0"], and_single).unwrap();
        assert_eq!(rows, vec!["AND X0"]);
    }

    #[test]
    fn single_when_limit_then_ani() {
        let rows = lower(ConditionKind::Limit, &["X0", "X1"], ani_single).unwrap();
        assert_eq!(rows, vec!["ANI X0"]);
    }

    #[test]
    fn single_when_no_operand_then_missing_io_operand() {
        let err = lower(ConditionKind::On, &[], and_single).unwrap_err();
        assert_eq!(err.problem, Problem::MissingIoOperand);
        assert_eq!(err.owner.id, 100);
    }

    #[test]
    fn single_when_blank_address_then_missing_io_operand() {
        let err = lower(ConditionKind::On, &["  "], and_single).unwrap_err();
        assert_eq!(err.problem, Problem::MissingIoOperand);
    }

    #[test]
    fn dual_negated_pair_when_two_operands_then_ld_ori_anb() {
        let rows =
            lower(ConditionKind::DualNegatedPair, &["X0", "X1"], dual_negated_pair).unwrap();
        assert_eq!(rows, vec!["LD X0", "ORI X1", "ANB"]);
    }

    #[test]
    fn dual_negated_pair_when_one_operand_then_err() {
        let err =
            lower(ConditionKind::DualNegatedPair, &["X0"], dual_negated_pair).unwrap_err();
        assert_eq!(err.problem, Problem::MissingIoOperand);
        assert!(err.description().contains("position=1"));
    }

    #[test]
    fn or_dual_when_two_operands_then_fixed_six_rows() {
        let rows = lower(ConditionKind::OrDual, &["X0", "X1"], or_dual).unwrap();
        assert_eq!(
            rows,
            vec!["LD X0", "AND X1", "LDI X0", "ANI X1", "ORB", "ANB"]
        );
    }

    #[rstest]
    #[case(&["X0"], &["AND X0"])]
    #[case(&["X0", "X1"], &["LD X0", "ORI X1", "ORB"])]
    #[case(&["X0", "X1", "X2"], &["LD X0", "ORI X1", "ORI X2", "ORB"])]
    #[case(&["X0", "X1", "X2", "X3"], &["LD X0", "ORI X1", "ORI X2", "ORI X3", "ORB"])]
    fn or_many_when_operands_then_expected_rows(
        #[case] addresses: &[&str],
        #[case] expected: &[&str],
    ) {
        let rows = lower(ConditionKind::OrMany, addresses, or_many).unwrap();
        assert_eq!(rows, expected);
    }

    #[test]
    fn or_many_when_no_operands_then_err() {
        let err = lower(ConditionKind::OrMany, &[], or_many).unwrap_err();
        assert_eq!(err.problem, Problem::MissingIoOperand);
    }

    #[test]
    fn or_many_when_indexes_out_of_order_then_ordered_by_index() {
        let cond = condition(
            100,
            1,
            ConditionKind::OrMany,
            "M100",
            vec![io(2, "X2"), io(0, "X0"), io(1, "X1")],
        );

        let rows = with_scope(&cylinder(vec![]), &cond, &[], |scope| {
            render(&or_many(scope).unwrap())
        });
        assert_eq!(rows, vec!["LD X0", "ORI X1", "ORI X2", "ORB"]);
    }

    proptest! {
        #[test]
        fn or_many_when_n_operands_then_one_row_or_n_plus_one(n in 1usize..12) {
            let addresses: Vec<String> = (0..n).map(|i| format!("X{}", i)).collect();
            let refs: Vec<&str> = addresses.iter().map(String::as_str).collect();

            let rows = lower(ConditionKind::OrMany, &refs, or_many).unwrap();

            let expected = if n == 1 { 1 } else { n + 1 };
            prop_assert_eq!(rows.len(), expected);
        }
    }
}
