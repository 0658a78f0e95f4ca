#![allow(clippy::type_complexity)]

//! The validator as individual rule stages (to enable testing).

use ilgen_dsl::mnemonic::{InstructionRow, DEFAULT_LITERAL_PREFIX};
use log::debug;

use crate::issue::Issue;
use crate::result::RuleResult;
use crate::{rule_operand_stack, rule_output_unique};

/// Settings that influence how rows are classified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationContext {
    /// Prefix that marks a literal operand. A row with a blank opcode and
    /// such an operand is a parameter of the preceding instruction.
    pub literal_prefix: String,
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self {
            literal_prefix: DEFAULT_LITERAL_PREFIX.to_string(),
        }
    }
}

/// Validates the stream with the default context.
///
/// Returns every issue found, ordered by rule and then by row. An empty
/// list means the stream is well formed.
pub fn validate(rows: &[InstructionRow]) -> Vec<Issue> {
    validate_with(rows, &ValidationContext::default())
}

/// Validates the stream with the context.
///
/// The function is pure: validating the same stream twice yields the same
/// issues.
pub fn validate_with(rows: &[InstructionRow], context: &ValidationContext) -> Vec<Issue> {
    let rules: Vec<fn(&[InstructionRow], &ValidationContext) -> RuleResult> = vec![
        rule_operand_stack::apply,
        rule_output_unique::apply,
    ];

    let mut all_issues = vec![];
    for rule in rules {
        match rule(rows, context) {
            Ok(_) => {
                // Nothing to do here
            }
            Err(issues) => {
                all_issues.extend(issues);
            }
        }
    }

    debug!(
        "Validated {} rows with {} issues",
        rows.len(),
        all_issues.len()
    );
    all_issues
}

#[cfg(test)]
mod tests {
    use ilgen_dsl::mnemonic::rows_from_path;
    use ilgen_problems::Problem;
    use ilgen_test::shared_resource_path;
    use proptest::prelude::*;

    use super::*;
    use crate::issue::Severity;
    use crate::test_helpers::stream;

    fn shared_rows(name: &'static str) -> Vec<InstructionRow> {
        rows_from_path(&shared_resource_path(name)).unwrap()
    }

    #[test]
    fn validate_when_valid_rows_then_no_issues() {
        assert_eq!(validate(&shared_rows("valid_rows.json")), vec![]);
    }

    #[test]
    fn validate_when_invalid_rows_then_issues_in_row_order() {
        let issues = validate(&shared_rows("invalid_rows.json"));

        let found: Vec<(u32, Severity, Problem)> = issues
            .iter()
            .map(|i| (i.key, i.severity, i.problem))
            .collect();
        assert_eq!(
            found,
            vec![
                (1, Severity::Error, Problem::OpcodeBeforeLoad),
                (2, Severity::Error, Problem::NoConditionExpression),
                (5, Severity::Warn, Problem::UnresolvedBranches),
            ]
        );
    }

    #[test]
    fn validate_when_both_rules_fire_then_stack_issues_first() {
        let rows = stream(&[
            ("LD", "X0"),
            ("OUT", "Y10"),
            ("OUT", "Y10"),
            ("AND", "X1"),
            ("#", "next"),
            ("ANB", ""),
        ]);

        let problems: Vec<Problem> = validate(&rows).iter().map(|i| i.problem).collect();

        assert_eq!(
            problems,
            vec![
                Problem::OpcodeBeforeLoad,
                Problem::BlockWithoutBranch,
                Problem::DuplicateOutput
            ]
        );
    }

    #[test]
    fn validate_with_when_other_literal_prefix_then_parameter_rows_follow_prefix() {
        let rows = stream(&[("", "H10")]);
        let context = ValidationContext {
            literal_prefix: "H".to_string(),
        };

        let issues = validate_with(&rows, &context);

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].problem, Problem::ParameterWithoutInstruction);
        assert!(validate(&rows).is_empty());
    }

    fn arbitrary_row() -> impl Strategy<Value = (String, String)> {
        (
            prop_oneof![
                Just(""),
                Just("#"),
                Just("LD"),
                Just("LDI"),
                Just("AND"),
                Just("ORI"),
                Just("ANB"),
                Just("ORB"),
                Just("OUT"),
                Just("MOV"),
                Just("CALL"),
                Just("NOPLF"),
                Just("NOP"),
                Just("FROB"),
            ],
            prop_oneof![Just(""), Just("X0"), Just("Y1"), Just("K2")],
        )
            .prop_map(|(opcode, operand)| (opcode.to_string(), operand.to_string()))
    }

    proptest! {
        #[test]
        fn validate_when_called_twice_then_same_issues(
            rows in proptest::collection::vec(arbitrary_row(), 0..40)
        ) {
            let pairs: Vec<(&str, &str)> =
                rows.iter().map(|(o, p)| (o.as_str(), p.as_str())).collect();
            let stream = stream(&pairs);

            prop_assert_eq!(validate(&stream), validate(&stream));
        }

        #[test]
        fn validate_when_any_stream_then_issues_refer_to_rows(
            rows in proptest::collection::vec(arbitrary_row(), 0..40)
        ) {
            let pairs: Vec<(&str, &str)> =
                rows.iter().map(|(o, p)| (o.as_str(), p.as_str())).collect();
            let stream = stream(&pairs);

            for issue in validate(&stream) {
                prop_assert!(issue.key >= 1 && issue.key as usize <= stream.len());
            }
        }
    }
}
