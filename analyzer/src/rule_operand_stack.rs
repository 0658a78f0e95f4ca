//! Validation rule that every instruction respects the operand stack.
//!
//! The rule runs an automaton over the stream. The automaton knows whether
//! an expression is open and how many parallel branches are waiting to be
//! combined.
//!
//! ## Passes
//!
//! ```text
//! LD  X0
//! LDI X1
//! ANB
//! OUT Y10
//! ```
//!
//! ## Fails
//!
//! ```text
//! OUT Y10
//! ```
use ilgen_dsl::mnemonic::{InstructionRow, OpcodeFamily};
use ilgen_problems::Problem;
use log::trace;

use crate::issue::Issue;
use crate::result::RuleResult;
use crate::stages::ValidationContext;

pub fn apply(rows: &[InstructionRow], context: &ValidationContext) -> RuleResult {
    let mut automaton = OperandStack::new(context);
    for row in rows {
        automaton.step(row);
    }
    automaton.finish();

    if !automaton.issues.is_empty() {
        return Err(automaton.issues);
    }
    Ok(())
}

/// How a row participates in the automaton.
enum RowKind {
    Comment,
    Parameter,
    Ignored,
    Instruction(Option<OpcodeFamily>),
}

struct OperandStack<'a> {
    context: &'a ValidationContext,
    has_expr: bool,
    /// Parallel branches opened by a nested load and not yet combined.
    branches: usize,
    /// The last row that is not a comment, parameter or ignored row.
    last_meaningful: Option<&'a InstructionRow>,
    issues: Vec<Issue>,
}

impl<'a> OperandStack<'a> {
    fn new(context: &'a ValidationContext) -> Self {
        Self {
            context,
            has_expr: false,
            branches: 0,
            last_meaningful: None,
            issues: vec![],
        }
    }

    fn classify(&self, row: &InstructionRow) -> RowKind {
        if !row.has_blank_opcode() {
            return RowKind::Instruction(row.opcode().map(|opcode| opcode.family()));
        }
        if row.has_statement() {
            return RowKind::Comment;
        }
        if row.operand.trim().starts_with(&self.context.literal_prefix) {
            return RowKind::Parameter;
        }
        RowKind::Ignored
    }

    fn step(&mut self, row: &'a InstructionRow) {
        let family = match self.classify(row) {
            RowKind::Comment => {
                self.reset();
                return;
            }
            RowKind::Parameter => {
                if self.last_meaningful.is_none() {
                    self.issues
                        .push(Issue::warn(row, Problem::ParameterWithoutInstruction));
                }
                return;
            }
            RowKind::Ignored => return,
            RowKind::Instruction(family) => family,
        };

        self.last_meaningful = Some(row);

        match family {
            Some(OpcodeFamily::Load { .. }) => {
                if self.has_expr {
                    self.branches += 1;
                }
                self.has_expr = true;
                self.require_operand(row);
            }
            Some(OpcodeFamily::Logic) => {
                if !self.has_expr {
                    self.issues.push(Issue::error(row, Problem::OpcodeBeforeLoad));
                }
                self.require_operand(row);
            }
            Some(OpcodeFamily::Block) => {
                if !self.has_expr {
                    self.issues.push(Issue::error(row, Problem::OpcodeBeforeLoad));
                }
                if self.branches == 0 {
                    self.issues.push(Issue::error(row, Problem::BlockWithoutBranch));
                } else {
                    self.branches -= 1;
                }
            }
            Some(OpcodeFamily::Call) => {
                if self.has_expr || self.branches > 0 {
                    self.issues.push(
                        Issue::warn(row, Problem::ConditionalCall)
                            .with_detail("consider an unconditional separator"),
                    );
                }
            }
            Some(OpcodeFamily::Consume) => {
                if !self.has_expr && self.branches == 0 {
                    self.issues
                        .push(Issue::error(row, Problem::NoConditionExpression));
                }
                self.require_operand(row);
            }
            Some(OpcodeFamily::Separator) => self.reset(),
            Some(OpcodeFamily::NoOp) => {}
            None => self
                .issues
                .push(Issue::warn(row, Problem::UnclassifiedInstruction)),
        }
        trace!(
            "Row {} {} leaves expression={} branches={}",
            row.key,
            row.opcode,
            self.has_expr,
            self.branches
        );
    }

    fn finish(&mut self) {
        if self.branches == 0 {
            return;
        }
        if let Some(row) = self.last_meaningful {
            self.issues.push(
                Issue::warn(row, Problem::UnresolvedBranches)
                    .with_detail(format!("{} unresolved branches", self.branches)),
            );
        }
    }

    fn reset(&mut self) {
        self.has_expr = false;
        self.branches = 0;
    }

    fn require_operand(&mut self, row: &InstructionRow) {
        if row.has_blank_operand() {
            self.issues.push(Issue::error(row, Problem::MissingOperand));
        }
    }
}
