//! Issues found while validating a mnemonic stream.
use std::fmt;

use ilgen_dsl::mnemonic::InstructionRow;
use ilgen_problems::Problem;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// The stream would be rejected by, or misbehave on, the target.
    Error,
    /// The pattern is suspicious but not certainly wrong.
    Warn,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warn => f.write_str("warning"),
        }
    }
}

/// A problem with one row of a stream.
///
/// The issue copies the identifying fields of the row so that it can be
/// reported without the stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Issue {
    pub key: u32,
    pub step: String,
    pub opcode: String,
    pub operand: String,
    pub severity: Severity,

    /// A normally unique value describing the type of issue.
    pub code: String,
    pub problem: Problem,
    pub message: String,
}

impl Issue {
    /// Creates an issue about the row. The message starts with the opcode
    /// of the row so that it reads on its own.
    pub fn at(row: &InstructionRow, severity: Severity, problem: Problem) -> Self {
        let opcode = row.opcode.trim();
        let message = if opcode.is_empty() {
            problem.message().to_string()
        } else {
            format!("{}: {}", opcode.to_ascii_uppercase(), problem.message())
        };
        Self {
            key: row.key,
            step: row.step.clone(),
            opcode: row.opcode.clone(),
            operand: row.operand.clone(),
            severity,
            code: problem.code().to_string(),
            problem,
            message,
        }
    }

    pub fn error(row: &InstructionRow, problem: Problem) -> Self {
        Self::at(row, Severity::Error, problem)
    }

    pub fn warn(row: &InstructionRow, problem: Problem) -> Self {
        Self::at(row, Severity::Warn, problem)
    }

    /// Adds detail to the message.
    pub fn with_detail(mut self, detail: impl fmt::Display) -> Self {
        self.message = format!("{} ({})", self.message, detail);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: row {} step {}: {}",
            self.severity, self.code, self.key, self.step, self.message
        )
    }
}
