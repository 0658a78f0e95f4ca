//! Validation of ladder mnemonic streams.
//!
//! The validator accepts any stream of instruction rows, generated or
//! authored by hand, and returns the issues it finds as data. It never
//! fails.

pub mod issue;
mod result;
mod rule_operand_stack;
mod rule_output_unique;
pub mod stages;

#[cfg(test)]
mod test_helpers;

pub use issue::{Issue, Severity};
pub use stages::{validate, validate_with, ValidationContext};
