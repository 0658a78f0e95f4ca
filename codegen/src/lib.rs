#![allow(clippy::result_large_err)]
//! Interlock ladder generation.
//!
//! This crate transforms a cylinder condition model (`GenerationInput`)
//! into a stream of ladder mnemonic rows. Each condition becomes a rung that
//! drives the condition's output bit and each cylinder ends with the
//! permission rungs that combine those outputs.
//!
//! # Condition families
//!
//! - ON: conditions on explicit IO operands (types 1 through 6)
//! - INV: sensors found by a naming convention (types 11 and 12)
//! - IL: references to other interlock bits (types 21 and 22)
//!
//! # Example
//!
//! ```ignore
//! use ilgen_codegen::generate;
//! use ilgen_dsl::model::GenerationInput;
//! use ilgen_dsl::options::GenerationOptions;
//!
//! let input = GenerationInput::from_path(&path)?;
//! let mut diagnostics = vec![];
//! let rows = generate(&input, &GenerationOptions::default(), &mut diagnostics);
//! ```

mod compile;
mod emit;
mod family_il;
mod family_inv;
mod family_on;
mod output;
mod precondition;

#[cfg(test)]
mod test_helpers;

pub use compile::{generate, generate_cylinder};
