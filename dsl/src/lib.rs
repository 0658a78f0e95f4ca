//! Provides definitions of the cylinder interlock condition model, the
//! ladder mnemonic rows generated from it and the diagnostics reported
//! along the way.

pub mod diagnostic;
pub mod error;
pub mod mnemonic;
pub mod model;
pub mod options;
