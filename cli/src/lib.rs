//! Command line front-end for the interlock generator and the mnemonic
//! validator.

pub mod cli;
pub mod logger;
