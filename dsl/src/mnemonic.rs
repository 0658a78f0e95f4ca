//! Ladder mnemonic instruction rows.
//!
//! A row is the sole interchange format between the generator and the
//! validator. Rows mirror a mnemonic listing: a sequence key, a step label,
//! the instruction, its operand and an optional line statement.
use std::fmt;
use std::path::Path;

use phf::{phf_map, Map};
use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Prefix that marks a decimal literal operand, e.g. `K12`.
pub const DEFAULT_LITERAL_PREFIX: &str = "K";

/// One row of a mnemonic listing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionRow {
    pub key: u32,
    #[serde(default)]
    pub step: String,
    #[serde(default)]
    pub opcode: String,
    #[serde(default)]
    pub operand: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
}

impl InstructionRow {
    pub fn instruction(
        key: u32,
        step: impl Into<String>,
        opcode: Opcode,
        operand: impl Into<String>,
    ) -> Self {
        Self {
            key,
            step: step.into(),
            opcode: opcode.mnemonic().to_string(),
            operand: operand.into(),
            statement: None,
        }
    }

    pub fn statement(key: u32, text: impl Into<String>) -> Self {
        Self {
            key,
            step: String::new(),
            opcode: String::new(),
            operand: String::new(),
            statement: Some(text.into()),
        }
    }

    /// Returns the classified opcode, or `None` if the opcode is blank or
    /// is not part of the known instruction set.
    pub fn opcode(&self) -> Option<Opcode> {
        Opcode::parse(&self.opcode)
    }

    pub fn has_blank_opcode(&self) -> bool {
        self.opcode.trim().is_empty()
    }

    pub fn has_blank_operand(&self) -> bool {
        self.operand.trim().is_empty()
    }

    pub fn has_statement(&self) -> bool {
        self.statement
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
    }
}

impl fmt::Display for InstructionRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.statement {
            Some(text) if self.has_blank_opcode() => write!(f, "{:>5} ; {}", self.key, text),
            _ => write!(
                f,
                "{:>5} {:>5} {:<6} {}",
                self.key, self.step, self.opcode, self.operand
            ),
        }
    }
}

/// Loads a stream of rows from a JSON array.
pub fn rows_from_json(text: &str) -> Result<Vec<InstructionRow>, LoadError> {
    Ok(serde_json::from_str(text)?)
}

pub fn rows_from_path(path: &Path) -> Result<Vec<InstructionRow>, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    rows_from_json(&text)
}

/// The instruction set understood by the generator and the validator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    Ld,
    Ldi,
    Ldp,
    Ldf,
    And,
    Ani,
    Andp,
    Andf,
    Or,
    Ori,
    Orp,
    Orf,
    Anb,
    Orb,
    Out,
    Set,
    Rst,
    Pls,
    Plf,
    Mov,
    Movp,
    Dmov,
    Bmov,
    Fmov,
    Add,
    Sub,
    Mul,
    Div,
    Inc,
    Dec,
    Call,
    Callp,
    Noplf,
    Nop,
}

/// How an opcode interacts with the operand stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpcodeFamily {
    /// Starts a new expression (or a new parallel branch).
    Load { inverted: bool },
    /// Combines a contact into the open expression.
    Logic,
    /// Combines the two most recent branches.
    Block,
    /// Consumes the open expression (outputs, moves, arithmetic).
    Consume,
    /// Calls a subroutine.
    Call,
    /// Ends the current rung.
    Separator,
    /// Does nothing.
    NoOp,
}

static OPCODES: Map<&'static str, Opcode> = phf_map! {
    "LD" => Opcode::Ld,
    "LDI" => Opcode::Ldi,
    "LDP" => Opcode::Ldp,
    "LDF" => Opcode::Ldf,
    "AND" => Opcode::And,
    "ANI" => Opcode::Ani,
    "ANDP" => Opcode::Andp,
    "ANDF" => Opcode::Andf,
    "OR" => Opcode::Or,
    "ORI" => Opcode::Ori,
    "ORP" => Opcode::Orp,
    "ORF" => Opcode::Orf,
    "ANB" => Opcode::Anb,
    "ORB" => Opcode::Orb,
    "OUT" => Opcode::Out,
    "SET" => Opcode::Set,
    "RST" => Opcode::Rst,
    "PLS" => Opcode::Pls,
    "PLF" => Opcode::Plf,
    "MOV" => Opcode::Mov,
    "MOVP" => Opcode::Movp,
    "DMOV" => Opcode::Dmov,
    "BMOV" => Opcode::Bmov,
    "FMOV" => Opcode::Fmov,
    "ADD" => Opcode::Add,
    "SUB" => Opcode::Sub,
    "MUL" => Opcode::Mul,
    "DIV" => Opcode::Div,
    "INC" => Opcode::Inc,
    "DEC" => Opcode::Dec,
    "CALL" => Opcode::Call,
    "CALLP" => Opcode::Callp,
    "NOPLF" => Opcode::Noplf,
    "NOP" => Opcode::Nop,
};

impl Opcode {
    /// Parses an opcode ignoring case and surrounding whitespace.
    pub fn parse(text: &str) -> Option<Opcode> {
        OPCODES
            .get(text.trim().to_ascii_uppercase().as_str())
            .copied()
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Ld => "LD",
            Opcode::Ldi => "LDI",
            Opcode::Ldp => "LDP",
            Opcode::Ldf => "LDF",
            Opcode::And => "AND",
            Opcode::Ani => "ANI",
            Opcode::Andp => "ANDP",
            Opcode::Andf => "ANDF",
            Opcode::Or => "OR",
            Opcode::Ori => "ORI",
            Opcode::Orp => "ORP",
            Opcode::Orf => "ORF",
            Opcode::Anb => "ANB",
            Opcode::Orb => "ORB",
            Opcode::Out => "OUT",
            Opcode::Set => "SET",
            Opcode::Rst => "RST",
            Opcode::Pls => "PLS",
            Opcode::Plf => "PLF",
            Opcode::Mov => "MOV",
            Opcode::Movp => "MOVP",
            Opcode::Dmov => "DMOV",
            Opcode::Bmov => "BMOV",
            Opcode::Fmov => "FMOV",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Inc => "INC",
            Opcode::Dec => "DEC",
            Opcode::Call => "CALL",
            Opcode::Callp => "CALLP",
            Opcode::Noplf => "NOPLF",
            Opcode::Nop => "NOP",
        }
    }

    pub fn family(self) -> OpcodeFamily {
        match self {
            Opcode::Ld | Opcode::Ldp | Opcode::Ldf => OpcodeFamily::Load { inverted: false },
            Opcode::Ldi => OpcodeFamily::Load { inverted: true },
            Opcode::And
            | Opcode::Ani
            | Opcode::Andp
            | Opcode::Andf
            | Opcode::Or
            | Opcode::Ori
            | Opcode::Orp
            | Opcode::Orf => OpcodeFamily::Logic,
            Opcode::Anb | Opcode::Orb => OpcodeFamily::Block,
            Opcode::Out
            | Opcode::Set
            | Opcode::Rst
            | Opcode::Pls
            | Opcode::Plf
            | Opcode::Mov
            | Opcode::Movp
            | Opcode::Dmov
            | Opcode::Bmov
            | Opcode::Fmov
            | Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::Inc
            | Opcode::Dec => OpcodeFamily::Consume,
            Opcode::Call | Opcode::Callp => OpcodeFamily::Call,
            Opcode::Noplf => OpcodeFamily::Separator,
            Opcode::Nop => OpcodeFamily::NoOp,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
