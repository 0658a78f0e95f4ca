//! Low-level mnemonic emitter.
//!
//! Provides a builder that appends instructions and line statements to a
//! row stream, assigning sequence keys and step labels as it goes.

use ilgen_dsl::mnemonic::{InstructionRow, Opcode};

/// An instruction that has not yet been placed in a stream.
///
/// Generators produce fragments of these. Only the emitter knows the key
/// and step a fragment will occupy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Instruction {
    pub opcode: Opcode,
    pub operand: String,
}

impl Instruction {
    pub fn new(opcode: Opcode, operand: impl Into<String>) -> Self {
        Self {
            opcode,
            operand: operand.into(),
        }
    }

    /// Creates an instruction that takes no operand (ANB, ORB, NOP).
    pub fn bare(opcode: Opcode) -> Self {
        Self {
            opcode,
            operand: String::new(),
        }
    }
}

/// Accumulates mnemonic rows.
pub(crate) struct Emitter {
    rows: Vec<InstructionRow>,
    next_key: u32,
    next_step: u32,
}

impl Emitter {
    pub fn new() -> Self {
        Emitter {
            rows: Vec::new(),
            next_key: 1,
            next_step: 0,
        }
    }

    /// Emits one instruction at the next step.
    pub fn emit(&mut self, instruction: &Instruction) {
        let key = self.take_key();
        let step = self.next_step;
        self.next_step += 1;
        self.rows.push(InstructionRow::instruction(
            key,
            step.to_string(),
            instruction.opcode,
            instruction.operand.clone(),
        ));
    }

    /// Emits a fragment in order.
    pub fn emit_all(&mut self, instructions: &[Instruction]) {
        for instruction in instructions {
            self.emit(instruction);
        }
    }

    /// Emits a line statement. Statements do not occupy a step.
    pub fn emit_statement(&mut self, text: impl Into<String>) {
        let key = self.take_key();
        self.rows.push(InstructionRow::statement(key, text));
    }

    /// Emits NOP (no operation).
    pub fn emit_nop(&mut self) {
        self.emit(&Instruction::bare(Opcode::Nop));
    }

    pub fn into_rows(self) -> Vec<InstructionRow> {
        self.rows
    }

    fn take_key(&mut self) -> u32 {
        let key = self.next_key;
        self.next_key += 1;
        key
    }
}
