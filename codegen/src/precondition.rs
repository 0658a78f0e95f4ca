//! Generates the precondition prefix of an interlock.
//!
//! Three independent policies gate every condition of an interlock. They run
//! in a fixed order: run mode, process range, then IO/device. The run-mode
//! policy is the one that opens the expression (`LD`), so an interlock
//! without it cannot be lowered.

use ilgen_dsl::diagnostic::{Diagnostic, ErrorSink, Owner};
use ilgen_dsl::mnemonic::Opcode;
use ilgen_dsl::model::{
    Cylinder, Direction, Interlock, IoDevicePrecondition, Polarity, ProcessDetail, ProcessRange,
    RunMode,
};
use ilgen_dsl::options::GenerationOptions;
use ilgen_problems::Problem;
use log::trace;

use crate::emit::Instruction;
use crate::output::{self, BACKWARD_AUTO, BACKWARD_MANUAL, FORWARD_AUTO, FORWARD_MANUAL};

/// Builds the prefix shared by every condition of the interlock.
///
/// Returns `None` (after reporting) when the interlock cannot be lowered.
/// Problems with optional policies are reported and the policy contributes
/// nothing.
pub(crate) fn prefix(
    cylinder: &Cylinder,
    interlock: &Interlock,
    details: &[ProcessDetail],
    options: &GenerationOptions,
    sink: &mut dyn ErrorSink,
) -> Option<Vec<Instruction>> {
    let Some(mode) = interlock.run_mode else {
        sink.report(Diagnostic::problem(
            Problem::MissingRunModePrecondition,
            Owner::interlock(cylinder, interlock),
        ));
        return None;
    };

    let Some(mut instructions) = run_mode(cylinder, mode, interlock.direction, options) else {
        sink.report(output::out_of_range(cylinder));
        return None;
    };

    if let Some(range) = &interlock.process_range {
        instructions.extend(process_range(range, details));
    }

    if let Some(io_device) = &interlock.io_device {
        match io_device_gate(io_device) {
            Some(instruction) => instructions.push(instruction),
            None => sink.report(
                Diagnostic::problem(
                    Problem::UnresolvedPrecondition,
                    Owner::interlock(cylinder, interlock),
                )
                .with_context("kind", format!("{:?}", io_device.kind).to_lowercase()),
            ),
        }
    }

    Some(instructions)
}

/// Loads the request devices selected by mode and direction, ORs them
/// together and gates the result with the mode signal.
///
/// Returns `None` if a request device is outside the address range.
pub(crate) fn run_mode(
    cylinder: &Cylinder,
    mode: RunMode,
    direction: Direction,
    options: &GenerationOptions,
) -> Option<Vec<Instruction>> {
    let mut instructions = request_offsets(mode, direction)
        .into_iter()
        .enumerate()
        .map(|(position, offset)| {
            let opcode = if position == 0 { Opcode::Ld } else { Opcode::Or };
            Some(Instruction::new(opcode, cylinder.device(offset)?))
        })
        .collect::<Option<Vec<Instruction>>>()?;

    instructions.push(match mode {
        RunMode::Auto => Instruction::new(Opcode::And, options.auto_pause_signal.as_str()),
        RunMode::Manual => Instruction::new(Opcode::Ani, options.manual_pause_signal.as_str()),
        RunMode::Always => Instruction::new(Opcode::And, options.always_on_signal.as_str()),
    });
    Some(instructions)
}

/// Offsets of the request devices, forward before backward, manual before auto.
fn request_offsets(mode: RunMode, direction: Direction) -> Vec<u32> {
    let pairs: &[(u32, u32)] = match mode {
        RunMode::Manual => &[(FORWARD_MANUAL, BACKWARD_MANUAL)],
        RunMode::Auto => &[(FORWARD_AUTO, BACKWARD_AUTO)],
        RunMode::Always => &[
            (FORWARD_MANUAL, BACKWARD_MANUAL),
            (FORWARD_AUTO, BACKWARD_AUTO),
        ],
    };

    let mut offsets = vec![];
    for (forward, backward) in pairs {
        if direction.includes_forward() {
            offsets.push(*forward);
        }
        if direction.includes_backward() {
            offsets.push(*backward);
        }
    }
    offsets
}

/// Selects the process steps within the range.
///
/// Process-range gating does not lower to any instruction yet; the steps
/// are selected so that the range is validated against the process list.
pub(crate) fn process_range(range: &ProcessRange, details: &[ProcessDetail]) -> Vec<Instruction> {
    let selected = details
        .iter()
        .filter(|d| d.id >= range.start_id && d.id <= range.end_id)
        .count();
    trace!(
        "Process range {}..={} selects {} steps",
        range.start_id,
        range.end_id,
        selected
    );
    vec![]
}

/// `AND` (polarity on) or `ANI` (polarity off) of the selected address.
fn io_device_gate(pre: &IoDevicePrecondition) -> Option<Instruction> {
    let address = pre.address()?;
    let opcode = match pre.polarity {
        Polarity::On => Opcode::And,
        Polarity::Off => Opcode::Ani,
    };
    Some(Instruction::new(opcode, address))
}
