//! Emits the outputs of conditions and the permission rungs of a cylinder.

use ilgen_dsl::diagnostic::{Diagnostic, Owner};
use ilgen_dsl::mnemonic::Opcode;
use ilgen_dsl::model::Cylinder;
use ilgen_dsl::options::GenerationOptions;
use ilgen_problems::Problem;

use crate::emit::Instruction;

/// Offsets from the cylinder base of the run-permission request devices.
pub(crate) const FORWARD_MANUAL: u32 = 10;
pub(crate) const BACKWARD_MANUAL: u32 = 11;
pub(crate) const FORWARD_AUTO: u32 = 12;
pub(crate) const BACKWARD_AUTO: u32 = 13;

/// Permission rungs as (name, request offset, permission offset), in the
/// order they are emitted.
const PERMISSION_RUNGS: [(&str, u32, u32); 4] = [
    ("forward manual", FORWARD_MANUAL, 17),
    ("forward auto", FORWARD_AUTO, 15),
    ("backward manual", BACKWARD_MANUAL, 18),
    ("backward auto", BACKWARD_AUTO, 16),
];

/// Largest offset from the cylinder base of any device the generator emits.
pub(crate) const HIGHEST_OFFSET: u32 = 18;

/// Reports that the devices of the cylinder do not fit in the address range.
pub(crate) fn out_of_range(cylinder: &Cylinder) -> Diagnostic {
    Diagnostic::problem(Problem::DeviceOutOfRange, Owner::cylinder(cylinder))
        .with_context("base", cylinder.base)
}

/// A rung and the statement that introduces it.
pub(crate) struct Rung {
    pub statement: String,
    pub instructions: Vec<Instruction>,
}

/// `OUT` of the condition device followed by a move of the interlock number
/// into the error-tracking device.
pub(crate) fn condition_outputs(
    device: &str,
    interlock_number: u32,
    options: &GenerationOptions,
) -> Vec<Instruction> {
    vec![
        Instruction::new(Opcode::Out, device),
        Instruction::new(
            Opcode::Mov,
            format!(
                "{} {}",
                options.literal(interlock_number),
                options.error_device
            ),
        ),
    ]
}

/// Builds the four permission rungs of the cylinder.
///
/// Each rung passes the request device through only when none of the
/// condition outputs of the cylinder is on. Returns `None` if a request or
/// permission device is outside the address range.
pub(crate) fn permission_rungs(cylinder: &Cylinder, outcoils: &[String]) -> Option<Vec<Rung>> {
    PERMISSION_RUNGS
        .iter()
        .map(|(name, source, target)| {
            let source = cylinder.device(*source)?;
            let target = cylinder.device(*target)?;

            let mut instructions = vec![Instruction::new(Opcode::Ld, source)];
            instructions.extend(
                outcoils
                    .iter()
                    .map(|outcoil| Instruction::new(Opcode::Ani, outcoil.as_str())),
            );
            instructions.push(Instruction::new(Opcode::Out, target));
            Some(Rung {
                statement: format!("{} {} permission", cylinder.display_name(), name),
                instructions,
            })
        })
        .collect()
}
