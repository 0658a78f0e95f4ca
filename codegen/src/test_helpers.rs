use ilgen_dsl::model::{
    Condition, ConditionKind, Cylinder, CylinderName, Direction, Interlock, IoOperand, Polarity,
    RunMode, SensorEntry,
};
use ilgen_dsl::options::GenerationOptions;

use crate::compile::ConditionScope;
use crate::emit::Instruction;

/// Cylinder `CY01` with label `M` and base 1000.
pub fn cylinder(interlocks: Vec<Interlock>) -> Cylinder {
    Cylinder {
        id: 1,
        name: CylinderName {
            prefix: "CY".to_string(),
            number: "01".to_string(),
            suffix: String::new(),
        },
        label: "M".to_string(),
        base: 1000,
        plc_id: None,
        interlocks,
    }
}

pub fn interlock(id: u32, sort_id: u32, run_mode: Option<RunMode>) -> Interlock {
    Interlock {
        id,
        sort_id,
        name: None,
        direction: Direction::Both,
        run_mode,
        process_range: None,
        io_device: None,
        conditions: vec![],
    }
}

/// A condition whose interlock number equals its condition number.
pub fn condition(
    id: u32,
    number: u32,
    kind: ConditionKind,
    device: &str,
    ios: Vec<IoOperand>,
) -> Condition {
    Condition {
        id,
        number,
        kind,
        polarity: Polarity::On,
        device: Some(device.to_string()),
        interlock_number: Some(number),
        reference: None,
        ios,
        comment1: None,
        comment2: None,
    }
}

pub fn io(index: u32, address: &str) -> IoOperand {
    IoOperand {
        index,
        address: address.to_string(),
        polarity: Polarity::On,
    }
}

/// Runs `f` with a scope for the condition of the default cylinder.
pub fn with_scope<R>(
    cylinder: &Cylinder,
    condition: &Condition,
    sensors: &[SensorEntry],
    f: impl FnOnce(&ConditionScope) -> R,
) -> R {
    let il = interlock(10, 1, None);
    let options = GenerationOptions::default();
    let scope = ConditionScope {
        cylinder,
        interlock: &il,
        condition,
        ios: condition.sorted_ios(),
        sensors,
        options: &options,
    };
    f(&scope)
}

/// Renders instructions as `OPCODE operand` text.
pub fn render(instructions: &[Instruction]) -> Vec<String> {
    instructions
        .iter()
        .map(|i| format!("{} {}", i.opcode, i.operand).trim_end().to_string())
        .collect()
}
