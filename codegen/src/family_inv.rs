//! Lowers the "INV" family: sensors found by naming convention.
//!
//! These conditions carry no IO operands. The sensor name is built from the
//! cylinder's display number and resolved against the sensor table of the
//! cylinder's PLC. The resolved sensor is always taken negated.

use ilgen_dsl::diagnostic::Diagnostic;
use ilgen_dsl::mnemonic::Opcode;
use ilgen_dsl::model::SensorEntry;
use ilgen_dsl::options::SensorNaming;
use ilgen_problems::Problem;
use log::trace;

use crate::compile::ConditionScope;
use crate::emit::Instruction;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SensorConvention {
    Alarm,
    /// Memory-bit sensors are wired through an alternate address when the
    /// sensor table provides one.
    MemoryBit,
}

impl SensorConvention {
    fn naming<'a>(self, scope: &ConditionScope<'a>) -> &'a SensorNaming {
        match self {
            SensorConvention::Alarm => &scope.options.alarm_sensor,
            SensorConvention::MemoryBit => &scope.options.memory_sensor,
        }
    }

    fn prefers_alternate(self) -> bool {
        matches!(self, SensorConvention::MemoryBit)
    }
}

pub(crate) fn apply(
    scope: &ConditionScope,
    convention: SensorConvention,
) -> Result<Vec<Instruction>, Diagnostic> {
    let key = convention.naming(scope).key(scope.cylinder.display_number());
    let address = resolve(
        scope.sensors,
        &key,
        scope.cylinder.plc_id,
        convention.prefers_alternate(),
    )
    .ok_or_else(|| {
        scope
            .problem(Problem::UnresolvedSensor)
            .with_context("key", &key)
    })?;

    trace!("Resolved sensor {} to {}", key, address);
    Ok(vec![Instruction::new(Opcode::Ani, address)])
}

/// Finds the address of the sensor named `key`.
///
/// When the cylinder belongs to a PLC, sensors of other PLCs are ignored.
fn resolve<'a>(
    sensors: &'a [SensorEntry],
    key: &str,
    plc_id: Option<u32>,
    prefer_alternate: bool,
) -> Option<&'a str> {
    let sensor = sensors
        .iter()
        .filter(|s| plc_id.is_none() || s.plc_id == plc_id)
        .find(|s| s.name.trim() == key)?;

    let primary = Some(sensor.address.trim()).filter(|a| !a.is_empty());
    if prefer_alternate {
        sensor.alternate().or(primary)
    } else {
        primary
    }
}

#[cfg(test)]
mod tests {
    use ilgen_dsl::model::ConditionKind;

    use super::*;
    use crate::test_helpers::{condition, cylinder, render, with_scope};

    fn sensor(name: &str, address: &str, alt: Option<&str>, plc_id: Option<u32>) -> SensorEntry {
        SensorEntry {
            address: address.to_string(),
            alt_address: alt.map(str::to_string),
            name: name.to_string(),
            plc_id,
        }
    }

    #[test]
    fn apply_when_alarm_sensor_found_then_ani_of_address() {
        let cond = condition(100, 1, ConditionKind::AlarmSensor, "M100", vec![]);
        let sensors = vec![sensor("01ALM", "X30", Some("M30"), None)];

        let rows = with_scope(&cylinder(vec![]), &cond, &sensors, |scope| {
            render(&apply(scope, SensorConvention::Alarm).unwrap())
        });

        assert_eq!(rows, vec!["ANI X30"]);
    }

    #[test]
    fn apply_when_memory_sensor_has_alternate_then_ani_of_alternate() {
        let cond = condition(100, 1, ConditionKind::MemorySensor, "M100", vec![]);
        let sensors = vec![sensor("MB01", "X40", Some("M40"), None)];

        let rows = with_scope(&cylinder(vec![]), &cond, &sensors, |scope| {
            render(&apply(scope, SensorConvention::MemoryBit).unwrap())
        });

        assert_eq!(rows, vec!["ANI M40"]);
    }

    #[test]
    fn apply_when_memory_sensor_without_alternate_then_ani_of_address() {
        let cond = condition(100, 1, ConditionKind::MemorySensor, "M100", vec![]);
        let sensors = vec![sensor("MB01", "X40", None, None)];

        let rows = with_scope(&cylinder(vec![]), &cond, &sensors, |scope| {
            render(&apply(scope, SensorConvention::MemoryBit).unwrap())
        });

        assert_eq!(rows, vec!["ANI X40"]);
    }

    #[test]
    fn apply_when_sensor_missing_then_unresolved_sensor() {
        let cond = condition(100, 1, ConditionKind::AlarmSensor, "M100", vec![]);
        let sensors = vec![sensor("02ALM", "X30", None, None)];

        let err = with_scope(&cylinder(vec![]), &cond, &sensors, |scope| {
            apply(scope, SensorConvention::Alarm).unwrap_err()
        });

        assert_eq!(err.problem, Problem::UnresolvedSensor);
        assert!(err.description().contains("key=01ALM"));
    }

    #[test]
    fn apply_when_sensor_on_other_plc_then_unresolved_sensor() {
        let mut cyl = cylinder(vec![]);
        cyl.plc_id = Some(1);
        let cond = condition(100, 1, ConditionKind::AlarmSensor, "M100", vec![]);
        let sensors = vec![sensor("01ALM", "X30", None, Some(2))];

        let err = with_scope(&cyl, &cond, &sensors, |scope| {
            apply(scope, SensorConvention::Alarm).unwrap_err()
        });

        assert_eq!(err.problem, Problem::UnresolvedSensor);
    }

    #[test]
    fn resolve_when_same_name_on_two_plcs_then_uses_cylinder_plc() {
        let sensors = vec![
            sensor("01ALM", "X30", None, Some(2)),
            sensor("01ALM", "X31", None, Some(1)),
        ];
        assert_eq!(resolve(&sensors, "01ALM", Some(1), false), Some("X31"));
    }
}
