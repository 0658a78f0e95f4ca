//! The condition model consumed by the ladder generator.
//!
//! The model is a tree: a cylinder owns interlocks, an interlock owns
//! conditions and a condition owns IO operands. Output devices and interlock
//! numbers are assigned by an external allocation pass before the model
//! reaches the generator, so the generator only ever reads the tree.
//!
//! Order matters throughout. Interlocks are lowered by sort id, conditions
//! by condition number and IO operands by index because the emitted
//! instruction order encodes the stack structure of the boolean logic.
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Whether a contact or reference is evaluated as-is (`On`) or negated (`Off`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    #[default]
    On,
    Off,
}

/// The movement directions an interlock applies to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Both,
    Forward,
    Backward,
}

impl Direction {
    pub fn includes_forward(self) -> bool {
        matches!(self, Direction::Both | Direction::Forward)
    }

    pub fn includes_backward(self) -> bool {
        matches!(self, Direction::Both | Direction::Backward)
    }
}

/// The run mode that gates an interlock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Auto,
    Manual,
    Always,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Auto => f.write_str("auto"),
            RunMode::Manual => f.write_str("manual"),
            RunMode::Always => f.write_str("always"),
        }
    }
}

/// Restricts an interlock to a span of process steps (inclusive).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRange {
    pub start_id: u32,
    pub end_id: u32,
}

/// Selects which address field an IO/device precondition reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IoDeviceKind {
    Io,
    Device,
}

/// Gates an interlock on an arbitrary IO point or internal device.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoDevicePrecondition {
    pub kind: IoDeviceKind,
    #[serde(default)]
    pub io_address: Option<String>,
    #[serde(default)]
    pub device_address: Option<String>,
    #[serde(default)]
    pub polarity: Polarity,
}

impl IoDevicePrecondition {
    /// Returns the address selected by the kind, if it is present and not blank.
    pub fn address(&self) -> Option<&str> {
        let field = match self.kind {
            IoDeviceKind::Io => &self.io_address,
            IoDeviceKind::Device => &self.device_address,
        };
        non_blank(field.as_deref())
    }
}

/// The condition-type tag of a condition.
///
/// Tags arrive from the outside as integers. Every tag the generator knows
/// how to lower has its own variant; anything else is kept as
/// `Unrecognized` so that the generator can report it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum ConditionKind {
    /// Single IO operand, normal polarity.
    On,
    /// Single IO operand, inverted polarity.
    OnInverted,
    /// Single IO operand wired as a limit (always inverted).
    Limit,
    /// A pair of IO operands: the first, or the negation of the second.
    DualNegatedPair,
    /// Both IO operands on, or both off.
    OrDual,
    /// The first IO operand or the negation of any other.
    OrMany,
    /// Alarm sensor resolved by naming convention.
    AlarmSensor,
    /// Memory-bit sensor resolved by naming convention.
    MemorySensor,
    /// Bit of another interlock.
    InterlockRef,
    /// Interlock gated by an IO operand.
    InterlockIo,
    Unrecognized(u32),
}

impl ConditionKind {
    pub fn id(self) -> u32 {
        self.into()
    }
}

impl From<u32> for ConditionKind {
    fn from(value: u32) -> Self {
        match value {
            1 => ConditionKind::On,
            2 => ConditionKind::OnInverted,
            3 => ConditionKind::Limit,
            4 => ConditionKind::DualNegatedPair,
            5 => ConditionKind::OrDual,
            6 => ConditionKind::OrMany,
            11 => ConditionKind::AlarmSensor,
            12 => ConditionKind::MemorySensor,
            21 => ConditionKind::InterlockRef,
            22 => ConditionKind::InterlockIo,
            other => ConditionKind::Unrecognized(other),
        }
    }
}

impl From<ConditionKind> for u32 {
    fn from(value: ConditionKind) -> Self {
        match value {
            ConditionKind::On => 1,
            ConditionKind::OnInverted => 2,
            ConditionKind::Limit => 3,
            ConditionKind::DualNegatedPair => 4,
            ConditionKind::OrDual => 5,
            ConditionKind::OrMany => 6,
            ConditionKind::AlarmSensor => 11,
            ConditionKind::MemorySensor => 12,
            ConditionKind::InterlockRef => 21,
            ConditionKind::InterlockIo => 22,
            ConditionKind::Unrecognized(other) => other,
        }
    }
}

/// One IO point referenced by a condition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoOperand {
    pub index: u32,
    pub address: String,
    #[serde(default)]
    pub polarity: Polarity,
}

/// One boolean term of an interlock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub id: u32,
    pub number: u32,
    #[serde(rename = "type")]
    pub kind: ConditionKind,
    #[serde(default)]
    pub polarity: Polarity,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub interlock_number: Option<u32>,
    /// The bit of the referenced interlock for interlock-reference conditions.
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub ios: Vec<IoOperand>,
    #[serde(default)]
    pub comment1: Option<String>,
    #[serde(default)]
    pub comment2: Option<String>,
}

impl Condition {
    /// Returns the output device, if one was assigned.
    pub fn assigned_device(&self) -> Option<&str> {
        non_blank(self.device.as_deref())
    }

    pub fn referenced_device(&self) -> Option<&str> {
        non_blank(self.reference.as_deref())
    }

    /// Returns the IO operands in ascending index order.
    pub fn sorted_ios(&self) -> Vec<&IoOperand> {
        let mut ios: Vec<&IoOperand> = self.ios.iter().collect();
        ios.sort_by_key(|io| io.index);
        ios
    }

    /// Returns the comments joined into a single statement, if any exist.
    pub fn comment(&self) -> Option<String> {
        let parts: Vec<&str> = [self.comment1.as_deref(), self.comment2.as_deref()]
            .into_iter()
            .filter_map(non_blank)
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    pub fn display_name(&self) -> String {
        format!("condition {}", self.number)
    }
}

/// A safety condition gating the movement of a cylinder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interlock {
    pub id: u32,
    pub sort_id: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub run_mode: Option<RunMode>,
    #[serde(default)]
    pub process_range: Option<ProcessRange>,
    #[serde(default)]
    pub io_device: Option<IoDevicePrecondition>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl Interlock {
    /// Returns the conditions in ascending condition number order.
    pub fn sorted_conditions(&self) -> Vec<&Condition> {
        let mut conditions: Vec<&Condition> = self.conditions.iter().collect();
        conditions.sort_by_key(|c| c.number);
        conditions
    }

    pub fn display_name(&self) -> String {
        match non_blank(self.name.as_deref()) {
            Some(name) => name.to_string(),
            None => format!("interlock {}", self.sort_id),
        }
    }
}

/// The parts of a cylinder's display name, e.g. `CY` `012` `A`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CylinderName {
    #[serde(default)]
    pub prefix: String,
    pub number: String,
    #[serde(default)]
    pub suffix: String,
}

/// A cylinder and the interlocks that gate it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cylinder {
    pub id: u32,
    pub name: CylinderName,
    /// Device label (for example `M`) that, together with `base`, locates the
    /// run-permission devices of this cylinder.
    pub label: String,
    pub base: u32,
    #[serde(default)]
    pub plc_id: Option<u32>,
    #[serde(default)]
    pub interlocks: Vec<Interlock>,
}

impl Cylinder {
    /// Returns the device at `base + offset` for this cylinder's label, or
    /// `None` if the address does not fit in the device range.
    pub fn device(&self, offset: u32) -> Option<String> {
        let address = self.base.checked_add(offset)?;
        Some(format!("{}{}", self.label, address))
    }

    pub fn display_number(&self) -> &str {
        &self.name.number
    }

    pub fn display_name(&self) -> String {
        format!("{}{}{}", self.name.prefix, self.name.number, self.name.suffix)
    }

    /// Returns the interlocks in ascending sort id order.
    pub fn sorted_interlocks(&self) -> Vec<&Interlock> {
        let mut interlocks: Vec<&Interlock> = self.interlocks.iter().collect();
        interlocks.sort_by_key(|il| il.sort_id);
        interlocks
    }
}

/// One named IO point known to a PLC.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorEntry {
    pub address: String,
    #[serde(default)]
    pub alt_address: Option<String>,
    pub name: String,
    #[serde(default)]
    pub plc_id: Option<u32>,
}

impl SensorEntry {
    pub fn alternate(&self) -> Option<&str> {
        non_blank(self.alt_address.as_deref())
    }
}

/// A step of the machine process.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDetail {
    pub id: u32,
    #[serde(default)]
    pub name: String,
}

/// Everything the generator reads for one run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationInput {
    #[serde(default)]
    pub cylinders: Vec<Cylinder>,
    #[serde(default)]
    pub sensors: Vec<SensorEntry>,
    #[serde(default)]
    pub process_details: Vec<ProcessDetail>,
}

impl GenerationInput {
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
