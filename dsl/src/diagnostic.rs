//! Provides definition for diagnostics, which are the configuration problems
//! found while generating interlock ladders, and the sink that receives them.
//!
//! Diagnostics never stop generation by themselves. The generator reports
//! them to an [`ErrorSink`] and carries on with the next condition. Only a
//! critical diagnostic aborts a run.
use std::fmt;

use ilgen_problems::Problem;
use log::{error, warn};

use crate::model::{Condition, Cylinder, Interlock};

/// The kind of record a diagnostic is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OwnerKind {
    /// The run as a whole rather than any particular record.
    Run,
    Cylinder,
    Interlock,
    Condition,
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerKind::Run => f.write_str("run"),
            OwnerKind::Cylinder => f.write_str("cylinder"),
            OwnerKind::Interlock => f.write_str("interlock"),
            OwnerKind::Condition => f.write_str("condition"),
        }
    }
}

/// Identifies the record that a diagnostic refers to.
///
/// This takes the place a source label would have in a text compiler: the
/// record id lets a user interface navigate to the record and the name is
/// what a user recognizes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Owner {
    pub kind: OwnerKind,

    /// Identifier of the record.
    pub id: u32,

    /// A name for the record suitable for display.
    pub name: String,
}

impl Owner {
    pub fn run() -> Self {
        Self {
            kind: OwnerKind::Run,
            id: 0,
            name: String::new(),
        }
    }

    pub fn cylinder(cylinder: &Cylinder) -> Self {
        Self {
            kind: OwnerKind::Cylinder,
            id: cylinder.id,
            name: cylinder.display_name(),
        }
    }

    pub fn interlock(cylinder: &Cylinder, interlock: &Interlock) -> Self {
        Self {
            kind: OwnerKind::Interlock,
            id: interlock.id,
            name: format!("{} {}", cylinder.display_name(), interlock.display_name()),
        }
    }

    pub fn condition(cylinder: &Cylinder, interlock: &Interlock, condition: &Condition) -> Self {
        Self {
            kind: OwnerKind::Condition,
            id: condition.id,
            name: format!(
                "{} {} {}",
                cylinder.display_name(),
                interlock.display_name(),
                condition.display_name()
            ),
        }
    }
}

/// A diagnostic. Diagnostics have a code that is indicative of the category
/// and the record that the problem belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// A normally unique value describing the type of diagnostic.
    pub code: String,

    pub problem: Problem,

    description: String,

    pub owner: Owner,

    /// Additional descriptions to the constant description.
    pub described: Vec<String>,

    /// A critical diagnostic aborts the whole run.
    pub critical: bool,
}

impl Diagnostic {
    /// Creates a diagnostic from the problem code about the owner.
    pub fn problem(problem: Problem, owner: Owner) -> Self {
        Self {
            code: problem.code().to_string(),
            problem,
            description: problem.message().to_string(),
            owner,
            described: vec![],
            critical: false,
        }
    }

    /// Marks the diagnostic as critical.
    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }

    /// Adds to the problem description (primary text) additional context
    /// about the problem.
    pub fn with_context(mut self, description: &str, item: impl fmt::Display) -> Self {
        self.described.push(format!("{}={}", description, item));
        self
    }

    /// Returns the description for the diagnostic. This may add in other
    /// data in addition that is part of the diagnostic.
    pub fn description(&self) -> String {
        if self.described.is_empty() {
            self.description.clone()
        } else {
            format!("{} ({})", self.description, self.described.join(", "))
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {} '{}': {}",
            self.code,
            self.owner.kind,
            self.owner.id,
            self.owner.name,
            self.description()
        )
    }
}

/// Receives diagnostics while generation continues.
pub trait ErrorSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl ErrorSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// A sink that only writes diagnostics to the log.
#[derive(Debug, Default)]
pub struct LogSink;

impl ErrorSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        if diagnostic.critical {
            error!("{}", diagnostic);
        } else {
            warn!("{}", diagnostic);
        }
    }
}
