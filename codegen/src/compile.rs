//! Compiles a cylinder condition model into a ladder mnemonic stream.
//!
//! This module walks the condition model and generates the rows that gate
//! cylinder movement.
//!
//! # Stream layout
//!
//! For each cylinder, interlocks are lowered in sort id order. Each
//! interlock starts with a line statement. Each of its conditions (in
//! condition number order) is lowered as its own rung:
//!
//! - a line statement carrying the condition comments,
//! - the precondition prefix of the interlock (run mode, process range,
//!   IO/device),
//! - the condition-family logic,
//! - `OUT` of the condition device and a `MOV` of the interlock number into
//!   the error-tracking device.
//!
//! After all interlocks, four permission rungs AND together the negation of
//! every condition output, followed by a `NOP` marker.
//!
//! # Failure handling
//!
//! Configuration problems are reported to the sink and only skip the
//! condition, interlock or cylinder they belong to. A condition is lowered completely
//! before any of its rows are emitted so a failed condition contributes no
//! rows at all. A critical report aborts the run and yields an empty stream.

use ilgen_dsl::diagnostic::{Diagnostic, ErrorSink, Owner};
use ilgen_dsl::mnemonic::{InstructionRow, Opcode};
use ilgen_dsl::model::{
    Condition, ConditionKind, Cylinder, GenerationInput, Interlock, IoOperand, SensorEntry,
};
use ilgen_dsl::options::GenerationOptions;
use ilgen_problems::Problem;
use log::{debug, trace};

use crate::emit::{Emitter, Instruction};
use crate::family_inv::SensorConvention;
use crate::{family_il, family_inv, family_on, output, precondition};

/// Generates the mnemonic stream for every cylinder of the input.
///
/// Returns an empty stream if the input has no cylinders or if any
/// critical diagnostic is reported during the run.
pub fn generate(
    input: &GenerationInput,
    options: &GenerationOptions,
    sink: &mut dyn ErrorSink,
) -> Vec<InstructionRow> {
    let mut sink = CriticalWatch::new(sink);

    if input.cylinders.is_empty() {
        sink.report(Diagnostic::problem(Problem::NoContent, Owner::run()).critical());
        return vec![];
    }

    let mut ctx = GenerationContext::new(input, options);
    for cylinder in &input.cylinders {
        compile_cylinder(&mut ctx, cylinder, &mut sink);
    }

    if sink.critical {
        return vec![];
    }
    ctx.emitter.into_rows()
}

/// Generates the mnemonic stream for a single cylinder.
///
/// The cylinder gets its own context (keys restart at 1), so cylinders can
/// be generated independently of each other and even in parallel.
pub fn generate_cylinder(
    cylinder: &Cylinder,
    input: &GenerationInput,
    options: &GenerationOptions,
    sink: &mut dyn ErrorSink,
) -> Vec<InstructionRow> {
    let mut sink = CriticalWatch::new(sink);
    let mut ctx = GenerationContext::new(input, options);
    compile_cylinder(&mut ctx, cylinder, &mut sink);

    if sink.critical {
        return vec![];
    }
    ctx.emitter.into_rows()
}

/// Tracks state during generation of a single run.
struct GenerationContext<'a> {
    input: &'a GenerationInput,
    options: &'a GenerationOptions,
    emitter: Emitter,
}

impl<'a> GenerationContext<'a> {
    fn new(input: &'a GenerationInput, options: &'a GenerationOptions) -> Self {
        Self {
            input,
            options,
            emitter: Emitter::new(),
        }
    }
}

/// Everything a condition-family generator may read for one condition.
pub(crate) struct ConditionScope<'a> {
    pub cylinder: &'a Cylinder,
    pub interlock: &'a Interlock,
    pub condition: &'a Condition,
    /// IO operands in ascending index order.
    pub ios: Vec<&'a IoOperand>,
    pub sensors: &'a [SensorEntry],
    pub options: &'a GenerationOptions,
}

impl<'a> ConditionScope<'a> {
    pub fn owner(&self) -> Owner {
        Owner::condition(self.cylinder, self.interlock, self.condition)
    }

    /// Creates a diagnostic about this condition.
    pub fn problem(&self, problem: Problem) -> Diagnostic {
        Diagnostic::problem(problem, self.owner()).with_context("number", self.condition.number)
    }
}

/// Passes diagnostics through while remembering whether any was critical.
struct CriticalWatch<'a> {
    inner: &'a mut dyn ErrorSink,
    critical: bool,
}

impl<'a> CriticalWatch<'a> {
    fn new(inner: &'a mut dyn ErrorSink) -> Self {
        Self {
            inner,
            critical: false,
        }
    }
}

impl ErrorSink for CriticalWatch<'_> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.critical |= diagnostic.critical;
        self.inner.report(diagnostic);
    }
}

fn compile_cylinder(ctx: &mut GenerationContext, cylinder: &Cylinder, sink: &mut dyn ErrorSink) {
    debug!(
        "Generating cylinder {} ({} interlocks)",
        cylinder.display_name(),
        cylinder.interlocks.len()
    );

    // Every device of the cylinder must be addressable before any row of it
    // is emitted.
    if cylinder.device(output::HIGHEST_OFFSET).is_none() {
        sink.report(output::out_of_range(cylinder));
        return;
    }

    // Outputs belong to this cylinder only; a fresh list per call means
    // nothing leaks into the next cylinder.
    let mut outcoils: Vec<String> = vec![];

    for interlock in cylinder.sorted_interlocks() {
        compile_interlock(ctx, cylinder, interlock, &mut outcoils, sink);
    }

    match output::permission_rungs(cylinder, &outcoils) {
        Some(rungs) => {
            for rung in rungs {
                ctx.emitter.emit_statement(rung.statement);
                ctx.emitter.emit_all(&rung.instructions);
            }
        }
        None => sink.report(output::out_of_range(cylinder)),
    }
    ctx.emitter.emit_nop();
}

fn compile_interlock(
    ctx: &mut GenerationContext,
    cylinder: &Cylinder,
    interlock: &Interlock,
    outcoils: &mut Vec<String>,
    sink: &mut dyn ErrorSink,
) {
    debug!(
        "Generating {} of cylinder {}",
        interlock.display_name(),
        cylinder.display_name()
    );

    ctx.emitter.emit_statement(format!(
        "{} {}",
        cylinder.display_name(),
        interlock.display_name()
    ));

    let Some(prefix) = precondition::prefix(
        cylinder,
        interlock,
        &ctx.input.process_details,
        ctx.options,
        sink,
    ) else {
        return;
    };

    for condition in interlock.sorted_conditions() {
        let scope = ConditionScope {
            cylinder,
            interlock,
            condition,
            ios: condition.sorted_ios(),
            sensors: &ctx.input.sensors,
            options: ctx.options,
        };

        match compile_condition(&scope) {
            Ok(rung) => {
                ctx.emitter.emit_statement(
                    condition
                        .comment()
                        .unwrap_or_else(|| condition.display_name()),
                );
                ctx.emitter.emit_all(&prefix);
                ctx.emitter.emit_all(&rung.logic);
                ctx.emitter.emit_all(&rung.outputs);
                outcoils.push(rung.outcoil);
            }
            Err(diagnostic) => sink.report(diagnostic),
        }
    }
}

/// A condition that lowered successfully.
struct ConditionRung {
    logic: Vec<Instruction>,
    outputs: Vec<Instruction>,
    outcoil: String,
}

fn compile_condition(scope: &ConditionScope) -> Result<ConditionRung, Diagnostic> {
    trace!(
        "Lowering {} of type {}",
        scope.condition.display_name(),
        scope.condition.kind.id()
    );

    let outcoil = scope
        .condition
        .assigned_device()
        .ok_or_else(|| scope.problem(Problem::MissingDevice))?;
    let number = scope
        .condition
        .interlock_number
        .ok_or_else(|| scope.problem(Problem::MissingInterlockNumber))?;

    let logic = lower_condition(scope)?;
    let outputs = output::condition_outputs(outcoil, number, scope.options);

    Ok(ConditionRung {
        logic,
        outputs,
        outcoil: outcoil.to_string(),
    })
}

/// Dispatches to the generator of the condition family.
fn lower_condition(scope: &ConditionScope) -> Result<Vec<Instruction>, Diagnostic> {
    match scope.condition.kind {
        ConditionKind::On => family_on::single(scope, Opcode::And),
        ConditionKind::OnInverted | ConditionKind::Limit => family_on::single(scope, Opcode::Ani),
        ConditionKind::DualNegatedPair => family_on::dual_negated_pair(scope),
        ConditionKind::OrDual => family_on::or_dual(scope),
        ConditionKind::OrMany => family_on::or_many(scope),
        ConditionKind::AlarmSensor => family_inv::apply(scope, SensorConvention::Alarm),
        ConditionKind::MemorySensor => family_inv::apply(scope, SensorConvention::MemoryBit),
        ConditionKind::InterlockRef => family_il::reference(scope),
        ConditionKind::InterlockIo => family_il::io_gated(scope),
        ConditionKind::Unrecognized(tag) => {
            Err(scope.problem(Problem::UnrecognizedConditionType).with_context("type", tag))
        }
    }
}
