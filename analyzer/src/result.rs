use crate::issue::Issue;

/// Defines a result type for validation rules.
///
/// A rule either returns nothing or the issues it found, in row order.
pub(crate) type RuleResult = Result<(), Vec<Issue>>;
