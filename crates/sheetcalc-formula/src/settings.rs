//! Evaluator configuration

/// How binary operators are split out of an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Precedence {
    /// Try `+`, `-`, `*`, `/`, comparisons, then `&`, splitting at the first
    /// top-level occurrence of the first operator found. `10-2-3` reads as
    /// `10-(2-3)`.
    #[default]
    FirstMatch,
    /// Conventional precedence, left associative: comparisons bind loosest,
    /// then `&`, then `+ -`, then `* /`, then unary minus.
    Standard,
}

/// What operators and functions do with error operands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ErrorPolicy {
    /// Errors coerce like any other non-numeric value (to 0 in arithmetic)
    #[default]
    Absorb,
    /// The first error operand or argument becomes the result
    Propagate,
}

/// Settings shared by every evaluation an [`Evaluator`](crate::Evaluator) runs
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EvaluatorSettings {
    /// Operator splitting mode
    pub precedence: Precedence,
    /// Error operand handling
    pub error_policy: ErrorPolicy,
    /// Fail with `#REF!` when a formula re-enters a cell being resolved
    pub detect_cycles: bool,
    /// Limit on expression nesting within one formula
    pub max_depth: usize,
    /// Limit on formula cells being resolved inside one another
    ///
    /// Long acyclic chains are resolved from the far end first and never
    /// come near it; without cycle detection a cycle stops here.
    pub max_reference_depth: usize,
    /// Largest range (in cells) a single reference may expand to
    pub max_range_cells: u64,
}

impl Default for EvaluatorSettings {
    fn default() -> Self {
        Self {
            precedence: Precedence::FirstMatch,
            error_policy: ErrorPolicy::Absorb,
            detect_cycles: true,
            max_depth: 256,
            max_reference_depth: 256,
            max_range_cells: 1_000_000,
        }
    }
}

impl EvaluatorSettings {
    /// Default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the operator splitting mode
    pub fn with_precedence(mut self, precedence: Precedence) -> Self {
        self.precedence = precedence;
        self
    }

    /// Set the error operand policy
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Enable or disable circular reference detection
    pub fn with_cycle_detection(mut self, enabled: bool) -> Self {
        self.detect_cycles = enabled;
        self
    }

    /// Set the nesting limit
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the reference nesting limit
    pub fn with_max_reference_depth(mut self, depth: usize) -> Self {
        self.max_reference_depth = depth;
        self
    }

    /// Set the range expansion limit
    pub fn with_max_range_cells(mut self, cells: u64) -> Self {
        self.max_range_cells = cells;
        self
    }
}
