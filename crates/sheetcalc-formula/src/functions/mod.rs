//! Built-in spreadsheet functions and the registry that dispatches them

pub mod date;
pub mod info;
pub mod logical;
pub mod lookup;
pub mod math;
pub mod text;

use crate::error::{FormulaError, Result};
use crate::evaluator::EvaluationContext;
use crate::value::FormulaValue;
use ahash::AHashMap;
use std::fmt;
use std::sync::Arc;

/// A callable spreadsheet function
///
/// Arguments arrive already evaluated; a range argument is a
/// [`FormulaValue::Array`] of its rows. Any `Fn` closure or function with
/// the matching signature implements this trait.
pub trait FormulaFunction: Send + Sync {
    fn call(&self, args: &[FormulaValue], ctx: &EvaluationContext<'_>) -> Result<FormulaValue>;
}

impl<F> FormulaFunction for F
where
    F: Fn(&[FormulaValue], &EvaluationContext<'_>) -> Result<FormulaValue> + Send + Sync,
{
    fn call(&self, args: &[FormulaValue], ctx: &EvaluationContext<'_>) -> Result<FormulaValue> {
        self(args, ctx)
    }
}

/// Function definition
#[derive(Clone)]
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: String,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation
    pub implementation: Arc<dyn FormulaFunction>,
    /// Is volatile (result changes between calls with the same inputs)
    pub volatile: bool,
    /// Receives error arguments even when errors propagate
    pub accepts_errors: bool,
}

impl FunctionDef {
    /// Define a function from a closure or `fn`
    pub fn new<F>(name: &str, min_args: usize, max_args: Option<usize>, f: F) -> Self
    where
        F: Fn(&[FormulaValue], &EvaluationContext<'_>) -> Result<FormulaValue>
            + Send
            + Sync
            + 'static,
    {
        Self::with_impl(name, min_args, max_args, Arc::new(f))
    }

    /// Define a function from any [`FormulaFunction`] implementation
    pub fn with_impl(
        name: &str,
        min_args: usize,
        max_args: Option<usize>,
        implementation: Arc<dyn FormulaFunction>,
    ) -> Self {
        Self {
            name: name.to_uppercase(),
            min_args,
            max_args,
            implementation,
            volatile: false,
            accepts_errors: false,
        }
    }

    /// Mark as volatile
    pub fn volatile(mut self) -> Self {
        self.volatile = true;
        self
    }

    /// Mark as receiving error arguments
    pub fn accepting_errors(mut self) -> Self {
        self.accepts_errors = true;
        self
    }

    /// Check an argument count against the declared bounds
    pub fn check_arity(&self, count: usize) -> Result<()> {
        if count < self.min_args {
            return Err(FormulaError::ArgumentCount {
                function: self.name.clone(),
                expected: format!("at least {}", self.min_args),
                actual: count,
            });
        }
        if let Some(max) = self.max_args {
            if count > max {
                return Err(FormulaError::ArgumentCount {
                    function: self.name.clone(),
                    expected: format!("at most {}", max),
                    actual: count,
                });
            }
        }
        Ok(())
    }

    /// Run the implementation
    pub fn invoke(&self, args: &[FormulaValue], ctx: &EvaluationContext<'_>) -> Result<FormulaValue> {
        self.implementation.call(args, ctx)
    }
}

impl fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDef")
            .field("name", &self.name)
            .field("min_args", &self.min_args)
            .field("max_args", &self.max_args)
            .field("volatile", &self.volatile)
            .field("accepts_errors", &self.accepts_errors)
            .finish_non_exhaustive()
    }
}

/// Function registry
///
/// Names are case-insensitive. Registering a name that already exists
/// replaces the earlier definition.
#[derive(Clone, Debug)]
pub struct FunctionRegistry {
    functions: AHashMap<String, FunctionDef>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self::empty();

        registry.register_math_functions();
        registry.register_logical_functions();
        registry.register_text_functions();
        registry.register_date_functions();
        registry.register_lookup_functions();
        registry.register_info_functions();

        registry
    }

    /// Create a registry with no functions
    pub fn empty() -> Self {
        Self {
            functions: AHashMap::new(),
        }
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(&name.to_uppercase())
    }

    /// Whether a function is registered under this name
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Register a function, replacing any existing one with the same name
    pub fn register(&mut self, def: FunctionDef) {
        let key = def.name.to_uppercase();
        if self.functions.contains_key(&key) {
            log::warn!("Function {} re-registered; previous definition replaced", key);
        }
        self.functions.insert(key, def);
    }

    /// Number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check if no functions are registered
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn register_math_functions(&mut self) {
        self.register(FunctionDef::new("SUM", 1, None, math::fn_sum));
        self.register(FunctionDef::new("AVERAGE", 1, None, math::fn_average));
        self.register(FunctionDef::new("COUNT", 1, None, math::fn_count));
        self.register(FunctionDef::new("COUNTA", 1, None, math::fn_counta));
        self.register(FunctionDef::new("MAX", 1, None, math::fn_max));
        self.register(FunctionDef::new("MIN", 1, None, math::fn_min));
        self.register(FunctionDef::new("ABS", 1, Some(1), math::fn_abs));
        self.register(FunctionDef::new("ROUND", 1, Some(2), math::fn_round));
        self.register(FunctionDef::new("FLOOR", 1, Some(2), math::fn_floor));
        self.register(FunctionDef::new("CEILING", 1, Some(2), math::fn_ceiling));
        self.register(FunctionDef::new("SQRT", 1, Some(1), math::fn_sqrt));
        self.register(FunctionDef::new("POWER", 2, Some(2), math::fn_power));
        self.register(FunctionDef::new("MOD", 2, Some(2), math::fn_mod));
        self.register(FunctionDef::new("INT", 1, Some(1), math::fn_int));
        self.register(FunctionDef::new("PI", 0, Some(0), math::fn_pi));
    }

    fn register_logical_functions(&mut self) {
        self.register(FunctionDef::new("IF", 2, Some(3), logical::fn_if));
        self.register(FunctionDef::new("AND", 1, None, logical::fn_and));
        self.register(FunctionDef::new("OR", 1, None, logical::fn_or));
        self.register(FunctionDef::new("NOT", 1, Some(1), logical::fn_not));
        self.register(
            FunctionDef::new("IFERROR", 2, Some(2), logical::fn_iferror).accepting_errors(),
        );
    }

    fn register_text_functions(&mut self) {
        self.register(FunctionDef::new("CONCATENATE", 1, None, text::fn_concatenate));
        self.register(FunctionDef::new("CONCAT", 1, None, text::fn_concat));
        self.register(FunctionDef::new("LEFT", 1, Some(2), text::fn_left));
        self.register(FunctionDef::new("RIGHT", 1, Some(2), text::fn_right));
        self.register(FunctionDef::new("MID", 3, Some(3), text::fn_mid));
        self.register(FunctionDef::new("LEN", 1, Some(1), text::fn_len));
        self.register(FunctionDef::new("TRIM", 1, Some(1), text::fn_trim));
        self.register(FunctionDef::new("UPPER", 1, Some(1), text::fn_upper));
        self.register(FunctionDef::new("LOWER", 1, Some(1), text::fn_lower));
        self.register(FunctionDef::new("PROPER", 1, Some(1), text::fn_proper));
    }

    fn register_date_functions(&mut self) {
        self.register(FunctionDef::new("TODAY", 0, Some(0), date::fn_today).volatile());
        self.register(FunctionDef::new("NOW", 0, Some(0), date::fn_now).volatile());
        self.register(FunctionDef::new("YEAR", 1, Some(1), date::fn_year));
        self.register(FunctionDef::new("MONTH", 1, Some(1), date::fn_month));
        self.register(FunctionDef::new("DAY", 1, Some(1), date::fn_day));
        self.register(FunctionDef::new("DATE", 3, Some(3), date::fn_date));
    }

    fn register_lookup_functions(&mut self) {
        self.register(FunctionDef::new("VLOOKUP", 3, Some(4), lookup::fn_vlookup));
        self.register(FunctionDef::new("HLOOKUP", 3, Some(4), lookup::fn_hlookup));
        self.register(FunctionDef::new("INDEX", 2, Some(3), lookup::fn_index));
        self.register(FunctionDef::new("MATCH", 2, Some(3), lookup::fn_match));
        self.register(FunctionDef::new("ROWS", 1, Some(1), lookup::fn_rows));
        self.register(FunctionDef::new("COLUMNS", 1, Some(1), lookup::fn_columns));
    }

    fn register_info_functions(&mut self) {
        self.register(FunctionDef::new("ISERROR", 1, Some(1), info::fn_iserror).accepting_errors());
        self.register(FunctionDef::new("ISBLANK", 1, Some(1), info::fn_isblank).accepting_errors());
        self.register(
            FunctionDef::new("ISNUMBER", 1, Some(1), info::fn_isnumber).accepting_errors(),
        );
        self.register(FunctionDef::new("ISTEXT", 1, Some(1), info::fn_istext).accepting_errors());
    }
}

// === Argument helpers shared by the built-ins ===

static EMPTY: FormulaValue = FormulaValue::Empty;

/// Argument `i`, or an empty value when it was not supplied
pub(crate) fn arg(args: &[FormulaValue], i: usize) -> &FormulaValue {
    args.get(i).unwrap_or(&EMPTY)
}

/// Argument `i` coerced to a number, or `default` when it was not supplied
pub(crate) fn number_arg(args: &[FormulaValue], i: usize, default: f64) -> f64 {
    args.get(i).map_or(default, FormulaValue::to_number)
}

/// Argument `i` as display text
pub(crate) fn text_arg(args: &[FormulaValue], i: usize) -> String {
    arg(args, i).to_text()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let registry = FunctionRegistry::new();
        for name in [
            "SUM", "AVERAGE", "COUNT", "COUNTA", "MAX", "MIN", "ABS", "ROUND", "FLOOR",
            "CEILING", "SQRT", "POWER", "IF", "AND", "OR", "NOT", "IFERROR", "CONCATENATE",
            "CONCAT", "LEFT", "RIGHT", "MID", "LEN", "TRIM", "UPPER", "LOWER", "PROPER",
            "TODAY", "NOW", "YEAR", "MONTH", "DAY", "DATE", "VLOOKUP", "HLOOKUP", "INDEX",
            "MATCH",
        ] {
            assert!(registry.contains(name), "{} missing", name);
        }
        assert!(registry.get("sum").is_some());
        assert!(registry.get("TODAY").unwrap().volatile);
        assert!(registry.get("IFERROR").unwrap().accepts_errors);
    }

    #[test]
    fn test_register_overwrites() {
        let mut registry = FunctionRegistry::empty();
        registry.register(FunctionDef::new("double", 1, Some(1), |args, _ctx| {
            Ok(FormulaValue::Number(args[0].to_number() * 2.0))
        }));
        registry.register(FunctionDef::new("DOUBLE", 0, None, |_args, _ctx| {
            Ok(FormulaValue::Number(0.0))
        }));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("Double").unwrap().max_args, None);
    }

    #[test]
    fn test_check_arity() {
        let def = FunctionDef::new("ABS", 1, Some(1), math::fn_abs);
        assert!(def.check_arity(1).is_ok());
        assert!(matches!(
            def.check_arity(0),
            Err(FormulaError::ArgumentCount { actual: 0, .. })
        ));
        assert!(def.check_arity(2).is_err());
    }
}
