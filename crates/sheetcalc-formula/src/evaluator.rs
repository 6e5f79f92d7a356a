//! Formula evaluator
//!
//! Evaluates formula ASTs against a [`CellStore`]. References are resolved
//! on read: a referenced cell that holds a formula is parsed and evaluated
//! in place, so no dependency graph is kept. Each resolved cell value is
//! remembered for the rest of the evaluation.

use crate::ast::{BinaryOperator, Formula, FormulaExpr, UnaryOperator};
use crate::error::{FormulaError, Result};
use crate::functions::{FunctionDef, FunctionRegistry};
use crate::parser::parse_formula;
use crate::result::FormulaResult;
use crate::settings::{ErrorPolicy, EvaluatorSettings};
use crate::value::{compare_values, first_error, FormulaValue};
use ahash::{AHashMap, AHashSet};
use sheetcalc_core::{CellAddress, CellError, CellRange, CellStore};
use std::any::Any;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::mem;
use std::panic::{self, AssertUnwindSafe};

/// Reference nesting at which a cell's dependencies are resolved up front
const PREFETCH_DEPTH: usize = 32;

/// Formula evaluator
///
/// Holds the function registry and settings. It keeps no per-call state, so
/// one instance can serve every sheet of a document.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    registry: FunctionRegistry,
    settings: EvaluatorSettings,
}

impl Evaluator {
    /// Evaluator with the built-in functions and default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluator with the built-in functions and the given settings
    pub fn with_settings(settings: EvaluatorSettings) -> Self {
        Self {
            registry: FunctionRegistry::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &EvaluatorSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut EvaluatorSettings {
        &mut self.settings
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.registry
    }

    /// Register a custom function accepting any number of arguments
    ///
    /// The name is case-insensitive and replaces any function registered
    /// under it before, built-ins included.
    ///
    /// # Example
    /// ```rust
    /// use sheetcalc_core::{CellAddress, Sheet};
    /// use sheetcalc_formula::{Evaluator, FormulaValue};
    ///
    /// let mut evaluator = Evaluator::new();
    /// evaluator.register_function("DOUBLE", |args, _ctx| {
    ///     Ok(FormulaValue::Number(args[0].to_number() * 2.0))
    /// });
    ///
    /// let result = evaluator.evaluate("=DOUBLE(5)", &Sheet::default(), CellAddress::new(0, 0));
    /// assert_eq!(result.as_number(), Some(10.0));
    /// ```
    pub fn register_function<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&[FormulaValue], &EvaluationContext<'_>) -> Result<FormulaValue>
            + Send
            + Sync
            + 'static,
    {
        self.registry.register(FunctionDef::new(name, 0, None, f));
    }

    /// Parse formula text with this evaluator's settings
    pub fn parse(&self, formula: &str) -> Result<Formula> {
        parse_formula(formula, &self.settings)
    }

    /// Evaluate formula text as if it were entered at `at`
    ///
    /// This never fails: parse errors, unknown functions, circular
    /// references and panics raised by custom functions all come back as
    /// an error result.
    pub fn evaluate(&self, formula: &str, store: &dyn CellStore, at: CellAddress) -> FormulaResult {
        log::debug!("Evaluating {} at {}", formula, at);
        self.guarded(|| {
            let parsed = self.parse(formula)?;
            EvaluationContext::new(store, &self.registry, &self.settings, at)
                .evaluate(parsed.expr())
        })
    }

    /// Evaluate an already parsed formula
    pub fn evaluate_formula(
        &self,
        formula: &Formula,
        store: &dyn CellStore,
        at: CellAddress,
    ) -> FormulaResult {
        log::debug!("Evaluating {} at {}", formula.source(), at);
        self.guarded(|| {
            EvaluationContext::new(store, &self.registry, &self.settings, at)
                .evaluate(formula.expr())
        })
    }

    /// Evaluate several parsed formulas against one store
    ///
    /// Cell values resolved for one formula are reused by the next, so the
    /// store must not change while this runs. Results come back in input
    /// order.
    pub fn evaluate_all<'f, I>(
        &self,
        store: &dyn CellStore,
        formulas: I,
    ) -> Vec<(CellAddress, FormulaResult)>
    where
        I: IntoIterator<Item = (CellAddress, &'f Formula)>,
    {
        let mut resolved = AHashMap::new();
        formulas
            .into_iter()
            .map(|(at, formula)| {
                log::debug!("Evaluating {} at {}", formula.source(), at);
                // A panic leaves `resolved` empty; later formulas start over
                let result = self.guarded(|| {
                    let ctx = EvaluationContext::new(store, &self.registry, &self.settings, at)
                        .with_resolved(mem::take(&mut resolved));
                    let value = ctx.evaluate(formula.expr());
                    resolved = ctx.into_resolved();
                    value
                });
                (at, result)
            })
            .collect()
    }

    fn guarded<F>(&self, work: F) -> FormulaResult
    where
        F: FnOnce() -> Result<FormulaValue>,
    {
        match panic::catch_unwind(AssertUnwindSafe(work)) {
            Ok(Ok(value)) => FormulaResult::from_value(value),
            Ok(Err(err)) => {
                log::warn!("Formula evaluation failed: {}", err);
                FormulaResult::from_fault(&err)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                log::warn!("Formula evaluation panicked: {}", message);
                FormulaResult::error(CellError::Generic, message)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Function panicked".to_string()
    }
}

/// Context for one top-level evaluation
///
/// Tracks the chain of cells currently being resolved, starting with the
/// cell the formula sits in. Reading a cell from that chain again is a
/// circular reference.
pub struct EvaluationContext<'a> {
    store: &'a dyn CellStore,
    registry: &'a FunctionRegistry,
    settings: &'a EvaluatorSettings,
    origin: CellAddress,
    resolving: RefCell<Vec<CellAddress>>,
    resolved: RefCell<AHashMap<CellAddress, FormulaValue>>,
}

impl<'a> EvaluationContext<'a> {
    /// Create a context for a formula located at `at`
    pub fn new(
        store: &'a dyn CellStore,
        registry: &'a FunctionRegistry,
        settings: &'a EvaluatorSettings,
        at: CellAddress,
    ) -> Self {
        Self {
            store,
            registry,
            settings,
            origin: at,
            resolving: RefCell::new(vec![at]),
            resolved: RefCell::new(AHashMap::new()),
        }
    }

    fn with_resolved(mut self, resolved: AHashMap<CellAddress, FormulaValue>) -> Self {
        self.resolved = RefCell::new(resolved);
        self
    }

    fn into_resolved(self) -> AHashMap<CellAddress, FormulaValue> {
        self.resolved.into_inner()
    }

    /// Cell whose formula is being evaluated right now
    pub fn current_cell(&self) -> CellAddress {
        self.resolving
            .borrow()
            .last()
            .copied()
            .unwrap_or(self.origin)
    }

    pub fn settings(&self) -> &EvaluatorSettings {
        self.settings
    }

    pub fn store(&self) -> &dyn CellStore {
        self.store
    }

    fn propagates(&self) -> bool {
        self.settings.error_policy == ErrorPolicy::Propagate
    }

    /// Evaluate an expression
    pub fn evaluate(&self, expr: &FormulaExpr) -> Result<FormulaValue> {
        match expr {
            // === Literals ===
            FormulaExpr::Number(n) => Ok(FormulaValue::Number(*n)),
            FormulaExpr::String(s) => Ok(FormulaValue::String(s.clone())),
            FormulaExpr::Boolean(b) => Ok(FormulaValue::Boolean(*b)),
            FormulaExpr::Empty => Ok(FormulaValue::Empty),

            // === References ===
            FormulaExpr::CellRef(addr) => self.resolve_reference(*addr),
            FormulaExpr::RangeRef(range) => self.resolve_range(range),

            // === Operators ===
            FormulaExpr::BinaryOp { op, left, right } => self.evaluate_binary_op(*op, left, right),
            FormulaExpr::UnaryOp { op, operand } => self.evaluate_unary_op(*op, operand),

            // === Functions ===
            FormulaExpr::Function { name, args } => self.evaluate_function(name, args),
        }
    }

    /// Value of a single cell
    ///
    /// Missing cells are empty. A formula cell is evaluated now; a fault in
    /// its formula becomes that cell's error value, except for circular
    /// references and runaway depth, which abort the whole evaluation.
    /// Reading the cell the formula sits in is a circular reference.
    pub fn resolve_reference(&self, addr: CellAddress) -> Result<FormulaValue> {
        log::trace!("Resolving {}", addr);
        if let Some(value) = self.resolved.borrow().get(&addr) {
            return Ok(value.clone());
        }

        let depth = {
            let resolving = self.resolving.borrow();
            if self.settings.detect_cycles && resolving.contains(&addr) {
                log::warn!("Circular reference detected at {}", addr);
                return Err(FormulaError::CircularReference(addr.to_string()));
            }
            resolving.len()
        };

        let cell = match self.store.cell(&addr) {
            Some(cell) => cell,
            None => return Ok(FormulaValue::Empty),
        };
        let formula = match &cell.formula {
            Some(formula) => formula,
            None => return Ok(FormulaValue::from(&cell.value)),
        };

        if depth > self.settings.max_reference_depth {
            return Err(FormulaError::DepthExceeded(self.settings.max_reference_depth));
        }

        let parsed = match parse_formula(formula, self.settings) {
            Ok(parsed) => parsed,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                log::warn!("Formula in {} does not parse: {}", addr, err);
                let value = FormulaValue::Error(err.cell_error());
                self.resolved.borrow_mut().insert(addr, value.clone());
                return Ok(value);
            }
        };

        self.resolving.borrow_mut().push(addr);
        let result = if depth >= PREFETCH_DEPTH {
            self.prefetch(addr, &parsed)
                .and_then(|()| self.evaluate(parsed.expr()))
        } else {
            self.evaluate(parsed.expr())
        };
        self.resolving.borrow_mut().pop();

        let value = match result {
            Ok(value) => value,
            Err(err) if !err.is_fatal() => {
                log::warn!("Formula in {} failed: {}", addr, err);
                FormulaValue::Error(err.cell_error())
            }
            Err(err) => return Err(err),
        };
        self.resolved.borrow_mut().insert(addr, value.clone());
        Ok(value)
    }

    /// Resolve the formula cells `root` depends on, farthest first
    ///
    /// `root` is already on the resolving stack. The references are walked
    /// with an explicit stack so a long chain costs no native stack, and
    /// each cell is resolved only after everything it reads, which keeps
    /// the recursion in `resolve_reference` shallow. Per-cell faults are
    /// stored as that cell's value; a circular reference or runaway depth
    /// is returned, since reading `root` would reach it too.
    fn prefetch(&self, root: CellAddress, formula: &Formula) -> Result<()> {
        let mut seen = AHashSet::new();
        seen.insert(root);
        let mut pending: Vec<(CellAddress, bool)> = Vec::new();
        self.push_references(formula, &mut pending);

        while let Some((addr, expanded)) = pending.pop() {
            if expanded {
                self.resolve_reference(addr)?;
                continue;
            }
            if !seen.insert(addr)
                || self.resolved.borrow().contains_key(&addr)
                || self.resolving.borrow().contains(&addr)
            {
                continue;
            }
            let source = match self.store.cell(&addr).and_then(|c| c.formula.as_deref()) {
                Some(source) => source,
                None => continue,
            };
            pending.push((addr, true));
            if let Ok(parsed) = parse_formula(source, self.settings) {
                self.push_references(&parsed, &mut pending);
            }
        }
        Ok(())
    }

    fn push_references(&self, formula: &Formula, pending: &mut Vec<(CellAddress, bool)>) {
        for range in formula.references() {
            if range.cell_count() > self.settings.max_range_cells {
                continue;
            }
            // Only stored cells can hold formulas
            let rows = self.store.range_cells(&range);
            for (r, row) in rows.iter().enumerate() {
                for (c, cell) in row.iter().enumerate() {
                    if cell.map_or(false, |cell| cell.formula.is_some()) {
                        let addr = CellAddress::new(
                            range.start.row + r as u32,
                            range.start.col + c as u32,
                        );
                        pending.push((addr, false));
                    }
                }
            }
        }
    }

    /// Values of a rectangle as an array of rows
    fn resolve_range(&self, range: &CellRange) -> Result<FormulaValue> {
        if range.cell_count() > self.settings.max_range_cells {
            return Err(FormulaError::Evaluation(format!(
                "Range {} has more than {} cells",
                range, self.settings.max_range_cells
            )));
        }

        if self.settings.detect_cycles && range.contains(&self.origin) {
            log::warn!("Range {} contains the evaluated cell {}", range, self.origin);
            return Err(FormulaError::CircularReference(self.origin.to_string()));
        }

        let cells = self.store.range_cells(range);
        let mut rows = Vec::with_capacity(cells.len());
        for (r, row) in cells.iter().enumerate() {
            let mut values = Vec::with_capacity(row.len());
            for (c, cell) in row.iter().enumerate() {
                let value = match cell {
                    Some(_) => self.resolve_reference(CellAddress::new(
                        range.start.row + r as u32,
                        range.start.col + c as u32,
                    ))?,
                    None => FormulaValue::Empty,
                };
                values.push(value);
            }
            rows.push(values);
        }
        Ok(FormulaValue::Array(rows))
    }

    /// Evaluate a binary operation
    fn evaluate_binary_op(
        &self,
        op: BinaryOperator,
        left: &FormulaExpr,
        right: &FormulaExpr,
    ) -> Result<FormulaValue> {
        let left_val = self.evaluate(left)?.into_scalar();
        let right_val = self.evaluate(right)?.into_scalar();

        if self.propagates() {
            if let Some(e) = left_val.error().or_else(|| right_val.error()) {
                return Ok(FormulaValue::Error(e));
            }
        }

        let ordering = || compare_values(&left_val, &right_val);
        let value = match op {
            // Arithmetic operators
            BinaryOperator::Add => checked(left_val.to_number() + right_val.to_number()),
            BinaryOperator::Subtract => checked(left_val.to_number() - right_val.to_number()),
            BinaryOperator::Multiply => checked(left_val.to_number() * right_val.to_number()),
            BinaryOperator::Divide => {
                let divisor = right_val.to_number();
                if divisor == 0.0 {
                    FormulaValue::Error(CellError::Div0)
                } else {
                    checked(left_val.to_number() / divisor)
                }
            }

            // Comparison operators
            BinaryOperator::Equal => FormulaValue::Boolean(ordering() == Ordering::Equal),
            BinaryOperator::NotEqual => FormulaValue::Boolean(ordering() != Ordering::Equal),
            BinaryOperator::LessThan => FormulaValue::Boolean(ordering() == Ordering::Less),
            BinaryOperator::LessEqual => FormulaValue::Boolean(ordering() != Ordering::Greater),
            BinaryOperator::GreaterThan => FormulaValue::Boolean(ordering() == Ordering::Greater),
            BinaryOperator::GreaterEqual => FormulaValue::Boolean(ordering() != Ordering::Less),

            // Concatenation
            BinaryOperator::Concat => {
                FormulaValue::String(left_val.to_text() + &right_val.to_text())
            }
        };
        Ok(value)
    }

    /// Evaluate a unary operation
    fn evaluate_unary_op(&self, op: UnaryOperator, operand: &FormulaExpr) -> Result<FormulaValue> {
        let val = self.evaluate(operand)?.into_scalar();

        if self.propagates() {
            if let Some(e) = val.error() {
                return Ok(FormulaValue::Error(e));
            }
        }

        match op {
            UnaryOperator::Negate => Ok(FormulaValue::Number(-val.to_number())),
        }
    }

    /// Evaluate a function call
    fn evaluate_function(&self, name: &str, args: &[FormulaExpr]) -> Result<FormulaValue> {
        let func = self
            .registry
            .get(name)
            .ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))?;

        func.check_arity(args.len())?;

        // Arguments are evaluated eagerly, left to right
        let mut evaluated_args = Vec::with_capacity(args.len());
        for arg in args {
            evaluated_args.push(self.evaluate(arg)?);
        }

        if self.propagates() && !func.accepts_errors {
            if let Some(e) = first_error(&evaluated_args) {
                return Ok(FormulaValue::Error(e));
            }
        }

        func.invoke(&evaluated_args, self)
    }
}

fn checked(n: f64) -> FormulaValue {
    if n.is_finite() {
        FormulaValue::Number(n)
    } else {
        FormulaValue::Error(CellError::Num)
    }
}
