//! Formula Abstract Syntax Tree types

use sheetcalc_core::{CellAddress, CellRange};

/// Formula expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    // === Literals ===
    /// Numeric literal
    Number(f64),
    /// String literal, or unrecognised text kept verbatim
    String(String),
    /// Boolean literal
    Boolean(bool),
    /// Nothing at all (an empty formula or an omitted argument)
    Empty,

    // === References ===
    /// Single cell reference
    CellRef(CellAddress),
    /// Range reference, normalized
    RangeRef(CellRange),

    // === Operators ===
    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<FormulaExpr>,
    },

    // === Function call ===
    Function {
        /// Uppercase function name
        name: String,
        args: Vec<FormulaExpr>,
    },
}

impl FormulaExpr {
    pub(crate) fn binary(op: BinaryOperator, left: FormulaExpr, right: FormulaExpr) -> Self {
        FormulaExpr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub(crate) fn negate(operand: FormulaExpr) -> Self {
        FormulaExpr::UnaryOp {
            op: UnaryOperator::Negate,
            operand: Box::new(operand),
        }
    }

    /// Every cell and range this expression reads, in source order
    ///
    /// Single-cell references are reported as one-cell ranges.
    pub fn references(&self) -> Vec<CellRange> {
        let mut refs = Vec::new();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references(&self, refs: &mut Vec<CellRange>) {
        match self {
            FormulaExpr::CellRef(addr) => refs.push(CellRange::single(*addr)),
            FormulaExpr::RangeRef(range) => refs.push(*range),
            FormulaExpr::BinaryOp { left, right, .. } => {
                left.collect_references(refs);
                right.collect_references(refs);
            }
            FormulaExpr::UnaryOp { operand, .. } => operand.collect_references(refs),
            FormulaExpr::Function { args, .. } => {
                for arg in args {
                    arg.collect_references(refs);
                }
            }
            FormulaExpr::Number(_)
            | FormulaExpr::String(_)
            | FormulaExpr::Boolean(_)
            | FormulaExpr::Empty => {}
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,

    // Comparison
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,

    // Text
    Concat,
}

impl BinaryOperator {
    /// Source symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Equal => "=",
            BinaryOperator::NotEqual => "<>",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::Concat => "&",
        }
    }

    /// Comparison operators in the order they are tried
    pub(crate) const COMPARISONS: [BinaryOperator; 6] = [
        BinaryOperator::GreaterEqual,
        BinaryOperator::LessEqual,
        BinaryOperator::NotEqual,
        BinaryOperator::Equal,
        BinaryOperator::GreaterThan,
        BinaryOperator::LessThan,
    ];

    pub fn is_comparison(&self) -> bool {
        Self::COMPARISONS.contains(self)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
}

/// A parsed formula together with its source text
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expr: FormulaExpr,
}

impl Formula {
    pub(crate) fn new(source: &str, expr: FormulaExpr) -> Self {
        Self {
            source: source.to_string(),
            expr,
        }
    }

    /// The text this formula was parsed from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Root expression
    pub fn expr(&self) -> &FormulaExpr {
        &self.expr
    }

    /// Cells and ranges the formula reads
    pub fn references(&self) -> Vec<CellRange> {
        self.expr.references()
    }
}
