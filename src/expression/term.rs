use alloc::rc::Rc;
use core::fmt;

use tracing::{debug, trace};

use crate::{symbol_table::State, visitor::Visitor, Error, Result};

// rejects an exact zero divisor instead of producing infinity
pub(crate) fn safe_divide(dividend: f64, divisor: f64) -> Result<f64> {
    if divisor == 0.0 {
        debug!(dividend, "rejected division by zero");
        return Err(Error::DivisionByZero);
    }
    Ok(dividend / divisor)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Identity,
    Negate,
}

impl UnaryOp {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            UnaryOp::Identity => value,
            UnaryOp::Negate => -value,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Identity => "+",
            UnaryOp::Negate => "-",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOp {
    pub fn apply(self, left: f64, right: f64) -> Result<f64> {
        match self {
            BinaryOp::Add => Ok(left + right),
            BinaryOp::Subtract => Ok(left - right),
            BinaryOp::Multiply => Ok(left * right),
            BinaryOp::Divide => safe_divide(left, right),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
}

impl AssignOp {
    // the arithmetic applied between the current value and the source, if any
    pub fn binary(self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::AddAssign => Some(BinaryOp::Add),
            AssignOp::SubAssign => Some(BinaryOp::Subtract),
            AssignOp::MulAssign => Some(BinaryOp::Multiply),
            AssignOp::DivAssign => Some(BinaryOp::Divide),
        }
    }

    pub fn combine(self, current: f64, source: f64) -> Result<f64> {
        match self.binary() {
            None => Ok(source),
            Some(op) => op.apply(current, source),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Assign => "<<=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
            AssignOp::MulAssign => "*=",
            AssignOp::DivAssign => "/=",
        }
    }
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constant {
    value: f64,
}

impl Constant {
    pub fn new(value: f64) -> Self {
        Self { value }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn evaluate(&self, _state: &State) -> Result<f64> {
        Ok(self.value)
    }
}

/// Handle to a slot in a [`State`]. Only a
/// [`SymbolTable`](crate::SymbolTable) hands these out, so the slot always
/// names a declared variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Variable {
    slot: usize,
}

impl Variable {
    pub(crate) fn new(slot: usize) -> Self {
        Self { slot }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn evaluate(&self, state: &State) -> Result<f64> {
        state.get(self.slot)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    op: UnaryOp,
    operand: Rc<Term>,
}

impl Unary {
    pub fn new(op: UnaryOp, operand: Rc<Term>) -> Self {
        Self { op, operand }
    }

    pub fn op(&self) -> UnaryOp {
        self.op
    }

    pub fn operand(&self) -> &Term {
        &self.operand
    }

    pub fn evaluate(&self, state: &mut State) -> Result<f64> {
        Ok(self.op.apply(self.operand.evaluate(state)?))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    op: BinaryOp,
    left: Rc<Term>,
    right: Rc<Term>,
}

impl Binary {
    pub fn new(op: BinaryOp, left: Rc<Term>, right: Rc<Term>) -> Self {
        Self { op, left, right }
    }

    pub fn op(&self) -> BinaryOp {
        self.op
    }

    pub fn left(&self) -> &Term {
        &self.left
    }

    pub fn right(&self) -> &Term {
        &self.right
    }

    pub fn evaluate(&self, state: &mut State) -> Result<f64> {
        let left = self.left.evaluate(state)?;
        let right = self.right.evaluate(state)?;
        self.op.apply(left, right)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    op: AssignOp,
    target: Variable,
    source: Rc<Term>,
}

impl Assignment {
    pub fn new(op: AssignOp, target: Variable, source: Rc<Term>) -> Self {
        Self { op, target, source }
    }

    pub fn op(&self) -> AssignOp {
        self.op
    }

    pub fn target(&self) -> Variable {
        self.target
    }

    pub fn source(&self) -> &Term {
        &self.source
    }

    /// Evaluates the source, folds it into the target slot and returns the
    /// stored value. The state is left untouched when any step fails.
    pub fn evaluate(&self, state: &mut State) -> Result<f64> {
        let source = self.source.evaluate(state)?;
        store(state, self.target, self.op, source)
    }
}

// shared by direct evaluation and the evaluator visitor
pub(crate) fn store(state: &mut State, target: Variable, op: AssignOp, source: f64) -> Result<f64> {
    let current = state.get_mut(target.slot())?;
    let value = op.combine(*current, source)?;
    trace!(slot = target.slot(), old = *current, new = value, %op, "assigned");
    *current = value;
    Ok(value)
}

/// One node of an expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Constant(Constant),
    Variable(Variable),
    Unary(Unary),
    Binary(Binary),
    Assignment(Assignment),
}

impl Term {
    pub fn evaluate(&self, state: &mut State) -> Result<f64> {
        match self {
            Term::Constant(c) => c.evaluate(state),
            Term::Variable(v) => v.evaluate(state),
            Term::Unary(u) => u.evaluate(state),
            Term::Binary(b) => b.evaluate(state),
            Term::Assignment(a) => a.evaluate(state),
        }
    }

    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Term::Constant(c) => visitor.visit_constant(c),
            Term::Variable(v) => visitor.visit_variable(v),
            Term::Unary(u) => visitor.visit_unary(u),
            Term::Binary(b) => visitor.visit_binary(b),
            Term::Assignment(a) => visitor.visit_assignment(a),
        }
    }

    pub fn as_variable(&self) -> Option<Variable> {
        match self {
            Term::Variable(v) => Some(*v),
            _ => None,
        }
    }
}
