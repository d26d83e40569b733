use alloc::rc::Rc;
use core::ops::{Add, Div, Mul, Neg, Sub};

use crate::{
    expression::term::{
        AssignOp, Assignment, Binary, BinaryOp, Constant, Term, Unary, UnaryOp, Variable,
    },
    symbol_table::{State, SymbolTable},
    visitor::printer::PrintTerm,
    Error, Result,
};

// Expression: a shared handle to the root of an expression tree. Building a new
// expression never touches the trees of its operands, it only shares them.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    term: Rc<Term>,
}

impl Expression {
    pub fn new(term: Term) -> Self {
        Self {
            term: Rc::new(term),
        }
    }

    pub fn term(&self) -> &Term {
        &self.term
    }

    pub fn as_variable(&self) -> Option<Variable> {
        self.term.as_variable()
    }

    pub fn evaluate(&self, state: &mut State) -> Result<f64> {
        self.term.evaluate(state)
    }

    pub fn display<'a>(&'a self, symbols: &'a SymbolTable) -> PrintTerm<'a> {
        PrintTerm {
            term: self.term(),
            symbols,
        }
    }

    // unary plus, which has no operator in rust
    pub fn plus(operand: impl Into<Expression>) -> Self {
        Self::unary(UnaryOp::Identity, operand.into())
    }

    pub(crate) fn unary(op: UnaryOp, operand: Expression) -> Self {
        Self::new(Term::Unary(Unary::new(op, operand.term)))
    }

    pub(crate) fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Self::new(Term::Binary(Binary::new(op, left.term, right.term)))
    }

    /// Builds `self <op> source`, failing with
    /// [`Error::InvalidAssignmentTarget`] unless `self` is a bare variable.
    pub fn assign_with(&self, op: AssignOp, source: impl Into<Expression>) -> Result<Self> {
        let target = self.as_variable().ok_or(Error::InvalidAssignmentTarget)?;
        Ok(target.assign_with(op, source))
    }

    pub fn assign(&self, source: impl Into<Expression>) -> Result<Self> {
        self.assign_with(AssignOp::Assign, source)
    }

    pub fn assign_add(&self, source: impl Into<Expression>) -> Result<Self> {
        self.assign_with(AssignOp::AddAssign, source)
    }

    pub fn assign_sub(&self, source: impl Into<Expression>) -> Result<Self> {
        self.assign_with(AssignOp::SubAssign, source)
    }

    pub fn assign_mul(&self, source: impl Into<Expression>) -> Result<Self> {
        self.assign_with(AssignOp::MulAssign, source)
    }

    pub fn assign_div(&self, source: impl Into<Expression>) -> Result<Self> {
        self.assign_with(AssignOp::DivAssign, source)
    }
}

// assignment builders; the target is a variable by construction, so these
// cannot fail
impl Variable {
    pub fn assign_with(self, op: AssignOp, source: impl Into<Expression>) -> Expression {
        Expression::new(Term::Assignment(Assignment::new(op, self, source.into().term)))
    }

    /// Plain assignment, printed as `<<=`.
    pub fn assign(self, source: impl Into<Expression>) -> Expression {
        self.assign_with(AssignOp::Assign, source)
    }

    pub fn add_to(self, source: impl Into<Expression>) -> Expression {
        self.assign_with(AssignOp::AddAssign, source)
    }

    pub fn sub_from(self, source: impl Into<Expression>) -> Expression {
        self.assign_with(AssignOp::SubAssign, source)
    }

    pub fn mul_by(self, source: impl Into<Expression>) -> Expression {
        self.assign_with(AssignOp::MulAssign, source)
    }

    pub fn div_by(self, source: impl Into<Expression>) -> Expression {
        self.assign_with(AssignOp::DivAssign, source)
    }
}

impl From<Term> for Expression {
    fn from(term: Term) -> Self {
        Self::new(term)
    }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Self {
        Self::new(Term::Constant(Constant::new(value)))
    }
}

impl From<i32> for Expression {
    fn from(value: i32) -> Self {
        Self::from(f64::from(value))
    }
}

impl From<Variable> for Expression {
    fn from(variable: Variable) -> Self {
        Self::new(Term::Variable(variable))
    }
}

impl From<&Expression> for Expression {
    fn from(expression: &Expression) -> Self {
        expression.clone()
    }
}

impl Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        Expression::unary(UnaryOp::Negate, self)
    }
}

impl Neg for &Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        Expression::unary(UnaryOp::Negate, self.clone())
    }
}

impl Neg for Variable {
    type Output = Expression;

    fn neg(self) -> Expression {
        Expression::unary(UnaryOp::Negate, self.into())
    }
}

// binary operators for every left operand type, against anything that
// converts into an expression, plus f64 on the left
macro_rules! binary_operators {
    ($($trait:ident :: $method:ident => $op:expr),* $(,)?) => {
        $(
            impl<R: Into<Expression>> $trait<R> for Expression {
                type Output = Expression;

                fn $method(self, rhs: R) -> Expression {
                    Expression::binary($op, self, rhs.into())
                }
            }

            impl<R: Into<Expression>> $trait<R> for &Expression {
                type Output = Expression;

                fn $method(self, rhs: R) -> Expression {
                    Expression::binary($op, self.clone(), rhs.into())
                }
            }

            impl<R: Into<Expression>> $trait<R> for Variable {
                type Output = Expression;

                fn $method(self, rhs: R) -> Expression {
                    Expression::binary($op, self.into(), rhs.into())
                }
            }

            impl $trait<Expression> for f64 {
                type Output = Expression;

                fn $method(self, rhs: Expression) -> Expression {
                    Expression::binary($op, self.into(), rhs)
                }
            }

            impl $trait<&Expression> for f64 {
                type Output = Expression;

                fn $method(self, rhs: &Expression) -> Expression {
                    Expression::binary($op, self.into(), rhs.clone())
                }
            }

            impl $trait<Variable> for f64 {
                type Output = Expression;

                fn $method(self, rhs: Variable) -> Expression {
                    Expression::binary($op, self.into(), rhs.into())
                }
            }
        )*
    };
}

binary_operators! {
    Add::add => BinaryOp::Add,
    Sub::sub => BinaryOp::Subtract,
    Mul::mul => BinaryOp::Multiply,
    Div::div => BinaryOp::Divide,
}
