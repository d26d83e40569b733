//! Expression-tree calculator with named variables.
//!
//! Variables are declared in a [`SymbolTable`], combined with constants into
//! [`Expression`] trees and evaluated against a [`State`] holding one value
//! per declared variable. Assignments write their result back into the state,
//! everything else is a pure read.
//!
//! ```
//! use citrus_calc::{SymbolTable, visitor::printer::print};
//!
//! let mut symbols = SymbolTable::new();
//! let a = symbols.declare("a", 2.0);
//! let b = symbols.declare("b", 3.0);
//! let c = symbols.var("c");
//! let mut state = symbols.state();
//!
//! let expr = c.assign(a + b);
//! assert_eq!(expr.evaluate(&mut state), Ok(5.0));
//! assert_eq!(state.as_slice(), &[2.0, 3.0, 5.0]);
//! assert_eq!(print(&expr, &symbols).unwrap(), "c <<= (a + b)");
//! ```

extern crate alloc;

use alloc::string::String;

pub mod expression;
pub mod symbol_table;
pub mod visitor;

#[cfg(test)]
mod proptests;

pub use expression::{
    expression_tree::Expression,
    parser::parse,
    term::{AssignOp, Assignment, Binary, BinaryOp, Constant, Term, Unary, UnaryOp, Variable},
};
pub use symbol_table::{State, SymbolTable};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("missing operand for '{operator}'")]
    MissingOperand { operator: &'static str },
    #[error("division by zero")]
    DivisionByZero,
    #[error("assignment destination must be a variable expression")]
    InvalidAssignmentTarget,
    #[error("slot {slot} is out of range for {len} variables")]
    OutOfRange { slot: usize, len: usize },
    #[error("undefined variable '{name}'")]
    UndefinedVariable { name: String },
    #[error("unexpected input at {position}: '{found}'")]
    Syntax { position: usize, found: String },
    #[error("expression nests deeper than {limit} levels")]
    TooDeep { limit: usize },
    #[error("failed to write rendering")]
    Format(#[from] core::fmt::Error),
}
