use crate::expression::term::{Assignment, Binary, Constant, Unary, Variable};

// Visitor: a traversal strategy over the closed set of term variants,
// dispatched through Term::accept
pub trait Visitor {
    type Output;

    fn visit_constant(&mut self, constant: &Constant) -> Self::Output;
    fn visit_variable(&mut self, variable: &Variable) -> Self::Output;
    fn visit_unary(&mut self, unary: &Unary) -> Self::Output;
    fn visit_binary(&mut self, binary: &Binary) -> Self::Output;
    fn visit_assignment(&mut self, assignment: &Assignment) -> Self::Output;
}

pub mod evaluator;
pub mod printer;
