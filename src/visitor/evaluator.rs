use crate::{
    expression::term::{store, Assignment, Binary, Constant, Term, Unary, Variable},
    symbol_table::State,
    Result,
};

use super::Visitor;

/// Evaluates a tree by visiting it, keeping the value of the last visited
/// node in an accumulator.
///
/// Produces the same values and the same state changes as
/// [`Term::evaluate`]. On error the accumulator keeps whatever the last
/// successful visit left in it.
#[derive(Debug)]
pub struct Evaluator<'s> {
    result: f64,
    state: &'s mut State,
}

impl<'s> Evaluator<'s> {
    pub fn new(state: &'s mut State) -> Self {
        Self { result: 0.0, state }
    }

    pub fn result(&self) -> f64 {
        self.result
    }

    pub fn state(&self) -> &State {
        &*self.state
    }

    fn visit_into(&mut self, term: &Term) -> Result<f64> {
        term.accept(self)?;
        Ok(self.result)
    }
}

impl Visitor for Evaluator<'_> {
    type Output = Result<()>;

    fn visit_constant(&mut self, constant: &Constant) -> Result<()> {
        self.result = constant.value();
        Ok(())
    }

    fn visit_variable(&mut self, variable: &Variable) -> Result<()> {
        self.result = self.state.value(*variable)?;
        Ok(())
    }

    fn visit_unary(&mut self, unary: &Unary) -> Result<()> {
        let operand = self.visit_into(unary.operand())?;
        self.result = unary.op().apply(operand);
        Ok(())
    }

    fn visit_binary(&mut self, binary: &Binary) -> Result<()> {
        let left = self.visit_into(binary.left())?;
        let right = self.visit_into(binary.right())?;
        self.result = binary.op().apply(left, right)?;
        Ok(())
    }

    fn visit_assignment(&mut self, assignment: &Assignment) -> Result<()> {
        let source = self.visit_into(assignment.source())?;
        self.result = store(self.state, assignment.target(), assignment.op(), source)?;
        Ok(())
    }
}

/// Runs a fresh [`Evaluator`] over `term` and returns its result.
pub fn evaluate(term: &Term, state: &mut State) -> Result<f64> {
    let mut evaluator = Evaluator::new(state);
    term.accept(&mut evaluator)?;
    Ok(evaluator.result())
}
