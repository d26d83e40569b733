use alloc::string::String;
use core::fmt::{self, Write};

use crate::{
    expression::term::{Assignment, Binary, Constant, Term, Unary, Variable},
    symbol_table::SymbolTable,
    Error, Expression, Result,
};

use super::Visitor;

/// Renders a tree fully parenthesized into any [`fmt::Write`] sink.
///
/// An assignment is left bare at the root (`c <<= (a + b)`) and wrapped when
/// nested (`(a + (c <<= 4))`), so the output always reads back as the same
/// tree.
pub struct Printer<'a, W: Write> {
    out: &'a mut W,
    symbols: &'a SymbolTable,
    depth: usize,
}

impl<'a, W: Write> Printer<'a, W> {
    pub fn new(out: &'a mut W, symbols: &'a SymbolTable) -> Self {
        Self {
            out,
            symbols,
            depth: 0,
        }
    }

    fn child(&mut self, term: &Term) -> Result<()> {
        self.depth += 1;
        let result = term.accept(self);
        self.depth -= 1;
        result
    }
}

impl<W: Write> Visitor for Printer<'_, W> {
    type Output = Result<()>;

    fn visit_constant(&mut self, constant: &Constant) -> Result<()> {
        write!(self.out, "{}", constant.value())?;
        Ok(())
    }

    fn visit_variable(&mut self, variable: &Variable) -> Result<()> {
        let name = self.symbols.name_of(variable.slot())?;
        self.out.write_str(name)?;
        Ok(())
    }

    fn visit_unary(&mut self, unary: &Unary) -> Result<()> {
        write!(self.out, "{}", unary.op())?;
        self.child(unary.operand())
    }

    fn visit_binary(&mut self, binary: &Binary) -> Result<()> {
        self.out.write_char('(')?;
        self.child(binary.left())?;
        write!(self.out, " {} ", binary.op())?;
        self.child(binary.right())?;
        self.out.write_char(')')?;
        Ok(())
    }

    fn visit_assignment(&mut self, assignment: &Assignment) -> Result<()> {
        let nested = self.depth > 0;
        if nested {
            self.out.write_char('(')?;
        }
        self.visit_variable(&assignment.target())?;
        write!(self.out, " {} ", assignment.op())?;
        self.child(assignment.source())?;
        if nested {
            self.out.write_char(')')?;
        }
        Ok(())
    }
}

pub fn print(expression: &Expression, symbols: &SymbolTable) -> Result<String> {
    let mut out = String::new();
    expression.term().accept(&mut Printer::new(&mut out, symbols))?;
    Ok(out)
}

/// [`fmt::Display`] adapter pairing a term with the table that names its
/// variables. Lookup failures surface as [`fmt::Error`]; use [`print`] to
/// keep the underlying [`Error`].
#[derive(Clone, Copy)]
pub struct PrintTerm<'a> {
    pub term: &'a Term,
    pub symbols: &'a SymbolTable,
}

impl fmt::Display for PrintTerm<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.term
            .accept(&mut Printer::new(f, self.symbols))
            .map_err(|_: Error| fmt::Error)
    }
}
