use alloc::string::{String, ToString};

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, digit1, multispace0, satisfy},
    combinator::{all_consuming, cut, not, peek, recognize, value},
    error::{ErrorKind, ParseError},
    number::complete::double,
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};
use tracing::debug;

use crate::{
    expression::{
        expression_tree::Expression,
        term::{AssignOp, BinaryOp, UnaryOp, Variable},
    },
    symbol_table::SymbolTable,
    Error, Result,
};

// Grammar, loosest binding first:
//
//   statement      := additive (assign_op statement)?
//   additive       := multiplicative (("+" | "-") multiplicative)*
//   multiplicative := unary (("*" | "/") unary)*
//   unary          := ("+" | "-") unary | primary
//   primary        := number | identifier | "(" statement ")"
//
// Assignments are right associative, so `a <<= b <<= 1` stores 1 in both.
//
// Every rule that grows the tree by a level takes one step of `depth`, so a
// statement can neither recurse nor build a tree deeper than `MAX_DEPTH`.

const MAX_DEPTH: usize = 128;

#[derive(Debug)]
enum SyntaxError<'a> {
    // no rule matched; holds the unconsumed input
    Unexpected(&'a str),
    // the text matched but does not describe a valid expression
    Invalid(Error),
}

impl<'a> ParseError<&'a str> for SyntaxError<'a> {
    fn from_error_kind(input: &'a str, _kind: ErrorKind) -> Self {
        SyntaxError::Unexpected(input)
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

impl SyntaxError<'_> {
    fn into_error(self, source: &str) -> Error {
        match self {
            SyntaxError::Invalid(e) => e,
            SyntaxError::Unexpected(rest) => Error::Syntax {
                position: source.len() - rest.len(),
                found: rest.trim().to_string(),
            },
        }
    }
}

type ParseResult<'a, T> = IResult<&'a str, T, SyntaxError<'a>>;

fn invalid<'a, T>(error: Error) -> ParseResult<'a, T> {
    Err(nom::Err::Failure(SyntaxError::Invalid(error)))
}

/// Parses a single statement such as `c += b - a * c`, resolving names
/// through `symbols`. When a name was declared more than once the latest
/// declaration is used.
pub fn parse(input: &str, symbols: &SymbolTable) -> Result<Expression> {
    match all_consuming(|i| statement(i, symbols, 0))(input) {
        Ok((_, expression)) => {
            debug!(input, "parsed expression");
            Ok(expression)
        }
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(e.into_error(input)),
        Err(nom::Err::Incomplete(_)) => Err(Error::Syntax {
            position: input.len(),
            found: String::new(),
        }),
    }
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> ParseResult<'a, O>
where
    F: FnMut(&'a str) -> ParseResult<'a, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn deeper<'a>(depth: usize) -> core::result::Result<usize, nom::Err<SyntaxError<'a>>> {
    if depth >= MAX_DEPTH {
        return Err(nom::Err::Failure(SyntaxError::Invalid(Error::TooDeep {
            limit: MAX_DEPTH,
        })));
    }
    Ok(depth + 1)
}

// runs the parser for the right side of `operator`, reporting a missing
// operand instead of a generic mismatch
fn operand<'a>(
    input: &'a str,
    operator: &'static str,
    mut parser: impl FnMut(&'a str) -> ParseResult<'a, Expression>,
) -> ParseResult<'a, Expression> {
    match parser(input) {
        Err(nom::Err::Error(_)) => invalid(Error::MissingOperand { operator }),
        result => result,
    }
}

fn statement<'a>(
    input: &'a str,
    symbols: &SymbolTable,
    depth: usize,
) -> ParseResult<'a, Expression> {
    let (input, target) = additive(input, symbols, depth)?;

    let (rest, (op, text)) = match assign_op(input) {
        Ok(parsed) => parsed,
        Err(_) => return Ok((input, target)),
    };
    if target.as_variable().is_none() {
        return invalid(Error::InvalidAssignmentTarget);
    }

    let depth = deeper(depth)?;
    let (rest, source) = operand(rest, text, |i| statement(i, symbols, depth))?;
    match target.assign_with(op, source) {
        Ok(expression) => Ok((rest, expression)),
        Err(e) => invalid(e),
    }
}

fn additive<'a>(
    input: &'a str,
    symbols: &SymbolTable,
    mut depth: usize,
) -> ParseResult<'a, Expression> {
    let (mut input, mut expression) = multiplicative(input, symbols, depth)?;

    while let Ok((rest, op)) = additive_op(input) {
        depth = deeper(depth)?;
        let (rest, right) = operand(rest, op.symbol(), |i| multiplicative(i, symbols, depth))?;
        expression = Expression::binary(op, expression, right);
        input = rest;
    }

    Ok((input, expression))
}

fn multiplicative<'a>(
    input: &'a str,
    symbols: &SymbolTable,
    mut depth: usize,
) -> ParseResult<'a, Expression> {
    let (mut input, mut expression) = unary(input, symbols, depth)?;

    while let Ok((rest, op)) = multiplicative_op(input) {
        depth = deeper(depth)?;
        let (rest, right) = operand(rest, op.symbol(), |i| unary(i, symbols, depth))?;
        expression = Expression::binary(op, expression, right);
        input = rest;
    }

    Ok((input, expression))
}

fn unary<'a>(input: &'a str, symbols: &SymbolTable, depth: usize) -> ParseResult<'a, Expression> {
    match unary_op(input) {
        Ok((rest, op)) => {
            let depth = deeper(depth)?;
            let (rest, inner) = operand(rest, op.symbol(), |i| unary(i, symbols, depth))?;
            Ok((rest, Expression::unary(op, inner)))
        }
        Err(_) => primary(input, symbols, depth),
    }
}

fn primary<'a>(input: &'a str, symbols: &SymbolTable, depth: usize) -> ParseResult<'a, Expression> {
    alt((
        number,
        |i: &'a str| variable(i, symbols).map(|(rest, v)| (rest, Expression::from(v))),
        delimited(
            ws(char('(')),
            |i: &'a str| {
                let depth = deeper(depth)?;
                statement(i, symbols, depth)
            },
            cut(ws(char(')'))),
        ),
    ))(input)
}

fn number(input: &str) -> ParseResult<Expression> {
    let (rest, value) = ws(preceded(peek(digit1), double))(input)?;
    Ok((rest, Expression::from(value)))
}

fn identifier(input: &str) -> ParseResult<&str> {
    recognize(pair(
        satisfy(|c| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_'),
    ))(input)
}

fn variable<'a>(input: &'a str, symbols: &SymbolTable) -> ParseResult<'a, Variable> {
    let (rest, name) = ws(identifier)(input)?;
    match symbols.lookup(name) {
        Some(variable) => Ok((rest, variable)),
        None => invalid(Error::UndefinedVariable {
            name: name.to_string(),
        }),
    }
}

// pairs each operator with its spelling, so errors quote what was typed
fn assign_op(input: &str) -> ParseResult<(AssignOp, &'static str)> {
    ws(alt((
        value((AssignOp::Assign, "<<="), tag("<<=")),
        value((AssignOp::AddAssign, "+="), tag("+=")),
        value((AssignOp::SubAssign, "-="), tag("-=")),
        value((AssignOp::MulAssign, "*="), tag("*=")),
        value((AssignOp::DivAssign, "/="), tag("/=")),
        value((AssignOp::Assign, "="), tag("=")),
    )))(input)
}

// binary operators must not swallow the first half of a compound assignment
fn additive_op(input: &str) -> ParseResult<BinaryOp> {
    ws(terminated(
        alt((
            value(BinaryOp::Add, char('+')),
            value(BinaryOp::Subtract, char('-')),
        )),
        not(char('=')),
    ))(input)
}

fn multiplicative_op(input: &str) -> ParseResult<BinaryOp> {
    ws(terminated(
        alt((
            value(BinaryOp::Multiply, char('*')),
            value(BinaryOp::Divide, char('/')),
        )),
        not(char('=')),
    ))(input)
}

fn unary_op(input: &str) -> ParseResult<UnaryOp> {
    ws(alt((
        value(UnaryOp::Identity, char('+')),
        value(UnaryOp::Negate, char('-')),
    )))(input)
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::parse;
    use crate::{visitor::printer::print, Error, Expression, SymbolTable, Variable};

    fn setup() -> (SymbolTable, Variable, Variable, Variable) {
        let mut symbols = SymbolTable::new();
        let a = symbols.declare("a", 2.0);
        let b = symbols.declare("b", 3.0);
        let c = symbols.var("c");
        (symbols, a, b, c)
    }

    #[test]
    fn test_number() {
        let (symbols, _, _, _) = setup();

        assert_eq!(parse("2", &symbols), Ok(Expression::from(2.0)));
        assert_eq!(parse(" 2.5 ", &symbols), Ok(Expression::from(2.5)));
    }

    #[test]
    fn test_precedence() {
        let (symbols, a, b, c) = setup();

        assert_eq!(parse("a + b * c", &symbols), Ok(a + b * c));
        assert_eq!(parse("(a + b) * c", &symbols), Ok((a + b) * c));
        assert_eq!(parse("a - b - c", &symbols), Ok((a - b) - c));
        assert_eq!(parse("a / b * c", &symbols), Ok((a / b) * c));
    }

    #[test]
    fn test_unary() {
        let (symbols, a, b, _) = setup();

        assert_eq!(parse("-a", &symbols), Ok(-a));
        assert_eq!(parse("+a", &symbols), Ok(Expression::plus(a)));
        assert_eq!(parse("a * -b", &symbols), Ok(a * -b));
        assert_eq!(parse("--a", &symbols), Ok(-(-a)));
    }

    #[test]
    fn test_assignments() {
        let (symbols, a, b, c) = setup();

        assert_eq!(parse("c <<= b - a", &symbols), Ok(c.assign(b - a)));
        assert_eq!(parse("c = 4", &symbols), Ok(c.assign(4.0)));
        assert_eq!(parse("c += b - a * c", &symbols), Ok(c.add_to(b - a * c)));
        assert_eq!(parse("c-=a", &symbols), Ok(c.sub_from(a)));
        assert_eq!(parse("c *= b", &symbols), Ok(c.mul_by(b)));
        assert_eq!(parse("c /= b", &symbols), Ok(c.div_by(b)));
        assert_eq!(parse("a <<= c <<= 1", &symbols), Ok(a.assign(c.assign(1.0))));
    }

    #[test]
    fn test_parsed_scenario() {
        let (symbols, _, _, _) = setup();
        let mut state = symbols.state();

        let assign = parse("c <<= b - a", &symbols).unwrap();
        assert_eq!(assign.evaluate(&mut state), Ok(1.0));

        let step = parse("c += b - a * c", &symbols).unwrap();
        assert_eq!(step.evaluate(&mut state), Ok(2.0));
        assert_eq!(step.evaluate(&mut state), Ok(1.0));
        assert_eq!(state.as_slice(), &[2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_invalid_assignment_target() {
        let (symbols, _, _, _) = setup();

        assert_eq!(parse("(c - a) += b", &symbols), Err(Error::InvalidAssignmentTarget));
        assert_eq!(parse("4 <<= a", &symbols), Err(Error::InvalidAssignmentTarget));
        assert_eq!(parse("(c += a) += b", &symbols), Err(Error::InvalidAssignmentTarget));
    }

    #[test]
    fn test_missing_operand() {
        let (symbols, _, _, _) = setup();

        assert_eq!(parse("a +", &symbols), Err(Error::MissingOperand { operator: "+" }));
        assert_eq!(parse("a * ", &symbols), Err(Error::MissingOperand { operator: "*" }));
        assert_eq!(parse("c +=", &symbols), Err(Error::MissingOperand { operator: "+=" }));
        assert_eq!(parse("-", &symbols), Err(Error::MissingOperand { operator: "-" }));
        assert_eq!(parse("c = ", &symbols), Err(Error::MissingOperand { operator: "=" }));
        assert_eq!(parse("c <<=", &symbols), Err(Error::MissingOperand { operator: "<<=" }));
        assert_eq!(parse("c==1", &symbols), Err(Error::MissingOperand { operator: "=" }));
    }

    #[test]
    fn test_nesting_limit() {
        let (symbols, a, _, _) = setup();
        let too_deep = Err(Error::TooDeep { limit: 128 });

        assert_eq!(parse(&("-".repeat(100_000) + "a"), &symbols), too_deep);
        assert_eq!(parse(&"(".repeat(100_000), &symbols), too_deep);
        assert_eq!(parse(&"a + ".repeat(100_000), &symbols), too_deep);
        assert_eq!(parse(&"c <<= ".repeat(100_000), &symbols), too_deep);

        let nested = "(".repeat(100) + "a" + &")".repeat(100);
        assert_eq!(parse(&nested, &symbols), Ok(Expression::from(a)));
        assert_eq!(parse(&("-".repeat(100) + "a"), &symbols).map(|_| ()), Ok(()));
    }

    #[test]
    fn test_undefined_variable() {
        let (symbols, _, _, _) = setup();

        assert_eq!(
            parse("a + x", &symbols),
            Err(Error::UndefinedVariable { name: "x".to_string() })
        );
    }

    #[test]
    fn test_syntax_errors() {
        let (symbols, _, _, _) = setup();

        assert_eq!(
            parse("a b", &symbols),
            Err(Error::Syntax { position: 2, found: "b".to_string() })
        );
        assert_eq!(
            parse("(a + b", &symbols),
            Err(Error::Syntax { position: 6, found: "".to_string() })
        );
        assert!(matches!(parse("", &symbols), Err(Error::Syntax { position: 0, .. })));
    }

    #[test]
    fn test_duplicate_name_resolves_to_latest() {
        let mut symbols = SymbolTable::new();
        symbols.declare("x", 1.0);
        let latest = symbols.declare("x", 2.0);

        assert_eq!(parse("x", &symbols), Ok(Expression::from(latest)));
    }

    #[test]
    fn test_print_parsed() {
        let (symbols, _, _, _) = setup();
        let expr = parse("c <<= a + b", &symbols).unwrap();

        assert_eq!(print(&expr, &symbols).unwrap(), "c <<= (a + b)");
    }
}
