//! Property-based tests over randomly built expression trees.

use alloc::{boxed::Box, vec::Vec};

use proptest::prelude::*;

use crate::{
    expression::term::{AssignOp, BinaryOp},
    visitor::evaluator::evaluate,
    Expression, SymbolTable, Variable,
};

const VARIABLES: usize = 4;

// Shape of a tree, built against a fresh table in each case
#[derive(Debug, Clone)]
enum Shape {
    Constant(f64),
    Variable(usize),
    Negate(Box<Shape>),
    Plus(Box<Shape>),
    Binary(BinaryOp, Box<Shape>, Box<Shape>),
    Assign(AssignOp, usize, Box<Shape>),
}

impl Shape {
    fn build(&self, vars: &[Variable]) -> Expression {
        match self {
            Shape::Constant(c) => Expression::from(*c),
            Shape::Variable(i) => Expression::from(vars[*i]),
            Shape::Negate(s) => -s.build(vars),
            Shape::Plus(s) => Expression::plus(s.build(vars)),
            Shape::Binary(op, l, r) => Expression::binary(*op, l.build(vars), r.build(vars)),
            Shape::Assign(op, i, s) => vars[*i].assign_with(*op, s.build(vars)),
        }
    }
}

fn small_value() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), (-50i32..50).prop_map(f64::from)]
}

fn binary_op() -> impl Strategy<Value = BinaryOp> {
    prop_oneof![
        Just(BinaryOp::Add),
        Just(BinaryOp::Subtract),
        Just(BinaryOp::Multiply),
        Just(BinaryOp::Divide),
    ]
}

fn assign_op() -> impl Strategy<Value = AssignOp> {
    prop_oneof![
        Just(AssignOp::Assign),
        Just(AssignOp::AddAssign),
        Just(AssignOp::SubAssign),
        Just(AssignOp::MulAssign),
        Just(AssignOp::DivAssign),
    ]
}

fn shape(with_assignments: bool) -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        small_value().prop_map(Shape::Constant),
        (0..VARIABLES).prop_map(Shape::Variable),
    ];

    leaf.prop_recursive(5, 32, 2, move |inner| {
        let mut options = vec![
            inner.clone().prop_map(|s| Shape::Negate(Box::new(s))).boxed(),
            inner.clone().prop_map(|s| Shape::Plus(Box::new(s))).boxed(),
            (binary_op(), inner.clone(), inner.clone())
                .prop_map(|(op, l, r)| Shape::Binary(op, Box::new(l), Box::new(r)))
                .boxed(),
        ];
        if with_assignments {
            options.push(
                (assign_op(), 0..VARIABLES, inner)
                    .prop_map(|(op, i, s)| Shape::Assign(op, i, Box::new(s)))
                    .boxed(),
            );
        }
        proptest::strategy::Union::new(options)
    })
}

fn table(initial: &[f64]) -> (SymbolTable, Vec<Variable>) {
    let mut symbols = SymbolTable::new();
    let vars = initial
        .iter()
        .enumerate()
        .map(|(i, value)| symbols.declare(alloc::format!("v{}", i), *value))
        .collect();
    (symbols, vars)
}

proptest! {
    #[test]
    fn constant_ignores_state(value in small_value(), initial in prop::collection::vec(small_value(), 0..VARIABLES)) {
        let (symbols, _) = table(&initial);
        let mut state = symbols.state();

        prop_assert_eq!(Expression::from(value).evaluate(&mut state), Ok(value));
        prop_assert_eq!(state.as_slice(), initial.as_slice());
    }

    #[test]
    fn variable_reads_its_slot(initial in prop::collection::vec(small_value(), VARIABLES)) {
        let (symbols, vars) = table(&initial);
        let mut state = symbols.state();

        for (variable, value) in vars.iter().zip(&initial) {
            prop_assert_eq!(Expression::from(*variable).evaluate(&mut state), Ok(*value));
        }
    }

    #[test]
    fn evaluator_agrees_with_direct(
        tree in shape(true),
        initial in prop::collection::vec(small_value(), VARIABLES),
    ) {
        let (symbols, vars) = table(&initial);
        let expr = tree.build(&vars);
        let mut direct = symbols.state();
        let mut visited = symbols.state();

        prop_assert_eq!(expr.evaluate(&mut direct), evaluate(expr.term(), &mut visited));
        prop_assert_eq!(direct, visited);
    }

    #[test]
    fn pure_expressions_are_idempotent(
        tree in shape(false),
        initial in prop::collection::vec(small_value(), VARIABLES),
    ) {
        let (symbols, vars) = table(&initial);
        let expr = tree.build(&vars);
        let mut state = symbols.state();

        let first = expr.evaluate(&mut state);
        prop_assert_eq!(state.as_slice(), initial.as_slice());
        prop_assert_eq!(expr.evaluate(&mut state), first);
    }

    #[test]
    fn assignment_touches_one_slot(
        target in 0..VARIABLES,
        source in shape(false),
        initial in prop::collection::vec(small_value(), VARIABLES),
    ) {
        let (symbols, vars) = table(&initial);
        let expr = vars[target].assign(source.build(&vars));
        let mut state = symbols.state();

        if let Ok(value) = expr.evaluate(&mut state) {
            for (slot, (before, after)) in initial.iter().zip(state.as_slice()).enumerate() {
                if slot == target {
                    prop_assert_eq!(*after, value);
                } else {
                    prop_assert_eq!(before, after);
                }
            }
        }
    }
}
