use alloc::{string::String, vec::Vec};

use indexmap::IndexMap;
use tracing::debug;

use crate::{expression::term::Variable, Error, Result};

/// Current value of every declared variable, indexed by slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct State {
    values: Vec<f64>,
}

impl State {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, slot: usize) -> Result<f64> {
        self.values.get(slot).copied().ok_or(Error::OutOfRange {
            slot,
            len: self.values.len(),
        })
    }

    pub fn get_mut(&mut self, slot: usize) -> Result<&mut f64> {
        let len = self.values.len();
        self.values
            .get_mut(slot)
            .ok_or(Error::OutOfRange { slot, len })
    }

    pub fn value(&self, variable: Variable) -> Result<f64> {
        self.get(variable.slot())
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

impl From<Vec<f64>> for State {
    fn from(values: Vec<f64>) -> Self {
        Self { values }
    }
}

/// Append-only registry of variable names and their initial values.
///
/// Slots are handed out densely in declaration order. Names are not required
/// to be unique: every declaration gets its own slot, and lookup by name
/// resolves to the most recent one.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    names: Vec<String>,
    initial: Vec<f64>,
    // distinct names in first-declaration order, each at its latest slot
    by_name: IndexMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, name: impl Into<String>, initial: f64) -> Variable {
        let name = name.into();
        let slot = self.names.len();
        debug!(%name, slot, initial, "declared variable");

        self.by_name.insert(name.clone(), slot);
        self.names.push(name);
        self.initial.push(initial);
        Variable::new(slot)
    }

    // declares a variable starting at zero
    pub fn var(&mut self, name: impl Into<String>) -> Variable {
        self.declare(name, 0.0)
    }

    pub fn lookup(&self, name: &str) -> Option<Variable> {
        self.by_name.get(name).map(|&slot| Variable::new(slot))
    }

    pub fn name_of(&self, slot: usize) -> Result<&str> {
        self.names
            .get(slot)
            .map(String::as_str)
            .ok_or(Error::OutOfRange {
                slot,
                len: self.names.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates the variables reachable by name, once per distinct name and in
    /// the order each name was first declared. A redeclared name yields its
    /// latest variable.
    pub fn visible(&self) -> impl Iterator<Item = (&str, Variable)> + '_ {
        self.by_name
            .iter()
            .map(|(name, &slot)| (name.as_str(), Variable::new(slot)))
    }

    /// Iterates `(name, initial value)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.initial.iter().copied())
    }

    pub fn state(&self) -> State {
        State::from(self.initial.clone())
    }

    /// Extends `state` with the initial values of variables declared after it
    /// was created. Existing slots keep their current values.
    pub fn sync_state(&self, state: &mut State) {
        if state.values.len() < self.initial.len() {
            let start = state.values.len();
            state.values.extend_from_slice(&self.initial[start..]);
        }
    }
}
