//! Type-safe wrappers for automaton state ids and variable indices.
//!
//! These newtypes keep the two kinds of indices used by the
//! [`Automaton`][crate::automaton::Automaton] apart: a [`StateId`] keys a
//! state, a [`VarId`] addresses a slot in a valuation.
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Identifier of an automaton state (0-indexed).
///
/// # Invariants
///
/// - After loading from canonical storage, the state with id `k` is the `k`-th state.
/// - During incremental construction ids may be sparse or arrive out of order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct StateId(usize);

impl StateId {
    /// Creates a state id from its raw index.
    pub const fn new(index: usize) -> Self {
        StateId(index)
    }

    /// Returns the raw index as a `usize`.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for StateId {
    fn from(index: usize) -> Self {
        StateId(index)
    }
}

impl From<StateId> for usize {
    fn from(id: StateId) -> Self {
        id.0
    }
}

impl FromStr for StateId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(StateId)
    }
}

/// Index of a variable in a [`VarTable`][crate::automaton::VarTable].
///
/// Variable ids are assigned in order of first appearance and never change
/// for the lifetime of the table.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VarId(usize);

impl VarId {
    pub const fn new(index: usize) -> Self {
        VarId(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}
