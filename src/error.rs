//! Error and warning types.
//!
//! Hard errors abort the enclosing build, merge or load. Soft data-quality
//! issues found while loading are reported as [`LoadWarning`]s and never stop
//! processing.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::types::StateId;

/// A [`Partition`][crate::partition::Partition] or
/// [`AbstractionSystem`][crate::partition::AbstractionSystem] whose parts do not fit together.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PartitionError {
    #[error("expected {expected} label sets (one per region), found {found}")]
    LabelCount { expected: usize, found: usize },

    #[error("region {region} has {found} proposition labels, expected {expected}")]
    LabelWidth { region: usize, expected: usize, found: usize },

    #[error("adjacency matrix is {found}x{found}, expected {expected}x{expected}")]
    AdjacencySize { expected: usize, found: usize },

    #[error("adjacency matrix is not symmetric")]
    AdjacencyNotSymmetric,

    #[error("adjacency matrix has a false diagonal entry")]
    AdjacencyNotReflexive,

    #[error("expected {expected} origin entries (one per region), found {found}")]
    OriginCount { expected: usize, found: usize },

    #[error("region {region} descends from original region {origin}, but only {available} exist")]
    OriginOutOfRange {
        region: usize,
        origin: usize,
        available: usize,
    },

    #[error("transition matrix is {found}x{found}, expected {expected}x{expected}")]
    TransitionSize { expected: usize, found: usize },
}

/// Failure of the abstraction builder or merger.
///
/// `E` is the error type of the [`GeometricOracle`][crate::geometry::GeometricOracle]
/// in use; oracle failures are passed through untouched.
#[derive(Debug, Error)]
pub enum AbstractionError<E> {
    #[error("geometric oracle failed")]
    Oracle(#[source] E),

    #[error("transition length must be at least 1")]
    InvalidTransLength,

    #[error("merge: partitions have different number of propositions ({left} vs {right})")]
    PropositionCount { left: usize, right: usize },

    #[error("merge: partitions have different propositions")]
    PropositionSymbols,

    #[error("merge: partitions have different number of original regions ({left} vs {right})")]
    OriginalRegionCount { left: usize, right: usize },

    #[error("merge: partitions have different domains")]
    DomainMismatch,

    #[error(
        "merge: partitions don't share an origin (cell {left_cell} has origin {left_origin}, \
         cell {right_cell} has origin {right_origin})"
    )]
    OriginMismatch {
        left_cell: usize,
        right_cell: usize,
        left_origin: usize,
        right_origin: usize,
    },

    #[error(transparent)]
    Partition(#[from] PartitionError),
}

/// Failure while reading the line-oriented automaton format.
#[derive(Debug, Error)]
pub enum TextError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: successor list appears before any state record")]
    OrphanSuccessors { line: usize },

    #[error("line {line}: invalid integer '{text}'")]
    InvalidNumber { line: usize, text: String },
}

/// Failure while reading the structured (XML) automaton format.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed XML: {0}")]
    Syntax(#[from] roxmltree::Error),

    #[error("expected <{expected}> tag, found <{found}>")]
    TagMismatch { expected: &'static str, found: String },

    #[error("unversioned document: root tag has no version attribute")]
    MissingVersion,

    #[error("unsupported document version: {0}")]
    UnsupportedVersion(String),

    #[error("<{parent}> is missing its <{tag}> tag")]
    MissingTag { parent: &'static str, tag: &'static str },

    #[error("<item> is missing its '{0}' attribute")]
    MissingAttribute(&'static str),

    #[error("invalid integer in <{tag}>: '{text}'")]
    InvalidInteger { tag: &'static str, text: String },

    #[error("missing states in automaton: {missing:?} (expected ids 0..{expected})")]
    MissingStates { expected: usize, missing: Vec<StateId> },
}

/// A non-fatal issue found while loading an automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// A state assigns a variable that is not in the expected variable list.
    UnknownVariable { state: StateId, name: String },
    /// A state leaves an expected variable unassigned.
    UnassignedVariable { state: StateId, name: String },
    /// A state id occurred more than once; the later occurrence was skipped.
    DuplicateState { state: StateId },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::UnknownVariable { state, name } => {
                write!(f, "state {}: unknown variable {}", state, name)
            }
            LoadWarning::UnassignedVariable { state, name } => {
                write!(f, "state {}: variable {} not assigned", state, name)
            }
            LoadWarning::DuplicateState { state } => {
                write!(f, "duplicate nodes found: {}; ignoring...", state)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let e: AbstractionError<io::Error> = AbstractionError::PropositionCount { left: 2, right: 3 };
        assert_eq!(
            e.to_string(),
            "merge: partitions have different number of propositions (2 vs 3)"
        );

        let w = LoadWarning::UnassignedVariable {
            state: StateId::new(4),
            name: "park".to_string(),
        };
        assert_eq!(w.to_string(), "state 4: variable park not assigned");
    }

    #[test]
    fn test_oracle_source_is_preserved() {
        use std::error::Error as _;

        let inner = io::Error::new(io::ErrorKind::Other, "LP infeasible");
        let e = AbstractionError::Oracle(inner);
        let source = e.source().unwrap();
        assert_eq!(source.to_string(), "LP infeasible");
    }
}
