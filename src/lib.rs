//! # hysyn: discrete abstractions and controllers for hybrid systems
//!
//! **`hysyn`** is the discrete core of a controller-synthesis toolchain for
//! hybrid systems. It turns a partition of a continuous state space into a
//! finite transition system, refines abstractions against each other, and
//! stores, queries and reduces the finite-state controllers that a reactive
//! synthesis tool produces for that transition system.
//!
//! ## Pipeline
//!
//! 1. Start from a [`Partition`][crate::partition::Partition] of the domain,
//!    wrapped in an [`AbstractionSystem`][crate::partition::AbstractionSystem].
//! 2. Compute which cells can be driven into which neighbours with
//!    [`compute_transitions`][crate::transitions::compute_transitions].
//! 3. Combine two abstractions into their joint refinement with
//!    [`merge_partitions`][crate::merge::merge_partitions] (and recompute transitions).
//! 4. Load the synthesized strategy into an [`Automaton`][crate::automaton::Automaton]
//!    and drive it with [`find_next_state`][crate::automaton::Automaton::find_next_state].
//!
//! ## Geometry
//!
//! All geometric work (intersection, set difference, volume, adjacency,
//! Chebyshev balls, backward reachability) is delegated to a
//! [`GeometricOracle`][crate::geometry::GeometricOracle] supplied by the caller.
//! This crate only stores regions in H-representation and never does
//! polytope arithmetic itself.
//!
//! ## Basic Usage
//!
//! ```rust
//! use hysyn::automaton::Automaton;
//!
//! let input = "\
//! State 0 with rank 0 -> <x:0, y:1>
//!     With successors : 1
//! State 1 with rank 0 -> <x:1, y:0>
//!     With successors : 0
//! ";
//! let (aut, warnings) = Automaton::from_aut_str(input, &[]).unwrap();
//! assert!(warnings.is_empty());
//!
//! let start = aut.find(&[("x", 0), ("y", 1)]).unwrap();
//! let next = aut.find_next_state(Some(start), &[("x", 1)]).unwrap();
//! assert_eq!(next.id().index(), 1);
//! ```
//!
//! ## Core Components
//!
//! - **[`partition`]**, **[`transitions`]**, **[`merge`]**: discrete abstractions.
//! - **[`automaton`]**: controllers, with text and XML loaders, reductions and DOT export.
//! - **[`geometry`]**: region storage and the oracle trait.

pub mod automaton;
pub mod bitset;
pub mod error;
pub mod geometry;
pub mod matrix;
pub mod merge;
pub mod partition;
pub mod transitions;
pub mod types;
