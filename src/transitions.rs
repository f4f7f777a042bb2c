//! Transition relation of a discrete abstraction.
//!
//! For every ordered pair of cells `(i, j)` within `trans_length` adjacency
//! hops, the oracle computes the largest part of cell `i` that can be driven
//! into cell `j`. The transition `i -> j` is kept only if that part is all of
//! `i`, up to a volume tolerance.
//!
//! Feasibility is always checked against the *original* region that cell `i`
//! was refined from, never the refined cell itself, so trajectories may leave
//! `i` as long as they stay in its coarse parent.
//!
//! # Examples
//!
//! ```ignore
//! use hysyn::transitions::TransitionConfig;
//!
//! let config = TransitionConfig { horizon: 5, ..TransitionConfig::default() };
//! system.compute_transitions(&oracle, &dynamics, &config)?;
//! let successors = system.successors(0).unwrap();
//! ```

use std::collections::VecDeque;

use log::{debug, info};

use crate::error::AbstractionError;
use crate::geometry::GeometricOracle;
use crate::matrix::BoolMatrix;
use crate::partition::AbstractionSystem;

/// Parameters of the transition computation.
#[derive(Debug, Clone)]
pub struct TransitionConfig {
    /// Number of steps the dynamics may take to reach the target cell (default: 10).
    pub horizon: usize,
    /// Whether the oracle should assume closed-loop control (default: true).
    pub closed_loop: bool,
    /// Maximal number of adjacency hops between source and target cells (default: 1).
    pub trans_length: usize,
    /// Volume below which the infeasible part of a cell is ignored (default: 1e-7).
    pub abs_tol: f64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            horizon: 10,
            closed_loop: true,
            trans_length: 1,
            abs_tol: 1e-7,
        }
    }
}

/// Ordered candidate pairs `(source, target)`, each scheduled exactly once.
///
/// Every nonzero entry of `candidates` schedules both directions, so an
/// asymmetric candidate matrix still gets each pair checked both ways.
fn candidate_pairs(candidates: &BoolMatrix) -> VecDeque<(usize, usize)> {
    let n = candidates.size();
    let mut scheduled = BoolMatrix::new(n);
    let mut worklist = VecDeque::new();
    for (row, col) in candidates.entries() {
        for (source, target) in [(col, row), (row, col)] {
            if !scheduled.get(target, source) {
                scheduled.set(target, source, true);
                worklist.push_back((source, target));
            }
        }
    }
    worklist
}

/// Computes the transition matrix of `system`.
///
/// In the result, entry `(j, i)` is set iff all of cell `i` (up to
/// `config.abs_tol` in volume) can reach cell `j`. The first oracle failure
/// aborts the computation and is returned as [`AbstractionError::Oracle`].
pub fn compute_transitions<O>(
    system: &AbstractionSystem,
    oracle: &O,
    dynamics: &O::Dynamics,
    config: &TransitionConfig,
) -> Result<BoolMatrix, AbstractionError<O::Error>>
where
    O: GeometricOracle,
{
    if config.trans_length == 0 {
        return Err(AbstractionError::InvalidTransLength);
    }

    let partition = system.partition();
    let n = partition.num_regions();

    let candidates = if config.trans_length > 1 {
        partition.adjacency().hop_closure(config.trans_length)
    } else {
        partition.adjacency().clone()
    };
    let mut worklist = candidate_pairs(&candidates);
    let num_pairs = worklist.len();

    let mut transitions = BoolMatrix::new(n);
    while let Some((i, j)) = worklist.pop_front() {
        let source = partition.region(i);
        let target = partition.region(j);

        let s0 = oracle
            .solve_feasible(
                source,
                target,
                dynamics,
                config.horizon,
                config.closed_loop,
                system.original_region_of(i),
            )
            .map_err(AbstractionError::Oracle)?;
        let diff = oracle.set_difference(source, &s0).map_err(AbstractionError::Oracle)?;
        let vol = oracle.volume(&diff).map_err(AbstractionError::Oracle)?;

        let reachable = vol < config.abs_tol;
        debug!("transition {} -> {}: infeasible volume {:e}, kept = {}", i, j, vol, reachable);
        transitions.set(j, i, reachable);
    }

    info!(
        "computed transitions for {} cells: {} of {} candidate pairs feasible",
        n,
        transitions.count(),
        num_pairs
    );
    Ok(transitions)
}

impl AbstractionSystem {
    /// Computes the transition matrix and stores it in this system.
    ///
    /// On failure the previously stored matrix (if any) is left untouched.
    pub fn compute_transitions<O>(
        &mut self,
        oracle: &O,
        dynamics: &O::Dynamics,
        config: &TransitionConfig,
    ) -> Result<(), AbstractionError<O::Error>>
    where
        O: GeometricOracle,
    {
        let transitions = compute_transitions(self, oracle, dynamics, config)?;
        self.set_transitions(transitions)?;
        Ok(())
    }
}
