//! Proposition-preserving partitions and discrete abstractions built on them.
//!
//! A [`Partition`] splits a convex `domain` into index-addressed regions, with
//! a reflexive, symmetric adjacency relation and one proposition label set per
//! region. An [`AbstractionSystem`] adds the refinement history (which coarse
//! *original* region every cell descends from) and, once computed, the
//! transition relation between cells.

use crate::error::PartitionError;
use crate::geometry::{Polytope, Region};
use crate::matrix::BoolMatrix;

/// An ordered collection of regions covering a domain.
///
/// # Invariants
///
/// - `labels.len() == regions.len()`, and every label set has one entry per proposition.
/// - `adjacency` is `n x n`, symmetric, with a true diagonal.
///
/// Coverage and non-overlap of the regions are geometric facts that this type
/// does not check.
#[derive(Debug, Clone)]
pub struct Partition {
    domain: Polytope,
    regions: Vec<Region>,
    labels: Vec<Vec<bool>>,
    prop_symbols: Vec<String>,
    adjacency: BoolMatrix,
}

impl Partition {
    /// Validates and assembles a partition.
    pub fn new(
        domain: Polytope,
        regions: Vec<Region>,
        labels: Vec<Vec<bool>>,
        prop_symbols: Vec<String>,
        adjacency: BoolMatrix,
    ) -> Result<Self, PartitionError> {
        let n = regions.len();
        if labels.len() != n {
            return Err(PartitionError::LabelCount {
                expected: n,
                found: labels.len(),
            });
        }
        if let Some((region, l)) = labels.iter().enumerate().find(|(_, l)| l.len() != prop_symbols.len()) {
            return Err(PartitionError::LabelWidth {
                region,
                expected: prop_symbols.len(),
                found: l.len(),
            });
        }
        if adjacency.size() != n {
            return Err(PartitionError::AdjacencySize {
                expected: n,
                found: adjacency.size(),
            });
        }
        if !adjacency.is_symmetric() {
            return Err(PartitionError::AdjacencyNotSymmetric);
        }
        if !adjacency.is_reflexive() {
            return Err(PartitionError::AdjacencyNotReflexive);
        }
        Ok(Self {
            domain,
            regions,
            labels,
            prop_symbols,
            adjacency,
        })
    }

    /// The trivial partition: the whole domain as a single cell.
    pub fn trivial(domain: Polytope, labels: Vec<bool>, prop_symbols: Vec<String>) -> Result<Self, PartitionError> {
        let region = Region::from(domain.clone());
        Self::new(domain, vec![region], vec![labels], prop_symbols, BoolMatrix::identity(1))
    }

    pub fn domain(&self) -> &Polytope {
        &self.domain
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region(&self, index: usize) -> &Region {
        &self.regions[index]
    }

    pub fn num_regions(&self) -> usize {
        self.regions.len()
    }

    pub fn num_props(&self) -> usize {
        self.prop_symbols.len()
    }

    pub fn prop_symbols(&self) -> &[String] {
        &self.prop_symbols
    }

    /// Proposition labels of a region, one flag per proposition symbol.
    pub fn labels(&self, index: usize) -> &[bool] {
        &self.labels[index]
    }

    /// Names of the propositions that hold in a region.
    pub fn true_props(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.prop_symbols
            .iter()
            .zip(&self.labels[index])
            .filter(|(_, holds)| **holds)
            .map(|(name, _)| name.as_str())
    }

    pub fn adjacency(&self) -> &BoolMatrix {
        &self.adjacency
    }

    pub fn is_adjacent(&self, i: usize, j: usize) -> bool {
        self.adjacency.get(i, j)
    }

    /// Cells adjacent to `index`, including `index` itself.
    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency.row(index)
    }
}

/// A partition together with its refinement history and transition relation.
///
/// Cell `i` descends from `original_regions[origin[i]]`. The transition matrix
/// is `None` until computed by [`compute_transitions`][crate::transitions::compute_transitions];
/// when present, `transitions.get(j, i)` means cell `i` can be driven to cell `j`.
#[derive(Debug, Clone)]
pub struct AbstractionSystem {
    partition: Partition,
    original_regions: Vec<Region>,
    origin: Vec<usize>,
    transitions: Option<BoolMatrix>,
}

impl AbstractionSystem {
    pub fn new(partition: Partition, original_regions: Vec<Region>, origin: Vec<usize>) -> Result<Self, PartitionError> {
        let n = partition.num_regions();
        if origin.len() != n {
            return Err(PartitionError::OriginCount {
                expected: n,
                found: origin.len(),
            });
        }
        if let Some((region, &o)) = origin.iter().enumerate().find(|&(_, &o)| o >= original_regions.len()) {
            return Err(PartitionError::OriginOutOfRange {
                region,
                origin: o,
                available: original_regions.len(),
            });
        }
        Ok(Self {
            partition,
            original_regions,
            origin,
            transitions: None,
        })
    }

    /// An abstraction whose cells are their own originals (no refinement yet).
    pub fn unrefined(partition: Partition) -> Self {
        let original_regions = partition.regions().to_vec();
        let origin = (0..partition.num_regions()).collect();
        Self {
            partition,
            original_regions,
            origin,
            transitions: None,
        }
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    pub fn original_regions(&self) -> &[Region] {
        &self.original_regions
    }

    pub fn origin(&self) -> &[usize] {
        &self.origin
    }

    /// The original (unrefined) region that cell `index` descends from.
    pub fn original_region_of(&self, index: usize) -> &Region {
        &self.original_regions[self.origin[index]]
    }

    pub fn transitions(&self) -> Option<&BoolMatrix> {
        self.transitions.as_ref()
    }

    pub fn set_transitions(&mut self, transitions: BoolMatrix) -> Result<(), PartitionError> {
        let n = self.partition.num_regions();
        if transitions.size() != n {
            return Err(PartitionError::TransitionSize {
                expected: n,
                found: transitions.size(),
            });
        }
        self.transitions = Some(transitions);
        Ok(())
    }

    pub fn clear_transitions(&mut self) {
        self.transitions = None;
    }

    /// Cells reachable in one step from cell `index`, or `None` if transitions are not computed yet.
    pub fn successors(&self, index: usize) -> Option<Vec<usize>> {
        self.transitions.as_ref().map(|t| t.column(index).collect())
    }
}
