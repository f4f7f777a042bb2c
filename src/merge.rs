//! Joint refinement of two compatible abstractions.
//!
//! Merging intersects every cell of the first partition with every cell of
//! the second and keeps the intersections that have an interior. Two product
//! cells are adjacent only if their parents make them candidates *and* the
//! oracle confirms they share a facet. The merged system has no transitions;
//! they must be recomputed for the refined cells.

use log::{debug, info};

use crate::error::AbstractionError;
use crate::geometry::{GeometricOracle, Region};
use crate::matrix::BoolMatrix;
use crate::partition::{AbstractionSystem, Partition};

/// Parameters of the merge.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Intersections whose Chebyshev radius does not exceed this are
    /// considered degenerate and dropped (default: 1e-5).
    pub min_cheby_radius: f64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self { min_cheby_radius: 1e-5 }
    }
}

/// A kept intersection and the cells it came from.
struct ProductCell {
    region: Region,
    left: usize,
    right: usize,
    origin: usize,
}

fn check_compatible<E>(left: &AbstractionSystem, right: &AbstractionSystem) -> Result<(), AbstractionError<E>> {
    let (p1, p2) = (left.partition(), right.partition());
    if p1.num_props() != p2.num_props() {
        return Err(AbstractionError::PropositionCount {
            left: p1.num_props(),
            right: p2.num_props(),
        });
    }
    if p1.prop_symbols() != p2.prop_symbols() {
        return Err(AbstractionError::PropositionSymbols);
    }
    if left.original_regions().len() != right.original_regions().len() {
        return Err(AbstractionError::OriginalRegionCount {
            left: left.original_regions().len(),
            right: right.original_regions().len(),
        });
    }
    if p1.domain() != p2.domain() {
        return Err(AbstractionError::DomainMismatch);
    }
    Ok(())
}

fn product_cells<O>(
    left: &AbstractionSystem,
    right: &AbstractionSystem,
    oracle: &O,
    config: &MergeConfig,
) -> Result<Vec<ProductCell>, AbstractionError<O::Error>>
where
    O: GeometricOracle,
{
    let (p1, p2) = (left.partition(), right.partition());
    let mut cells = Vec::new();
    for i in 0..p1.num_regions() {
        for j in 0..p2.num_regions() {
            let isect = oracle
                .intersect(p1.region(i), p2.region(j))
                .map_err(AbstractionError::Oracle)?;
            let ball = oracle.cheby_ball(&isect).map_err(AbstractionError::Oracle)?;
            if ball.radius <= config.min_cheby_radius {
                continue;
            }
            let (o1, o2) = (left.origin()[i], right.origin()[j]);
            if o1 != o2 {
                return Err(AbstractionError::OriginMismatch {
                    left_cell: i,
                    right_cell: j,
                    left_origin: o1,
                    right_origin: o2,
                });
            }
            debug!("product cell {} = {} x {} (radius {:e})", cells.len(), i, j, ball.radius);
            cells.push(ProductCell {
                region: isect,
                left: i,
                right: j,
                origin: o1,
            });
        }
    }
    Ok(cells)
}

/// Merges two abstractions into their joint refinement.
///
/// Both inputs must share the domain (same inequality system), the
/// proposition symbols, and the number of original regions; every kept product
/// cell must come from two cells with the same origin. Labels are inherited
/// from `left`, and so are the original regions.
///
/// The adjacency of the result is symmetric with a true diagonal. The
/// transition matrix of the result is `None`.
pub fn merge_partitions<O>(
    left: &AbstractionSystem,
    right: &AbstractionSystem,
    oracle: &O,
    config: &MergeConfig,
) -> Result<AbstractionSystem, AbstractionError<O::Error>>
where
    O: GeometricOracle,
{
    check_compatible(left, right)?;

    let cells = product_cells(left, right, oracle, config)?;
    let (p1, p2) = (left.partition(), right.partition());

    let n = cells.len();
    let mut adjacency = BoolMatrix::identity(n);
    for p in 0..n {
        for q in (p + 1)..n {
            let (a, b) = (&cells[p], &cells[q]);
            let candidate = p1.is_adjacent(a.left, b.left)
                || p2.is_adjacent(a.right, b.right)
                || a.left == b.left
                || a.right == b.right;
            if candidate && oracle.is_adjacent(&a.region, &b.region).map_err(AbstractionError::Oracle)? {
                adjacency.set_symmetric(p, q, true);
            }
        }
    }

    let labels = cells.iter().map(|c| p1.labels(c.left).to_vec()).collect();
    let origin = cells.iter().map(|c| c.origin).collect();
    let regions = cells.into_iter().map(|c| c.region).collect();

    let partition = Partition::new(
        p1.domain().clone(),
        regions,
        labels,
        p1.prop_symbols().to_vec(),
        adjacency,
    )?;
    info!(
        "merged {} x {} cells into {} cells ({} adjacent pairs)",
        p1.num_regions(),
        p2.num_regions(),
        partition.num_regions(),
        (partition.adjacency().count() - n) / 2
    );
    let merged = AbstractionSystem::new(partition, left.original_regions().to_vec(), origin)?;
    Ok(merged)
}
