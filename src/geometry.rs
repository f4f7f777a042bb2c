//! Regions of the continuous state space and the geometric oracle contract.
//!
//! This crate does not do polytope arithmetic. A [`Region`] is plain data (a
//! union of convex pieces in H-representation), and every geometric question
//! asked by the abstraction builder and merger goes through a
//! [`GeometricOracle`] supplied by the caller.
//!
//! # Examples
//!
//! ```
//! use hysyn::geometry::{Polytope, Region};
//!
//! // The unit square [0, 1] x [0, 1].
//! let square = Polytope::from_box(&[0.0, 0.0], &[1.0, 1.0]);
//! assert_eq!(square.dim(), 2);
//! assert_eq!(square.num_constraints(), 4);
//! assert!(square.contains(&[0.5, 0.5], 0.0));
//!
//! let region = Region::from(square);
//! assert_eq!(region.num_pieces(), 1);
//! ```

/// A convex polytope `{ x : A x <= b }`.
///
/// Equality is structural: two polytopes are equal iff they have the same
/// inequality system, row for row.
#[derive(Debug, Clone, PartialEq)]
pub struct Polytope {
    a: Vec<Vec<f64>>,
    b: Vec<f64>,
}

impl Polytope {
    /// Creates a polytope from its inequality system.
    ///
    /// # Panics
    ///
    /// Panics if `a` and `b` have different numbers of rows, or if the rows of `a` differ in length.
    pub fn new(a: Vec<Vec<f64>>, b: Vec<f64>) -> Self {
        assert_eq!(a.len(), b.len(), "A and b must have the same number of rows");
        if let Some(first) = a.first() {
            assert!(a.iter().all(|row| row.len() == first.len()), "rows of A must have equal length");
        }
        Self { a, b }
    }

    /// Axis-aligned box `lower <= x <= upper`, as `2 * dim` constraints.
    ///
    /// Rows come in the order `x_0 <= u_0, -x_0 <= -l_0, x_1 <= u_1, ...`.
    pub fn from_box(lower: &[f64], upper: &[f64]) -> Self {
        assert_eq!(lower.len(), upper.len(), "box bounds must have equal dimension");
        let dim = lower.len();
        let mut a = Vec::with_capacity(2 * dim);
        let mut b = Vec::with_capacity(2 * dim);
        for k in 0..dim {
            let mut up = vec![0.0; dim];
            up[k] = 1.0;
            a.push(up);
            b.push(upper[k]);
            let mut low = vec![0.0; dim];
            low[k] = -1.0;
            a.push(low);
            b.push(-lower[k]);
        }
        Self { a, b }
    }

    pub fn a(&self) -> &[Vec<f64>] {
        &self.a
    }

    pub fn b(&self) -> &[f64] {
        &self.b
    }

    /// Dimension of the ambient space (0 for an unconstrained system).
    pub fn dim(&self) -> usize {
        self.a.first().map_or(0, |row| row.len())
    }

    pub fn num_constraints(&self) -> usize {
        self.b.len()
    }

    /// Checks `A x <= b + tol` row by row.
    pub fn contains(&self, x: &[f64], tol: f64) -> bool {
        self.a.iter().zip(&self.b).all(|(row, &rhs)| {
            let lhs: f64 = row.iter().zip(x).map(|(ai, xi)| ai * xi).sum();
            lhs <= rhs + tol
        })
    }
}

/// A union of convex polytopes; one cell of a partition.
///
/// An empty list of pieces denotes the empty set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Region {
    pieces: Vec<Polytope>,
}

impl Region {
    pub fn new(pieces: Vec<Polytope>) -> Self {
        Self { pieces }
    }

    /// The empty region.
    pub fn empty() -> Self {
        Self { pieces: Vec::new() }
    }

    pub fn pieces(&self) -> &[Polytope] {
        &self.pieces
    }

    pub fn num_pieces(&self) -> usize {
        self.pieces.len()
    }

    /// True if the region has no pieces. This is a syntactic check; a region
    /// with infeasible pieces is not detected here (ask the oracle for its volume).
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn contains(&self, x: &[f64], tol: f64) -> bool {
        self.pieces.iter().any(|p| p.contains(x, tol))
    }
}

impl From<Polytope> for Region {
    fn from(p: Polytope) -> Self {
        Self { pieces: vec![p] }
    }
}

/// Largest ball inscribed in a region.
#[derive(Debug, Clone, PartialEq)]
pub struct ChebyBall {
    pub radius: f64,
    pub center: Vec<f64>,
}

/// Geometric and reachability primitives consumed by the abstraction layer.
///
/// Implementations are expected to be side-effect free: the builder may call
/// them in any order and never retries a failed call.
pub trait GeometricOracle {
    /// Description of the continuous dynamics understood by [`solve_feasible`](Self::solve_feasible).
    type Dynamics;

    /// Failure of a geometric or numerical computation.
    type Error: std::error::Error + 'static;

    fn intersect(&self, a: &Region, b: &Region) -> Result<Region, Self::Error>;

    /// Set difference `a \ b`.
    fn set_difference(&self, a: &Region, b: &Region) -> Result<Region, Self::Error>;

    /// Volume (Lebesgue measure) of the region; always `>= 0`.
    fn volume(&self, region: &Region) -> Result<f64, Self::Error>;

    /// True if the two regions share a facet.
    fn is_adjacent(&self, a: &Region, b: &Region) -> Result<bool, Self::Error>;

    /// Chebyshev ball of the region. Empty or degenerate regions report a non-positive radius.
    fn cheby_ball(&self, region: &Region) -> Result<ChebyBall, Self::Error>;

    /// Maximal subset of `source` from which `target` is reachable within
    /// `horizon` steps under `dynamics`, staying inside `excursion` throughout.
    fn solve_feasible(
        &self,
        source: &Region,
        target: &Region,
        dynamics: &Self::Dynamics,
        horizon: usize,
        closed_loop: bool,
        excursion: &Region,
    ) -> Result<Region, Self::Error>;
}
