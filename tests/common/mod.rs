//! Exact geometric oracle for unions of axis-aligned boxes.
//!
//! Regions must be built with [`Polytope::from_box`]; pieces of a region are
//! assumed to be pairwise disjoint (up to shared faces). The dynamics are a
//! constant drift plus a bounded control input per step:
//! `x' = x + drift + u` with `|u_k| <= control`.

#![allow(dead_code)]

use std::fmt;

use hysyn::geometry::{ChebyBall, GeometricOracle, Polytope, Region};
use hysyn::matrix::BoolMatrix;
use hysyn::partition::{AbstractionSystem, Partition};

const EPS: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub enum BoxError {
    NotABox,
    DimensionMismatch { expected: usize, found: usize },
}

impl fmt::Display for BoxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoxError::NotABox => write!(f, "polytope is not an axis-aligned box"),
            BoxError::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {}, found {}", expected, found)
            }
        }
    }
}

impl std::error::Error for BoxError {}

#[derive(Debug, Clone, PartialEq)]
pub struct Aabb {
    pub lo: Vec<f64>,
    pub hi: Vec<f64>,
}

impl Aabb {
    pub fn new(lo: &[f64], hi: &[f64]) -> Self {
        Self {
            lo: lo.to_vec(),
            hi: hi.to_vec(),
        }
    }

    fn from_polytope(p: &Polytope) -> Result<Self, BoxError> {
        let dim = p.dim();
        let mut lo = vec![f64::NEG_INFINITY; dim];
        let mut hi = vec![f64::INFINITY; dim];
        for (row, &rhs) in p.a().iter().zip(p.b()) {
            let mut nonzero = row.iter().enumerate().filter(|&(_, &c)| c != 0.0);
            let (k, &c) = nonzero.next().ok_or(BoxError::NotABox)?;
            if nonzero.next().is_some() {
                return Err(BoxError::NotABox);
            }
            if c > 0.0 {
                hi[k] = hi[k].min(rhs / c);
            } else {
                lo[k] = lo[k].max(rhs / c);
            }
        }
        Ok(Self { lo, hi })
    }

    fn to_polytope(&self) -> Polytope {
        Polytope::from_box(&self.lo, &self.hi)
    }

    fn dim(&self) -> usize {
        self.lo.len()
    }

    fn width(&self, k: usize) -> f64 {
        self.hi[k] - self.lo[k]
    }

    fn volume(&self) -> f64 {
        (0..self.dim()).map(|k| self.width(k).max(0.0)).product()
    }

    fn has_interior(&self) -> bool {
        (0..self.dim()).all(|k| self.width(k) > EPS)
    }

    fn intersect(&self, other: &Aabb) -> Aabb {
        let lo = self.lo.iter().zip(&other.lo).map(|(a, b)| a.max(*b)).collect();
        let hi = self.hi.iter().zip(&other.hi).map(|(a, b)| a.min(*b)).collect();
        Aabb { lo, hi }
    }

    /// Disjoint boxes covering `self \ other`.
    fn subtract(&self, other: &Aabb) -> Vec<Aabb> {
        if !self.intersect(other).has_interior() {
            return vec![self.clone()];
        }
        let mut rest = self.clone();
        let mut out = Vec::new();
        for k in 0..self.dim() {
            if rest.lo[k] < other.lo[k] {
                let mut below = rest.clone();
                below.hi[k] = other.lo[k];
                out.push(below);
                rest.lo[k] = other.lo[k];
            }
            if rest.hi[k] > other.hi[k] {
                let mut above = rest.clone();
                above.lo[k] = other.hi[k];
                out.push(above);
                rest.hi[k] = other.hi[k];
            }
        }
        out.retain(Aabb::has_interior);
        out
    }

    /// Shares a facet: touching in exactly one axis, overlapping with positive length in all others.
    fn touches(&self, other: &Aabb) -> bool {
        let isect = self.intersect(other);
        let flat: Vec<usize> = (0..self.dim()).filter(|&k| isect.width(k).abs() <= EPS).collect();
        flat.len() == 1 && (0..self.dim()).all(|k| isect.width(k) >= -EPS)
    }
}

/// Constant drift plus bounded control.
#[derive(Debug, Clone)]
pub struct Drift {
    pub step: Vec<f64>,
    pub control: f64,
}

#[derive(Debug, Default)]
pub struct BoxOracle;

impl BoxOracle {
    fn boxes(region: &Region) -> Result<Vec<Aabb>, BoxError> {
        region.pieces().iter().map(Aabb::from_polytope).collect()
    }

    fn region(boxes: impl IntoIterator<Item = Aabb>) -> Region {
        Region::new(boxes.into_iter().map(|b| b.to_polytope()).collect())
    }

    fn check_dim(boxes: &[Aabb], dim: usize) -> Result<(), BoxError> {
        match boxes.iter().find(|b| b.dim() != dim) {
            Some(b) => Err(BoxError::DimensionMismatch {
                expected: dim,
                found: b.dim(),
            }),
            None => Ok(()),
        }
    }

    /// States that reach `target` in one step.
    fn pre(target: &Aabb, dynamics: &Drift, closed_loop: bool) -> Aabb {
        let slack = if closed_loop { dynamics.control } else { 0.0 };
        let lo = target.lo.iter().zip(&dynamics.step).map(|(l, d)| l - d - slack).collect();
        let hi = target.hi.iter().zip(&dynamics.step).map(|(h, d)| h - d + slack).collect();
        Aabb { lo, hi }
    }
}

impl GeometricOracle for BoxOracle {
    type Dynamics = Drift;
    type Error = BoxError;

    fn intersect(&self, a: &Region, b: &Region) -> Result<Region, BoxError> {
        let (a, b) = (Self::boxes(a)?, Self::boxes(b)?);
        let mut out = Vec::new();
        for x in &a {
            for y in &b {
                let isect = x.intersect(y);
                if (0..isect.dim()).all(|k| isect.width(k) >= 0.0) {
                    out.push(isect);
                }
            }
        }
        Ok(Self::region(out))
    }

    fn set_difference(&self, a: &Region, b: &Region) -> Result<Region, BoxError> {
        let mut rest = Self::boxes(a)?;
        for y in Self::boxes(b)? {
            rest = rest.iter().flat_map(|x| x.subtract(&y)).collect();
        }
        Ok(Self::region(rest))
    }

    fn volume(&self, region: &Region) -> Result<f64, BoxError> {
        Ok(Self::boxes(region)?.iter().map(Aabb::volume).sum())
    }

    fn is_adjacent(&self, a: &Region, b: &Region) -> Result<bool, BoxError> {
        let (a, b) = (Self::boxes(a)?, Self::boxes(b)?);
        Ok(a.iter().any(|x| b.iter().any(|y| x.touches(y))))
    }

    fn cheby_ball(&self, region: &Region) -> Result<ChebyBall, BoxError> {
        let best = Self::boxes(region)?
            .into_iter()
            .map(|b| {
                let radius = (0..b.dim()).map(|k| b.width(k) / 2.0).fold(f64::INFINITY, f64::min);
                let center = b.lo.iter().zip(&b.hi).map(|(l, h)| (l + h) / 2.0).collect();
                ChebyBall { radius, center }
            })
            .max_by(|x, y| x.radius.total_cmp(&y.radius));
        Ok(best.unwrap_or(ChebyBall {
            radius: -1.0,
            center: Vec::new(),
        }))
    }

    fn solve_feasible(
        &self,
        source: &Region,
        target: &Region,
        dynamics: &Drift,
        horizon: usize,
        closed_loop: bool,
        excursion: &Region,
    ) -> Result<Region, BoxError> {
        let dim = dynamics.step.len();
        let allowed = Self::boxes(excursion)?;
        let mut layer = Self::boxes(target)?;
        Self::check_dim(&allowed, dim)?;
        Self::check_dim(&layer, dim)?;

        let mut reach = layer.clone();
        for _ in 0..horizon {
            let mut next = Vec::new();
            for t in &layer {
                let pre = Self::pre(t, dynamics, closed_loop);
                next.extend(allowed.iter().map(|e| pre.intersect(e)).filter(Aabb::has_interior));
            }
            if next.is_empty() {
                break;
            }
            reach.extend(next.iter().cloned());
            layer = next;
        }
        self.intersect(source, &Self::region(reach))
    }
}

/// 1-D partition of `[cuts[0], cuts[last]]` into consecutive intervals, all in one original region.
pub fn line_system(cuts: &[f64]) -> AbstractionSystem {
    let n = cuts.len() - 1;
    let domain = Polytope::from_box(&[cuts[0]], &[cuts[n]]);
    let regions = cuts
        .windows(2)
        .map(|w| Region::from(Polytope::from_box(&[w[0]], &[w[1]])))
        .collect();
    let adjacency = BoolMatrix::from_fn(n, |r, c| r.abs_diff(c) <= 1);
    let labels = (0..n).map(|i| vec![i == 0]).collect();
    let partition = Partition::new(domain.clone(), regions, labels, vec!["home".to_string()], adjacency)
        .expect("valid line partition");
    AbstractionSystem::new(partition, vec![Region::from(domain)], vec![0; n]).expect("valid origins")
}

/// 2-D grid partition of `[0, nx] x [0, ny]` into unit squares, row-major.
pub fn grid_system(nx: usize, ny: usize) -> AbstractionSystem {
    let domain = Polytope::from_box(&[0.0, 0.0], &[nx as f64, ny as f64]);
    let mut regions = Vec::new();
    let mut coords = Vec::new();
    for j in 0..ny {
        for i in 0..nx {
            let (x, y) = (i as f64, j as f64);
            regions.push(Region::from(Polytope::from_box(&[x, y], &[x + 1.0, y + 1.0])));
            coords.push((i, j));
        }
    }
    let n = regions.len();
    let adjacency = BoolMatrix::from_fn(n, |r, c| {
        let ((i1, j1), (i2, j2)) = (coords[r], coords[c]);
        i1.abs_diff(i2) + j1.abs_diff(j2) <= 1
    });
    let labels = vec![vec![]; n];
    let partition = Partition::new(domain.clone(), regions, labels, vec![], adjacency).expect("valid grid partition");
    AbstractionSystem::new(partition, vec![Region::from(domain)], vec![0; n]).expect("valid origins")
}
