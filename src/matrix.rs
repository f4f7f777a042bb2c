//! Square boolean matrices for adjacency and transition relations.
//!
//! Entry `(row, col)` follows the convention of the abstraction layer: in a
//! transition matrix, `get(j, i) == true` means cell `i` can move to cell `j`.

use std::fmt;

use crate::bitset::BitSet;

/// A dense `n x n` boolean matrix with bit-set rows.
#[derive(Debug, Clone)]
pub struct BoolMatrix {
    size: usize,
    rows: Vec<BitSet>,
}

impl BoolMatrix {
    /// Creates an all-false `size x size` matrix.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            rows: (0..size).map(|_| BitSet::new(size)).collect(),
        }
    }

    /// Creates the `size x size` identity matrix.
    pub fn identity(size: usize) -> Self {
        let mut m = Self::new(size);
        for i in 0..size {
            m.set(i, i, true);
        }
        m
    }

    /// Creates a matrix with every entry set.
    pub fn full(size: usize) -> Self {
        Self::from_fn(size, |_, _| true)
    }

    /// Creates a matrix whose entry `(row, col)` is `f(row, col)`.
    pub fn from_fn(size: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut m = Self::new(size);
        for row in 0..size {
            for col in 0..size {
                if f(row, col) {
                    m.set(row, col, true);
                }
            }
        }
        m
    }

    /// Builds a matrix from nested rows.
    ///
    /// Returns `None` if the rows do not form a square matrix.
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> Option<Self> {
        let size = rows.len();
        if rows.iter().any(|r| r.as_ref().len() != size) {
            return None;
        }
        Some(Self::from_fn(size, |row, col| rows[row].as_ref()[col]))
    }

    /// Number of rows (equivalently, columns).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the entry at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> bool {
        assert!(col < self.size, "column {} out of bounds for size {}", col, self.size);
        self.rows[row].contains(col)
    }

    /// Sets the entry at `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        assert!(col < self.size, "column {} out of bounds for size {}", col, self.size);
        if value {
            self.rows[row].insert(col);
        } else {
            self.rows[row].remove(col);
        }
    }

    /// Sets both `(a, b)` and `(b, a)`.
    pub fn set_symmetric(&mut self, a: usize, b: usize, value: bool) {
        self.set(a, b, value);
        self.set(b, a, value);
    }

    /// Iterates over the set columns of `row`, in increasing order.
    pub fn row(&self, row: usize) -> impl Iterator<Item = usize> + '_ {
        self.rows[row].iter()
    }

    /// Iterates over the set rows of `col`, in increasing order.
    pub fn column(&self, col: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.size).filter(move |&row| self.rows[row].contains(col))
    }

    /// Iterates over all set entries `(row, col)` in row-major order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(row, bits)| bits.iter().map(move |col| (row, col)))
    }

    /// Number of set entries.
    pub fn count(&self) -> usize {
        self.rows.iter().map(|r| r.len()).sum()
    }

    pub fn is_symmetric(&self) -> bool {
        self.entries().all(|(row, col)| self.get(col, row))
    }

    /// Returns true if every diagonal entry is set.
    pub fn is_reflexive(&self) -> bool {
        (0..self.size).all(|i| self.get(i, i))
    }

    /// Boolean matrix product: `(self * other)[r][c] = OR_k self[r][k] AND other[k][c]`.
    ///
    /// # Panics
    ///
    /// Panics if the sizes differ.
    pub fn multiply(&self, other: &BoolMatrix) -> BoolMatrix {
        assert_eq!(self.size, other.size, "matrix sizes differ");
        let mut result = BoolMatrix::new(self.size);
        for (row, bits) in self.rows.iter().enumerate() {
            for k in bits.iter() {
                result.rows[row].union_with(&other.rows[k]);
            }
        }
        result
    }

    /// Pairs connected by a walk of exactly `hops` steps, i.e. `self^hops` thresholded to booleans.
    ///
    /// For a reflexive relation this coincides with "reachable within `hops` steps".
    /// `hops == 0` yields the identity.
    pub fn hop_closure(&self, hops: usize) -> BoolMatrix {
        if hops == 0 {
            return BoolMatrix::identity(self.size);
        }
        let mut result = self.clone();
        for _ in 1..hops {
            result = result.multiply(self);
        }
        result
    }
}

impl PartialEq for BoolMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && (0..self.size).all(|r| self.row(r).eq(other.row(r)))
    }
}

impl Eq for BoolMatrix {}

impl fmt::Display for BoolMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for row in 0..self.size {
            if row > 0 {
                write!(f, ", ")?;
            }
            write!(f, "[")?;
            for col in 0..self.size {
                if col > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", self.get(row, col) as u8)?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}
