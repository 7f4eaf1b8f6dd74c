//! Solving `A x = b` by Gauss-Jordan elimination of the augmented matrix `[A|b]`.
//!
//! Unlike [`BitLu`](crate::lu::BitLu), this copes with singular systems: it reports whether the
//! system is consistent, which variables are free, and how many solutions there are, and it can
//! produce any of them.

use crate::{
    matrix::BitMatrix,
    store::{BitStore, BitStoreMut},
    vector::BitVector,
    word::Word,
};
use rand::Rng;

/// A square linear system reduced to reduced row echelon form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitGauss<W: Word = u64> {
    lhs: BitMatrix<W>,
    rhs: BitVector<W>,
    pivots: Vec<usize>,
    free: Vec<usize>,
    consistent: bool,
    solution_count: usize,
}

impl<W: Word> BitGauss<W> {
    /// Reduces the system `a x = b`.
    ///
    /// # Panics
    ///
    /// Panics if `a` is not square or `b` does not match its size.
    #[tracing::instrument(level = "debug", skip_all, fields(size = a.rows()))]
    pub fn new<S: BitStore<Word = W> + ?Sized>(a: &BitMatrix<W>, b: &S) -> Self {
        assert!(
            a.is_square(),
            "Gaussian elimination needs a square matrix, got {}x{}",
            a.rows(),
            a.cols()
        );
        let n = a.rows();
        assert_eq!(
            b.len(),
            n,
            "right-hand side of length {} for a system of size {n}",
            b.len()
        );

        let mut lhs = a.clone();
        lhs.push_col(b);
        let mut flags = lhs.to_reduced_echelon_form();
        flags.pop();
        let rhs = lhs.pop_col().unwrap_or_default();

        let pivots: Vec<usize> = flags.ones().collect();
        let free: Vec<usize> = (0..n).filter(|&j| !flags.get(j)).collect();
        let rank = pivots.len();
        let consistent = rhs.span(rank, n).none();

        let solution_count = if !consistent {
            0
        } else if free.len() >= (usize::BITS - 1) as usize {
            1 << (usize::BITS - 1)
        } else {
            1 << free.len()
        };

        tracing::debug!(rank, free = free.len(), consistent, "reduced");
        BitGauss {
            lhs,
            rhs,
            pivots,
            free,
            consistent,
            solution_count,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.lhs.rows()
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.pivots.len()
    }

    #[inline]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Columns without a pivot, in increasing order.
    #[inline]
    pub fn free_indices(&self) -> &[usize] {
        &self.free
    }

    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.consistent
    }

    /// Number of solutions, `2^free_count()` capped at `2^(usize::BITS - 1)`, or 0 for an
    /// inconsistent system.
    #[inline]
    pub fn solution_count(&self) -> usize {
        self.solution_count
    }

    /// The reduced coefficient matrix.
    #[inline]
    pub fn lhs(&self) -> &BitMatrix<W> {
        &self.lhs
    }

    /// The reduced right-hand side.
    #[inline]
    pub fn rhs(&self) -> &BitVector<W> {
        &self.rhs
    }

    /// A solution with uniformly random free variables, or `None` if the system is inconsistent.
    pub fn solve(&self, rng: &mut impl Rng) -> Option<BitVector<W>> {
        if !self.consistent {
            return None;
        }
        let mut x = BitVector::zeros(self.size());
        for &c in &self.free {
            x.set(c, rng.random());
        }
        self.back_substitute(&mut x);
        Some(x)
    }

    /// The solution numbered `i`, for `i < solution_count()`.
    ///
    /// Bit `k` of `i` is the value of the `k`-th free variable in column order. The numbering is
    /// fixed for a given system but depends on how it reduced, so it is not canonical.
    pub fn solve_indexed(&self, i: usize) -> Option<BitVector<W>> {
        if i >= self.solution_count {
            return None;
        }
        let mut x = BitVector::zeros(self.size());
        for (k, &c) in self.free.iter().take(usize::BITS as usize).enumerate() {
            if (i >> k) & 1 == 1 {
                x.set(c, true);
            }
        }
        self.back_substitute(&mut x);
        Some(x)
    }

    /// Fills in the pivot variables of `x` from its free variables, bottom pivot row first.
    fn back_substitute(&self, x: &mut BitVector<W>) {
        let n = self.size();
        for (r, &p) in self.pivots.iter().enumerate().rev() {
            let v = self.rhs.get(r) ^ self.lhs.row(r).span(p + 1, n).dot(&x.span(p + 1, n));
            x.set(p, v);
        }
    }
}
