//! LU decomposition with partial pivoting.
//!
//! Over GF(2) every nonzero pivot is 1, so elimination never scales a row: it only XORs the pivot
//! row into the rows below it. The multipliers are exactly the bits already sitting below the
//! pivot, which is why `L` and `U` can share one matrix.

use crate::{
    matrix::BitMatrix,
    store::{BitStore, BitStoreMut},
    vector::BitVector,
    word::Word,
};

/// The factorisation `P A = L U` of a square matrix `A`.
///
/// `L` (unit lower triangular, diagonal implied) and `U` (upper triangular) are packed into one
/// matrix. `P` is kept as a list of row swaps in the order they were made: entry `j` is the row
/// that was swapped into position `j` at step `j`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitLu<W: Word = u64> {
    lu: BitMatrix<W>,
    swaps: Vec<usize>,
    rank: usize,
}

impl<W: Word> BitLu<W> {
    /// Factorises `a`.
    ///
    /// A singular matrix still factorises; columns without a pivot are skipped and lower the
    /// rank.
    ///
    /// # Panics
    ///
    /// Panics if `a` is not square.
    #[tracing::instrument(level = "debug", skip_all, fields(size = a.rows()))]
    pub fn new(a: &BitMatrix<W>) -> Self {
        assert!(
            a.is_square(),
            "LU decomposition needs a square matrix, got {}x{}",
            a.rows(),
            a.cols()
        );
        let n = a.rows();
        let mut lu = a.clone();
        let mut swaps = Vec::with_capacity(n);
        let mut rank = n;

        for j in 0..n {
            let Some(p) = (j..n).find(|&i| lu.bit(i, j)) else {
                tracing::trace!(column = j, "no pivot");
                rank -= 1;
                swaps.push(j);
                continue;
            };
            swaps.push(p);
            if p != j {
                lu.swap_rows(p, j);
            }
            for i in (j + 1)..n {
                if lu.bit(i, j) {
                    lu.add_row_from(j, i, j + 1);
                }
            }
        }

        tracing::debug!(rank, "factorised");
        BitLu { lu, swaps, rank }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.lu.rows()
    }

    /// Number of columns that found a pivot on the diagonal.
    ///
    /// This is the rank of the matrix when it is nonsingular. For singular input it can fall short
    /// of the true rank: a column without a pivot leaves the rows below unchanged, so a later pivot
    /// may sit above the diagonal where this search does not look.
    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    #[inline]
    pub fn is_singular(&self) -> bool {
        self.rank < self.size()
    }

    /// The determinant, which over GF(2) is 1 exactly when the matrix is invertible.
    #[inline]
    pub fn determinant(&self) -> bool {
        !self.is_singular()
    }

    /// The unit lower triangular factor.
    pub fn l(&self) -> BitMatrix<W> {
        self.lu.unit_lower()
    }

    /// The upper triangular factor.
    pub fn u(&self) -> BitMatrix<W> {
        self.lu.upper()
    }

    /// The packed `[L\U]` matrix.
    #[inline]
    pub fn lu(&self) -> &BitMatrix<W> {
        &self.lu
    }

    /// The row swaps, in the order they must be applied.
    #[inline]
    pub fn swaps(&self) -> &[usize] {
        &self.swaps
    }

    /// The permutation as a full index map: row `i` of `P A` is row `permutation_vector()[i]` of
    /// `A`.
    pub fn permutation_vector(&self) -> Vec<usize> {
        let mut perm: Vec<usize> = (0..self.size()).collect();
        for (j, &p) in self.swaps.iter().enumerate() {
            perm.swap(j, p);
        }
        perm
    }

    /// Applies `P` to a vector in place.
    pub fn permute_vector<S: BitStoreMut<Word = W> + ?Sized>(&self, b: &mut S) {
        assert_eq!(
            b.len(),
            self.size(),
            "vector of length {} permuted by a decomposition of size {}",
            b.len(),
            self.size()
        );
        for (j, &p) in self.swaps.iter().enumerate() {
            if p != j {
                b.swap(j, p);
            }
        }
    }

    /// Applies `P` to the rows of a matrix in place.
    pub fn permute(&self, m: &mut BitMatrix<W>) {
        assert_eq!(
            m.rows(),
            self.size(),
            "matrix with {} rows permuted by a decomposition of size {}",
            m.rows(),
            self.size()
        );
        for (j, &p) in self.swaps.iter().enumerate() {
            if p != j {
                m.swap_rows(j, p);
            }
        }
    }

    /// Solves `A x = b`, or returns `None` if `A` is singular.
    pub fn solve<S: BitStore<Word = W> + ?Sized>(&self, b: &S) -> Option<BitVector<W>> {
        let n = self.size();
        assert_eq!(
            b.len(),
            n,
            "right-hand side of length {} for a system of size {n}",
            b.len()
        );
        if self.is_singular() {
            return None;
        }

        let mut x = b.to_vector();
        self.permute_vector(&mut x);

        // L y = P b
        for i in 1..n {
            if self.lu.row(i).span(0, i).dot(&x.span(0, i)) {
                x.flip(i);
            }
        }

        // U x = y, with a unit diagonal since the matrix is invertible
        for i in (0..n.saturating_sub(1)).rev() {
            if self.lu.row(i).span(i + 1, n).dot(&x.span(i + 1, n)) {
                x.flip(i);
            }
        }

        Some(x)
    }

    /// Solves `A X = B` for a matrix of right-hand sides, or returns `None` if `A` is singular.
    pub fn solve_matrix(&self, b: &BitMatrix<W>) -> Option<BitMatrix<W>> {
        let n = self.size();
        assert_eq!(
            b.rows(),
            n,
            "right-hand side with {} rows for a system of size {n}",
            b.rows()
        );
        if self.is_singular() {
            return None;
        }

        let mut x = b.clone();
        self.permute(&mut x);

        for i in 1..n {
            for j in self.lu.row(i).span(0, i).ones() {
                x.add_row(j, i);
            }
        }

        for i in (0..n).rev() {
            for j in self.lu.row(i).span(i + 1, n).ones() {
                x.add_row(i + 1 + j, i);
            }
        }

        Some(x)
    }

    /// The inverse of `A`, or `None` if it is singular.
    pub fn inverse(&self) -> Option<BitMatrix<W>> {
        self.solve_matrix(&BitMatrix::identity(self.size()))
    }
}
