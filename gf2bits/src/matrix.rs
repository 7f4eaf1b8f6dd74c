use crate::{
    error::Gf2Error,
    parse,
    span::BitSpanMut,
    store::{BitStore, BitStoreMut},
    vector::BitVector,
    word::Word,
};
use rand::Rng;
use std::{
    fmt,
    ops::{
        Add, AddAssign, BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Index,
        Mul, Not, Sub, SubAssign,
    },
    str::FromStr,
};

/// A matrix of bits, stored as a vector of [`BitVector`] rows.
///
/// Rows are cheap: they can be borrowed, swapped and XOR-ed in place. Columns have no stored
/// form and are rebuilt on demand in `O(rows)`, so algorithms here are written row-first.
///
/// Every row has exactly [`BitMatrix::cols`] elements.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BitMatrix<W: Word = u64> {
    rows: Vec<BitVector<W>>,
    cols: usize,
}

/// Elementary row operations, applied to a matrix or to something that shadows its row
/// reduction.
///
/// Gaussian elimination reports every operation it performs to a proxy implementing this trait.
/// Using `()` ignores them; using a second matrix replays them there, which is how inverses are
/// computed.
pub trait RowOps {
    fn add_row(&mut self, from: usize, to: usize);
    fn swap_rows(&mut self, from: usize, to: usize);
}

impl<W: Word> BitMatrix<W> {
    /// The 0x0 matrix.
    #[inline]
    pub fn new() -> Self {
        BitMatrix {
            rows: Vec::new(),
            cols: 0,
        }
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        BitMatrix {
            rows: vec![BitVector::zeros(cols); rows],
            cols,
        }
    }

    pub fn ones(rows: usize, cols: usize) -> Self {
        BitMatrix {
            rows: vec![BitVector::ones(cols); rows],
            cols,
        }
    }

    pub fn identity(size: usize) -> Self {
        BitMatrix {
            rows: (0..size).map(|i| BitVector::unit(size, i)).collect(),
            cols: size,
        }
    }

    /// Checkerboard pattern with a set element in the top-left corner.
    pub fn alternating(rows: usize, cols: usize) -> Self {
        let even = BitVector::alternating(cols);
        let odd = !&even;
        BitMatrix {
            rows: (0..rows)
                .map(|i| if i % 2 == 0 { even.clone() } else { odd.clone() })
                .collect(),
            cols,
        }
    }

    /// Builds a matrix from a function `f` giving the value of each element.
    pub fn build(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        BitMatrix {
            rows: (0..rows)
                .map(|i| BitVector::from_fn(cols, |j| f(i, j)))
                .collect(),
            cols,
        }
    }

    /// Stacks the given rows.
    ///
    /// # Panics
    ///
    /// Panics if the rows do not all have the same length.
    pub fn from_rows(rows: Vec<BitVector<W>>) -> Self {
        let cols = rows.first().map_or(0, |r| r.len());
        if let Some(i) = rows.iter().position(|r| r.len() != cols) {
            panic!(
                "row {i} has length {}, but row 0 has length {cols}",
                rows[i].len()
            );
        }
        BitMatrix { rows, cols }
    }

    /// # Panics
    ///
    /// Panics if the rows do not all have the same length.
    pub fn from_bool_vec(data: &[Vec<bool>]) -> Self {
        Self::from_rows(data.iter().map(|r| BitVector::from(r.as_slice())).collect())
    }

    /// Reshapes a store of `rows * cols` elements into a matrix, filling it row by row.
    ///
    /// # Panics
    ///
    /// Panics if the store length is not `rows * cols`.
    pub fn from_vector<S: BitStore<Word = W> + ?Sized>(v: &S, rows: usize, cols: usize) -> Self {
        assert_eq!(
            v.len(),
            rows * cols,
            "cannot reshape {} elements into a {rows}x{cols} matrix",
            v.len()
        );
        let v = v.to_vector();
        BitMatrix {
            rows: (0..rows).map(|i| v.sub(i * cols, (i + 1) * cols)).collect(),
            cols,
        }
    }

    pub fn random(rng: &mut impl Rng, rows: usize, cols: usize) -> Self {
        BitMatrix {
            rows: (0..rows).map(|_| BitVector::random(rng, cols)).collect(),
            cols,
        }
    }

    /// A matrix whose elements are set independently with probability `p`.
    pub fn random_with_probability(rng: &mut impl Rng, rows: usize, cols: usize, p: f64) -> Self {
        BitMatrix {
            rows: (0..rows)
                .map(|_| BitVector::random_with_probability(rng, cols, p))
                .collect(),
            cols,
        }
    }

    /// A random invertible matrix, built by applying random row additions to the identity.
    pub fn random_invertible(rng: &mut impl Rng, size: usize) -> Self {
        let mut m = BitMatrix::identity(size);
        if size < 2 {
            return m;
        }

        for _ in 0..10 * size * size {
            let r1 = rng.random_range(0..size);
            let mut r2 = rng.random_range(0..size - 1);
            if r2 >= r1 {
                r2 += 1;
            }
            m.add_row(r1, r2);
        }

        m
    }

    /// The matrix `u vᵀ`: row `i` is `v` when `u[i]` is set and zero otherwise.
    pub fn outer_product<U, V>(u: &U, v: &V) -> Self
    where
        U: BitStore<Word = W> + ?Sized,
        V: BitStore<Word = W> + ?Sized,
    {
        let v = v.to_vector();
        let zero = BitVector::zeros(v.len());
        BitMatrix {
            rows: u
                .iter()
                .map(|b| if b { v.clone() } else { zero.clone() })
                .collect(),
            cols: v.len(),
        }
    }

    /// The matrix with entries `u[i] + v[j]`.
    pub fn outer_sum<U, V>(u: &U, v: &V) -> Self
    where
        U: BitStore<Word = W> + ?Sized,
        V: BitStore<Word = W> + ?Sized,
    {
        let v = v.to_vector();
        let flipped = !&v;
        BitMatrix {
            rows: u
                .iter()
                .map(|b| if b { flipped.clone() } else { v.clone() })
                .collect(),
            cols: v.len(),
        }
    }

    /// The `n`x`n` matrix that shifts a vector towards the front by `p`, i.e. element `i` of
    /// `M v` is element `i + p` of `v`.
    pub fn left_shift(n: usize, p: usize) -> Self {
        Self::build(n, n, |i, j| j == i + p)
    }

    /// The `n`x`n` matrix that shifts a vector towards the back by `p`, i.e. element `i` of
    /// `M v` is element `i - p` of `v`.
    pub fn right_shift(n: usize, p: usize) -> Self {
        Self::build(n, n, |i, j| i == j + p)
    }

    /// The `n`x`n` matrix that rotates a vector towards the front by `p`.
    pub fn left_rotation(n: usize, p: usize) -> Self {
        Self::build(n, n, |i, j| j == (i + p) % n)
    }

    /// The `n`x`n` matrix that rotates a vector towards the back by `p`.
    pub fn right_rotation(n: usize, p: usize) -> Self {
        Self::build(n, n, |i, j| i == (j + p) % n)
    }

    /// The companion matrix with the given top row and ones on the sub-diagonal.
    pub fn companion<S: BitStore<Word = W> + ?Sized>(top_row: &S) -> Self {
        let n = top_row.len();
        let mut m = Self::zeros(n, n);
        if n > 0 {
            m.rows[0].copy_from(top_row);
        }
        for i in 1..n {
            m.rows[i].set(i - 1, true);
        }
        m
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.cols == 0
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows.len() == self.cols
    }

    #[inline]
    fn assert_square(&self) {
        assert!(
            self.is_square(),
            "matrix must be square, got {}x{}",
            self.rows(),
            self.cols
        );
    }

    #[inline]
    fn assert_same_shape(&self, other: &Self) {
        assert!(
            self.rows() == other.rows() && self.cols == other.cols,
            "matrices have different shapes: {}x{} and {}x{}",
            self.rows(),
            self.cols,
            other.rows(),
            other.cols
        );
    }

    #[inline]
    pub fn bit(&self, i: usize, j: usize) -> bool {
        self.rows[i].get(j)
    }

    #[inline]
    pub fn set_bit(&mut self, i: usize, j: usize, b: bool) {
        self.rows[i].set(j, b);
    }

    #[inline]
    pub fn flip_bit(&mut self, i: usize, j: usize) {
        self.rows[i].flip(j);
    }

    #[inline]
    pub fn row(&self, i: usize) -> &BitVector<W> {
        &self.rows[i]
    }

    /// Mutable view of row `i`. The view covers the whole row, so it cannot change the width.
    #[inline]
    pub fn row_mut(&mut self, i: usize) -> BitSpanMut<'_, W> {
        let cols = self.cols;
        self.rows[i].span_mut(0, cols)
    }

    /// Returns a copy of column `j`.
    pub fn col(&self, j: usize) -> BitVector<W> {
        assert!(
            j < self.cols,
            "column {j} out of bounds for {} columns",
            self.cols
        );
        BitVector::from_fn(self.rows(), |i| self.rows[i].get(j))
    }

    #[inline]
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        self.rows.swap(a, b);
    }

    pub fn swap_cols(&mut self, a: usize, b: usize) {
        for r in self.rows.iter_mut() {
            r.swap(a, b);
        }
    }

    /// Adds row `from` to row `to`.
    #[inline]
    pub fn add_row(&mut self, from: usize, to: usize) {
        let (src, dst) = self.row_pair_mut(from, to);
        dst.xor_assign(src);
    }

    /// Adds the columns `start..` of row `from` to the same columns of row `to`.
    #[inline]
    pub(crate) fn add_row_from(&mut self, from: usize, to: usize, start: usize) {
        let cols = self.cols;
        let (src, dst) = self.row_pair_mut(from, to);
        dst.span_mut(start, cols).xor_assign(&src.span(start, cols));
    }

    /// Borrows row `src` immutably and row `dst` mutably.
    fn row_pair_mut(&mut self, src: usize, dst: usize) -> (&BitVector<W>, &mut BitVector<W>) {
        assert_ne!(src, dst, "cannot borrow row {src} twice");
        if src < dst {
            let (lo, hi) = self.rows.split_at_mut(dst);
            (&lo[src], &mut hi[0])
        } else {
            let (lo, hi) = self.rows.split_at_mut(src);
            (&hi[0], &mut lo[dst])
        }
    }

    /// Appends a row. Pushing onto a matrix with no rows and no columns sets the width.
    ///
    /// # Panics
    ///
    /// Panics if the row length differs from the number of columns.
    pub fn push_row(&mut self, row: BitVector<W>) {
        if self.rows.is_empty() && self.cols == 0 {
            self.cols = row.len();
        }
        assert_eq!(
            row.len(),
            self.cols,
            "row of length {} pushed onto a matrix with {} columns",
            row.len(),
            self.cols
        );
        self.rows.push(row);
    }

    pub fn pop_row(&mut self) -> Option<BitVector<W>> {
        self.rows.pop()
    }

    /// Appends a column.
    ///
    /// # Panics
    ///
    /// Panics if the column length differs from the number of rows.
    pub fn push_col<S: BitStore<Word = W> + ?Sized>(&mut self, col: &S) {
        assert_eq!(
            col.len(),
            self.rows(),
            "column of length {} pushed onto a matrix with {} rows",
            col.len(),
            self.rows()
        );
        for (r, b) in self.rows.iter_mut().zip(col.iter()) {
            r.push(b);
        }
        self.cols += 1;
    }

    pub fn pop_col(&mut self) -> Option<BitVector<W>> {
        if self.cols == 0 {
            return None;
        }
        let col = self
            .rows
            .iter_mut()
            .map(|r| r.pop().unwrap_or(false))
            .collect();
        self.cols -= 1;
        Some(col)
    }

    /// Appends the columns of `other` on the right.
    pub fn append_cols(&mut self, other: &Self) {
        assert_eq!(
            self.rows(),
            other.rows(),
            "cannot append columns of a matrix with a different number of rows"
        );
        for (r, o) in self.rows.iter_mut().zip(other.rows.iter()) {
            r.append(o);
        }
        self.cols += other.cols;
    }

    /// Appends the rows of `other` at the bottom.
    pub fn append_rows(&mut self, other: &Self) {
        if self.rows.is_empty() && self.cols == 0 {
            self.cols = other.cols;
        }
        assert_eq!(
            self.cols, other.cols,
            "cannot append rows of a matrix with a different number of columns"
        );
        self.rows.extend(other.rows.iter().cloned());
    }

    /// Copy of rows `r0..r1` and columns `c0..c1`.
    pub fn sub_matrix(&self, r0: usize, r1: usize, c0: usize, c1: usize) -> Self {
        assert!(
            r0 <= r1 && r1 <= self.rows() && c0 <= c1 && c1 <= self.cols,
            "sub-matrix [{r0}, {r1}) x [{c0}, {c1}) outside a {}x{} matrix",
            self.rows(),
            self.cols
        );
        BitMatrix {
            rows: self.rows[r0..r1].iter().map(|r| r.sub(c0, c1)).collect(),
            cols: c1 - c0,
        }
    }

    /// Overwrites the block with top-left corner `(r0, c0)` by `src`.
    pub fn replace(&mut self, r0: usize, c0: usize, src: &Self) {
        assert!(
            r0 + src.rows() <= self.rows() && c0 + src.cols <= self.cols,
            "a {}x{} block at ({r0}, {c0}) does not fit in a {}x{} matrix",
            src.rows(),
            src.cols,
            self.rows(),
            self.cols
        );
        for (i, s) in src.rows.iter().enumerate() {
            self.rows[r0 + i].span_mut(c0, c0 + src.cols).copy_from(s);
        }
    }

    /// Returns a transposed copy of the matrix
    pub fn transposed(&self) -> Self {
        let mut t = Self::zeros(self.cols, self.rows());
        for (i, r) in self.rows.iter().enumerate() {
            for j in r.ones() {
                t.rows[j].set(i, true);
            }
        }
        t
    }

    /// Transposes a square matrix in place.
    pub fn transpose_in_place(&mut self) {
        self.assert_square();
        for i in 0..self.rows() {
            for j in i + 1..self.cols {
                let (a, b) = (self.rows[i].get(j), self.rows[j].get(i));
                if a != b {
                    self.rows[i].set(j, b);
                    self.rows[j].set(i, a);
                }
            }
        }
    }

    pub fn count_ones(&self) -> usize {
        self.rows.iter().map(|r| r.count_ones()).sum()
    }

    pub fn is_zero(&self) -> bool {
        self.rows.iter().all(|r| r.none())
    }

    pub fn is_ones(&self) -> bool {
        self.rows.iter().all(|r| r.all())
    }

    pub fn is_identity(&self) -> bool {
        self.is_square()
            && self
                .rows
                .iter()
                .enumerate()
                .all(|(i, r)| r.first_set() == Some(i) && r.next_set(i).is_none())
    }

    pub fn is_symmetric(&self) -> bool {
        self.is_square() && *self == self.transposed()
    }

    /// Elements `(i, i)` for `i < min(rows, cols)`.
    pub fn diagonal(&self) -> BitVector<W> {
        BitVector::from_fn(self.rows().min(self.cols), |i| self.rows[i].get(i))
    }

    /// Sum of the diagonal elements.
    pub fn trace(&self) -> bool {
        self.diagonal().count_ones() % 2 == 1
    }

    /// Copy keeping, in row `i`, only the columns `keep(i)`.
    fn masked(&self, keep: impl Fn(usize) -> (usize, usize)) -> Self {
        let mut m = self.clone();
        let cols = self.cols;
        for (i, r) in m.rows.iter_mut().enumerate() {
            let (begin, end) = keep(i);
            let (begin, end) = (begin.min(cols), end.min(cols));
            r.span_mut(0, begin).reset_all();
            r.span_mut(end.max(begin), cols).reset_all();
        }
        m
    }

    fn with_unit_diagonal(mut self) -> Self {
        for i in 0..self.rows().min(self.cols) {
            self.rows[i].set(i, true);
        }
        self
    }

    /// The lower triangle, diagonal included.
    pub fn lower(&self) -> Self {
        self.masked(|i| (0, i + 1))
    }

    pub fn strictly_lower(&self) -> Self {
        self.masked(|i| (0, i))
    }

    /// The strictly lower triangle with ones on the diagonal.
    pub fn unit_lower(&self) -> Self {
        self.strictly_lower().with_unit_diagonal()
    }

    /// The upper triangle, diagonal included.
    pub fn upper(&self) -> Self {
        self.masked(|i| (i, usize::MAX))
    }

    pub fn strictly_upper(&self) -> Self {
        self.masked(|i| (i + 1, usize::MAX))
    }

    /// The strictly upper triangle with ones on the diagonal.
    pub fn unit_upper(&self) -> Self {
        self.strictly_upper().with_unit_diagonal()
    }

    /// Perform gaussian elimination while also performing matching row operations on `proxy`
    /// and returning a vector flagging the pivot columns
    fn gauss_helper(&mut self, full: bool, proxy: &mut impl RowOps) -> BitVector<W> {
        let mut pivots = BitVector::zeros(self.cols);
        let mut pcols = Vec::new();
        let mut row = 0;

        for pcol in 0..self.cols {
            if row == self.rows() {
                break;
            }
            let Some(row1) = (row..self.rows()).find(|&i| self.rows[i].get(pcol)) else {
                continue;
            };

            if row != row1 {
                self.swap_rows(row, row1);
                proxy.swap_rows(row, row1);
            }

            for i in (row + 1)..self.rows() {
                if self.rows[i].get(pcol) {
                    self.add_row(row, i);
                    proxy.add_row(row, i);
                }
            }

            pivots.set(pcol, true);
            pcols.push(pcol);
            row += 1;
        }

        if full {
            for (row, &pcol) in pcols.iter().enumerate().rev() {
                for i in 0..row {
                    if self.rows[i].get(pcol) {
                        self.add_row(row, i);
                        proxy.add_row(row, i);
                    }
                }
            }
        }

        pivots
    }

    /// Reduces the matrix to row echelon form and returns a vector flagging the pivot columns.
    /// The number of set flags is the rank.
    #[inline]
    pub fn to_echelon_form(&mut self) -> BitVector<W> {
        self.gauss_helper(false, &mut ())
    }

    /// Reduces the matrix to reduced row echelon form and returns a vector flagging the pivot
    /// columns.
    #[inline]
    pub fn to_reduced_echelon_form(&mut self) -> BitVector<W> {
        self.gauss_helper(true, &mut ())
    }

    /// Compute the rank of the matrix using gaussian elimination
    #[inline]
    pub fn rank(&self) -> usize {
        self.clone().to_echelon_form().count_ones()
    }

    /// Compute the inverse of the matrix, or `None` if it is singular.
    ///
    /// # Panics
    ///
    /// Panics if the matrix is not square.
    pub fn inverse(&self) -> Option<Self> {
        self.assert_square();
        let mut inv = BitMatrix::identity(self.cols);
        let rank = self.clone().gauss_helper(true, &mut inv).count_ones();
        if rank == self.cols {
            Some(inv)
        } else {
            tracing::trace!(rank, size = self.cols, "matrix is singular");
            None
        }
    }

    /// Raises a square matrix to the power `n`, or to `2^n` if `as_log2` is set.
    pub fn to_the(&self, n: usize, as_log2: bool) -> Self {
        self.assert_square();
        if as_log2 {
            let mut result = self.clone();
            for _ in 0..n {
                result = &result * &result;
            }
            return result;
        }

        let mut result = Self::identity(self.cols);
        let mut base = self.clone();
        let mut e = n;
        while e > 0 {
            if e & 1 == 1 {
                result = &result * &base;
            }
            e >>= 1;
            if e > 0 {
                base = &base * &base;
            }
        }
        result
    }

    /// Matrix product computed one output column at a time: each column of `rhs` is extracted
    /// once and dotted with every row of `self`.
    pub fn dot(&self, rhs: &Self) -> Self {
        self.assert_can_multiply(rhs);
        let mut res = Self::zeros(self.rows(), rhs.cols);
        for j in 0..rhs.cols {
            let c = rhs.col(j);
            for (i, r) in self.rows.iter().enumerate() {
                if r.dot(&c) {
                    res.rows[i].set(j, true);
                }
            }
        }
        res
    }

    /// The product `M v`.
    pub fn dot_vector<S: BitStore<Word = W> + ?Sized>(&self, v: &S) -> BitVector<W> {
        assert_eq!(
            v.len(),
            self.cols,
            "vector of length {} multiplied by a matrix with {} columns",
            v.len(),
            self.cols
        );
        BitVector::from_fn(self.rows(), |i| self.rows[i].dot(v))
    }

    #[inline]
    fn assert_can_multiply(&self, rhs: &Self) {
        assert!(
            self.cols == rhs.rows(),
            "Attempting to multiply matrices of incompatible dimensions: {} != {}",
            self.cols,
            rhs.rows()
        );
    }
}

/// The probability that a uniformly random `n`x`n` matrix over GF(2) is invertible, i.e. the
/// product of `1 - 2^-k` for `k` in `1..=n`.
///
/// Terms past `f64::MANTISSA_DIGITS` no longer change the result and are skipped, so the value
/// saturates for large `n`.
pub fn probability_invertible(n: usize) -> f64 {
    let terms = n.min(f64::MANTISSA_DIGITS as usize);
    (1..=terms).fold(1.0, |p, k| p * (1.0 - 0.5f64.powi(k as i32)))
}

/// `1 - probability_invertible(n)`.
pub fn probability_singular(n: usize) -> f64 {
    1.0 - probability_invertible(n)
}

impl RowOps for () {
    #[inline]
    fn add_row(&mut self, _: usize, _: usize) {}

    #[inline]
    fn swap_rows(&mut self, _: usize, _: usize) {}
}

impl<W: Word> RowOps for BitMatrix<W> {
    #[inline]
    fn add_row(&mut self, from: usize, to: usize) {
        BitMatrix::add_row(self, from, to);
    }

    #[inline]
    fn swap_rows(&mut self, from: usize, to: usize) {
        BitMatrix::swap_rows(self, from, to);
    }
}

impl<W: Word> Index<(usize, usize)> for BitMatrix<W> {
    type Output = bool;

    #[inline]
    fn index(&self, index: (usize, usize)) -> &Self::Output {
        if self.bit(index.0, index.1) {
            &true
        } else {
            &false
        }
    }
}

/// One binary row per line. Rows of a matrix with no columns are written as `0b` so that they
/// still parse back as rows.
///
/// A matrix with no rows has no text to carry its width, so it always parses back as 0x0.
impl<W: Word> fmt::Display for BitMatrix<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, r) in self.rows.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            if r.is_empty() {
                f.write_str("0b")?;
            } else {
                write!(f, "{r}")?;
            }
        }
        Ok(())
    }
}

impl<W: Word> FromStr for BitMatrix<W> {
    type Err = Gf2Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse::parse_matrix(s)
    }
}

impl<W: Word> Mul for &BitMatrix<W> {
    type Output = BitMatrix<W>;

    fn mul(self, rhs: Self) -> Self::Output {
        self.assert_can_multiply(rhs);
        let mut res = BitMatrix::zeros(self.rows(), rhs.cols);

        for (i, r) in self.rows.iter().enumerate() {
            for j in r.ones() {
                res.rows[i].xor_assign(&rhs.rows[j]);
            }
        }

        res
    }
}

impl<W: Word> Mul<&BitVector<W>> for &BitMatrix<W> {
    type Output = BitVector<W>;

    #[inline]
    fn mul(self, rhs: &BitVector<W>) -> Self::Output {
        self.dot_vector(rhs)
    }
}

/// `vᵀ M`, as a vector.
impl<W: Word> Mul<&BitMatrix<W>> for &BitVector<W> {
    type Output = BitVector<W>;

    fn mul(self, rhs: &BitMatrix<W>) -> Self::Output {
        assert_eq!(
            self.len(),
            rhs.rows(),
            "vector of length {} multiplied by a matrix with {} rows",
            self.len(),
            rhs.rows()
        );
        let mut res = BitVector::zeros(rhs.cols);
        for i in self.ones() {
            res.xor_assign(&rhs.rows[i]);
        }
        res
    }
}

macro_rules! elementwise_ops {
    ($(($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $op:ident)),*) => {
        $(
            impl<W: Word> $assign_trait<&BitMatrix<W>> for BitMatrix<W> {
                fn $assign_method(&mut self, rhs: &BitMatrix<W>) {
                    self.assert_same_shape(rhs);
                    for (r, o) in self.rows.iter_mut().zip(rhs.rows.iter()) {
                        r.$op(o);
                    }
                }
            }

            impl<W: Word> $trait for &BitMatrix<W> {
                type Output = BitMatrix<W>;

                fn $method(self, rhs: Self) -> Self::Output {
                    let mut res = self.clone();
                    res.$assign_method(rhs);
                    res
                }
            }
        )*
    };
}

elementwise_ops!(
    (Add, add, AddAssign, add_assign, xor_assign),
    (Sub, sub, SubAssign, sub_assign, xor_assign),
    (BitXor, bitxor, BitXorAssign, bitxor_assign, xor_assign),
    (BitAnd, bitand, BitAndAssign, bitand_assign, and_assign),
    (BitOr, bitor, BitOrAssign, bitor_assign, or_assign)
);

impl<W: Word> Not for &BitMatrix<W> {
    type Output = BitMatrix<W>;

    fn not(self) -> Self::Output {
        BitMatrix {
            rows: self.rows.iter().map(|r| !r).collect(),
            cols: self.cols,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};
    use rstest::rstest;

    #[test]
    fn identity() {
        let m = BitMatrix::<u64>::identity(100);
        for i in 0..100 {
            for j in 0..100 {
                assert_eq!(m[(i, j)], i == j);
            }
        }
        assert!(m.is_identity());
        assert!(m.is_symmetric());
        assert!(!m.trace());
        assert_eq!(m.count_ones(), 100);
    }

    #[test]
    fn fills_and_structure() {
        let a = BitMatrix::<u8>::alternating(3, 4);
        assert_eq!(a.to_string(), "1010\n0101\n1010");
        assert!(BitMatrix::<u8>::ones(3, 9).is_ones());
        assert!(BitMatrix::<u8>::zeros(3, 9).is_zero());

        let c = BitMatrix::companion(&"101".parse::<BitVector>().unwrap());
        assert_eq!(c.to_string(), "101\n100\n010");

        let u: BitVector = "101".parse().unwrap();
        let v: BitVector = "0110".parse().unwrap();
        assert_eq!(
            BitMatrix::outer_product(&u, &v).to_string(),
            "0110\n0000\n0110"
        );
        assert_eq!(BitMatrix::outer_sum(&u, &v).to_string(), "1001\n0110\n1001");
    }

    #[rstest]
    fn shifts_and_rotations(#[values(0, 1, 3, 7)] p: usize) {
        let mut rng = SmallRng::seed_from_u64(p as u64);
        let n = 7;
        let v = BitVector::<u64>::random(&mut rng, n);

        let mut left = v.clone();
        left.shift_left(p);
        assert_eq!(BitMatrix::left_shift(n, p).dot_vector(&v), left);

        let mut right = v.clone();
        right.shift_right(p);
        assert_eq!(BitMatrix::right_shift(n, p).dot_vector(&v), right);

        let rotated_left = BitVector::<u64>::from_fn(n, |i| v.get((i + p) % n));
        assert_eq!(&BitMatrix::<u64>::left_rotation(n, p) * &v, rotated_left);
        let rotated_right = BitVector::<u64>::from_fn(n, |i| v.get((i + n - p % n) % n));
        assert_eq!(&BitMatrix::<u64>::right_rotation(n, p) * &v, rotated_right);
    }

    #[test]
    fn rows_and_columns() {
        let mut m: BitMatrix = "1100 0110 0011".parse().unwrap();
        assert_eq!(m.col(1).to_binary_string(), "110");
        m.swap_cols(0, 3);
        assert_eq!(m.to_string(), "0101\n0110\n1010");
        m.swap_rows(0, 2);
        assert_eq!(m.row(0).to_binary_string(), "1010");

        m.push_col(&"111".parse::<BitVector>().unwrap());
        assert_eq!(m.cols(), 5);
        assert_eq!(m.pop_col().unwrap().to_binary_string(), "111");
        assert_eq!(m.cols(), 4);

        m.push_row(BitVector::ones(4));
        assert_eq!(m.rows(), 4);
        assert_eq!(m.pop_row().unwrap(), BitVector::ones(4));

        m.row_mut(1).flip_all();
        assert_eq!(m.row(1).to_binary_string(), "1001");
        m.flip_bit(1, 1);
        m.set_bit(1, 2, true);
        assert_eq!(m.row(1).to_binary_string(), "1111");
    }

    #[test]
    fn blocks() {
        let mut rng = SmallRng::seed_from_u64(3);
        let m = BitMatrix::<u8>::random(&mut rng, 12, 20);
        let s = m.sub_matrix(2, 7, 5, 17);
        for i in 0..5 {
            for j in 0..12 {
                assert_eq!(s[(i, j)], m[(i + 2, j + 5)]);
            }
        }

        let mut z = BitMatrix::<u8>::zeros(12, 20);
        z.replace(2, 5, &s);
        assert_eq!(z.sub_matrix(2, 7, 5, 17), s);
        assert_eq!(z.count_ones(), s.count_ones());

        let mut wide = m.sub_matrix(0, 12, 0, 9);
        wide.append_cols(&m.sub_matrix(0, 12, 9, 20));
        assert_eq!(wide, m);

        let mut tall = m.sub_matrix(0, 4, 0, 20);
        tall.append_rows(&m.sub_matrix(4, 12, 0, 20));
        assert_eq!(tall, m);
    }

    #[test]
    fn reshape_vector() {
        let v: BitVector = "110001".parse().unwrap();
        let m = BitMatrix::from_vector(&v, 2, 3);
        assert_eq!(m.to_string(), "110\n001");
        assert_eq!(BitMatrix::<u8>::zeros(3, 0).to_string(), "0b\n0b\n0b");
        let b = BitMatrix::<u64>::from_bool_vec(&[vec![true, false], vec![false, true]]);
        assert!(b.is_identity());
    }

    #[test]
    fn transpose() {
        let mut rng = SmallRng::seed_from_u64(1);
        let m = BitMatrix::<u64>::random(&mut rng, 10, 4);
        let n = m.transposed();
        for i in 0..m.rows() {
            for j in 0..m.cols() {
                assert_eq!(m[(i, j)], n[(j, i)]);
            }
        }

        let m = BitMatrix::<u64>::random(&mut rng, 300, 200);
        let n = m.transposed();
        for i in 0..m.rows() {
            for j in 0..m.cols() {
                assert_eq!(m[(i, j)], n[(j, i)]);
            }
        }
    }

    #[test]
    fn transpose_in_place() {
        let mut rng = SmallRng::seed_from_u64(1);
        let m = BitMatrix::<u16>::random(&mut rng, 37, 37);
        let mut n = m.clone();
        n.transpose_in_place();
        assert_eq!(n, m.transposed());
        n.transpose_in_place();
        assert_eq!(m, n);
    }

    #[test]
    fn triangles() {
        let m = BitMatrix::<u8>::ones(3, 4);
        assert_eq!(m.lower().to_string(), "1000\n1100\n1110");
        assert_eq!(m.strictly_lower().to_string(), "0000\n1000\n1100");
        assert_eq!(m.upper().to_string(), "1111\n0111\n0011");
        assert_eq!(m.strictly_upper().to_string(), "0111\n0011\n0001");

        let z = BitMatrix::<u8>::zeros(3, 3);
        assert!(z.unit_lower().is_identity());
        assert!(z.unit_upper().is_identity());
        assert_eq!(m.diagonal().to_binary_string(), "111");
        assert!(m.trace());
    }

    #[test]
    fn echelon_forms() {
        let mut m: BitMatrix = "0110 0101 0011 1111".parse().unwrap();
        let pivots = m.to_echelon_form();
        assert_eq!(pivots.to_binary_string(), "1110");
        assert_eq!(m.to_string(), "1111\n0101\n0011\n0000");

        let mut r: BitMatrix = "0110 0101 0011 1111".parse().unwrap();
        r.to_reduced_echelon_form();
        assert_eq!(r.to_string(), "1001\n0101\n0011\n0000");
        assert_eq!(r.rank(), 3);
    }

    #[test]
    fn random_echelon_is_echelon() {
        let mut rng = SmallRng::seed_from_u64(9);
        let mut m = BitMatrix::<u32>::random(&mut rng, 30, 50);
        let pivots = m.to_reduced_echelon_form();
        let leads: Vec<Option<usize>> = (0..m.rows()).map(|i| m.row(i).first_set()).collect();
        let rank = pivots.count_ones();
        for (i, lead) in leads.iter().enumerate() {
            if i < rank {
                let col = lead.unwrap();
                assert!(pivots.get(col));
                assert_eq!(m.col(col).count_ones(), 1);
                if i > 0 {
                    assert!(leads[i - 1].unwrap() < col);
                }
            } else {
                assert!(lead.is_none());
            }
        }
    }

    #[test]
    fn matrix_mult() {
        let mut rng = SmallRng::seed_from_u64(1);
        let m1 = BitMatrix::<u64>::random(&mut rng, 80, 100);
        let m2 = BitMatrix::<u64>::random(&mut rng, 100, 70);
        let m3 = &m1 * &m2;

        for i in 0..m3.rows() {
            for j in 0..m3.cols() {
                let mut b = false;
                for k in 0..m1.cols() {
                    b ^= m1.bit(i, k) & m2.bit(k, j);
                }
                assert_eq!(m3.bit(i, j), b);
            }
        }
        assert_eq!(m1.dot(&m2), m3);

        let v = BitVector::<u64>::random(&mut rng, 80);
        assert_eq!(&v * &m1, m1.transposed().dot_vector(&v));
    }

    #[test]
    #[should_panic(expected = "incompatible dimensions")]
    fn mult_mismatch() {
        let a = BitMatrix::<u64>::zeros(2, 3);
        let _ = &a * &a;
    }

    #[test]
    fn matrix_inv() {
        let mut rng = SmallRng::seed_from_u64(1);
        let sz = 100;
        let m = BitMatrix::<u64>::random_invertible(&mut rng, sz);
        let n = m.inverse().unwrap();
        let id = BitMatrix::identity(sz);

        assert_eq!(&m * &n, id);
        assert_eq!(&n * &m, id);
        assert!(BitMatrix::<u64>::ones(3, 3).inverse().is_none());
    }

    #[test]
    #[should_panic(expected = "must be square")]
    fn inverse_of_non_square() {
        BitMatrix::<u64>::zeros(2, 3).inverse();
    }

    #[test]
    fn powers() {
        let mut rng = SmallRng::seed_from_u64(2);
        let m = BitMatrix::<u16>::random(&mut rng, 20, 20);
        let mut naive = BitMatrix::<u16>::identity(20);
        for _ in 0..13 {
            naive = &naive * &m;
        }
        assert_eq!(m.to_the(13, false), naive);
        assert_eq!(m.to_the(3, true), m.to_the(8, false));
        assert!(m.to_the(0, false).is_identity());
        assert_eq!(m.to_the(0, true), m);
    }

    #[test]
    fn elementwise() {
        let a: BitMatrix<u8> = "1100 1010".parse().unwrap();
        let b: BitMatrix<u8> = "1010 0110".parse().unwrap();
        assert_eq!((&a + &b).to_string(), "0110\n1100");
        assert_eq!(&a - &b, &a ^ &b);
        assert_eq!((&a & &b).to_string(), "1000\n0010");
        assert_eq!((&a | &b).to_string(), "1110\n1110");
        assert_eq!((!&a).to_string(), "0011\n0101");
        let mut c = a.clone();
        c += &a;
        assert!(c.is_zero());
    }

    #[test]
    fn probabilities() {
        assert_eq!(probability_invertible(0), 1.0);
        assert_eq!(probability_invertible(1), 0.5);
        assert!((probability_invertible(2) - 0.375).abs() < 1e-12);
        assert_eq!(probability_invertible(1000), probability_invertible(53));
        assert!((probability_singular(100) - 0.711_211_904_913_2).abs() < 1e-9);
    }
}
