//! Characteristic polynomials via Danilevsky's reduction to Frobenius form.
//!
//! A sequence of similarity transforms turns a square matrix into a block upper triangular
//! matrix whose diagonal blocks are companion matrices. A companion block is determined by its top
//! row, and its characteristic polynomial can be read straight off that row, so the characteristic
//! polynomial of the whole matrix is the product of the per-block polynomials. The blocks above
//! the diagonal do not affect it and are discarded.

use crate::{
    matrix::BitMatrix,
    polynomial::BitPolynomial,
    store::{BitStore, BitStoreMut},
    vector::BitVector,
    word::Word,
};

/// Reduces `m` to Frobenius form and returns the top rows of its companion blocks, in order
/// down the diagonal.
///
/// # Panics
///
/// Panics if `m` is not square.
pub fn companion_blocks<W: Word>(m: &BitMatrix<W>) -> Vec<BitVector<W>> {
    assert!(
        m.is_square(),
        "Frobenius form needs a square matrix, got {}x{}",
        m.rows(),
        m.cols()
    );
    let mut a = m.clone();
    let mut tops = Vec::new();

    // the working block is the leading k x k sub-matrix; everything below it is already in
    // companion form
    let mut k = a.rows();
    while k > 0 {
        let mut i = k - 1;
        loop {
            if i == 0 {
                tops.push(a.row(0).sub(0, k));
                k = 0;
                break;
            }

            if !a.bit(i, i - 1) {
                if let Some(j) = a.row(i).span(0, i - 1).last_set() {
                    // a simultaneous row and column swap is a similarity transform
                    a.swap_cols(j, i - 1);
                    a.swap_rows(j, i - 1);
                }
            }

            if !a.bit(i, i - 1) {
                // row i is zero left of the diagonal, so rows i..k split off as a companion block
                tops.push(a.row(i).sub(i, k));
                k = i;
                break;
            }

            eliminate_row(&mut a, i, k);
            i -= 1;
        }
        tracing::trace!(size = tops.last().map_or(0, |t| t.len()), "companion block");
    }

    tops.reverse();
    tops
}

/// Turns row `i` of the leading `k` x `k` block into `e_(i-1)` by conjugating with the matrix
/// `T` that equals the identity except that row `i - 1` is row `i` of `a`.
///
/// `T` is its own inverse because row `i` of `a` has a 1 at position `i - 1`.
fn eliminate_row<W: Word>(a: &mut BitMatrix<W>, i: usize, k: usize) {
    let row = a.row(i).sub(0, k);
    let mut u = row.clone();
    u.set(i - 1, false);

    // a <- a T: column i - 1 picks up u in every row where it is set
    for r in 0..k {
        if a.bit(r, i - 1) {
            a.row_mut(r).span_mut(0, k).xor_assign(&u);
        }
    }

    // a <- T a: row i - 1 becomes the combination of rows selected by the old row i
    let mut combined = BitVector::zeros(k);
    for j in row.ones() {
        combined.xor_assign(&a.row(j).span(0, k));
    }
    a.row_mut(i - 1).span_mut(0, k).copy_from(&combined);
    a.row_mut(i)
        .span_mut(0, k)
        .copy_from(&BitVector::unit(k, i - 1));
}

/// The characteristic polynomial of the companion matrix with the given top row: monic of
/// degree `top_row.len()`, with the lower coefficients being the top row reversed.
pub fn companion_polynomial<S: BitStore + ?Sized>(top_row: &S) -> BitPolynomial<S::Word> {
    let mut coeffs = top_row.to_vector().reversed();
    coeffs.push(true);
    BitPolynomial::from_coefficients(coeffs)
}

impl<W: Word> BitMatrix<W> {
    /// The block diagonal matrix of the companion blocks found by [`companion_blocks`].
    ///
    /// It has the same characteristic polynomial as this matrix but is not in general similar to
    /// it, since the coupling between blocks is dropped.
    pub fn frobenius_form(&self) -> Self {
        Self::from_companion_blocks(&companion_blocks(self))
    }

    /// The block diagonal matrix whose blocks are the companion matrices of the given top rows.
    pub fn from_companion_blocks(top_rows: &[BitVector<W>]) -> Self {
        let n = top_rows.iter().map(|t| t.len()).sum();
        let mut m = Self::zeros(n, n);
        let mut offset = 0;
        for top in top_rows {
            m.replace(offset, offset, &Self::companion(top));
            offset += top.len();
        }
        m
    }

    /// The characteristic polynomial `det(x I - M)`.
    ///
    /// # Panics
    ///
    /// Panics if the matrix is not square.
    #[tracing::instrument(level = "debug", skip_all, fields(size = self.rows()))]
    pub fn characteristic_polynomial(&self) -> BitPolynomial<W> {
        let blocks = companion_blocks(self);
        tracing::debug!(blocks = blocks.len(), "reduced to Frobenius form");
        blocks
            .iter()
            .fold(BitPolynomial::one(), |p, top| &p * &companion_polynomial(top))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};
    use rstest::rstest;

    #[test_log::test]
    fn identity_scenarios() {
        assert_eq!(
            BitMatrix::<u64>::identity(2)
                .characteristic_polynomial()
                .to_string(),
            "1 + x^2"
        );
        assert_eq!(
            BitMatrix::<u64>::identity(3)
                .characteristic_polynomial()
                .to_string(),
            "1 + x + x^2 + x^3"
        );
    }

    #[test]
    fn special_matrices() {
        assert!(BitMatrix::<u64>::new().characteristic_polynomial().is_one());
        assert_eq!(
            BitMatrix::<u8>::zeros(5, 5).characteristic_polynomial(),
            BitPolynomial::x_to_the(5)
        );
        // nilpotent shift: x^n
        assert_eq!(
            BitMatrix::<u8>::right_shift(6, 1).characteristic_polynomial(),
            BitPolynomial::x_to_the(6)
        );
        // cyclic rotation: x^n + 1
        let mut expected = BitPolynomial::<u8>::x_to_the(6);
        expected.set_coeff(0, true);
        assert_eq!(
            BitMatrix::<u8>::left_rotation(6, 1).characteristic_polynomial(),
            expected
        );
    }

    #[test]
    fn companion_round_trip() {
        let top: BitVector = "01101".parse().unwrap();
        let c = BitMatrix::companion(&top);
        let p = companion_polynomial(&top);
        assert_eq!(p.to_string(), "1 + x^2 + x^3 + x^5");
        assert_eq!(c.characteristic_polynomial(), p);
        assert!(p.eval_matrix(&c).is_zero());
    }

    #[rstest]
    fn cayley_hamilton(#[values(1, 2, 5, 8, 17, 40)] n: usize) {
        let mut rng = SmallRng::seed_from_u64(n as u64);
        let a = BitMatrix::<u8>::random(&mut rng, n, n);
        let p = a.characteristic_polynomial();
        assert_eq!(p.degree(), n);
        assert!(p.eval_matrix(&a).is_zero());

        let s = BitMatrix::<u8>::random_invertible(&mut rng, n);
        let similar = &(&s * &a) * &s.inverse().unwrap();
        assert_eq!(similar.characteristic_polynomial(), p);

        let f = a.frobenius_form();
        assert_eq!(f.characteristic_polynomial(), p);
    }

    #[test]
    fn sparse_matrices_split_into_blocks() {
        let mut rng = SmallRng::seed_from_u64(12);
        for _ in 0..20 {
            let a = BitMatrix::<u16>::random_with_probability(&mut rng, 12, 12, 0.1);
            let blocks = companion_blocks(&a);
            assert_eq!(blocks.iter().map(|b| b.len()).sum::<usize>(), 12);
            let p = a.characteristic_polynomial();
            assert_eq!(p.degree(), 12);
            assert!(p.eval_matrix(&a).is_zero());
        }
    }

    #[test]
    fn split_blocks_keep_only_the_polynomial() {
        let a: BitMatrix<u64> = "01 00".parse().unwrap();
        let blocks = companion_blocks(&a);
        assert_eq!(blocks.len(), 2);
        let f = a.frobenius_form();
        assert!(f.is_zero());
        assert_eq!(f.characteristic_polynomial(), a.characteristic_polynomial());
        assert_eq!(a.characteristic_polynomial(), BitPolynomial::x_to_the(2));
        assert_ne!(f.rank(), a.rank());
    }

    #[test]
    #[should_panic(expected = "square")]
    fn non_square() {
        BitMatrix::<u64>::zeros(2, 3).characteristic_polynomial();
    }
}
