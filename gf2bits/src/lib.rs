//! `gf2bits` is a Rust library for linear algebra over the 2-element finite field. Some features
//! include:
//! - bit vectors packed into `u8`, `u16`, `u32` or `u64` words, with borrowed sub-range views
//!   that read and write across word boundaries
//! - counting, searching, shifting, dot products and convolution written once for every store
//! - row-major bit matrices with echelon forms, rank, inverse, powers and multiplication
//! - LU decomposition and a Gaussian solver that enumerates the solutions of singular systems
//! - polynomials over GF(2), including `x^n mod p(x)` for exponents as large as `2^n`
//! - characteristic polynomials via reduction to Frobenius form
//!
//! The main data structures provided by this crate are:
//! - [`BitVector`] and [`BitArray`]: owned bit stores, growable and fixed-capacity
//! - [`BitSpan`] and [`BitSpanMut`]: views of a bit range inside another store
//! - [`BitMatrix`]: a matrix of `BitVector` rows
//! - [`BitPolynomial`]: a polynomial given by its coefficient vector
//!
//! Most element-level functionality lives on the [`BitStore`] and [`BitStoreMut`] traits, so
//! bring them into scope to use it.
//!
//! ```
//! use gf2bits::{BitGauss, BitMatrix, BitStore, BitVector};
//!
//! let a = BitMatrix::<u64>::ones(3, 3);
//! let b = BitVector::<u64>::ones(3);
//! let gauss = BitGauss::new(&a, &b);
//! assert_eq!(gauss.solution_count(), 4);
//! let x = gauss.solve_indexed(3).unwrap();
//! assert_eq!(a.dot_vector(&x), b);
//! assert_eq!(x.count_ones() % 2, 1);
//! ```

#![allow(
    clippy::needless_range_loop,
    clippy::suspicious_arithmetic_impl,
    clippy::suspicious_op_assign_impl,
    clippy::uninlined_format_args,
    clippy::bool_assert_comparison,
    clippy::cast_possible_truncation,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::bool_to_int_with_if
)]
pub mod array;
pub mod error;
pub mod frobenius;
pub mod gauss;
pub mod lu;
pub mod matrix;
mod parse;
pub mod polynomial;
pub mod span;
pub mod store;
pub mod vector;
pub mod word;

pub use array::BitArray;
pub use error::Gf2Error;
pub use frobenius::{companion_blocks, companion_polynomial};
pub use gauss::BitGauss;
pub use lu::BitLu;
pub use matrix::{probability_invertible, probability_singular, BitMatrix, RowOps};
pub use polynomial::BitPolynomial;
pub use span::{BitSpan, BitSpanMut};
pub use store::{BitStore, BitStoreMut};
pub use vector::BitVector;
pub use word::Word;

use rand::{rngs::SmallRng, SeedableRng};

/// A small, fast generator for the random constructors.
///
/// With a seed the sequence is reproducible; without one the generator is seeded from the
/// operating system.
pub fn small_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn seeded_rng_is_reproducible() {
        let a = BitMatrix::<u64>::random(&mut small_rng(Some(42)), 20, 30);
        let b = BitMatrix::<u64>::random(&mut small_rng(Some(42)), 20, 30);
        assert_eq!(a, b);
        let c = BitMatrix::<u64>::random(&mut small_rng(Some(43)), 20, 30);
        assert_ne!(a, c);
        let mut rng = small_rng(None);
        assert_eq!(BitVector::<u8>::random(&mut rng, 9).len(), 9);
    }
}
