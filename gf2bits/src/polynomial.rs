use crate::{
    error::Gf2Error,
    matrix::BitMatrix,
    store::{BitStore, BitStoreMut},
    span::BitSpan,
    vector::BitVector,
    word::Word,
};
use rand::Rng;
use ref_cast::RefCast;
use std::{
    fmt,
    ops::{Add, AddAssign, Mul, MulAssign, Sub, SubAssign},
};

/// A polynomial over GF(2), stored as its coefficient vector: element `i` is the coefficient of
/// `x^i`.
///
/// The coefficient vector may carry trailing zeros. They do not change the polynomial and are
/// ignored by comparisons, so [`BitPolynomial::size`] can exceed `degree() + 1`.
///
/// # Examples
///
/// ```
/// use gf2bits::{BitPolynomial, BitVector};
///
/// let p: BitPolynomial = BitPolynomial::from_coefficients("1101".parse::<BitVector>().unwrap());
/// assert_eq!(p.to_string(), "1 + x + x^3");
/// assert_eq!(p.degree(), 3);
/// ```
#[derive(Clone, Default, RefCast)]
#[repr(transparent)]
pub struct BitPolynomial<W: Word = u64> {
    coeffs: BitVector<W>,
}

impl<W: Word> BitPolynomial<W> {
    /// The zero polynomial, with no coefficients.
    #[inline]
    pub fn new() -> Self {
        BitPolynomial {
            coeffs: BitVector::new(),
        }
    }

    #[inline]
    pub fn zero() -> Self {
        Self::new()
    }

    pub fn one() -> Self {
        Self::x_to_the(0)
    }

    pub fn x_to_the(n: usize) -> Self {
        BitPolynomial {
            coeffs: BitVector::unit(n + 1, n),
        }
    }

    #[inline]
    pub fn from_coefficients(coeffs: BitVector<W>) -> Self {
        BitPolynomial { coeffs }
    }

    /// Views a coefficient vector as a polynomial without copying it.
    #[inline]
    pub fn from_coefficients_ref(coeffs: &BitVector<W>) -> &Self {
        BitPolynomial::ref_cast(coeffs)
    }

    /// A random polynomial of exactly the given degree.
    pub fn random(rng: &mut impl Rng, degree: usize) -> Self {
        let mut coeffs = BitVector::random(rng, degree + 1);
        coeffs.set(degree, true);
        BitPolynomial { coeffs }
    }

    #[inline]
    pub fn coefficients(&self) -> &BitVector<W> {
        &self.coeffs
    }

    #[inline]
    pub fn into_coefficients(self) -> BitVector<W> {
        self.coeffs
    }

    /// Number of stored coefficients, trailing zeros included.
    #[inline]
    pub fn size(&self) -> usize {
        self.coeffs.len()
    }

    /// Index of the highest nonzero coefficient. The zero polynomial has degree 0.
    #[inline]
    pub fn degree(&self) -> usize {
        self.coeffs.last_set().unwrap_or(0)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.coeffs.none()
    }

    #[inline]
    pub fn is_one(&self) -> bool {
        self.coeffs.last_set() == Some(0)
    }

    /// True for `0` and `1`.
    #[inline]
    pub fn is_constant(&self) -> bool {
        self.degree() == 0
    }

    /// True if the highest stored coefficient is 1, i.e. there are no trailing zeros.
    #[inline]
    pub fn is_monic(&self) -> bool {
        self.coeffs.last_set().is_some_and(|d| d + 1 == self.size())
    }

    /// Drops the trailing zero coefficients.
    pub fn make_monic(&mut self) -> &mut Self {
        let len = self.coeffs.last_set().map_or(0, |d| d + 1);
        self.coeffs.resize(len);
        self
    }

    /// Coefficient of `x^i`; zero past the stored coefficients.
    #[inline]
    pub fn coeff(&self, i: usize) -> bool {
        i < self.size() && self.coeffs.get(i)
    }

    /// Sets the coefficient of `x^i`, growing the coefficient vector if needed.
    pub fn set_coeff(&mut self, i: usize, value: bool) -> &mut Self {
        if i >= self.size() {
            if !value {
                return self;
            }
            self.coeffs.resize(i + 1);
        }
        self.coeffs.set(i, value);
        self
    }

    #[inline]
    pub fn count_ones(&self) -> usize {
        self.coeffs.count_ones()
    }

    /// The coefficients up to and including the leading one.
    #[inline]
    fn live(&self) -> BitSpan<'_, W> {
        let len = self.coeffs.last_set().map_or(0, |d| d + 1);
        self.coeffs.span(0, len)
    }

    /// `p(x)^2`, computed by interleaving the coefficients with zeros.
    pub fn squared(&self) -> Self {
        BitPolynomial {
            coeffs: self.live().riffled(),
        }
    }

    /// `x^n p(x)`.
    pub fn times_x_to_the(&self, n: usize) -> Self {
        let mut coeffs = BitVector::zeros(n);
        coeffs.append(&self.coeffs);
        BitPolynomial { coeffs }
    }

    /// The value at `x`, i.e. `p(0)` or `p(1)`.
    pub fn eval(&self, x: bool) -> bool {
        if x {
            self.count_ones() % 2 == 1
        } else {
            self.coeff(0)
        }
    }

    /// The matrix `p(M)`, evaluated with Horner's method.
    ///
    /// # Panics
    ///
    /// Panics if `m` is not square.
    pub fn eval_matrix(&self, m: &BitMatrix<W>) -> BitMatrix<W> {
        assert!(
            m.is_square(),
            "polynomial evaluated at a non-square {}x{} matrix",
            m.rows(),
            m.cols()
        );
        let n = m.rows();
        let Some(top) = self.coeffs.last_set() else {
            return BitMatrix::zeros(n, n);
        };

        let mut result = BitMatrix::identity(n);
        for i in (0..top).rev() {
            result = m * &result;
            if self.coeffs.get(i) {
                for k in 0..n {
                    result.flip_bit(k, k);
                }
            }
        }
        result
    }

    /// Computes `x^e mod p(x)` where `e` is `n`, or `2^n` if `as_log2` is set.
    ///
    /// The exponent never has to be materialised, so `as_log2` allows exponents far beyond
    /// `usize`. Fails only when `p` is the zero polynomial.
    #[tracing::instrument(level = "debug", skip(self), fields(degree = self.degree()))]
    pub fn reduce_x_to_the(&self, n: usize, as_log2: bool) -> Result<Self, Gf2Error> {
        let Some(d) = self.coeffs.last_set() else {
            return Err(Gf2Error::ZeroModulus);
        };

        // `None` when the exponent is too large to be a `usize`
        let e = if as_log2 {
            (n < usize::BITS as usize).then(|| 1usize << n)
        } else {
            Some(n)
        };

        if d == 0 {
            return Ok(Self::zero());
        }
        if d == 1 {
            // x = c mod (x + c)
            return Ok(if e == Some(0) || self.coeffs.get(0) {
                Self::one()
            } else {
                Self::zero()
            });
        }
        match e {
            Some(e) if e < d => return Ok(Self::x_to_the(e)),
            Some(e) if e == d => {
                return Ok(BitPolynomial {
                    coeffs: self.coeffs.sub(0, d),
                })
            }
            _ => {}
        }

        let reducer = Reducer::new(&self.coeffs, d);
        let r = if as_log2 {
            let mut r = BitVector::unit(d, 1);
            for _ in 0..n {
                r = reducer.squared(&r);
            }
            r
        } else {
            let mut r = BitVector::unit(d, 0);
            for bit in (0..usize::BITS - n.leading_zeros()).rev() {
                r = reducer.squared(&r);
                if (n >> bit) & 1 == 1 {
                    reducer.times_x(&mut r);
                }
            }
            r
        };
        tracing::trace!(remainder = %r, "reduced");
        Ok(BitPolynomial { coeffs: r })
    }

    fn to_string_with(&self, var: &str, full: bool) -> String {
        let term = |i: usize| match i {
            0 => String::new(),
            1 => var.to_string(),
            _ => format!("{var}^{i}"),
        };
        let terms: Vec<String> = if full {
            (0..self.size())
                .map(|i| {
                    let c = if self.coeffs.get(i) { '1' } else { '0' };
                    format!("{c}{}", term(i))
                })
                .collect()
        } else {
            self.coeffs
                .ones()
                .map(|i| if i == 0 { "1".to_string() } else { term(i) })
                .collect()
        };
        if terms.is_empty() {
            "0".to_string()
        } else {
            terms.join(" + ")
        }
    }

    /// Like the `Display` form but with `var` as the variable name.
    pub fn to_string_with_var(&self, var: &str) -> String {
        self.to_string_with(var, false)
    }

    /// Every stored coefficient, zeros included: `"1 + 0x + 1x^2"`.
    pub fn to_full_string(&self) -> String {
        self.to_string_with("x", true)
    }
}

/// Arithmetic modulo `P(x) = x^d + p(x)` on remainders held as `d`-element vectors.
struct Reducer<W: Word> {
    d: usize,
    low: BitVector<W>,
    /// `x^(d + i) mod P` for `i < d`
    table: Vec<BitVector<W>>,
}

impl<W: Word> Reducer<W> {
    fn new(modulus: &BitVector<W>, d: usize) -> Self {
        let low = modulus.sub(0, d);
        let mut reducer = Reducer {
            d,
            low: low.clone(),
            table: Vec::with_capacity(d),
        };
        let mut t = low;
        for _ in 0..d {
            reducer.table.push(t.clone());
            reducer.times_x(&mut t);
        }
        reducer
    }

    /// `r <- x r mod P`
    fn times_x(&self, r: &mut BitVector<W>) {
        let overflow = r.get(self.d - 1);
        r.shift_right(1);
        if overflow {
            r.xor_assign(&self.low);
        }
    }

    /// `r^2 mod P`
    fn squared(&self, r: &BitVector<W>) -> BitVector<W> {
        let s = r.riffled();
        let mut out = s.sub(0, self.d);
        for i in s.span(self.d, s.len()).ones() {
            out.xor_assign(&self.table[i]);
        }
        out
    }
}

impl<W: Word> PartialEq for BitPolynomial<W> {
    fn eq(&self, other: &Self) -> bool {
        self.live().same_bits(&other.live())
    }
}

impl<W: Word> Eq for BitPolynomial<W> {}

impl<W: Word> From<BitVector<W>> for BitPolynomial<W> {
    fn from(coeffs: BitVector<W>) -> Self {
        BitPolynomial { coeffs }
    }
}

impl<W: Word> fmt::Display for BitPolynomial<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with("x", false))
    }
}

impl<W: Word> fmt::Debug for BitPolynomial<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitPolynomial({self})")
    }
}

impl<W: Word> AddAssign<&BitPolynomial<W>> for BitPolynomial<W> {
    fn add_assign(&mut self, rhs: &BitPolynomial<W>) {
        let rhs = rhs.live();
        if rhs.len() > self.size() {
            self.coeffs.resize(rhs.len());
        }
        self.coeffs.span_mut(0, rhs.len()).xor_assign(&rhs);
    }
}

/// Subtraction is addition over GF(2).
impl<W: Word> SubAssign<&BitPolynomial<W>> for BitPolynomial<W> {
    #[inline]
    fn sub_assign(&mut self, rhs: &BitPolynomial<W>) {
        *self += rhs;
    }
}

impl<W: Word> Add for &BitPolynomial<W> {
    type Output = BitPolynomial<W>;

    fn add(self, rhs: Self) -> Self::Output {
        let mut res = self.clone();
        res += rhs;
        res
    }
}

impl<W: Word> Sub for &BitPolynomial<W> {
    type Output = BitPolynomial<W>;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        self + rhs
    }
}

impl<W: Word> Mul for &BitPolynomial<W> {
    type Output = BitPolynomial<W>;

    fn mul(self, rhs: Self) -> Self::Output {
        if self.is_zero() || rhs.is_zero() {
            return BitPolynomial::zero();
        }
        if self.is_one() {
            return rhs.clone();
        }
        if rhs.is_one() {
            return self.clone();
        }
        BitPolynomial {
            coeffs: self.live().convolved_with(&rhs.live()),
        }
    }
}

impl<W: Word> MulAssign<&BitPolynomial<W>> for BitPolynomial<W> {
    fn mul_assign(&mut self, rhs: &BitPolynomial<W>) {
        *self = &*self * rhs;
    }
}
