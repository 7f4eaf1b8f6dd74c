use crate::{
    error::Gf2Error,
    parse,
    span::{BitSpan, BitSpanMut},
    store::{BitStore, BitStoreMut},
    word::Word,
};
use rand::Rng;
use std::{
    fmt,
    ops::{
        BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Index, Not, ShlAssign,
        ShrAssign,
    },
    str::FromStr,
};

/// A growable vector of bits, stored as a vector of [`Word`]s.
///
/// `BitVector` is the workhorse container of the crate: matrix rows and polynomial coefficients
/// are `BitVector`s. Most of its functionality (counting, searching, shifting, dot products,
/// string conversion) comes from the [`BitStore`] and [`BitStoreMut`] traits.
///
/// # Examples
///
/// ```
/// use gf2bits::{BitStore, BitStoreMut, BitVector};
///
/// let mut bv = BitVector::<u64>::zeros(100);
/// bv.set(5, true);
/// assert!(bv.get(5));
/// assert_eq!(bv.count_ones(), 1);
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BitVector<W: Word = u64> {
    len: usize,
    words: Vec<W>,
}

impl<W: Word> BitVector<W> {
    /// An empty vector.
    #[inline]
    pub fn new() -> Self {
        BitVector {
            len: 0,
            words: Vec::new(),
        }
    }

    /// An empty vector with room for `bits` elements.
    #[inline]
    pub fn with_capacity(bits: usize) -> Self {
        BitVector {
            len: 0,
            words: Vec::with_capacity(W::words_for(bits)),
        }
    }

    #[inline]
    pub fn zeros(len: usize) -> Self {
        BitVector {
            len,
            words: vec![W::ZERO; W::words_for(len)],
        }
    }

    #[inline]
    pub fn ones(len: usize) -> Self {
        let mut v = BitVector {
            len,
            words: vec![W::MAX; W::words_for(len)],
        };
        v.clean();
        v
    }

    /// The vector with only element `i` set.
    pub fn unit(len: usize, i: usize) -> Self {
        let mut v = Self::zeros(len);
        v.set(i, true);
        v
    }

    /// The pattern `1010...`, starting with a set element.
    pub fn alternating(len: usize) -> Self {
        let pattern = (0..W::BITS / 2).fold(W::ZERO, |w, k| w | W::unit(2 * k));
        let mut v = BitVector {
            len,
            words: vec![pattern; W::words_for(len)],
        };
        v.clean();
        v
    }

    /// Builds a vector from a function `f` giving the value of each element.
    pub fn from_fn(len: usize, f: impl FnMut(usize) -> bool) -> Self {
        let mut v = Self::zeros(len);
        v.set_from_fn(f);
        v
    }

    /// Builds a vector of `len` elements from a sequence of words, least significant element
    /// first. Missing words are zero; surplus words and bits beyond `len` are dropped.
    pub fn from_words(len: usize, words: impl IntoIterator<Item = W>) -> Self {
        let n = W::words_for(len);
        let mut words: Vec<W> = words.into_iter().take(n).collect();
        words.resize(n, W::ZERO);
        let mut v = BitVector { len, words };
        v.clean();
        v
    }

    /// A vector whose elements are independent fair coin flips.
    #[inline]
    pub fn random(rng: &mut impl Rng, len: usize) -> Self {
        let mut v = Self::zeros(len);
        v.fill_random(rng);
        v
    }

    /// A vector whose elements are set independently with probability `p`.
    ///
    /// # Panics
    ///
    /// Panics if `p` is not in `[0, 1]`.
    pub fn random_with_probability(rng: &mut impl Rng, len: usize, p: f64) -> Self {
        assert!((0.0..=1.0).contains(&p), "probability {p} not in [0, 1]");
        Self::from_fn(len, |_| rng.random_bool(p))
    }

    /// The underlying words, least significant element first.
    #[inline]
    pub fn as_words(&self) -> &[W] {
        &self.words
    }

    #[inline]
    pub(crate) fn words_mut(&mut self) -> &mut [W] {
        &mut self.words
    }

    /// Resizes to `len` elements, filling any new elements with zero.
    pub fn resize(&mut self, len: usize) {
        self.words.resize(W::words_for(len), W::ZERO);
        self.len = len;
        self.clean();
    }

    #[inline]
    pub fn clear(&mut self) {
        self.words.clear();
        self.len = 0;
    }

    pub fn push(&mut self, value: bool) {
        self.resize(self.len + 1);
        if value {
            self.set(self.len - 1, true);
        }
    }

    pub fn pop(&mut self) -> Option<bool> {
        let last = self.len.checked_sub(1)?;
        let b = self.get(last);
        self.resize(last);
        Some(b)
    }

    /// Appends all elements of `other` to the end of this vector.
    pub fn append<R: BitStore<Word = W> + ?Sized>(&mut self, other: &R) {
        let start = self.len;
        self.resize(start + other.len());
        self.span_mut(start, start + other.len()).copy_from(other);
    }

    #[inline]
    pub fn shrink_to_fit(&mut self) {
        self.words.shrink_to_fit();
    }

    /// Reverses the order of the elements in place.
    pub fn reverse(&mut self) {
        if self.len == 0 {
            return;
        }
        // Reversing every word and the word order reverses the full padded width; the live
        // elements then sit `pad` places too far back.
        self.words.reverse();
        for w in self.words.iter_mut() {
            *w = w.reverse_bits();
        }
        let pad = self.words.len() * W::BITS - self.len;
        if pad > 0 {
            let b = W::BITS as u32;
            let n = self.words.len();
            for i in 0..n {
                let hi = if i + 1 < n { self.words[i + 1] << (b - pad as u32) } else { W::ZERO };
                self.words[i] = (self.words[i] >> pad as u32) | hi;
            }
        }
        self.clean();
    }

    /// Returns a reversed copy.
    pub fn reversed(&self) -> Self {
        let mut v = self.clone();
        v.reverse();
        v
    }

    /// Returns an owned copy of the elements in `[begin, end)`.
    #[inline]
    pub fn sub(&self, begin: usize, end: usize) -> Self {
        self.span(begin, end).to_vector()
    }

    /// Borrows the elements in `[begin, end)`.
    ///
    /// # Panics
    ///
    /// Panics unless `begin <= end <= self.len()`.
    #[inline]
    pub fn span(&self, begin: usize, end: usize) -> BitSpan<'_, W> {
        BitSpan::new(&self.words, self.len, begin, end)
    }

    /// Mutably borrows the elements in `[begin, end)`.
    ///
    /// # Panics
    ///
    /// Panics unless `begin <= end <= self.len()`.
    #[inline]
    pub fn span_mut(&mut self, begin: usize, end: usize) -> BitSpanMut<'_, W> {
        BitSpanMut::new(&mut self.words, self.len, begin, end)
    }
}

impl<W: Word> BitStore for BitVector<W> {
    type Word = W;

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn word(&self, i: usize) -> W {
        self.words[i]
    }

    #[inline]
    fn words(&self) -> usize {
        self.words.len()
    }
}

impl<W: Word> BitStoreMut for BitVector<W> {
    #[inline]
    fn set_word(&mut self, i: usize, word: W) {
        let word = if i + 1 == self.words.len() {
            word & self.last_word_mask()
        } else {
            word
        };
        self.words[i] = word;
    }
}

impl<W: Word> fmt::Display for BitVector<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_binary_string())
    }
}

impl<W: Word> fmt::Debug for BitVector<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitVector({})", self.to_binary_string())
    }
}

impl<W: Word> FromStr for BitVector<W> {
    type Err = Gf2Error;

    /// Parses a binary string such as `"10110"` or a hex string such as `"0xf05.8"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse::parse_vector(s)
    }
}

/// Allows indexing into the vector to return the element at `index`.
impl<W: Word> Index<usize> for BitVector<W> {
    type Output = bool;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        if self.get(index) {
            &true
        } else {
            &false
        }
    }
}

impl<W: Word, R: BitStore<Word = W> + ?Sized> BitXorAssign<&R> for BitVector<W> {
    #[inline]
    fn bitxor_assign(&mut self, rhs: &R) {
        self.xor_assign(rhs);
    }
}

impl<W: Word, R: BitStore<Word = W> + ?Sized> BitAndAssign<&R> for BitVector<W> {
    #[inline]
    fn bitand_assign(&mut self, rhs: &R) {
        self.and_assign(rhs);
    }
}

impl<W: Word, R: BitStore<Word = W> + ?Sized> BitOrAssign<&R> for BitVector<W> {
    #[inline]
    fn bitor_assign(&mut self, rhs: &R) {
        self.or_assign(rhs);
    }
}

impl<W: Word> BitXor for &BitVector<W> {
    type Output = BitVector<W>;

    fn bitxor(self, rhs: Self) -> Self::Output {
        let mut result = self.clone();
        result ^= rhs;
        result
    }
}

impl<W: Word> BitAnd for &BitVector<W> {
    type Output = BitVector<W>;

    fn bitand(self, rhs: Self) -> Self::Output {
        let mut result = self.clone();
        result &= rhs;
        result
    }
}

impl<W: Word> BitOr for &BitVector<W> {
    type Output = BitVector<W>;

    fn bitor(self, rhs: Self) -> Self::Output {
        let mut result = self.clone();
        result |= rhs;
        result
    }
}

impl<W: Word> Not for &BitVector<W> {
    type Output = BitVector<W>;

    fn not(self) -> Self::Output {
        let mut result = self.clone();
        result.flip_all();
        result
    }
}

/// `v <<= p` is [`BitStoreMut::shift_left`]: elements move towards the front.
impl<W: Word> ShlAssign<usize> for BitVector<W> {
    #[inline]
    fn shl_assign(&mut self, p: usize) {
        self.shift_left(p);
    }
}

/// `v >>= p` is [`BitStoreMut::shift_right`]: elements move towards the back.
impl<W: Word> ShrAssign<usize> for BitVector<W> {
    #[inline]
    fn shr_assign(&mut self, p: usize) {
        self.shift_right(p);
    }
}

impl<W: Word> FromIterator<bool> for BitVector<W> {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        let mut v = BitVector::new();
        let mut c = 0;
        let mut block = W::ZERO;
        for bit in iter {
            if bit {
                block |= W::unit(c);
            }
            c += 1;
            if c == W::BITS {
                v.words.push(block);
                c = 0;
                block = W::ZERO;
            }
            v.len += 1;
        }

        if c != 0 {
            v.words.push(block);
        }

        v
    }
}

impl<W: Word> From<Vec<bool>> for BitVector<W> {
    fn from(value: Vec<bool>) -> Self {
        BitVector::from_iter(value.iter().copied())
    }
}

impl<W: Word> From<&[bool]> for BitVector<W> {
    fn from(value: &[bool]) -> Self {
        BitVector::from_iter(value.iter().copied())
    }
}

impl<W: Word> From<BitVector<W>> for Vec<bool> {
    fn from(value: BitVector<W>) -> Self {
        value.iter().collect()
    }
}
