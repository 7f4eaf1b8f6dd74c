use crate::{
    error::Gf2Error,
    parse,
    span::{BitSpan, BitSpanMut},
    store::{BitStore, BitStoreMut},
    word::Word,
};
use rand::Rng;
use std::{fmt, ops::Index, str::FromStr};

/// A bit store with inline storage for up to `WORDS * W::BITS` elements.
///
/// The length is fixed when the array is built. Arrays are `Copy` and never allocate, which makes
/// them a good fit for short vectors held in bulk.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitArray<W: Word, const WORDS: usize> {
    len: usize,
    words: [W; WORDS],
}

impl<W: Word, const WORDS: usize> BitArray<W, WORDS> {
    /// Maximum number of elements.
    pub const CAPACITY: usize = WORDS * W::BITS;

    #[inline]
    fn check_capacity(len: usize) {
        assert!(
            len <= Self::CAPACITY,
            "length {len} exceeds the capacity {} of the array",
            Self::CAPACITY
        );
    }

    #[inline]
    pub fn zeros(len: usize) -> Self {
        Self::check_capacity(len);
        BitArray {
            len,
            words: [W::ZERO; WORDS],
        }
    }

    pub fn ones(len: usize) -> Self {
        let mut a = Self::zeros(len);
        a.set_all();
        a
    }

    pub fn from_fn(len: usize, f: impl FnMut(usize) -> bool) -> Self {
        let mut a = Self::zeros(len);
        a.set_from_fn(f);
        a
    }

    pub fn random(rng: &mut impl Rng, len: usize) -> Self {
        let mut a = Self::zeros(len);
        a.fill_random(rng);
        a
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        Self::CAPACITY
    }

    #[inline]
    pub fn as_words(&self) -> &[W] {
        &self.words[..W::words_for(self.len)]
    }

    pub fn span(&self, begin: usize, end: usize) -> BitSpan<'_, W> {
        BitSpan::new(&self.words, self.len, begin, end)
    }

    pub fn span_mut(&mut self, begin: usize, end: usize) -> BitSpanMut<'_, W> {
        BitSpanMut::new(&mut self.words, self.len, begin, end)
    }
}

impl<W: Word, const WORDS: usize> BitStore for BitArray<W, WORDS> {
    type Word = W;

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn word(&self, i: usize) -> W {
        self.words[i]
    }
}

impl<W: Word, const WORDS: usize> BitStoreMut for BitArray<W, WORDS> {
    #[inline]
    fn set_word(&mut self, i: usize, word: W) {
        let word = if i + 1 == self.words() {
            word & self.last_word_mask()
        } else {
            word
        };
        self.words[i] = word;
    }
}

impl<W: Word, const WORDS: usize> Index<usize> for BitArray<W, WORDS> {
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

impl<W: Word, const WORDS: usize> fmt::Display for BitArray<W, WORDS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_binary_string())
    }
}

impl<W: Word, const WORDS: usize> fmt::Debug for BitArray<W, WORDS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitArray({})", self.to_binary_string())
    }
}

impl<W: Word, const WORDS: usize> FromStr for BitArray<W, WORDS> {
    type Err = Gf2Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits = parse::parse_bits(s)?;
        if bits.len() > Self::CAPACITY {
            return Err(Gf2Error::CapacityExceeded {
                len: bits.len(),
                capacity: Self::CAPACITY,
            });
        }
        Ok(Self::from_fn(bits.len(), |i| bits[i]))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::vector::BitVector;
    use rand::{rngs::SmallRng, SeedableRng};

    type Small = BitArray<u8, 3>;

    #[test]
    fn fills() {
        let a = Small::ones(19);
        assert_eq!(a.count_ones(), 19);
        assert_eq!(a.as_words(), &[0xff, 0xff, 0b111]);
        assert_eq!(a.capacity(), 24);
        let z = Small::zeros(24);
        assert!(z.none());
        let f = Small::from_fn(10, |i| i % 2 == 1);
        assert_eq!(f.to_string(), "0101010101");
    }

    #[test]
    fn behaves_like_vector() {
        let mut rng = SmallRng::seed_from_u64(4);
        let a = BitArray::<u16, 4>::random(&mut rng, 50);
        let v = a.to_vector();
        assert!(a.same_bits(&v));
        assert_eq!(a.first_set(), v.first_set());
        assert_eq!(a.to_hex_string(), v.to_hex_string());
        assert_eq!(a.dot(&v), v.dot(&v));
    }

    #[test]
    fn spans_into_array() {
        let mut a = Small::zeros(20);
        a.span_mut(6, 14).set_all();
        assert_eq!(a.to_string(), "00000011111111000000");
        assert_eq!(a.span(5, 8).to_binary_string(), "011");
        assert!(a[6] && !a[5]);
    }

    #[test]
    fn parse_with_capacity() {
        let a: Small = "0xf05.8".parse().unwrap();
        assert_eq!(a.to_string(), "11110000101");
        let b: Small = "0xffffff".parse().unwrap();
        assert!(b.all());
        assert_eq!(
            "0xfffffff".parse::<Small>(),
            Err(Gf2Error::CapacityExceeded {
                len: 28,
                capacity: 24
            })
        );
        let c: BitVector<u8> = "0xfffffff".parse().unwrap();
        assert_eq!(c.len(), 28);
    }

    #[test]
    #[should_panic(expected = "exceeds the capacity")]
    fn too_long() {
        Small::zeros(25);
    }
}
