//! Borrowed views of a bit range inside another store.
//!
//! A span never owns storage. It keeps the physical words that overlap its range, the bit offset
//! of its first element inside the first of those words, and its length. Logical word `i` of a
//! span is stitched together from physical words `i` and `i + 1`: the low `BITS - offset` bits
//! come from the first, shifted down by `offset`, and the remaining `offset` bits from the second,
//! shifted up by `BITS - offset`. The final logical word is masked to the span's length, so the
//! clean invariant holds even though the owner's bits continue past the end of the span.
//!
//! The borrow checker enforces what the owner needs: it outlives every span into it, and it is
//! not mutated through another path while a [`BitSpanMut`] is alive.

use crate::{
    store::{BitStore, BitStoreMut},
    word::Word,
};
use std::{fmt, ops::BitXorAssign};

/// An immutable view of the bits `[begin, end)` of some store.
#[derive(Clone, Copy)]
pub struct BitSpan<'a, W: Word> {
    words: &'a [W],
    offset: usize,
    len: usize,
}

/// A mutable view of the bits `[begin, end)` of some store.
///
/// Writes through the span only ever touch bits inside its range.
pub struct BitSpanMut<'a, W: Word> {
    words: &'a mut [W],
    offset: usize,
    len: usize,
}

/// Physical word range covering bits `[begin, end)`.
#[inline]
fn covering_words<W: Word>(owner_len: usize, begin: usize, end: usize) -> (usize, usize) {
    assert!(
        begin <= end && end <= owner_len,
        "span [{begin}, {end}) is outside a store of length {owner_len}"
    );
    let first = begin / W::BITS;
    (first, W::words_for(end).max(first))
}

#[inline]
fn synthesize<W: Word>(words: &[W], offset: usize, len: usize, i: usize) -> W {
    let mut w = words[i] >> offset as u32;
    if offset > 0 && i + 1 < words.len() {
        w |= words[i + 1] << (W::BITS - offset) as u32;
    }
    if i + 1 == W::words_for(len) {
        w &= W::mask_below(len - i * W::BITS);
    }
    w
}

#[inline]
fn store<W: Word>(words: &mut [W], offset: usize, len: usize, i: usize, w: W) {
    let n = (len - i * W::BITS).min(W::BITS);
    let w = w & W::mask_below(n);

    let lo_bits = n.min(W::BITS - offset);
    let lo_mask = W::mask_below(lo_bits) << offset as u32;
    words[i] = (words[i] & !lo_mask) | ((w << offset as u32) & lo_mask);

    if n > lo_bits {
        let hi_mask = W::mask_below(n - lo_bits);
        words[i + 1] = (words[i + 1] & !hi_mask) | ((w >> (W::BITS - offset) as u32) & hi_mask);
    }
}

impl<'a, W: Word> BitSpan<'a, W> {
    /// Views bits `[begin, end)` of the `owner_len` bits stored in `words`.
    ///
    /// # Panics
    ///
    /// Panics unless `begin <= end <= owner_len`.
    pub fn new(words: &'a [W], owner_len: usize, begin: usize, end: usize) -> Self {
        let (first, last) = covering_words::<W>(owner_len, begin, end);
        BitSpan {
            words: &words[first..last],
            offset: begin % W::BITS,
            len: end - begin,
        }
    }

    /// Narrows the view to its own bits `[begin, end)`.
    pub fn span(&self, begin: usize, end: usize) -> BitSpan<'a, W> {
        assert!(
            begin <= end && end <= self.len,
            "span [{begin}, {end}) is outside a span of length {}",
            self.len
        );
        BitSpan::new(self.words, self.offset + self.len, self.offset + begin, self.offset + end)
    }
}

impl<'a, W: Word> BitSpanMut<'a, W> {
    /// Mutably views bits `[begin, end)` of the `owner_len` bits stored in `words`.
    ///
    /// # Panics
    ///
    /// Panics unless `begin <= end <= owner_len`.
    pub fn new(words: &'a mut [W], owner_len: usize, begin: usize, end: usize) -> Self {
        let (first, last) = covering_words::<W>(owner_len, begin, end);
        BitSpanMut {
            words: &mut words[first..last],
            offset: begin % W::BITS,
            len: end - begin,
        }
    }

    /// Reborrows the whole span immutably.
    #[inline]
    pub fn as_span(&self) -> BitSpan<'_, W> {
        BitSpan {
            words: &*self.words,
            offset: self.offset,
            len: self.len,
        }
    }

    /// Immutable view of the span's own bits `[begin, end)`.
    pub fn span(&self, begin: usize, end: usize) -> BitSpan<'_, W> {
        self.as_span().span(begin, end)
    }

    /// Mutable view of the span's own bits `[begin, end)`.
    pub fn span_mut(&mut self, begin: usize, end: usize) -> BitSpanMut<'_, W> {
        assert!(
            begin <= end && end <= self.len,
            "span [{begin}, {end}) is outside a span of length {}",
            self.len
        );
        BitSpanMut::new(
            self.words,
            self.offset + self.len,
            self.offset + begin,
            self.offset + end,
        )
    }
}

impl<W: Word> BitStore for BitSpan<'_, W> {
    type Word = W;

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn word(&self, i: usize) -> W {
        synthesize(self.words, self.offset, self.len, i)
    }

    #[inline]
    fn offset(&self) -> usize {
        self.offset
    }
}

impl<W: Word> BitStore for BitSpanMut<'_, W> {
    type Word = W;

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn word(&self, i: usize) -> W {
        synthesize(&*self.words, self.offset, self.len, i)
    }

    #[inline]
    fn offset(&self) -> usize {
        self.offset
    }
}

impl<W: Word> BitStoreMut for BitSpanMut<'_, W> {
    #[inline]
    fn set_word(&mut self, i: usize, word: W) {
        store(self.words, self.offset, self.len, i, word);
    }
}

impl<W: Word, R: BitStore<Word = W> + ?Sized> BitXorAssign<&R> for BitSpanMut<'_, W> {
    #[inline]
    fn bitxor_assign(&mut self, rhs: &R) {
        self.xor_assign(rhs);
    }
}

impl<W: Word> fmt::Display for BitSpan<'_, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_binary_string())
    }
}

impl<W: Word> fmt::Debug for BitSpan<'_, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitSpan({})", self.to_binary_string())
    }
}

impl<W: Word> fmt::Display for BitSpanMut<'_, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_binary_string())
    }
}

impl<W: Word> fmt::Debug for BitSpanMut<'_, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitSpanMut({})", self.to_binary_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::vector::BitVector;
    use rand::{rngs::SmallRng, SeedableRng};
    use rstest::rstest;

    #[rstest]
    fn span_words_match_elements(
        #[values(0, 1, 3, 8, 13)] begin: usize,
        #[values(0, 1, 7, 8, 9, 24, 30)] len: usize,
    ) {
        let mut rng = SmallRng::seed_from_u64(7);
        let v = BitVector::<u8>::random(&mut rng, 48);
        let s = v.span(begin, begin + len);
        assert_eq!(s.len(), len);
        assert_eq!(s.offset(), begin % 8);
        for i in 0..len {
            assert_eq!(s.get(i), v.get(begin + i), "element {i}");
        }
        // the final word is clean even though the owner continues
        assert_eq!(s.count_ones(), (begin..begin + len).filter(|&i| v.get(i)).count());
        assert!(s.same_bits(&v.sub(begin, begin + len)));
    }

    #[rstest]
    fn span_writes_stay_inside(
        #[values(0, 2, 8, 11)] begin: usize,
        #[values(1, 6, 8, 17, 25)] len: usize,
    ) {
        let mut v = BitVector::<u8>::zeros(48);
        v.span_mut(begin, begin + len).set_all();
        for i in 0..48 {
            assert_eq!(v.get(i), (begin..begin + len).contains(&i), "element {i}");
        }
        v.span_mut(begin, begin + len).flip_all();
        assert!(v.none());

        let mut w = BitVector::<u8>::ones(48);
        w.span_mut(begin, begin + len).reset_all();
        assert_eq!(w.count_ones(), 48 - len);
    }

    #[test]
    fn span_xor_from_other_store() {
        let mut v: BitVector<u16> = "0000000000000000000000".parse().unwrap();
        let w: BitVector<u16> = "1101".parse().unwrap();
        let mut s = v.span_mut(14, 18);
        s ^= &w;
        assert_eq!(v.to_binary_string(), "0000000000000011010000");
    }

    #[test]
    fn nested_spans() {
        let v: BitVector<u8> = "0011010111001010111".parse().unwrap();
        let s = v.span(2, 17);
        let t = s.span(3, 9);
        assert_eq!(t.to_binary_string(), v.sub(5, 11).to_binary_string());

        let mut u = v.clone();
        let mut sm = u.span_mut(1, 18);
        sm.span_mut(4, 10).flip_all();
        assert_eq!(sm.span(4, 10).to_binary_string(), "010001");
        let mut expected = v.clone();
        for i in 5..11 {
            expected.flip(i);
        }
        assert_eq!(u, expected);
    }

    #[test]
    fn empty_span_at_end() {
        let v = BitVector::<u8>::ones(16);
        let s = v.span(16, 16);
        assert!(s.is_empty());
        assert_eq!(s.words(), 0);
        assert!(s.none());
    }

    #[test]
    #[should_panic(expected = "outside a store")]
    fn span_past_end() {
        let v = BitVector::<u8>::zeros(10);
        v.span(4, 11);
    }

    #[test]
    #[should_panic(expected = "outside a store")]
    fn span_reversed_range() {
        let v = BitVector::<u8>::zeros(10);
        v.span(5, 4);
    }
}
