//! The bit-store capability shared by every container.
//!
//! A store only has to report its length and hand out (or accept) its logical words. Everything
//! else is written once here as provided methods and works unchanged for [`BitVector`],
//! [`BitArray`] and the borrowed [`BitSpan`]/[`BitSpanMut`] views.
//!
//! Every implementor upholds the *clean* invariant: bit positions at or beyond [`BitStore::len`]
//! in the final word read as zero. Whole-word reductions rely on it, and every provided mutator
//! restores it before returning.
//!
//! [`BitArray`]: crate::array::BitArray
//! [`BitSpan`]: crate::span::BitSpan
//! [`BitSpanMut`]: crate::span::BitSpanMut

use crate::{vector::BitVector, word::Word};
use rand::Rng;

/// Read access to a packed sequence of bits.
pub trait BitStore {
    type Word: Word;

    /// Number of bits in the store.
    fn len(&self) -> usize;

    /// The `i`th logical word. Bits past the end of the store are zero.
    fn word(&self, i: usize) -> Self::Word;

    /// Bit offset of element 0 inside the first underlying word. Zero for owning stores.
    #[inline]
    fn offset(&self) -> usize {
        0
    }

    /// Number of logical words, i.e. the minimum needed to hold [`BitStore::len`] bits.
    #[inline]
    fn words(&self) -> usize {
        Self::Word::words_for(self.len())
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mask selecting the live bits of the final word.
    #[inline]
    fn last_word_mask(&self) -> Self::Word {
        match self.len() % Self::Word::BITS {
            0 => Self::Word::MAX,
            r => Self::Word::mask_below(r),
        }
    }

    /// Returns the value of the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of range.
    #[inline]
    fn get(&self, index: usize) -> bool {
        assert!(
            index < self.len(),
            "bit index {index} out of bounds for length {}",
            self.len()
        );
        self.word(index / Self::Word::BITS)
            .bit(index % Self::Word::BITS)
    }

    fn any(&self) -> bool {
        (0..self.words()).any(|i| self.word(i) != Self::Word::ZERO)
    }

    fn all(&self) -> bool {
        let n = self.words();
        if n == 0 {
            return true;
        }
        (0..n - 1).all(|i| self.word(i) == Self::Word::MAX)
            && self.word(n - 1) == self.last_word_mask()
    }

    #[inline]
    fn none(&self) -> bool {
        !self.any()
    }

    fn count_ones(&self) -> usize {
        (0..self.words()).fold(0, |c, i| c + self.word(i).count_ones() as usize)
    }

    #[inline]
    fn count_zeros(&self) -> usize {
        self.len() - self.count_ones()
    }

    /// Number of unset elements before the first set one (the whole length if none is set).
    fn leading_zeros(&self) -> usize {
        self.first_set().unwrap_or(self.len())
    }

    /// Number of unset elements after the last set one (the whole length if none is set).
    fn trailing_zeros(&self) -> usize {
        match self.last_set() {
            Some(i) => self.len() - 1 - i,
            None => self.len(),
        }
    }

    fn first_set(&self) -> Option<usize> {
        scan_forward(self.len(), 0, |i| self.word(i))
    }

    fn last_set(&self) -> Option<usize> {
        scan_backward(self.len(), self.len(), |i| self.word(i))
    }

    /// First set element strictly after `index`.
    fn next_set(&self, index: usize) -> Option<usize> {
        scan_forward(self.len(), index + 1, |i| self.word(i))
    }

    /// Last set element strictly before `index`.
    fn previous_set(&self, index: usize) -> Option<usize> {
        scan_backward(self.len(), index, |i| self.word(i))
    }

    fn first_unset(&self) -> Option<usize> {
        scan_forward(self.len(), 0, |i| flipped_word(self, i))
    }

    fn last_unset(&self) -> Option<usize> {
        scan_backward(self.len(), self.len(), |i| flipped_word(self, i))
    }

    fn next_unset(&self, index: usize) -> Option<usize> {
        scan_forward(self.len(), index + 1, |i| flipped_word(self, i))
    }

    fn previous_unset(&self, index: usize) -> Option<usize> {
        scan_backward(self.len(), index, |i| flipped_word(self, i))
    }

    /// Returns an iterator over all elements as `bool`s.
    #[inline]
    fn iter(&self) -> Bits<'_, Self> {
        Bits {
            store: self,
            index: 0,
            word: Self::Word::ZERO,
        }
    }

    /// Returns an iterator over the indices of the set elements, in increasing order.
    #[inline]
    fn ones(&self) -> Ones<'_, Self> {
        Ones {
            store: self,
            word_index: 0,
            word: if self.words() > 0 {
                self.word(0)
            } else {
                Self::Word::ZERO
            },
        }
    }

    /// Computes the dot product (mod 2) of two equal-length stores.
    ///
    /// # Panics
    ///
    /// Panics if the lengths differ.
    fn dot<R: BitStore<Word = Self::Word> + ?Sized>(&self, rhs: &R) -> bool {
        assert_eq!(
            self.len(),
            rhs.len(),
            "dot product of stores with different lengths"
        );
        let mut acc = Self::Word::ZERO;
        for i in 0..self.words() {
            acc ^= self.word(i) & rhs.word(i);
        }
        acc.parity()
    }

    /// True if both stores have the same length and the same elements.
    fn same_bits<R: BitStore<Word = Self::Word> + ?Sized>(&self, rhs: &R) -> bool {
        self.len() == rhs.len() && (0..self.words()).all(|i| self.word(i) == rhs.word(i))
    }

    /// Returns an owned copy of the store.
    fn to_vector(&self) -> BitVector<Self::Word> {
        BitVector::from_words(self.len(), (0..self.words()).map(|i| self.word(i)))
    }

    /// Convolution of two stores, i.e. the coefficients of the product of the GF(2) polynomials
    /// they represent.
    ///
    /// The result has length `self.len() + rhs.len() - 1`, or is empty if either input is. It is
    /// built Horner-style: scanning `self` from its last set element towards the front, the
    /// accumulator is shifted up by one and `rhs` is XOR-ed into its low words whenever the
    /// current element is set.
    fn convolved_with<R: BitStore<Word = Self::Word> + ?Sized>(
        &self,
        rhs: &R,
    ) -> BitVector<Self::Word> {
        let (na, nb) = (self.len(), rhs.len());
        if na == 0 || nb == 0 {
            return BitVector::new();
        }
        let mut result = BitVector::zeros(na + nb - 1);
        let Some(last) = self.last_set() else {
            return result;
        };

        let rhs_words = rhs.words();
        let acc = result.words_mut();
        for i in (0..=last).rev() {
            if i != last {
                let live = Self::Word::words_for(last - i + nb).min(acc.len());
                shift_up_by_one(&mut acc[..live]);
            }
            if self.get(i) {
                for k in 0..rhs_words {
                    acc[k] ^= rhs.word(k);
                }
            }
        }
        result
    }

    /// Interleaves every element with a following zero: `abcde -> a0b0c0d0e`.
    ///
    /// Over GF(2) this squares the polynomial the store represents, since squaring has no cross
    /// terms. The result has length `2 * len - 1`, or is empty for an empty store.
    fn riffled(&self) -> BitVector<Self::Word> {
        let n = self.len();
        if n == 0 {
            return BitVector::new();
        }
        let mut result = BitVector::zeros(2 * n - 1);
        let out = result.words_mut();
        for i in 0..self.words() {
            let (lo, hi) = self.word(i).riffle();
            out[2 * i] = lo;
            if 2 * i + 1 < out.len() {
                out[2 * i + 1] = hi;
            }
        }
        result
    }

    /// Elements as `0`/`1` characters, element 0 first.
    fn to_binary_string(&self) -> String {
        self.to_binary_string_with("", "", "")
    }

    /// Elements as `0`/`1` characters, element 0 first, joined by `separator` and wrapped in
    /// `prefix` and `suffix`.
    fn to_binary_string_with(&self, separator: &str, prefix: &str, suffix: &str) -> String {
        let mut s = String::with_capacity(
            prefix.len() + suffix.len() + self.len() * (1 + separator.len()),
        );
        s.push_str(prefix);
        for (i, b) in self.iter().enumerate() {
            if i > 0 {
                s.push_str(separator);
            }
            s.push(if b { '1' } else { '0' });
        }
        s.push_str(suffix);
        s
    }

    /// Hex encoding, four elements per digit, element 0 in the least significant bit of the first
    /// digit.
    ///
    /// When the length is not a multiple of 4 the final digit carries a `.2`, `.4` or `.8` suffix
    /// saying it only holds 1, 2 or 3 significant bits. The empty store encodes as `""`.
    fn to_hex_string(&self) -> String {
        let n = self.len();
        if n == 0 {
            return String::new();
        }
        let digits = n.div_ceil(4);
        let mut s = String::with_capacity(digits + 4);
        s.push_str("0x");
        for d in 0..digits {
            let start = 4 * d;
            let nibble = (self.word(start / Self::Word::BITS) >> (start % Self::Word::BITS) as u32)
                .to_u64()
                & 0xf;
            s.push(char::from_digit(nibble as u32, 16).unwrap_or('0'));
        }
        match n % 4 {
            1 => s.push_str(".2"),
            2 => s.push_str(".4"),
            3 => s.push_str(".8"),
            _ => {}
        }
        s
    }
}

/// Write access to a packed sequence of bits.
pub trait BitStoreMut: BitStore {
    /// Replaces the `i`th logical word. Bits past the end of the store are ignored.
    fn set_word(&mut self, i: usize, word: Self::Word);

    /// Zeroes the bits of the final word that lie past the end of the store.
    fn clean(&mut self) {
        let n = self.words();
        if n > 0 {
            let w = self.word(n - 1) & self.last_word_mask();
            self.set_word(n - 1, w);
        }
    }

    /// Sets the element at `index` to `value`.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of range.
    #[inline]
    fn set(&mut self, index: usize, value: bool) {
        assert!(
            index < self.len(),
            "bit index {index} out of bounds for length {}",
            self.len()
        );
        let i = index / Self::Word::BITS;
        let bit = Self::Word::unit(index % Self::Word::BITS);
        let w = self.word(i);
        self.set_word(i, if value { w | bit } else { w & !bit });
    }

    #[inline]
    fn flip(&mut self, index: usize) {
        assert!(
            index < self.len(),
            "bit index {index} out of bounds for length {}",
            self.len()
        );
        let i = index / Self::Word::BITS;
        let w = self.word(i) ^ Self::Word::unit(index % Self::Word::BITS);
        self.set_word(i, w);
    }

    /// Swaps the elements at `a` and `b`.
    #[inline]
    fn swap(&mut self, a: usize, b: usize) {
        let (x, y) = (self.get(a), self.get(b));
        if x != y {
            self.set(a, y);
            self.set(b, x);
        }
    }

    fn set_all(&mut self) {
        for i in 0..self.words() {
            self.set_word(i, Self::Word::MAX);
        }
        self.clean();
    }

    fn reset_all(&mut self) {
        for i in 0..self.words() {
            self.set_word(i, Self::Word::ZERO);
        }
    }

    fn flip_all(&mut self) {
        for i in 0..self.words() {
            let w = !self.word(i);
            self.set_word(i, w);
        }
        self.clean();
    }

    /// Sets element `i` to `f(i)` for every `i`.
    fn set_from_fn(&mut self, mut f: impl FnMut(usize) -> bool) {
        for i in 0..self.len() {
            self.set(i, f(i));
        }
    }

    /// Overwrites every element with a fair coin flip.
    fn fill_random(&mut self, rng: &mut impl Rng) {
        for i in 0..self.words() {
            self.set_word(i, Self::Word::random(rng));
        }
        self.clean();
    }

    /// # Panics
    ///
    /// Panics if the lengths differ.
    fn copy_from<R: BitStore<Word = Self::Word> + ?Sized>(&mut self, src: &R) {
        assert_eq!(self.len(), src.len(), "copy between stores of different lengths");
        for i in 0..self.words() {
            self.set_word(i, src.word(i));
        }
    }

    fn xor_assign<R: BitStore<Word = Self::Word> + ?Sized>(&mut self, rhs: &R) {
        assert_eq!(self.len(), rhs.len(), "XOR of stores with different lengths");
        for i in 0..self.words() {
            let w = self.word(i) ^ rhs.word(i);
            self.set_word(i, w);
        }
    }

    fn and_assign<R: BitStore<Word = Self::Word> + ?Sized>(&mut self, rhs: &R) {
        assert_eq!(self.len(), rhs.len(), "AND of stores with different lengths");
        for i in 0..self.words() {
            let w = self.word(i) & rhs.word(i);
            self.set_word(i, w);
        }
    }

    fn or_assign<R: BitStore<Word = Self::Word> + ?Sized>(&mut self, rhs: &R) {
        assert_eq!(self.len(), rhs.len(), "OR of stores with different lengths");
        for i in 0..self.words() {
            let w = self.word(i) | rhs.word(i);
            self.set_word(i, w);
        }
    }

    /// Shifts towards the front: element `i` takes the value of element `i + p` and the last `p`
    /// elements become zero.
    fn shift_left(&mut self, p: usize) {
        if p == 0 {
            return;
        }
        if p >= self.len() {
            self.reset_all();
            return;
        }
        let b = Self::Word::BITS;
        let n = self.words();
        let (ws, bs) = (p / b, p % b);
        let word_or_zero = |s: &Self, i: usize| if i < n { s.word(i) } else { Self::Word::ZERO };
        for i in 0..n {
            let lo = word_or_zero(self, i + ws);
            let w = if bs == 0 {
                lo
            } else {
                (lo >> bs as u32) | (word_or_zero(self, i + ws + 1) << (b - bs) as u32)
            };
            self.set_word(i, w);
        }
        self.clean();
    }

    /// Shifts towards the back: element `i` takes the value of element `i - p` and the first `p`
    /// elements become zero.
    fn shift_right(&mut self, p: usize) {
        if p == 0 {
            return;
        }
        if p >= self.len() {
            self.reset_all();
            return;
        }
        let b = Self::Word::BITS;
        let (ws, bs) = (p / b, p % b);
        for i in (0..self.words()).rev() {
            let w = if i < ws {
                Self::Word::ZERO
            } else if bs == 0 {
                self.word(i - ws)
            } else {
                let hi = self.word(i - ws) << bs as u32;
                let lo = if i > ws {
                    self.word(i - ws - 1) >> (b - bs) as u32
                } else {
                    Self::Word::ZERO
                };
                hi | lo
            };
            self.set_word(i, w);
        }
        self.clean();
    }
}

/// Logical word `i` with every live bit inverted.
#[inline]
fn flipped_word<S: BitStore + ?Sized>(store: &S, i: usize) -> S::Word {
    let w = !store.word(i);
    if i + 1 == store.words() {
        w & store.last_word_mask()
    } else {
        w
    }
}

/// Position of the first set bit at or after `start` in a `len`-bit sequence of words.
fn scan_forward<W: Word>(len: usize, start: usize, word_at: impl Fn(usize) -> W) -> Option<usize> {
    if start >= len {
        return None;
    }
    let n = W::words_for(len);
    let mut i = start / W::BITS;
    let mut w = word_at(i) & !W::mask_below(start % W::BITS);
    loop {
        if let Some(b) = w.lowest_set() {
            return Some(i * W::BITS + b);
        }
        i += 1;
        if i >= n {
            return None;
        }
        w = word_at(i);
    }
}

/// Position of the last set bit strictly before `end` in a `len`-bit sequence of words.
fn scan_backward<W: Word>(len: usize, end: usize, word_at: impl Fn(usize) -> W) -> Option<usize> {
    let end = end.min(len);
    if end == 0 {
        return None;
    }
    let mut i = (end - 1) / W::BITS;
    let mut w = word_at(i) & W::mask_below(end - i * W::BITS);
    loop {
        if let Some(b) = w.highest_set() {
            return Some(i * W::BITS + b);
        }
        if i == 0 {
            return None;
        }
        i -= 1;
        w = word_at(i);
    }
}

/// Multiplies the polynomial held in `words` by `x`; the top bit must be free.
#[inline]
fn shift_up_by_one<W: Word>(words: &mut [W]) {
    let mut carry = W::ZERO;
    for w in words.iter_mut() {
        let next = *w >> (W::BITS - 1) as u32;
        *w = (*w << 1) | carry;
        carry = next;
    }
}

/// Iterator over the elements of a [`BitStore`], yielding each as a `bool`.
pub struct Bits<'a, S: BitStore + ?Sized> {
    store: &'a S,
    index: usize,
    word: S::Word,
}

impl<S: BitStore + ?Sized> Iterator for Bits<'_, S> {
    type Item = bool;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.store.len() {
            return None;
        }
        let b = S::Word::BITS;
        if self.index % b == 0 {
            self.word = self.store.word(self.index / b);
        }
        let bit = self.word.bit(self.index % b);
        self.index += 1;
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.store.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl<S: BitStore + ?Sized> ExactSizeIterator for Bits<'_, S> {}

/// Iterator over the indices of the set elements of a [`BitStore`].
pub struct Ones<'a, S: BitStore + ?Sized> {
    store: &'a S,
    word_index: usize,
    word: S::Word,
}

impl<S: BitStore + ?Sized> Iterator for Ones<'_, S> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(b) = self.word.lowest_set() {
                self.word ^= S::Word::unit(b);
                return Some(self.word_index * S::Word::BITS + b);
            }
            self.word_index += 1;
            if self.word_index >= self.store.words() {
                return None;
            }
            self.word = self.store.word(self.word_index);
        }
    }
}
