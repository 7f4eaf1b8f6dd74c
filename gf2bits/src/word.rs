//! Bit-twiddling on a single storage word.
//!
//! Every container in this crate packs its bits into a contiguous run of [`Word`]s. Element `i`
//! of a store lives in word `i / W::BITS` at bit position `i % W::BITS`, counting from the
//! least significant bit.

use rand::Rng;
use std::{
    fmt,
    hash::Hash,
    ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not, Shl, Shr},
};

/// A fixed-width unsigned integer used as the unit of bit storage.
///
/// Implemented for `u8`, `u16`, `u32` and `u64`.
pub trait Word:
    Copy
    + Default
    + Eq
    + Ord
    + Hash
    + fmt::Debug
    + fmt::Binary
    + Send
    + Sync
    + 'static
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + Not<Output = Self>
    + BitAndAssign
    + BitOrAssign
    + BitXorAssign
    + Shl<u32, Output = Self>
    + Shr<u32, Output = Self>
{
    /// Number of bits in the word
    const BITS: usize;
    const ZERO: Self;
    const ONE: Self;
    const MAX: Self;

    fn count_ones(self) -> u32;
    fn leading_zeros(self) -> u32;
    fn trailing_zeros(self) -> u32;
    fn reverse_bits(self) -> Self;

    /// Truncating conversion from a `u64`.
    fn from_u64(value: u64) -> Self;
    fn to_u64(self) -> u64;

    fn random(rng: &mut impl Rng) -> Self;

    /// Returns the minimum number of words required to store the given number of bits.
    #[inline]
    fn words_for(bits: usize) -> usize {
        bits.div_ceil(Self::BITS)
    }

    /// A word with the low `n` bits set. `n` may be anything from `0` to `BITS` inclusive.
    #[inline]
    fn mask_below(n: usize) -> Self {
        if n == 0 {
            Self::ZERO
        } else if n >= Self::BITS {
            Self::MAX
        } else {
            Self::MAX >> (Self::BITS - n) as u32
        }
    }

    /// A word with only bit `i` set.
    #[inline]
    fn unit(i: usize) -> Self {
        Self::ONE << i as u32
    }

    #[inline]
    fn bit(self, i: usize) -> bool {
        (self >> i as u32) & Self::ONE == Self::ONE
    }

    /// Sum of the bits mod 2
    #[inline]
    fn parity(self) -> bool {
        self.count_ones() & 1 == 1
    }

    #[inline]
    fn lowest_set(self) -> Option<usize> {
        (self != Self::ZERO).then(|| self.trailing_zeros() as usize)
    }

    #[inline]
    fn highest_set(self) -> Option<usize> {
        (self != Self::ZERO).then(|| Self::BITS - 1 - self.leading_zeros() as usize)
    }

    /// Interleaves every bit with a following zero, e.g. `abcd -> a0b0c0d0` read from the least
    /// significant end.
    ///
    /// The result needs twice the width of the input, so it comes back as two words: the low half
    /// of `self` spread over `lo` and the high half spread over `hi`.
    #[inline]
    fn riffle(self) -> (Self, Self) {
        let half = Self::BITS / 2;
        let half_mask = (1u64 << half) - 1;
        let lo = spread(self.to_u64() & half_mask);
        let hi = spread((self >> half as u32).to_u64() & half_mask);
        (Self::from_u64(lo), Self::from_u64(hi))
    }
}

/// Moves bit `i` of a 32-bit value to bit `2 * i`.
#[inline]
fn spread(mut x: u64) -> u64 {
    x &= 0x0000_0000_ffff_ffff;
    x = (x | (x << 16)) & 0x0000_ffff_0000_ffff;
    x = (x | (x << 8)) & 0x00ff_00ff_00ff_00ff;
    x = (x | (x << 4)) & 0x0f0f_0f0f_0f0f_0f0f;
    x = (x | (x << 2)) & 0x3333_3333_3333_3333;
    x = (x | (x << 1)) & 0x5555_5555_5555_5555;
    x
}

macro_rules! implement_word {
    ($($word_type:ty),*) => {
        $(
            impl Word for $word_type {
                const BITS: usize = <$word_type>::BITS as usize;
                const ZERO: Self = 0;
                const ONE: Self = 1;
                const MAX: Self = <$word_type>::MAX;

                #[inline]
                fn count_ones(self) -> u32 {
                    <$word_type>::count_ones(self)
                }

                #[inline]
                fn leading_zeros(self) -> u32 {
                    <$word_type>::leading_zeros(self)
                }

                #[inline]
                fn trailing_zeros(self) -> u32 {
                    <$word_type>::trailing_zeros(self)
                }

                #[inline]
                fn reverse_bits(self) -> Self {
                    <$word_type>::reverse_bits(self)
                }

                #[inline]
                fn from_u64(value: u64) -> Self {
                    value as $word_type
                }

                #[inline]
                fn to_u64(self) -> u64 {
                    self as u64
                }

                #[inline]
                fn random(rng: &mut impl Rng) -> Self {
                    rng.random()
                }
            }
        )*
    };
}

implement_word!(u8, u16, u32, u64);

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    fn riffle_reference<W: Word>(w: W) -> (W, W) {
        let mut lo = W::ZERO;
        let mut hi = W::ZERO;
        for i in 0..W::BITS {
            if w.bit(i) {
                let j = 2 * i;
                if j < W::BITS {
                    lo |= W::unit(j);
                } else {
                    hi |= W::unit(j - W::BITS);
                }
            }
        }
        (lo, hi)
    }

    #[test]
    fn masks() {
        assert_eq!(<u8 as Word>::mask_below(0), 0);
        assert_eq!(<u8 as Word>::mask_below(3), 0b111);
        assert_eq!(<u8 as Word>::mask_below(8), 0xff);
        assert_eq!(<u64 as Word>::mask_below(64), u64::MAX);
        assert_eq!(<u64 as Word>::mask_below(63), u64::MAX >> 1);
        assert_eq!(<u16 as Word>::unit(15), 0x8000);
    }

    #[test]
    fn words_for() {
        assert_eq!(<u8 as Word>::words_for(0), 0);
        assert_eq!(<u8 as Word>::words_for(8), 1);
        assert_eq!(<u8 as Word>::words_for(9), 2);
        assert_eq!(<u64 as Word>::words_for(129), 3);
    }

    #[test]
    fn set_positions() {
        assert_eq!(<u32 as Word>::lowest_set(0), None);
        assert_eq!(<u32 as Word>::highest_set(0), None);
        assert_eq!(<u32 as Word>::lowest_set(0b1010_0000), Some(5));
        assert_eq!(<u32 as Word>::highest_set(0b1010_0000), Some(7));
        assert!(<u8 as Word>::parity(0b0111));
        assert!(!<u8 as Word>::parity(0b0101));
    }

    #[test]
    fn riffle_small() {
        assert_eq!(<u8 as Word>::riffle(0b1011), (0b0100_0101, 0));
        assert_eq!(<u8 as Word>::riffle(0b1111_0000), (0, 0b0101_0101));
    }

    #[test]
    fn riffle_matches_reference() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..100 {
            let w8 = <u8 as Word>::random(&mut rng);
            assert_eq!(w8.riffle(), riffle_reference(w8));
            let w16 = <u16 as Word>::random(&mut rng);
            assert_eq!(w16.riffle(), riffle_reference(w16));
            let w32 = <u32 as Word>::random(&mut rng);
            assert_eq!(w32.riffle(), riffle_reference(w32));
            let w64 = <u64 as Word>::random(&mut rng);
            assert_eq!(w64.riffle(), riffle_reference(w64));
        }
    }
}
