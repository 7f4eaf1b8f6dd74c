use thiserror::Error;

/// Recoverable failures: malformed text and reduction modulo the zero polynomial.
///
/// Dimension mismatches, out-of-range indices and other calling-convention violations are not
/// represented here; they panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Gf2Error {
    #[error("invalid character {found:?} in bit string")]
    InvalidCharacter { found: char },

    #[error("hex digit {digit:?} does not fit in the {bits} significant bits its suffix allows")]
    HexSuffixOverflow { digit: char, bits: usize },

    #[error("hex suffix is not attached to a final digit")]
    DanglingHexSuffix,

    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRows {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("{len} bits do not fit in a store with capacity {capacity}")]
    CapacityExceeded { len: usize, capacity: usize },

    #[error("cannot reduce modulo the zero polynomial")]
    ZeroModulus,
}
