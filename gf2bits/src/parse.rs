//! Text to bits.
//!
//! Vectors are written in vector order, element 0 first, either as binary (`"10110"`, optional
//! `0b`) or as hex (`"0xf05.8"`, optional `0x`). A hex digit holds four elements with element 0 in
//! its least significant bit; a trailing `.2`, `.4` or `.8` says the final digit only carries 1, 2
//! or 3 of them. Whitespace, `,`, `_` and `'` inside a vector are ignored.
//!
//! Without a prefix, a string made only of `0` and `1` is binary and anything else is hex.

use crate::{error::Gf2Error, matrix::BitMatrix, store::BitStore, vector::BitVector, word::Word};

#[inline]
fn is_ignored(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | '_' | '\'')
}

/// Parses a vector string into its elements.
pub(crate) fn parse_bits(s: &str) -> Result<Vec<bool>, Gf2Error> {
    let cleaned: String = s.chars().filter(|&c| !is_ignored(c)).collect();

    if let Some(rest) = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        parse_hex(rest)
    } else if let Some(rest) = cleaned
        .strip_prefix("0b")
        .or_else(|| cleaned.strip_prefix("0B"))
    {
        parse_binary(rest)
    } else if cleaned.chars().all(|c| c == '0' || c == '1') {
        parse_binary(&cleaned)
    } else {
        parse_hex(&cleaned)
    }
}

fn parse_binary(s: &str) -> Result<Vec<bool>, Gf2Error> {
    s.chars()
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            found => Err(Gf2Error::InvalidCharacter { found }),
        })
        .collect()
}

fn parse_hex(s: &str) -> Result<Vec<bool>, Gf2Error> {
    let (digits, last_bits) = match s.split_once('.') {
        None => (s, 4),
        Some((digits, suffix)) => {
            let mut suffix_chars = suffix.chars();
            let bits = match (suffix_chars.next(), suffix_chars.next()) {
                (Some('2'), None) => 1,
                (Some('4'), None) => 2,
                (Some('8'), None) => 3,
                (Some(_), Some(found)) | (Some(found), None) => {
                    return Err(Gf2Error::InvalidCharacter { found })
                }
                (None, _) => return Err(Gf2Error::DanglingHexSuffix),
            };
            if digits.is_empty() {
                return Err(Gf2Error::DanglingHexSuffix);
            }
            (digits, bits)
        }
    };

    let count = digits.chars().count();
    let mut bits = Vec::with_capacity(4 * count);
    for (k, c) in digits.chars().enumerate() {
        let value = c
            .to_digit(16)
            .ok_or(Gf2Error::InvalidCharacter { found: c })?;
        let width = if k + 1 == count { last_bits } else { 4 };
        if value >> width != 0 {
            return Err(Gf2Error::HexSuffixOverflow {
                digit: c,
                bits: width,
            });
        }
        bits.extend((0..width).map(|i| (value >> i) & 1 == 1));
    }
    Ok(bits)
}

pub(crate) fn parse_vector<W: Word>(s: &str) -> Result<BitVector<W>, Gf2Error> {
    parse_bits(s).map(BitVector::from)
}

/// Parses a matrix: one vector string per row, rows separated by whitespace, `,` or `;`.
pub(crate) fn parse_matrix<W: Word>(s: &str) -> Result<BitMatrix<W>, Gf2Error> {
    let rows = s
        .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .filter(|token| !token.is_empty())
        .map(parse_vector::<W>)
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(first) = rows.first() {
        let expected = first.len();
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(Gf2Error::RaggedRows {
                row,
                found: r.len(),
                expected,
            });
        }
    }
    Ok(BitMatrix::from_rows(rows))
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    fn bits(s: &str) -> String {
        parse_bits(s)
            .unwrap()
            .into_iter()
            .map(|b| if b { '1' } else { '0' })
            .collect()
    }

    #[rstest]
    #[case("10110", "10110")]
    #[case("0b10110", "10110")]
    #[case("1_0 1,1'0", "10110")]
    #[case("0x1", "1000")]
    #[case("0xf05.8", "11110000101")]
    #[case("f05.8", "11110000101")]
    #[case("0X1.2", "1")]
    #[case("0x2.4", "01")]
    #[case("0xA", "0101")]
    #[case("", "")]
    #[case("0x", "")]
    fn accepted_forms(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(bits(input), expected);
    }

    #[rstest]
    #[case("10z1", Gf2Error::InvalidCharacter { found: 'z' })]
    #[case("0b102", Gf2Error::InvalidCharacter { found: '2' })]
    #[case("0xf.3", Gf2Error::InvalidCharacter { found: '3' })]
    #[case("0xf.", Gf2Error::DanglingHexSuffix)]
    #[case("0x.2", Gf2Error::DanglingHexSuffix)]
    #[case("0x3.2", Gf2Error::HexSuffixOverflow { digit: '3', bits: 1 })]
    #[case("0xf.8", Gf2Error::HexSuffixOverflow { digit: 'f', bits: 3 })]
    fn rejected_forms(#[case] input: &str, #[case] expected: Gf2Error) {
        assert_eq!(parse_bits(input), Err(expected));
    }

    #[test]
    fn matrix_rows() {
        let m: BitMatrix = parse_matrix("101; 0x3.8,\n111").unwrap();
        assert_eq!(m.rows(), 3);
        assert_eq!(m.cols(), 3);
        assert_eq!(m.row(1).to_binary_string(), "110");
        assert_eq!(m.to_string(), "101\n110\n111");
    }

    #[test]
    fn ragged_matrix() {
        let err = parse_matrix::<u64>("101 11 111").unwrap_err();
        assert_eq!(
            err,
            Gf2Error::RaggedRows {
                row: 1,
                found: 2,
                expected: 3
            }
        );
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn empty_matrix() {
        let m = parse_matrix::<u8>("  ").unwrap();
        assert_eq!((m.rows(), m.cols()), (0, 0));
    }

    #[test]
    fn rows_without_columns() {
        let m = parse_matrix::<u8>("0b 0b; 0b").unwrap();
        assert_eq!((m.rows(), m.cols()), (3, 0));
        let err = parse_matrix::<u8>("0b 0b1").unwrap_err();
        assert_eq!(
            err,
            Gf2Error::RaggedRows {
                row: 1,
                found: 1,
                expected: 0
            }
        );
    }
}
