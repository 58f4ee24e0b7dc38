//! Classical bits, 2-bit values and bit-string helpers.

use crate::core::errors::ProtocolError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitXor;
use std::str::FromStr;

/// A classical bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Bit {
    Zero,
    One,
}

impl Bit {
    /// Draws a uniformly random bit.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Bit::from(rng.random_bool(0.5))
    }

    pub fn is_one(self) -> bool {
        self == Bit::One
    }

    pub fn as_char(self) -> char {
        match self {
            Bit::Zero => '0',
            Bit::One => '1',
        }
    }
}

impl From<bool> for Bit {
    fn from(value: bool) -> Self {
        if value { Bit::One } else { Bit::Zero }
    }
}

impl From<Bit> for u8 {
    fn from(bit: Bit) -> Self {
        bit as u8
    }
}

impl TryFrom<u8> for Bit {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Bit::Zero),
            1 => Ok(Bit::One),
            other => Err(ProtocolError::InvalidInput(format!(
                "{other} is not a bit value"
            ))),
        }
    }
}

impl TryFrom<char> for Bit {
    type Error = ProtocolError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '0' => Ok(Bit::Zero),
            '1' => Ok(Bit::One),
            other => Err(ProtocolError::InvalidInput(format!(
                "'{other}' is not a bit character"
            ))),
        }
    }
}

impl BitXor for Bit {
    type Output = Bit;

    fn bitxor(self, rhs: Bit) -> Bit {
        Bit::from(self != rhs)
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A 2-bit value carried by one superdense-coding channel use.
///
/// The first bit selects the phase flip (Z) on the sender's qubit and is read
/// back from qubit 0; the second selects the bit flip (X) and is read back from
/// qubit 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum BitPair {
    B00,
    B01,
    B10,
    B11,
}

impl BitPair {
    pub const ALL: [BitPair; 4] = [BitPair::B00, BitPair::B01, BitPair::B10, BitPair::B11];

    pub fn new(first: Bit, second: Bit) -> Self {
        match (first, second) {
            (Bit::Zero, Bit::Zero) => BitPair::B00,
            (Bit::Zero, Bit::One) => BitPair::B01,
            (Bit::One, Bit::Zero) => BitPair::B10,
            (Bit::One, Bit::One) => BitPair::B11,
        }
    }

    /// Builds a pair from the first two bits of `bits`.
    pub fn from_prefix(bits: &[Bit]) -> Result<Self, ProtocolError> {
        match bits {
            [first, second, ..] => Ok(BitPair::new(*first, *second)),
            _ => Err(ProtocolError::InsufficientKeyMaterial {
                available: bits.len(),
                required: 2,
            }),
        }
    }

    pub fn first(self) -> Bit {
        Bit::from(matches!(self, BitPair::B10 | BitPair::B11))
    }

    pub fn second(self) -> Bit {
        Bit::from(matches!(self, BitPair::B01 | BitPair::B11))
    }

    pub fn bits(self) -> [Bit; 2] {
        [self.first(), self.second()]
    }

    /// Number of positions in which the two pairs agree (0, 1 or 2).
    pub fn matching_bits(self, other: BitPair) -> usize {
        (self.first() == other.first()) as usize + (self.second() == other.second()) as usize
    }
}

impl BitXor for BitPair {
    type Output = BitPair;

    fn bitxor(self, rhs: BitPair) -> BitPair {
        BitPair::new(self.first() ^ rhs.first(), self.second() ^ rhs.second())
    }
}

impl FromStr for BitPair {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits = parse_bits(s)?;
        if bits.len() != 2 {
            return Err(ProtocolError::InvalidInput(format!(
                "message must be exactly 2 bits, got {s:?}"
            )));
        }
        Ok(BitPair::new(bits[0], bits[1]))
    }
}

impl TryFrom<String> for BitPair {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BitPair> for String {
    fn from(pair: BitPair) -> Self {
        pair.to_string()
    }
}

impl fmt::Display for BitPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.first(), self.second())
    }
}

/// Parses a string of `'0'`/`'1'` characters.
pub fn parse_bits(s: &str) -> Result<Vec<Bit>, ProtocolError> {
    s.chars().map(Bit::try_from).collect()
}

/// Formats bits as a `'0'`/`'1'` string.
pub fn format_bits(bits: &[Bit]) -> String {
    bits.iter().map(|b| b.as_char()).collect()
}

/// UTF-8 bytes of `text`, most significant bit first.
pub fn text_to_bits(text: &str) -> Vec<Bit> {
    text.bytes()
        .flat_map(|byte| (0..8).rev().map(move |i| Bit::from((byte >> i) & 1 == 1)))
        .collect()
}

/// Inverse of [`text_to_bits`]. Trailing bits short of a full byte are dropped
/// and invalid UTF-8 is replaced.
pub fn bits_to_text(bits: &[Bit]) -> String {
    let bytes: Vec<u8> = bits
        .chunks_exact(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, b| (acc << 1) | u8::from(*b)))
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Splits bits into 2-bit blocks, zero padding the last one.
pub fn chunk_pairs(bits: &[Bit]) -> Vec<BitPair> {
    bits.chunks(2)
        .map(|chunk| BitPair::new(chunk[0], chunk.get(1).copied().unwrap_or(Bit::Zero)))
        .collect()
}
