//! 128-bit identifiers for actors and lightmap build data.
//!
//! The textual form is the engine's default one: 32 uppercase hex digits,
//! the four 32-bit words printed in order (`%08X%08X%08X%08X`).

#[cfg(test)]
use fake::Dummy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(test, derive(Dummy))]
pub struct Guid {
    pub a: u32,
    pub b: u32,
    pub c: u32,
    pub d: u32,
}

impl Guid {
    pub const fn new(a: u32, b: u32, c: u32, d: u32) -> Self {
        Self { a, b, c, d }
    }

    pub fn is_valid(&self) -> bool {
        (self.a | self.b | self.c | self.d) != 0
    }

    fn from_bytes(bytes: &[u8; 16]) -> Self {
        let mut words = [0u32; 4];
        for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
            *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Self::new(words[0], words[1], words[2], words[3])
    }
}

impl Display for Guid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08X}{:08X}{:08X}{:08X}",
            self.a, self.b, self.c, self.d
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuidParseError {
    input: String,
}

impl Display for GuidParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "invalid guid '{}': expected 32 hex digits", self.input)
    }
}

impl Error for GuidParseError {}

impl FromStr for Guid {
    type Err = GuidParseError;

    /// Accepts the plain 32 digit form as well as the hyphenated
    /// `8-4-4-4-12` form, optionally wrapped in braces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || GuidParseError {
            input: s.to_string(),
        };
        let trimmed = s.trim();
        let trimmed = trimmed
            .strip_prefix('{')
            .and_then(|inner| inner.strip_suffix('}'))
            .unwrap_or(trimmed);
        let digits: String = trimmed.chars().filter(|c| *c != '-').collect();
        if digits.len() != 32 {
            return Err(err());
        }
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(&digits, &mut bytes).map_err(|_| err())?;
        Ok(Guid::from_bytes(&bytes))
    }
}

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
