use core::fmt;

use serde::{Deserialize, Serialize};

/// Value that deterministically initializes mine placement.
///
/// Text seeds are folded into a 64-bit value with FNV-1a so the same string maps to the same layout on every
/// platform and toolchain.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seed {
    Number(u64),
    Text(String),
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

impl Seed {
    /// Fresh, non-reproducible seed drawn from the thread-local OS-seeded generator.
    pub fn fresh() -> Self {
        Self::Number(rand::random())
    }

    pub fn to_u64(&self) -> u64 {
        match self {
            Self::Number(value) => *value,
            Self::Text(text) => text.bytes().fold(FNV_OFFSET, |hash, byte| {
                (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
            }),
        }
    }
}

impl From<u64> for Seed {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Seed {
    fn from(value: &str) -> Self {
        Self::Text(value.into())
    }
}

impl From<String> for Seed {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}
