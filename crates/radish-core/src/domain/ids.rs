//! Future identifiers.
//!
//! A `FutureId` is a 128-bit value stored as a [`Ulid`]. Which bits are random
//! depends on the [`IdGenerator`](crate::ports::IdGenerator) that produced it:
//! the default generator fills all 128 bits from `rand`, the ULID generator
//! keeps a millisecond timestamp in the top 48 bits so ids sort by creation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Identifier of one enqueued task invocation.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FutureId(Ulid);

impl FutureId {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    pub fn from_u128(value: u128) -> Self {
        Self(Ulid::from(value))
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }

    pub fn as_u128(&self) -> u128 {
        self.0.into()
    }

    pub fn to_bytes(&self) -> [u8; 16] {
        self.0.to_bytes()
    }
}

impl From<Ulid> for FutureId {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl fmt::Display for FutureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for FutureId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parses_back() {
        let id = FutureId::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef);
        let parsed: FutureId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(id.to_string().len(), 26);
    }

    #[test]
    fn is_sixteen_bytes() {
        assert_eq!(std::mem::size_of::<FutureId>(), 16);
        let id = FutureId::from_u128(1);
        assert_eq!(id.to_bytes()[15], 1);
        assert_eq!(id.as_u128(), 1);
    }

    #[test]
    fn serializes_as_ulid_string() {
        let id = FutureId::from_ulid(Ulid::new());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let back: FutureId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
