//! Switch label paths
//!
//! A path is the compressed 64-bit switch label the daemon uses to reach a
//! node. Labels are read right to left: the lowest bits hold the first hop,
//! and the highest set bit terminates the label. `0000.0000.0000.0001` is
//! the empty route, i.e. the local node itself.

use crate::error::{Result, RoutingError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

/// Length of a path once decoded (64 bits)
pub const PATH_BYTES: usize = 8;

/// Index of the highest set bit of `raw`.
///
/// This is the number of label bits below the terminating 1-bit, which is
/// what the containment and one-hop tests shift and mask by.
pub fn log2(raw: u64) -> Result<u32> {
    if raw == 0 {
        return Err(RoutingError::MalformedPath);
    }
    Ok(63 - raw.leading_zeros())
}

/// Mask selecting the label bits that encode the route from self to `raw`.
///
/// Equal to `2^log2(raw) - 1`; zero for self.
pub fn prefix_mask(raw: u64) -> Result<u64> {
    let bits = log2(raw)?;
    Ok(u64::MAX.checked_shr(64 - bits).unwrap_or(0))
}

/// A non-zero switch label
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path(NonZeroU64);

impl Path {
    /// The route to the local node
    pub const SELF: Path = Path(NonZeroU64::MIN);

    /// Wrap a raw label, rejecting zero
    pub fn new(raw: u64) -> Result<Self> {
        NonZeroU64::new(raw)
            .map(Path)
            .ok_or(RoutingError::MalformedPath)
    }

    /// Raw 64-bit label value
    pub fn raw(&self) -> u64 {
        self.0.get()
    }

    /// Whether this is the route to the local node
    pub fn is_self(&self) -> bool {
        *self == Path::SELF
    }

    /// Index of the highest set bit
    pub fn log2(&self) -> u32 {
        63 - self.0.leading_zeros()
    }

    /// Mask of the label bits below the terminating bit
    pub fn prefix_mask(&self) -> u64 {
        u64::MAX.checked_shr(64 - self.log2()).unwrap_or(0)
    }

    /// Whether traffic along `self` necessarily transits `mid`.
    ///
    /// Holds when `mid` is an ancestor of (or equal to) `self` in the label
    /// tree: `mid` is not larger and both share the bits below `mid`'s
    /// terminator.
    pub fn is_behind(&self, mid: Path) -> bool {
        if mid > *self {
            return false;
        }
        let mask = mid.prefix_mask();
        self.raw() & mask == mid.raw() & mask
    }

    /// Whether `self` is exactly one switch hop beyond `mid`.
    ///
    /// Mirrors the daemon's number compression: after stripping `mid`'s
    /// label bits the remaining director must be a 4, 7 or 10 bit encoding
    /// as selected by its low bits. This depends on the daemon's current
    /// encoding scheme and can report false positives for unusual labels.
    pub fn is_one_hop(&self, mid: Path) -> bool {
        if !self.is_behind(mid) {
            return false;
        }

        let director = self.raw() >> mid.log2();
        let Ok(bits) = log2(director) else {
            return false;
        };

        if director & 1 != 0 {
            bits == 4
        } else if director & 3 != 0 {
            bits == 7
        } else {
            bits == 10
        }
    }
}

impl TryFrom<u64> for Path {
    type Error = RoutingError;

    fn try_from(raw: u64) -> Result<Self> {
        Path::new(raw)
    }
}

impl FromStr for Path {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s.replace('.', "");
        let bytes =
            hex::decode(&digits).map_err(|e| RoutingError::InvalidPathFormat(format!("{s}: {e}")))?;

        let bytes: [u8; PATH_BYTES] = bytes.try_into().map_err(|b: Vec<u8>| {
            RoutingError::InvalidPathFormat(format!(
                "{s}: expected {PATH_BYTES} bytes, got {}",
                b.len()
            ))
        })?;

        Path::new(u64::from_be_bytes(bytes))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = self.raw();
        write!(
            f,
            "{:04x}.{:04x}.{:04x}.{:04x}",
            (raw >> 48) & 0xffff,
            (raw >> 32) & 0xffff,
            (raw >> 16) & 0xffff,
            raw & 0xffff
        )
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path({self})")
    }
}

impl Serialize for Path {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
