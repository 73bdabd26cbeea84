//! Wire-level status bitmask
//!
//! The server reports presence as a bitfield whose flags overlap. A value of
//! `-1` is the sentinel for "unknown", which is also what offline and error
//! responses look like.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Individual status flags as carried on the wire
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StatusFlags: u32 {
        const AWAY          = 0x0000_0001;
        const DND           = 0x0000_0002;
        const NA            = 0x0000_0004;
        const OCCUPIED      = 0x0000_0010;
        const FREE_FOR_CHAT = 0x0000_0020;
        const INVISIBLE     = 0x0000_0100;
        /// Reported by the server for a plain online user
        const ONLINE        = 0x0100_0000;
    }
}

/// Signed status bitmask with `-1` meaning unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusBitmask(i64);

impl StatusBitmask {
    /// Unknown / offline / error sentinel
    pub const UNKNOWN: Self = Self(-1);

    /// Bitmask of a plain online user
    pub const ONLINE: Self = Self(StatusFlags::ONLINE.bits() as i64);

    #[must_use]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn from_flags(flags: StatusFlags) -> Self {
        Self(flags.bits() as i64)
    }

    #[must_use]
    pub const fn raw(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_unknown(self) -> bool {
        self.0 == -1
    }

    /// Flags carried by this mask; `None` for the unknown sentinel
    #[must_use]
    pub fn flags(self) -> Option<StatusFlags> {
        if self.is_unknown() {
            None
        } else {
            Some(StatusFlags::from_bits_retain(self.0 as u32))
        }
    }

    /// Check whether a flag is set (never true for the unknown sentinel)
    #[must_use]
    pub fn contains(self, flag: StatusFlags) -> bool {
        self.flags().is_some_and(|flags| flags.contains(flag))
    }
}

impl Default for StatusBitmask {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl From<StatusFlags> for StatusBitmask {
    fn from(flags: StatusFlags) -> Self {
        Self::from_flags(flags)
    }
}

impl fmt::Display for StatusBitmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            write!(f, "unknown")
        } else {
            write!(f, "{:#010x}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_has_no_flags() {
        assert!(StatusBitmask::UNKNOWN.is_unknown());
        assert_eq!(StatusBitmask::UNKNOWN.flags(), None);
        // -1 has every bit set but must not read as any status
        assert!(!StatusBitmask::UNKNOWN.contains(StatusFlags::INVISIBLE));
    }

    #[test]
    fn test_default_is_unknown() {
        assert_eq!(StatusBitmask::default(), StatusBitmask::UNKNOWN);
    }

    #[test]
    fn test_online_mask() {
        assert_eq!(StatusBitmask::ONLINE.raw(), 0x0100_0000);
        assert!(StatusBitmask::ONLINE.contains(StatusFlags::ONLINE));
    }

    #[test]
    fn test_combined_flags() {
        let mask = StatusBitmask::from_flags(StatusFlags::AWAY | StatusFlags::DND);
        assert!(mask.contains(StatusFlags::AWAY));
        assert!(mask.contains(StatusFlags::DND));
        assert!(!mask.contains(StatusFlags::NA));
    }

    #[test]
    fn test_display() {
        assert_eq!(StatusBitmask::UNKNOWN.to_string(), "unknown");
        assert_eq!(StatusBitmask::from_raw(0x20).to_string(), "0x00000020");
    }
}
