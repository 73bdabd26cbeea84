//! Presence status values
//!
//! The closed set of states a contact or the local account can be in.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Presence status of an account or contact
///
/// Values are process-wide constants and are compared by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    /// Not connected or not visible
    Offline,
    /// Connected but hidden from other users
    Invisible,
    /// Do not disturb
    DoNotDisturb,
    /// Occupied (urgent messages only)
    Occupied,
    /// Not available, extended away
    NotAvailable,
    /// Away from the computer
    Away,
    /// Available and willing to chat
    FreeForChat,
    /// Available
    Online,
}

impl Default for PresenceStatus {
    fn default() -> Self {
        Self::Offline
    }
}

impl PresenceStatus {
    /// Every status, in declaration order
    pub const ALL: [PresenceStatus; 8] = [
        Self::Offline,
        Self::Invisible,
        Self::DoNotDisturb,
        Self::Occupied,
        Self::NotAvailable,
        Self::Away,
        Self::FreeForChat,
        Self::Online,
    ];

    /// Online-ness weight. Higher means more reachable; zero means offline.
    #[must_use]
    pub const fn weight(self) -> u8 {
        match self {
            Self::Offline => 0,
            Self::Occupied => 25,
            Self::DoNotDisturb => 30,
            Self::NotAvailable => 35,
            Self::Away => 40,
            Self::Invisible => 45,
            Self::Online => 65,
            Self::FreeForChat => 85,
        }
    }

    /// Whether this status counts as connected
    #[must_use]
    pub const fn is_online(self) -> bool {
        !matches!(self, Self::Offline)
    }

    /// Human readable name
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Offline => "Offline",
            Self::Invisible => "Invisible",
            Self::DoNotDisturb => "Do Not Disturb",
            Self::Occupied => "Occupied",
            Self::NotAvailable => "Not Available",
            Self::Away => "Away",
            Self::FreeForChat => "Free For Chat",
            Self::Online => "Online",
        }
    }
}

impl fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for PresenceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "offline" => Ok(Self::Offline),
            "invisible" => Ok(Self::Invisible),
            "donotdisturb" | "dnd" => Ok(Self::DoNotDisturb),
            "occupied" => Ok(Self::Occupied),
            "notavailable" | "na" => Ok(Self::NotAvailable),
            "away" => Ok(Self::Away),
            "freeforchat" | "ffc" => Ok(Self::FreeForChat),
            "online" => Ok(Self::Online),
            _ => Err(format!("Invalid presence status: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_offline_is_not_online() {
        for status in PresenceStatus::ALL {
            assert_eq!(status.is_online(), status != PresenceStatus::Offline);
        }
    }

    #[test]
    fn test_weights() {
        assert_eq!(PresenceStatus::Offline.weight(), 0);
        assert!(PresenceStatus::FreeForChat.weight() > PresenceStatus::Online.weight());
        assert!(PresenceStatus::Online.weight() > PresenceStatus::Away.weight());
        assert!(PresenceStatus::Away.weight() > PresenceStatus::Occupied.weight());
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("Do Not Disturb".parse::<PresenceStatus>(), Ok(PresenceStatus::DoNotDisturb));
        assert_eq!("ffc".parse::<PresenceStatus>(), Ok(PresenceStatus::FreeForChat));
        assert_eq!("ONLINE".parse::<PresenceStatus>(), Ok(PresenceStatus::Online));
        assert!("busy".parse::<PresenceStatus>().is_err());
        assert_eq!(PresenceStatus::NotAvailable.to_string(), "Not Available");
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&PresenceStatus::FreeForChat).unwrap();
        assert_eq!(json, "\"free_for_chat\"");
        let parsed: PresenceStatus = serde_json::from_str("\"do_not_disturb\"").unwrap();
        assert_eq!(parsed, PresenceStatus::DoNotDisturb);
    }
}
