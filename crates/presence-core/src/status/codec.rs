//! Status encoding and decoding
//!
//! Two account flavours speak the same bitmask but differ in which statuses
//! they can express and in how a status change is pushed to the server. The
//! difference is captured by the [`StatusCodec`] strategy, selected once per
//! account through [`AccountMode::codec`].

use serde::{Deserialize, Serialize};
use std::fmt;

use super::bitmask::{StatusBitmask, StatusFlags};
use super::presence_status::PresenceStatus;
use crate::error::{PresenceError, PresenceResult};
use crate::protocol::{ProtocolCommand, UserInfo};

/// Away message set when a basic-presence account goes away without text
pub const DEFAULT_AWAY_MESSAGE: &str = "I'm away!";

/// Status to flag mapping. Offline has no entry.
const ENCODING_TABLE: [(PresenceStatus, StatusFlags); 7] = [
    (PresenceStatus::Away, StatusFlags::AWAY),
    (PresenceStatus::DoNotDisturb, StatusFlags::DND),
    (PresenceStatus::FreeForChat, StatusFlags::FREE_FOR_CHAT),
    (PresenceStatus::Invisible, StatusFlags::INVISIBLE),
    (PresenceStatus::NotAvailable, StatusFlags::NA),
    (PresenceStatus::Occupied, StatusFlags::OCCUPIED),
    (PresenceStatus::Online, StatusFlags::ONLINE),
];

/// Decode priority, highest first. A mask with none of these reads as Online.
const DECODE_PRIORITY: [(StatusFlags, PresenceStatus); 6] = [
    (StatusFlags::INVISIBLE, PresenceStatus::Invisible),
    (StatusFlags::DND, PresenceStatus::DoNotDisturb),
    (StatusFlags::OCCUPIED, PresenceStatus::Occupied),
    (StatusFlags::NA, PresenceStatus::NotAvailable),
    (StatusFlags::AWAY, PresenceStatus::Away),
    (StatusFlags::FREE_FOR_CHAT, PresenceStatus::FreeForChat),
];

const EXTENDED_STATUSES: [PresenceStatus; 8] = [
    PresenceStatus::Online,
    PresenceStatus::DoNotDisturb,
    PresenceStatus::FreeForChat,
    PresenceStatus::NotAvailable,
    PresenceStatus::Occupied,
    PresenceStatus::Away,
    PresenceStatus::Invisible,
    PresenceStatus::Offline,
];

const BASIC_STATUSES: [PresenceStatus; 4] = [
    PresenceStatus::Online,
    PresenceStatus::Away,
    PresenceStatus::Invisible,
    PresenceStatus::Offline,
];

/// Decode a wire bitmask into a presence status
///
/// The unknown sentinel is the only value that decodes to Offline. A mask
/// with no recognised flag is treated as Online, since the server only
/// answers for users that are connected.
pub fn decode(mask: StatusBitmask) -> PresenceStatus {
    let Some(flags) = mask.flags() else {
        return PresenceStatus::Offline;
    };

    DECODE_PRIORITY
        .iter()
        .find(|(flag, _)| flags.contains(*flag))
        .map_or(PresenceStatus::Online, |(_, status)| *status)
}

/// Encode a presence status as a wire bitmask
///
/// # Errors
/// Returns `PresenceError::UnsupportedStatus` for Offline, which cannot be
/// published as a mask.
pub fn encode(status: PresenceStatus) -> PresenceResult<StatusBitmask> {
    ENCODING_TABLE
        .iter()
        .find(|(candidate, _)| *candidate == status)
        .map(|(_, flags)| StatusBitmask::from_flags(*flags))
        .ok_or(PresenceError::UnsupportedStatus(status))
}

/// Account flavour, fixed for the lifetime of a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountMode {
    /// Numeric accounts with the full status set and extended authorization
    #[default]
    Extended,
    /// Screen-name accounts limited to online, away and invisible
    Basic,
}

impl AccountMode {
    /// The codec strategy for this account flavour
    #[must_use]
    pub fn codec(self) -> &'static dyn StatusCodec {
        match self {
            Self::Extended => &ExtendedStatusCodec,
            Self::Basic => &BasicPresenceCodec,
        }
    }
}

impl fmt::Display for AccountMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extended => write!(f, "extended"),
            Self::Basic => write!(f, "basic"),
        }
    }
}

impl std::str::FromStr for AccountMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "extended" | "icq" => Ok(Self::Extended),
            "basic" | "aim" => Ok(Self::Basic),
            _ => Err(format!("Invalid account mode: {s}")),
        }
    }
}

/// Encoding strategy for one account flavour
pub trait StatusCodec: Send + Sync + fmt::Debug {
    /// The account flavour this codec serves
    fn mode(&self) -> AccountMode;

    /// Statuses this account can be in, in presentation order
    fn supported_statuses(&self) -> &'static [PresenceStatus];

    /// Encode a status, rejecting anything outside the supported set
    fn encode(&self, status: PresenceStatus) -> PresenceResult<StatusBitmask> {
        if !self.supported_statuses().contains(&status) {
            return Err(PresenceError::UnsupportedStatus(status));
        }
        encode(status)
    }

    fn decode(&self, mask: StatusBitmask) -> PresenceStatus {
        decode(mask)
    }

    /// Bitmask describing our own account from a server own-info report
    fn own_status(&self, info: &UserInfo) -> StatusBitmask;

    /// Status of a buddy from a server status report
    fn buddy_status(&self, info: &UserInfo) -> PresenceStatus;

    /// Commands that move the account from `current` to `requested`
    fn publish_commands(
        &self,
        requested: PresenceStatus,
        current: PresenceStatus,
        message: &str,
    ) -> PresenceResult<Vec<ProtocolCommand>>;

    /// Whether the account supports authorization re-requests
    fn supports_extended_authorization(&self) -> bool;
}

/// Codec for accounts with the full extended status set
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtendedStatusCodec;

impl StatusCodec for ExtendedStatusCodec {
    fn mode(&self) -> AccountMode {
        AccountMode::Extended
    }

    fn supported_statuses(&self) -> &'static [PresenceStatus] {
        &EXTENDED_STATUSES
    }

    fn own_status(&self, info: &UserInfo) -> StatusBitmask {
        if info.status.is_unknown() {
            StatusBitmask::ONLINE
        } else {
            info.status
        }
    }

    fn buddy_status(&self, info: &UserInfo) -> PresenceStatus {
        decode(info.status)
    }

    fn publish_commands(
        &self,
        requested: PresenceStatus,
        _current: PresenceStatus,
        message: &str,
    ) -> PresenceResult<Vec<ProtocolCommand>> {
        let mask = self.encode(requested)?;
        Ok(vec![
            ProtocolCommand::SetExtendedStatus { mask },
            ProtocolCommand::SetStatusMessage {
                message: message.to_string(),
            },
        ])
    }

    fn supports_extended_authorization(&self) -> bool {
        true
    }
}

/// Codec for accounts that only know online, away and invisible
///
/// Away is expressed through an away message and invisibility through a
/// separate visibility switch, so going from one to another may need two
/// commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicPresenceCodec;

impl StatusCodec for BasicPresenceCodec {
    fn mode(&self) -> AccountMode {
        AccountMode::Basic
    }

    fn supported_statuses(&self) -> &'static [PresenceStatus] {
        &BASIC_STATUSES
    }

    fn own_status(&self, info: &UserInfo) -> StatusBitmask {
        if info.away == Some(true) {
            StatusBitmask::from_flags(StatusFlags::AWAY)
        } else if !info.status.is_unknown() {
            info.status
        } else {
            StatusBitmask::ONLINE
        }
    }

    fn buddy_status(&self, info: &UserInfo) -> PresenceStatus {
        if info.away == Some(true) {
            PresenceStatus::Away
        } else {
            PresenceStatus::Online
        }
    }

    fn publish_commands(
        &self,
        requested: PresenceStatus,
        current: PresenceStatus,
        message: &str,
    ) -> PresenceResult<Vec<ProtocolCommand>> {
        self.encode(requested)?;

        let mut commands = Vec::with_capacity(2);
        match requested {
            PresenceStatus::Away => {
                if current == PresenceStatus::Invisible {
                    commands.push(ProtocolCommand::SetVisibility { visible: true });
                }
                let away = if message.is_empty() {
                    DEFAULT_AWAY_MESSAGE
                } else {
                    message
                };
                commands.push(ProtocolCommand::SetAwayMessage {
                    message: Some(away.to_string()),
                });
            }
            PresenceStatus::Invisible => {
                if current == PresenceStatus::Away {
                    commands.push(ProtocolCommand::SetAwayMessage { message: None });
                }
                commands.push(ProtocolCommand::SetVisibility { visible: false });
            }
            PresenceStatus::Online => {
                if current == PresenceStatus::Invisible {
                    commands.push(ProtocolCommand::SetVisibility { visible: true });
                } else if current == PresenceStatus::Away {
                    commands.push(ProtocolCommand::SetAwayMessage { message: None });
                }
            }
            other => return Err(PresenceError::UnsupportedStatus(other)),
        }
        Ok(commands)
    }

    fn supports_extended_authorization(&self) -> bool {
        false
    }
}
