//! Presence status model and wire codec

mod bitmask;
pub mod codec;
mod presence_status;

pub use bitmask::{StatusBitmask, StatusFlags};
pub use codec::{
    AccountMode, BasicPresenceCodec, ExtendedStatusCodec, StatusCodec, DEFAULT_AWAY_MESSAGE,
};
pub use presence_status::PresenceStatus;
