//! Protocol-facing message types

mod messages;

pub use messages::{ProtocolCommand, ProtocolEvent, ProtocolRequest, ProtocolResponse, UserInfo};
