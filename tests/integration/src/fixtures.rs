//! Test fixtures and data generators
//!
//! Provides contact lists and server reports reused across tests.

use std::sync::atomic::{AtomicU64, Ordering};

use presence_core::{Contact, PresenceStatus, StatusBitmask, StatusFlags, UserInfo};
use presence_service::testing::InMemoryContactList;

/// Counter for unique identifiers
static COUNTER: AtomicU64 = AtomicU64::new(500_000);

/// A fresh numeric identifier
pub fn unique_identifier() -> String {
    COUNTER.fetch_add(1, Ordering::SeqCst).to_string()
}

pub const ROOT: &str = "Contacts";
pub const FRIENDS: &str = "Friends";
pub const WORK: &str = "Work";
pub const AWAITING: &str = "Awaiting authorization";

/// Alice is online in Friends, Bob is offline in Friends, Carol is away at Work
pub const ALICE: &str = "111111";
pub const BOB: &str = "222222";
pub const CAROL: &str = "333333";

/// Root with two server-stored groups and three contacts
pub fn standard_contact_list() -> InMemoryContactList {
    InMemoryContactList::new(ROOT)
        .with_group(FRIENDS)
        .with_group(WORK)
        .with_contact(FRIENDS, Contact::resolved(ALICE).with_status(PresenceStatus::Online))
        .with_contact(FRIENDS, Contact::resolved(BOB))
        .with_contact(WORK, Contact::resolved(CAROL).with_status(PresenceStatus::Away))
}

/// Own-info report carrying the given flags
pub fn own_info(flags: StatusFlags) -> UserInfo {
    UserInfo::new("100200300", StatusBitmask::from_flags(flags))
}

/// Buddy report carrying the given flags
pub fn buddy(identifier: &str, flags: StatusFlags) -> UserInfo {
    UserInfo::new(identifier, StatusBitmask::from_flags(flags))
}
