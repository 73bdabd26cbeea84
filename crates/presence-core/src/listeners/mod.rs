//! Listener registries

mod hub;
mod registry;

pub use hub::{ListenerHub, SharedListenerHub};
pub use registry::ListenerRegistry;
