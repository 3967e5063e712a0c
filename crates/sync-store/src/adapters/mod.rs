//! Adapters layer.
//!
//! Relay senders (in-memory hub, JSON channel hop, recorder) and per-window
//! key-value stores.

pub mod kv;
pub mod relay;

pub use kv::{InMemoryKeyValueStore, UnavailableKeyValueStore};
pub use relay::{spawn_forwarder, ChannelRelaySender, RecordingRelaySender};
