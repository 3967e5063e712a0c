//! # Overlay Sync Test Suite
//!
//! Windows wired through a real [`sync_bus::InMemoryRelay`] with armed
//! inbound listeners, as the runtime does it.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── convergence.rs   # Replicas converge, sender stays untouched
//!     ├── delivery.rs      # Ordering, exclusion, late joiners
//!     └── runtime.rs       # Full bootstrap through OverlayRuntime
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p overlay-sync-tests
//! cargo test -p overlay-sync-tests integration::delivery
//! ```

#![allow(dead_code)]

pub mod integration;
