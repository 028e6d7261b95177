//! TTL cache backends for the Kindling aggregator.
//!
//! Two interchangeable implementations of [`kindling_core::TtlCache`]:
//! [`MemoryTtlCache`], a lock-striped map with an injectable clock for
//! deterministic expiry under test, and [`MokaTtlCache`], built on Moka's
//! concurrent cache with a per-entry expiry policy.

pub mod memory;
pub mod moka;

pub use self::moka::MokaTtlCache;
pub use memory::MemoryTtlCache;
