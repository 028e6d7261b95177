//! Upstream client for the Hacker News item API.
//!
//! [`HnClient`] implements [`kindling_core::ItemSource`] over the public v0
//! REST endpoints. It performs no retries and no caching; the aggregation
//! engine owns both policies.

pub mod hn;

pub use hn::{HnClient, DEFAULT_BASE_URL};
