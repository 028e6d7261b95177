//! Core types and traits for the Kindling story aggregator.
//!
//! This crate provides the shared domain model and the trait seams used by
//! the cache backends, the upstream client, and the aggregation engine.

pub mod cache;
pub mod clock;
pub mod error;
pub mod item;
pub mod service;
pub mod source;
pub mod story;

pub use cache::TtlCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AggregateError, SourceError};
pub use item::ItemId;
pub use service::BestStories;
pub use source::ItemSource;
pub use story::{RawItem, StoryView};
