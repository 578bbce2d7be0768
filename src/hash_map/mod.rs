//! Hash map implementations
//!
//! - `BucketedMap`: fixed bucket count, linear scan within each bucket, buckets
//!   backed by [`GrowableBuffer`](crate::GrowableBuffer)
//! - `BuildIdentityHasher`: integer keys hash to themselves, making bucket
//!   placement predictable

mod bucketed_map;
mod identity;

pub use bucketed_map::{BucketedMap, Entry};
pub use identity::{BuildIdentityHasher, IdentityHasher};
