//! # growmap: Type-Specialized Growable Buffers and Bucketed Hash Maps
//!
//! Two tightly coupled containers, specialized per element type through
//! generics:
//!
//! - **[`GrowableBuffer<T>`]**: owned contiguous storage that doubles when
//!   full and halves once usage falls to one third of capacity, never below
//!   its configured block size.
//! - **[`BucketedMap<K, V, S>`]**: a fixed number of buckets, each a
//!   `GrowableBuffer` of entries scanned linearly, selected by
//!   `hash(key) % bucket_count`.
//!
//! Illegal operations (popping an empty buffer, removing past the end, using
//! a released buffer) are fatal by default. The reaction is injected per
//! container through an [`IllegalOpPolicy`]; every such operation also has a
//! `try_*` form returning [`Result`].
//!
//! ## Quick Start
//!
//! ```rust
//! use growmap::{BucketedMap, GrowableBuffer, IllegalOpPolicy};
//!
//! let mut buf = GrowableBuffer::new();
//! for i in 0..100 {
//!     buf.push(i);
//! }
//! assert_eq!(buf.pop(), 99);
//! assert_eq!(buf.size(), 99);
//!
//! let mut map = BucketedMap::new();
//! map.set(5, "five");
//! map.set(10, "ten");
//! map.change_key(&5, 10);
//! assert_eq!(map.find(&10), Some("five"));
//! assert_eq!(map.count(), 1);
//!
//! let mut lenient: GrowableBuffer<u8> = GrowableBuffer::with_policy(IllegalOpPolicy::return_default());
//! assert_eq!(lenient.pop(), 0);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod config;
pub mod containers;
pub mod error;
pub mod hash_map;
pub mod policy;

// Re-export core types
pub use config::{BufferConfig, Config, MapConfig};
pub use containers::GrowableBuffer;
pub use error::{ContainerError, Result};
pub use hash_map::{BucketedMap, BuildIdentityHasher, Entry};
pub use policy::{FaultAction, IllegalOpPolicy};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library (currently only logs the version)
pub fn init() {
    log::debug!("Initializing growmap v{}", VERSION);
}
