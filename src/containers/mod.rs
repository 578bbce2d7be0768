//! Contiguous container types
//!
//! - **`GrowableBuffer<T>`** - owned contiguous buffer with doubling growth and
//!   one-third shrink, the storage behind every map bucket

mod growable_buffer;

pub use growable_buffer::GrowableBuffer;
