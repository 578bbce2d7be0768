//! Identity hashing for integer keys
//!
//! With [`BuildIdentityHasher`] an integer key hashes to itself, so bucket
//! placement in a [`BucketedMap`](super::BucketedMap) is simply `key % N`.
//! Keys that hash as several values (tuples, strings) are folded together
//! with a rotate-and-add combine.

use std::hash::{BuildHasher, Hasher};

/// Builds [`IdentityHasher`]s
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildIdentityHasher;

impl BuildHasher for BuildIdentityHasher {
    type Hasher = IdentityHasher;

    fn build_hasher(&self) -> Self::Hasher {
        IdentityHasher::default()
    }
}

/// Hasher returning a single written integer unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityHasher {
    hash: u64,
}

impl IdentityHasher {
    #[inline]
    fn combine(&mut self, value: u64) {
        self.hash = self.hash.rotate_left(5).wrapping_add(value);
    }
}

impl Hasher for IdentityHasher {
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.combine(byte as u64);
        }
    }

    fn write_u8(&mut self, i: u8) {
        self.combine(i as u64);
    }

    fn write_u16(&mut self, i: u16) {
        self.combine(i as u64);
    }

    fn write_u32(&mut self, i: u32) {
        self.combine(i as u64);
    }

    fn write_u64(&mut self, i: u64) {
        self.combine(i);
    }

    fn write_usize(&mut self, i: usize) {
        self.combine(i as u64);
    }

    fn write_i8(&mut self, i: i8) {
        self.combine(i as u64);
    }

    fn write_i16(&mut self, i: i16) {
        self.combine(i as u64);
    }

    fn write_i32(&mut self, i: i32) {
        self.combine(i as u64);
    }

    fn write_i64(&mut self, i: i64) {
        self.combine(i as u64);
    }

    fn write_isize(&mut self, i: isize) {
        self.combine(i as u64);
    }
}
