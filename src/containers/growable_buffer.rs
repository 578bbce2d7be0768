//! GrowableBuffer: contiguous buffer with doubling growth and one-third shrink
//!
//! Storage is managed directly with `alloc`/`realloc`. Capacity follows a
//! fixed policy instead of being caller-controlled:
//!
//! - `init` allocates exactly `block_size` slots.
//! - A push into a full buffer doubles the capacity.
//! - A removal that leaves `size() <= capacity / 3` halves the capacity, never
//!   going below `block_size`.
//!
//! The gap between the grow trigger (full) and the shrink trigger (one third)
//! keeps a buffer hovering around a boundary from reallocating on every call.

use crate::config::{BufferConfig, Config};
use crate::error::{check_index, ContainerError, Result};
use crate::policy::IllegalOpPolicy;
use std::alloc::{self, Layout};
use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::ptr::{self, NonNull};
use std::slice;

/// Growable contiguous buffer with hysteresis-based shrinking
///
/// A buffer is either initialized (owns storage of at least `block_size`
/// slots) or uninitialized (owns nothing). Buffers built with [`new`],
/// [`with_policy`] or [`with_config`] start initialized; [`uninit`] gives the
/// two-step form that needs an explicit [`init`]. [`release`] returns a buffer
/// to the uninitialized state.
///
/// Operations that can be illegal come in two forms. `try_*` methods return a
/// [`Result`]. The plain methods hand the error to the buffer's
/// [`IllegalOpPolicy`], which aborts by default.
///
/// # Examples
///
/// ```rust
/// use growmap::GrowableBuffer;
///
/// let mut buf = GrowableBuffer::new();
/// buf.push(1);
/// buf.push(2);
/// buf.push(3);
/// assert_eq!(buf.remove_at(0), 1);
/// assert_eq!(buf.pop(), 3);
/// assert_eq!(buf.as_slice(), &[2]);
/// ```
///
/// [`new`]: GrowableBuffer::new
/// [`with_policy`]: GrowableBuffer::with_policy
/// [`with_config`]: GrowableBuffer::with_config
/// [`uninit`]: GrowableBuffer::uninit
/// [`init`]: GrowableBuffer::init
/// [`release`]: GrowableBuffer::release
pub struct GrowableBuffer<T> {
    ptr: Option<NonNull<T>>,
    current: usize,
    capacity: usize,
    shrink_at: usize,
    block_size: usize,
    policy: IllegalOpPolicy,
}

impl<T> GrowableBuffer<T> {
    /// Create an initialized buffer with the default configuration
    pub fn new() -> Self {
        Self::with_policy(IllegalOpPolicy::default())
    }

    /// Create an initialized buffer with the default block size and the given policy
    pub fn with_policy(policy: IllegalOpPolicy) -> Self {
        let mut buffer = Self::uninit_with_policy(BufferConfig::default(), policy);
        buffer.init();
        buffer
    }

    /// Create an initialized buffer from a validated configuration
    pub fn with_config(config: BufferConfig) -> Result<Self> {
        let policy = config.on_illegal.into();
        Self::with_config_and_policy(config, policy)
    }

    /// Create an initialized buffer with a configuration and an injected policy
    ///
    /// `config.on_illegal` is ignored in favour of `policy`.
    pub fn with_config_and_policy(config: BufferConfig, policy: IllegalOpPolicy) -> Result<Self> {
        config.validate()?;
        let mut buffer = Self::uninit_with_policy(config, policy);
        buffer.try_init()?;
        Ok(buffer)
    }

    /// Create an uninitialized buffer; [`init`](Self::init) must run before use
    pub fn uninit(config: BufferConfig) -> Self {
        let policy = config.on_illegal.into();
        Self::uninit_with_policy(config, policy)
    }

    /// Create an uninitialized buffer with an injected policy
    pub fn uninit_with_policy(config: BufferConfig, policy: IllegalOpPolicy) -> Self {
        Self {
            ptr: None,
            current: 0,
            capacity: 0,
            shrink_at: 0,
            block_size: config.block_size,
            policy,
        }
    }

    /// Allocate `block_size` slots, discarding any previous contents
    #[track_caller]
    pub fn init(&mut self) {
        if let Err(err) = self.try_init() {
            self.policy.raise(err);
        }
    }

    /// Fallible form of [`init`](Self::init)
    pub fn try_init(&mut self) -> Result<()> {
        if self.block_size == 0 {
            return Err(ContainerError::configuration(
                "block_size must be greater than 0",
            ));
        }
        self.release();
        self.reallocate(self.block_size)?;
        self.shrink_at = 0;
        Ok(())
    }

    /// Drop all elements, free the storage and return to the uninitialized state
    pub fn release(&mut self) {
        self.drop_elements();
        if let Some(ptr) = self.ptr.take() {
            if mem::size_of::<T>() != 0 && self.capacity > 0 {
                // Same layout the storage was (re)allocated with.
                if let Ok(layout) = Layout::array::<T>(self.capacity) {
                    unsafe { alloc::dealloc(ptr.as_ptr() as *mut u8, layout) };
                }
            }
        }
        self.capacity = 0;
        self.shrink_at = 0;
    }

    /// Whether the buffer currently owns storage
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.ptr.is_some()
    }

    /// Number of elements
    #[inline]
    pub fn size(&self) -> usize {
        self.current
    }

    /// Number of elements, alias of [`size`](Self::size)
    #[inline]
    pub fn len(&self) -> usize {
        self.current
    }

    /// Check if the buffer holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.current == 0
    }

    /// Configured initial block size
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Policy applied to illegal operations
    #[inline]
    pub fn policy(&self) -> &IllegalOpPolicy {
        &self.policy
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(crate) fn shrink_threshold(&self) -> usize {
        self.shrink_at
    }

    #[inline]
    fn data_ptr(&self) -> *mut T {
        match self.ptr {
            Some(ptr) => ptr.as_ptr(),
            None => ptr::null_mut(),
        }
    }

    /// Get the buffer as a slice
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        match self.ptr {
            Some(ptr) if self.current > 0 => unsafe { slice::from_raw_parts(ptr.as_ptr(), self.current) },
            _ => &[],
        }
    }

    /// Get the buffer as a mutable slice
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match self.ptr {
            Some(ptr) if self.current > 0 => unsafe { slice::from_raw_parts_mut(ptr.as_ptr(), self.current) },
            _ => &mut [],
        }
    }

    /// Append `value`, doubling the capacity first if the buffer is full
    #[track_caller]
    pub fn push(&mut self, value: T) {
        if let Err(err) = self.try_push(value) {
            self.policy.raise(err);
        }
    }

    /// Fallible form of [`push`](Self::push)
    pub fn try_push(&mut self, value: T) -> Result<()> {
        self.ensure_initialized("push")?;

        if self.current == self.capacity {
            let doubled = self
                .capacity
                .checked_mul(2)
                .ok_or_else(|| ContainerError::out_of_memory(usize::MAX))?;
            self.reallocate(doubled)?;
            self.recompute_shrink_at();
        }

        unsafe {
            ptr::write(self.data_ptr().add(self.current), value);
        }
        self.current += 1;
        Ok(())
    }

    /// Remove and return the last element
    ///
    /// On an empty buffer the policy decides; if it continues, `T::default()`
    /// is returned and the buffer is left unchanged.
    #[track_caller]
    pub fn pop(&mut self) -> T
    where
        T: Default,
    {
        match self.try_pop() {
            Ok(value) => value,
            Err(err) => {
                self.policy.raise(err);
                T::default()
            }
        }
    }

    /// Fallible form of [`pop`](Self::pop)
    pub fn try_pop(&mut self) -> Result<T> {
        self.ensure_initialized("pop")?;
        if self.current == 0 {
            return Err(ContainerError::empty_container("pop"));
        }

        self.current -= 1;
        let value = unsafe { ptr::read(self.data_ptr().add(self.current)) };
        self.maybe_shrink();
        Ok(value)
    }

    /// Remove and return the element at `index`, shifting later elements left
    #[track_caller]
    pub fn remove_at(&mut self, index: usize) -> T
    where
        T: Default,
    {
        match self.try_remove_at(index) {
            Ok(value) => value,
            Err(err) => {
                self.policy.raise(err);
                T::default()
            }
        }
    }

    /// Fallible form of [`remove_at`](Self::remove_at)
    pub fn try_remove_at(&mut self, index: usize) -> Result<T> {
        self.ensure_initialized("remove")?;
        check_index(index, self.current)?;

        let value = unsafe {
            let slot = self.data_ptr().add(index);
            let value = ptr::read(slot);
            ptr::copy(slot.add(1), slot, self.current - index - 1);
            value
        };
        self.current -= 1;
        self.maybe_shrink();
        Ok(value)
    }

    /// Remove every element matching `matches`, keeping the order of the rest
    ///
    /// Returns the number of removed elements.
    pub fn delete_matching<P>(&mut self, matches: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        self.delete_matching_then(matches, drop)
    }

    /// Like [`delete_matching`](Self::delete_matching), handing each removed
    /// element to `post` right after it leaves the buffer
    pub fn delete_matching_then<P, F>(&mut self, mut matches: P, mut post: F) -> usize
    where
        P: FnMut(&T) -> bool,
        F: FnMut(T),
    {
        let mut removed = 0;
        let mut index = 0;
        while index < self.current {
            if !matches(&self.as_slice()[index]) {
                index += 1;
                continue;
            }
            if let Ok(value) = self.try_remove_at(index) {
                removed += 1;
                post(value);
            }
        }
        removed
    }

    /// Reallocate to exactly `new_cap` slots
    fn reallocate(&mut self, new_cap: usize) -> Result<()> {
        debug_assert!(new_cap >= self.current);
        debug_assert!(new_cap > 0);

        if mem::size_of::<T>() == 0 {
            self.ptr = Some(NonNull::dangling());
            self.capacity = new_cap;
            return Ok(());
        }

        let new_layout = Layout::array::<T>(new_cap)
            .map_err(|_| ContainerError::out_of_memory(new_cap.saturating_mul(mem::size_of::<T>())))?;

        let new_ptr = match self.ptr {
            Some(ptr) if self.capacity > 0 => {
                let old_layout = Layout::array::<T>(self.capacity)
                    .map_err(|_| ContainerError::out_of_memory(usize::MAX))?;
                unsafe { alloc::realloc(ptr.as_ptr() as *mut u8, old_layout, new_layout.size()) as *mut T }
            }
            _ => unsafe { alloc::alloc(new_layout) as *mut T },
        };

        let ptr = NonNull::new(new_ptr).ok_or_else(|| ContainerError::out_of_memory(new_layout.size()))?;
        log::trace!(
            "growable buffer resized from {} to {} slots ({} in use)",
            self.capacity,
            new_cap,
            self.current
        );
        self.ptr = Some(ptr);
        self.capacity = new_cap;
        Ok(())
    }

    fn recompute_shrink_at(&mut self) {
        self.shrink_at = if self.capacity > self.block_size {
            self.capacity / 3
        } else {
            0
        };
    }

    fn maybe_shrink(&mut self) {
        if self.shrink_at == 0 || self.current > self.shrink_at {
            return;
        }

        let target = (self.capacity / 2).max(self.block_size);
        match self.reallocate(target) {
            Ok(()) => self.recompute_shrink_at(),
            // A failed shrink leaves the larger, still valid, allocation in place.
            Err(err) => log::warn!("keeping capacity {} after failed shrink: {}", self.capacity, err),
        }
    }

    fn ensure_initialized(&self, operation: &str) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(ContainerError::invalid_container(format!(
                "cannot {} on a buffer that is not initialized",
                operation
            )))
        }
    }

    fn drop_elements(&mut self) {
        let len = self.current;
        // Zero the length first so a panicking destructor cannot cause a double drop.
        self.current = 0;
        if let Some(ptr) = self.ptr {
            unsafe {
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(ptr.as_ptr(), len));
            }
        }
    }
}

impl<T: Clone> GrowableBuffer<T> {
    /// Append clones of all elements of `other`, leaving `other` untouched
    ///
    /// The receiver is reallocated to hold exactly both contents plus one
    /// block of slack. If either buffer is uninitialized the policy decides;
    /// if it continues, the receiver is left unchanged.
    #[track_caller]
    pub fn concat(&mut self, other: &GrowableBuffer<T>) {
        if let Err(err) = self.try_concat(other) {
            self.policy.raise(err);
        }
    }

    /// Fallible form of [`concat`](Self::concat)
    pub fn try_concat(&mut self, other: &GrowableBuffer<T>) -> Result<()> {
        self.ensure_initialized("concat")?;
        if !other.is_initialized() {
            return Err(ContainerError::invalid_container(
                "cannot concat a buffer that is not initialized",
            ));
        }

        let total = self
            .current
            .checked_add(other.current)
            .and_then(|n| n.checked_add(self.block_size))
            .ok_or_else(|| ContainerError::out_of_memory(usize::MAX))?;
        self.reallocate(total)?;
        self.recompute_shrink_at();

        for item in other.as_slice() {
            unsafe {
                ptr::write(self.data_ptr().add(self.current), item.clone());
            }
            self.current += 1;
        }
        Ok(())
    }
}

impl<T> Default for GrowableBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for GrowableBuffer<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T> Deref for GrowableBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T> DerefMut for GrowableBuffer<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<T> Index<usize> for GrowableBuffer<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.as_slice()[index]
    }
}

impl<T> IndexMut<usize> for GrowableBuffer<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.as_mut_slice()[index]
    }
}

impl<'a, T> IntoIterator for &'a GrowableBuffer<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for GrowableBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T: PartialEq> PartialEq for GrowableBuffer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for GrowableBuffer<T> {}

impl<T: Clone> Clone for GrowableBuffer<T> {
    fn clone(&self) -> Self {
        let config = BufferConfig::with_block_size(self.block_size);
        let mut cloned = Self::uninit_with_policy(config, self.policy.clone());
        if !self.is_initialized() {
            return cloned;
        }

        if let Err(err) = cloned.reallocate(self.capacity) {
            self.policy.raise(err);
            return cloned;
        }
        cloned.shrink_at = self.shrink_at;
        for item in self.as_slice() {
            unsafe {
                ptr::write(cloned.data_ptr().add(cloned.current), item.clone());
            }
            cloned.current += 1;
        }
        cloned
    }
}

// Safety: GrowableBuffer<T> owns its elements; the policy is Send + Sync
unsafe impl<T: Send> Send for GrowableBuffer<T> {}

// Safety: shared access only hands out &T
unsafe impl<T: Sync> Sync for GrowableBuffer<T> {}
