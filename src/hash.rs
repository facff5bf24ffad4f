//! Key bytes, the rolling hash and directory sizing.

use std::ffi::{CStr, CString};

/// Hash code cached alongside every entry.
pub type HashCode = u32;

/// Multiplier of the rolling hash.
pub const HASH_PRIME: HashCode = 47;

/// Occupancy ratio at which `put` grows the directory.
pub const LOAD_FACTOR: f64 = 0.75;

/// Smallest non-empty directory.
pub const MINIMUM_CAPACITY: usize = 1 << 4;

/// Largest directory; past this the table keeps chaining instead of growing.
pub const MAXIMUM_CAPACITY: usize = 1 << 31;

/// Growth always lands on a power of two strictly above `capacity + GROWTH_STEP`.
pub const GROWTH_STEP: usize = 4;

/// Byte view of a key. Equality and hashing only ever look at these bytes.
pub trait KeyBytes {
    fn key_bytes(&self) -> &[u8];
}

impl KeyBytes for str {
    #[inline]
    fn key_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl KeyBytes for [u8] {
    #[inline]
    fn key_bytes(&self) -> &[u8] {
        self
    }
}

/// The terminating NUL is not part of the key.
impl KeyBytes for CStr {
    #[inline]
    fn key_bytes(&self) -> &[u8] {
        self.to_bytes()
    }
}

impl KeyBytes for String {
    #[inline]
    fn key_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl KeyBytes for Vec<u8> {
    #[inline]
    fn key_bytes(&self) -> &[u8] {
        self
    }
}

impl KeyBytes for CString {
    #[inline]
    fn key_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<T: ?Sized + KeyBytes> KeyBytes for &T {
    #[inline]
    fn key_bytes(&self) -> &[u8] {
        (**self).key_bytes()
    }
}

/// `hash = 47 * hash + byte` over 32 bits, wrapping. The empty key hashes to 0.
#[inline]
pub fn hash_bytes(bytes: &[u8]) -> HashCode {
    bytes.iter().fold(0, |hash: HashCode, &b| {
        hash.wrapping_mul(HASH_PRIME).wrapping_add(HashCode::from(b))
    })
}

/// Slot index for `hash` in a directory of `capacity` slots (a power of two).
#[inline]
pub(crate) fn bucket_index(hash: HashCode, capacity: usize) -> usize {
    debug_assert!(capacity.is_power_of_two());
    (hash as usize) & (capacity - 1)
}

/// Directory size for a caller-supplied hint. Zero stays unallocated.
pub fn capacity_for(hint: usize) -> usize {
    if hint == 0 {
        return 0;
    }
    if hint > MAXIMUM_CAPACITY {
        return MAXIMUM_CAPACITY;
    }
    hint.next_power_of_two().max(MINIMUM_CAPACITY)
}

/// Capacity after one growth step from `current`. Returns `current` at the ceiling.
pub fn next_capacity(current: usize) -> usize {
    if current == 0 {
        return MINIMUM_CAPACITY;
    }
    match (current + GROWTH_STEP + 1).checked_next_power_of_two() {
        Some(n) if n <= MAXIMUM_CAPACITY => n,
        _ => MAXIMUM_CAPACITY.max(current),
    }
}

/// Whether `len` live entries have reached the growth threshold of `capacity`.
#[inline]
pub(crate) fn at_load_limit(len: usize, capacity: usize) -> bool {
    len as f64 >= capacity as f64 * LOAD_FACTOR
}
