//! strtab: a single-threaded hash table from borrowed byte-string keys to
//! values, usable from Rust and, through `capi`, from C.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small associative container for symbol tables, caches and
//!   interning maps, where keys already live somewhere else and the table
//!   only points at them.
//! - Layers:
//!   - `hash`: the `KeyBytes` view of a key, the 32-bit rolling hash
//!     (`h = 47 * h + byte`, wrapping) and directory sizing rules.
//!   - `Table<'k, K, V>`: power-of-two directory of slots; collisions chain
//!     through a `SlotMap` arena of links. Keys are `&'k K`, values are
//!     owned.
//!   - `Cursor`/`Iter`/`IntoIter`: directory-order traversal, explicit or
//!     as std iterators; `IntoIter` hands owned values back.
//!   - `capi`: `extern "C"` functions over `Table<'static, CStr, *mut c_void>`.
//!
//! Constraints
//! - No removal of single entries. Dropping the table (or draining it)
//!   is the only way entries go away.
//! - The borrow checker stands in for the ownership contract: keys must
//!   outlive the table, and a live cursor freezes the table.
//! - O(1) average put/get. Growth happens inside `put` once
//!   `len >= capacity * 0.75`, and is checked on every put.
//!
//! Hash and rehash invariants
//! - Each entry caches its `u32` hash; rehashing uses only cached hashes.
//! - Key equality is cached hash first, then byte equality.
//! - Capacity is zero or a power of two in `16..=2^31`; slot index is
//!   `hash & (capacity - 1)`.
//!
//! Allocation failure
//! - Growth inside `put` degrades to chaining in the current directory
//!   when the new directory cannot be allocated, and logs a warning.
//! - `try_with_capacity` and `try_reserve` surface `TableError` instead.
//!
//! Non-goals
//! - Thread safety beyond what the borrow rules already give.
//! - Ordered iteration: the only promise is every live entry exactly once.

pub mod capi;
mod cursor;
mod error;
pub mod hash;
mod table;
mod table_proptest;

// Public surface
pub use cursor::{Cursor, IntoIter, Iter};
pub use error::TableError;
pub use hash::{hash_bytes, HashCode, KeyBytes};
pub use table::Table;
