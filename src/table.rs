//! Table: power-of-two directory of slots with per-slot overflow chains.
//!
//! Each slot holds at most one entry inline. Further entries whose hash lands
//! on the same slot live in a `SlotMap` arena and are linked from the slot
//! entry through `next`. Every entry caches its hash code; rehashing never
//! looks at key bytes again.

use crate::cursor::{Cursor, Iter};
use crate::error::TableError;
use crate::hash::{
    at_load_limit, bucket_index, capacity_for, hash_bytes, next_capacity, HashCode, KeyBytes,
    LOAD_FACTOR, MAXIMUM_CAPACITY,
};
use core::fmt;
use core::mem;
use slotmap::{new_key_type, SlotMap};
use std::alloc::{handle_alloc_error, Layout};

new_key_type! {
    /// Arena key of a chain link.
    pub(crate) struct LinkKey;
}

#[derive(Debug)]
pub(crate) struct Entry<'k, K: ?Sized, V> {
    pub(crate) key: &'k K,
    pub(crate) value: V,
    pub(crate) hash: HashCode,
    pub(crate) next: Option<LinkKey>,
}

impl<'k, K: ?Sized + KeyBytes, V> Entry<'k, K, V> {
    #[inline]
    fn matches(&self, hash: HashCode, bytes: &[u8]) -> bool {
        self.hash == hash && self.key.key_bytes() == bytes
    }
}

pub(crate) type Slot<'k, K, V> = Option<Entry<'k, K, V>>;

/// Where an entry lives: inline in a directory slot or in the chain arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Location {
    Slot(usize),
    Link(LinkKey),
}

/// Hash table from borrowed byte-string keys to owned values.
///
/// Keys are borrowed for `'k` and never copied; [`Table::get_key`] hands back
/// the stored reference, which makes the table usable as an interner. Values
/// are moved in by [`Table::put`] and handed back when replaced, or all at
/// once by draining the table with `into_iter`.
///
/// ```
/// use strtab::Table;
///
/// let mut t = Table::new();
/// assert_eq!(t.put("a", 1), None);
/// assert_eq!(t.put("a", 2), Some(1));
/// assert_eq!(t.get("a"), Some(&2));
/// assert_eq!(t.len(), 1);
/// ```
pub struct Table<'k, K: ?Sized, V> {
    pub(crate) directory: Vec<Slot<'k, K, V>>,
    pub(crate) links: SlotMap<LinkKey, Entry<'k, K, V>>,
    len: usize,
}

impl<'k, K: ?Sized, V> Table<'k, K, V> {
    /// Empty table. Nothing is allocated until the first `put`.
    pub fn new() -> Self {
        Self {
            directory: Vec::new(),
            links: SlotMap::with_key(),
            len: 0,
        }
    }

    /// Table with a directory of `capacity_for(hint)` slots allocated up front.
    ///
    /// Allocation failure is reported through [`handle_alloc_error`]; use
    /// [`Table::try_with_capacity`] to get an error instead.
    pub fn with_capacity(hint: usize) -> Self {
        match Self::try_with_capacity(hint) {
            Ok(table) => table,
            Err(TableError::AllocFailed { slots, .. }) => Self::alloc_failure(slots),
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_with_capacity(hint: usize) -> Result<Self, TableError> {
        let mut table = Self::new();
        let slots = capacity_for(hint);
        if slots > 0 {
            table.resize_to(slots)?;
        }
        Ok(table)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of directory slots: zero or a power of two.
    pub fn capacity(&self) -> usize {
        self.directory.len()
    }

    /// Explicit cursor positioned before the first entry.
    pub fn cursor(&self) -> Cursor<'_, 'k, K, V> {
        Cursor::new(self)
    }

    /// Iterator over `(key, value)` in directory order.
    pub fn iter(&self) -> Iter<'_, 'k, K, V> {
        Iter::new(self)
    }

    pub(crate) fn into_parts(
        self,
    ) -> (Vec<Slot<'k, K, V>>, SlotMap<LinkKey, Entry<'k, K, V>>) {
        (self.directory, self.links)
    }

    pub(crate) fn entry_at(&self, at: Location) -> Option<&Entry<'k, K, V>> {
        match at {
            Location::Slot(index) => self.directory.get(index).and_then(Option::as_ref),
            Location::Link(link) => self.links.get(link),
        }
    }

    fn entry_at_mut(&mut self, at: Location) -> Option<&mut Entry<'k, K, V>> {
        match at {
            Location::Slot(index) => self.directory.get_mut(index).and_then(Option::as_mut),
            Location::Link(link) => self.links.get_mut(link),
        }
    }

    /// Moves every entry into a fresh directory of `target` slots, using
    /// cached hashes. On allocation failure the table is left untouched.
    fn resize_to(&mut self, target: usize) -> Result<(), TableError> {
        debug_assert!(target.is_power_of_two() && target <= MAXIMUM_CAPACITY);
        let mut directory: Vec<Slot<'k, K, V>> = Vec::new();
        directory
            .try_reserve_exact(target)
            .map_err(|source| TableError::AllocFailed {
                slots: target,
                source,
            })?;
        directory.resize_with(target, || None);

        log::debug!(
            "growing directory from {} to {} slots ({} entries)",
            self.capacity(),
            target,
            self.len
        );

        let old_directory = mem::replace(&mut self.directory, directory);
        let links = SlotMap::with_capacity_and_key(self.links.len());
        let mut old_links = mem::replace(&mut self.links, links);

        for head in old_directory.into_iter().flatten() {
            let mut chain = head.next;
            Self::relink(&mut self.directory, &mut self.links, head);
            while let Some(entry) = chain.and_then(|link| old_links.remove(link)) {
                chain = entry.next;
                Self::relink(&mut self.directory, &mut self.links, entry);
            }
        }
        debug_assert!(old_links.is_empty());
        Ok(())
    }

    /// Pushes `entry` at the head of its slot's chain. Keys are known distinct.
    fn relink(
        directory: &mut [Slot<'k, K, V>],
        links: &mut SlotMap<LinkKey, Entry<'k, K, V>>,
        mut entry: Entry<'k, K, V>,
    ) {
        let slot = &mut directory[bucket_index(entry.hash, directory.len())];
        entry.next = slot.take().map(|head| links.insert(head));
        *slot = Some(entry);
    }

    /// One growth step for `put`. Failure degrades to chaining in the
    /// current directory; with no directory at all there is nothing to
    /// degrade to.
    fn grow(&mut self) {
        let current = self.capacity();
        let target = next_capacity(current);
        if target == current {
            log::trace!("directory at maximum capacity {current}; not growing");
            return;
        }
        if let Err(err) = self.resize_to(target) {
            if self.directory.is_empty() {
                Self::alloc_failure(target);
            }
            log::warn!("skipping directory growth: {err}");
        }
    }

    fn alloc_failure(slots: usize) -> ! {
        match Layout::array::<Slot<'k, K, V>>(slots) {
            Ok(layout) => handle_alloc_error(layout),
            Err(_) => panic!("directory of {slots} slots overflows the address space"),
        }
    }
}

impl<'k, K: ?Sized + KeyBytes, V> Table<'k, K, V> {
    /// Inserts or updates `key`. Returns the previous value if the key was
    /// present; the stored key reference is kept in that case.
    ///
    /// The directory grows first whenever `len() >= capacity() * 0.75`,
    /// including when `key` turns out to be present already.
    pub fn put(&mut self, key: &'k K, value: V) -> Option<V> {
        if at_load_limit(self.len, self.capacity()) {
            self.grow();
        }
        let entry = Entry {
            key,
            value,
            hash: hash_bytes(key.key_bytes()),
            next: None,
        };
        let previous = Self::place(&mut self.directory, &mut self.links, entry);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Grows so that the next `additional` puts will not trigger growth.
    /// On error the table is unchanged.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TableError> {
        if additional == 0 {
            return Ok(());
        }
        let needed = self
            .len
            .checked_add(additional)
            .ok_or(TableError::CapacityOverflow {
                requested: usize::MAX,
            })?;
        let slots = (needed as f64 / LOAD_FACTOR).ceil() as usize;
        if slots > MAXIMUM_CAPACITY {
            return Err(TableError::CapacityOverflow { requested: needed });
        }
        let target = capacity_for(slots);
        if target <= self.capacity() {
            return Ok(());
        }
        self.resize_to(target)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: ?Sized + KeyBytes,
    {
        let at = self.locate(key)?;
        self.entry_at(at).map(|e| &e.value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: ?Sized + KeyBytes,
    {
        let at = self.locate(key)?;
        self.entry_at_mut(at).map(|e| &mut e.value)
    }

    /// The key reference stored by the first `put` of an equal key.
    pub fn get_key<Q>(&self, key: &Q) -> Option<&'k K>
    where
        Q: ?Sized + KeyBytes,
    {
        let at = self.locate(key)?;
        self.entry_at(at).map(|e| e.key)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&'k K, &V)>
    where
        Q: ?Sized + KeyBytes,
    {
        let at = self.locate(key)?;
        self.entry_at(at).map(|e| (e.key, &e.value))
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized + KeyBytes,
    {
        self.locate(key).is_some()
    }

    /// Finds the entry for `key`. An empty table answers without hashing.
    fn locate<Q>(&self, key: &Q) -> Option<Location>
    where
        Q: ?Sized + KeyBytes,
    {
        if self.len == 0 {
            return None;
        }
        let bytes = key.key_bytes();
        let hash = hash_bytes(bytes);
        let index = bucket_index(hash, self.capacity());
        let mut entry = self.directory[index].as_ref()?;
        if entry.matches(hash, bytes) {
            return Some(Location::Slot(index));
        }
        while let Some(link) = entry.next {
            entry = &self.links[link];
            if entry.matches(hash, bytes) {
                return Some(Location::Link(link));
            }
        }
        None
    }

    /// Stores `incoming` in its slot or chain. Returns the replaced value
    /// when an equal key is already present, `None` when a new entry was added.
    fn place(
        directory: &mut [Slot<'k, K, V>],
        links: &mut SlotMap<LinkKey, Entry<'k, K, V>>,
        incoming: Entry<'k, K, V>,
    ) -> Option<V> {
        let slot = &mut directory[bucket_index(incoming.hash, directory.len())];
        let head = match slot {
            Some(head) => head,
            None => {
                *slot = Some(incoming);
                return None;
            }
        };
        let bytes = incoming.key.key_bytes();
        if head.matches(incoming.hash, bytes) {
            return Some(mem::replace(&mut head.value, incoming.value));
        }

        let mut tail = None;
        let mut cursor = head.next;
        while let Some(link) = cursor {
            let entry = &mut links[link];
            if entry.matches(incoming.hash, bytes) {
                return Some(mem::replace(&mut entry.value, incoming.value));
            }
            tail = Some(link);
            cursor = entry.next;
        }

        let link = links.insert(incoming);
        match tail {
            Some(tail) => links[tail].next = Some(link),
            None => head.next = Some(link),
        }
        None
    }
}

impl<'k, K: ?Sized, V> Default for Table<'k, K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'k, K: ?Sized + fmt::Debug, V: fmt::Debug> fmt::Debug for Table<'k, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'k, K: ?Sized + KeyBytes, V> Extend<(&'k K, V)> for Table<'k, K, V> {
    fn extend<I: IntoIterator<Item = (&'k K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<'k, K: ?Sized + KeyBytes, V> FromIterator<(&'k K, V)> for Table<'k, K, V> {
    fn from_iter<I: IntoIterator<Item = (&'k K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}
