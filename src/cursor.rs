//! Traversal of a `Table` in directory order.
//!
//! `Cursor` is the explicit form: `advance` moves to the next entry and the
//! caller reads `key`/`value` at the current position. `Iter` wraps a cursor
//! as a std iterator and `IntoIter` drains the table, handing every value
//! back. Order is directory order, then chain order within a slot.

use crate::table::{Entry, LinkKey, Location, Slot, Table};
use core::iter::FusedIterator;
use slotmap::SlotMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Position {
    Unstarted,
    At(Location),
    Exhausted,
}

/// Cursor over a borrowed table. The borrow rules out mutation while it lives.
pub struct Cursor<'t, 'k, K: ?Sized, V> {
    table: &'t Table<'k, K, V>,
    position: Position,
    // next directory index to scan once the current chain runs out
    next_slot: usize,
}

impl<'t, 'k, K: ?Sized, V> Cursor<'t, 'k, K, V> {
    pub(crate) fn new(table: &'t Table<'k, K, V>) -> Self {
        Self {
            table,
            position: Position::Unstarted,
            next_slot: 0,
        }
    }

    fn current(&self) -> Option<&'t Entry<'k, K, V>> {
        match self.position {
            Position::At(at) => self.table.entry_at(at),
            Position::Unstarted | Position::Exhausted => None,
        }
    }

    /// Moves to the next entry. Returns `false` once the table is exhausted,
    /// and keeps returning `false` afterwards.
    pub fn advance(&mut self) -> bool {
        if let Some(link) = self.current().and_then(|e| e.next) {
            self.position = Position::At(Location::Link(link));
            return true;
        }
        let directory = &self.table.directory;
        while self.next_slot < directory.len() {
            let index = self.next_slot;
            self.next_slot += 1;
            if directory[index].is_some() {
                self.position = Position::At(Location::Slot(index));
                return true;
            }
        }
        self.position = Position::Exhausted;
        false
    }

    /// Current entry, or `None` before the first `advance` and after exhaustion.
    pub fn entry(&self) -> Option<(&'k K, &'t V)> {
        self.current().map(|e| (e.key, &e.value))
    }

    /// Key at the current position.
    ///
    /// # Panics
    ///
    /// If the last `advance` did not return `true`.
    pub fn key(&self) -> &'k K {
        match self.current() {
            Some(e) => e.key,
            None => panic!("cursor is not positioned on an entry"),
        }
    }

    /// Value at the current position.
    ///
    /// # Panics
    ///
    /// If the last `advance` did not return `true`.
    pub fn value(&self) -> &'t V {
        match self.current() {
            Some(e) => &e.value,
            None => panic!("cursor is not positioned on an entry"),
        }
    }
}

/// Iterator over `(key, value)` pairs of a borrowed table.
pub struct Iter<'t, 'k, K: ?Sized, V> {
    cursor: Cursor<'t, 'k, K, V>,
    remaining: usize,
}

impl<'t, 'k, K: ?Sized, V> Iter<'t, 'k, K, V> {
    pub(crate) fn new(table: &'t Table<'k, K, V>) -> Self {
        Self {
            cursor: Cursor::new(table),
            remaining: table.len(),
        }
    }
}

impl<'t, 'k, K: ?Sized, V> Iterator for Iter<'t, 'k, K, V> {
    type Item = (&'k K, &'t V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if !self.cursor.advance() {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        self.cursor.entry()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'t, 'k, K: ?Sized, V> ExactSizeIterator for Iter<'t, 'k, K, V> {}
impl<'t, 'k, K: ?Sized, V> FusedIterator for Iter<'t, 'k, K, V> {}

impl<'t, 'k, K: ?Sized, V> IntoIterator for &'t Table<'k, K, V> {
    type Item = (&'k K, &'t V);
    type IntoIter = Iter<'t, 'k, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Draining iterator: yields every key with its owned value.
pub struct IntoIter<'k, K: ?Sized, V> {
    directory: std::vec::IntoIter<Slot<'k, K, V>>,
    links: SlotMap<LinkKey, Entry<'k, K, V>>,
    chain: Option<LinkKey>,
    remaining: usize,
}

impl<'k, K: ?Sized, V> Iterator for IntoIter<'k, K, V> {
    type Item = (&'k K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = match self.chain.take().and_then(|link| self.links.remove(link)) {
            Some(entry) => entry,
            None => self.directory.by_ref().flatten().next()?,
        };
        self.chain = entry.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some((entry.key, entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'k, K: ?Sized, V> ExactSizeIterator for IntoIter<'k, K, V> {}
impl<'k, K: ?Sized, V> FusedIterator for IntoIter<'k, K, V> {}

impl<'k, K: ?Sized, V> IntoIterator for Table<'k, K, V> {
    type Item = (&'k K, V);
    type IntoIter = IntoIter<'k, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let remaining = self.len();
        let (directory, links) = self.into_parts();
        IntoIter {
            directory: directory.into_iter(),
            links,
            chain: None,
            remaining,
        }
    }
}
