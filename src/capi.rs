//! C ABI over `Table<'static, CStr, *mut c_void>`; see `include/strtab.h`.
//!
//! Keys and values stay owned by the C caller and must outlive the table.
//! A null key is accepted everywhere and behaves as "not found". Handles
//! must come from this module; a null table or iterator handle aborts.

use crate::cursor::Cursor;
use crate::table::Table;
use core::ffi::{c_char, c_int, c_void};
use core::ptr;
use std::ffi::CStr;

pub type RawTable = Table<'static, CStr, *mut c_void>;

/// Heap cursor handed out by `strtab_iterator`.
pub struct RawIterator(Cursor<'static, 'static, CStr, *mut c_void>);

unsafe fn table_ref<'a>(table: *const RawTable) -> &'a RawTable {
    match unsafe { table.as_ref() } {
        Some(t) => t,
        None => panic!("null table handle"),
    }
}

unsafe fn table_mut<'a>(table: *mut RawTable) -> &'a mut RawTable {
    match unsafe { table.as_mut() } {
        Some(t) => t,
        None => panic!("null table handle"),
    }
}

unsafe fn iterator_mut<'a>(iterator: *mut RawIterator) -> &'a mut RawIterator {
    match unsafe { iterator.as_mut() } {
        Some(it) => it,
        None => panic!("null iterator handle"),
    }
}

unsafe fn key_arg(key: *const c_char) -> Option<&'static CStr> {
    if key.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(key) })
    }
}

#[no_mangle]
pub extern "C" fn strtab_new() -> *mut RawTable {
    Box::into_raw(Box::new(Table::new()))
}

/// Returns null if the directory cannot be allocated.
#[no_mangle]
pub extern "C" fn strtab_with_capacity(hint: usize) -> *mut RawTable {
    match Table::try_with_capacity(hint) {
        Ok(table) => Box::into_raw(Box::new(table)),
        Err(err) => {
            log::warn!("strtab_with_capacity({hint}): {err}");
            ptr::null_mut()
        }
    }
}

/// # Safety
///
/// `table` must be a live handle from `strtab_new`/`strtab_with_capacity`.
#[no_mangle]
pub unsafe extern "C" fn strtab_size(table: *const RawTable) -> usize {
    unsafe { table_ref(table) }.len()
}

/// Non-zero when `strtab_get` would return non-null; a stored null value
/// is indistinguishable from absence.
///
/// # Safety
///
/// As for `strtab_get`.
#[no_mangle]
pub unsafe extern "C" fn strtab_contains(table: *const RawTable, key: *const c_char) -> c_int {
    c_int::from(!unsafe { strtab_get(table, key) }.is_null())
}

/// Returns the replaced value, or null for a new key or a null `key`.
///
/// # Safety
///
/// `table` must be a live handle with no live iterator. A non-null `key`
/// must be NUL-terminated and stay valid and unmodified until the table is
/// freed.
#[no_mangle]
pub unsafe extern "C" fn strtab_put(
    table: *mut RawTable,
    key: *const c_char,
    value: *mut c_void,
) -> *mut c_void {
    let table = unsafe { table_mut(table) };
    match unsafe { key_arg(key) } {
        Some(key) => table.put(key, value).unwrap_or(ptr::null_mut()),
        None => ptr::null_mut(),
    }
}

/// # Safety
///
/// `table` must be a live handle. A non-null `key` must be NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn strtab_get(table: *const RawTable, key: *const c_char) -> *mut c_void {
    let table = unsafe { table_ref(table) };
    unsafe { key_arg(key) }
        .and_then(|key| table.get(key).copied())
        .unwrap_or(ptr::null_mut())
}

/// The key pointer stored by the first put of an equal key.
///
/// # Safety
///
/// As for `strtab_get`.
#[no_mangle]
pub unsafe extern "C" fn strtab_get_key(
    table: *const RawTable,
    key: *const c_char,
) -> *const c_char {
    let table = unsafe { table_ref(table) };
    unsafe { key_arg(key) }
        .and_then(|key| table.get_key(key))
        .map_or(ptr::null(), CStr::as_ptr)
}

/// Frees the table's own storage. Keys and values are not touched.
///
/// # Safety
///
/// `table` must be null or a live handle with no live iterator; it is
/// dangling afterwards.
#[no_mangle]
pub unsafe extern "C" fn strtab_free(table: *mut RawTable) {
    if !table.is_null() {
        drop(unsafe { Box::from_raw(table) });
    }
}

/// # Safety
///
/// `table` must be a live handle and must not be mutated or freed while
/// the iterator is in use.
#[no_mangle]
pub unsafe extern "C" fn strtab_iterator(table: *const RawTable) -> *mut RawIterator {
    let table: &'static RawTable = unsafe { table_ref(table) };
    Box::into_raw(Box::new(RawIterator(table.cursor())))
}

/// # Safety
///
/// `iterator` must be a live handle from `strtab_iterator`.
#[no_mangle]
pub unsafe extern "C" fn strtab_next(iterator: *mut RawIterator) -> c_int {
    c_int::from(unsafe { iterator_mut(iterator) }.0.advance())
}

/// Aborts unless the last `strtab_next` returned non-zero.
///
/// # Safety
///
/// As for `strtab_next`.
#[no_mangle]
pub unsafe extern "C" fn strtab_key(iterator: *mut RawIterator) -> *const c_char {
    unsafe { iterator_mut(iterator) }.0.key().as_ptr()
}

/// Aborts unless the last `strtab_next` returned non-zero.
///
/// # Safety
///
/// As for `strtab_next`.
#[no_mangle]
pub unsafe extern "C" fn strtab_value(iterator: *mut RawIterator) -> *mut c_void {
    *unsafe { iterator_mut(iterator) }.0.value()
}

/// Frees the iterator only.
///
/// # Safety
///
/// `iterator` must be null or a live handle; it is dangling afterwards.
#[no_mangle]
pub unsafe extern "C" fn strtab_release_iterator(iterator: *mut RawIterator) {
    if !iterator.is_null() {
        drop(unsafe { Box::from_raw(iterator) });
    }
}
