//! Opaque-handle C boundary over [`archive_memindex::ArchiveIndex`].
//!
//! Handles are heap pointers created by [`indexer_create`] and released
//! by [`indexer_destroy`]; no handle ever escapes the process. Lookup
//! functions return `-1` for absent entries, add functions return `false`
//! on a hash48 conflict, and query results are returned as an owned
//! [`I64List`] the caller must pass back to [`i64_list_destroy`].

use std::os::raw::c_void;

use archive_memindex::{ArchiveIndex, TxOffsetsQuery};

/// Owned list of 64-bit offsets handed across the boundary.
///
/// `vec_ptr` is the owning allocation, `data`/`size` describe its
/// contents. Release with [`i64_list_destroy`].
#[repr(C)]
pub struct I64List {
    pub vec_ptr: *mut c_void,
    pub data: *const i64,
    pub size: usize,
}

impl I64List {
    fn empty() -> Self {
        I64List {
            vec_ptr: std::ptr::null_mut(),
            data: std::ptr::null(),
            size: 0,
        }
    }

    fn from_vec(offsets: Vec<i64>) -> Self {
        let boxed = Box::new(offsets);
        let data = boxed.as_ptr();
        let size = boxed.len();
        I64List {
            vec_ptr: Box::into_raw(boxed) as *mut c_void,
            data,
            size,
        }
    }
}

/// Query arguments as passed across the boundary.
#[repr(C)]
pub struct TxOffsetsQueryC {
    /// 48-bit address identifier; 0 means no address criterion.
    pub addr_hash: u64,
    /// Pointer to `topic_count` 48-bit topic identifiers; may be null
    /// when `topic_count` is 0.
    pub topic_hashes: *const u64,
    pub topic_count: u32,
    pub start_height: u32,
    pub end_height: u32,
}

/// Allocate an empty index and return its handle.
#[no_mangle]
pub extern "C" fn indexer_create() -> *mut ArchiveIndex {
    Box::into_raw(Box::new(ArchiveIndex::new()))
}

/// # Safety
/// `handle` must come from [`indexer_create`] and must not be used again
/// after this call.
#[no_mangle]
pub unsafe extern "C" fn indexer_destroy(handle: *mut ArchiveIndex) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// # Safety
/// `handle` must be a live pointer from [`indexer_create`].
#[no_mangle]
pub unsafe extern "C" fn indexer_add_block(
    handle: *mut ArchiveIndex,
    height: u32,
    hash48: u64,
    offset40: i64,
) -> bool {
    (*handle).add_block(height, hash48, offset40).is_ok()
}

/// # Safety
/// `handle` must be a live pointer from [`indexer_create`].
#[no_mangle]
pub unsafe extern "C" fn indexer_erase_block(handle: *mut ArchiveIndex, height: u32, hash48: u64) {
    (*handle).erase_block(height, hash48);
}

/// # Safety
/// `handle` must be a live pointer from [`indexer_create`].
#[no_mangle]
pub unsafe extern "C" fn indexer_offset_by_block_height(
    handle: *mut ArchiveIndex,
    height: u32,
) -> i64 {
    (*handle)
        .offset_by_block_height(height)
        .map_or(-1, |off| off as i64)
}

/// # Safety
/// `handle` must be a live pointer from [`indexer_create`].
#[no_mangle]
pub unsafe extern "C" fn indexer_offset_by_block_hash(
    handle: *mut ArchiveIndex,
    hash48: u64,
) -> i64 {
    (*handle)
        .offset_by_block_hash(hash48)
        .map_or(-1, |off| off as i64)
}

/// # Safety
/// `handle` must be a live pointer from [`indexer_create`].
#[no_mangle]
pub unsafe extern "C" fn indexer_add_tx(
    handle: *mut ArchiveIndex,
    id56: u64,
    hash48: u64,
    offset40: i64,
) -> bool {
    (*handle).add_tx(id56, hash48, offset40).is_ok()
}

/// # Safety
/// `handle` must be a live pointer from [`indexer_create`].
#[no_mangle]
pub unsafe extern "C" fn indexer_erase_tx(handle: *mut ArchiveIndex, id56: u64, hash48: u64) {
    (*handle).erase_tx(id56, hash48);
}

/// # Safety
/// `handle` must be a live pointer from [`indexer_create`].
#[no_mangle]
pub unsafe extern "C" fn indexer_offset_by_tx_id(handle: *mut ArchiveIndex, id56: u64) -> i64 {
    (*handle).offset_by_tx_id(id56).map_or(-1, |off| off as i64)
}

/// # Safety
/// `handle` must be a live pointer from [`indexer_create`].
#[no_mangle]
pub unsafe extern "C" fn indexer_offset_by_tx_hash(handle: *mut ArchiveIndex, hash48: u64) -> i64 {
    (*handle)
        .offset_by_tx_hash(hash48)
        .map_or(-1, |off| off as i64)
}

/// # Safety
/// `handle` must be a live pointer from [`indexer_create`]; `indices`
/// must point to `index_count` readable u32 values (or be null with
/// `index_count` 0).
#[no_mangle]
pub unsafe extern "C" fn indexer_add_addr2log(
    handle: *mut ArchiveIndex,
    hash48: u64,
    height: u32,
    indices: *const u32,
    index_count: usize,
) {
    let indices = slice_or_empty(indices, index_count);
    let _ = (*handle).add_addr2log(hash48, height, indices);
}

/// # Safety
/// `handle` must be a live pointer from [`indexer_create`].
#[no_mangle]
pub unsafe extern "C" fn indexer_erase_addr2log(
    handle: *mut ArchiveIndex,
    hash48: u64,
    height: u32,
) {
    (*handle).erase_addr2log(hash48, height);
}

/// # Safety
/// Same contract as [`indexer_add_addr2log`].
#[no_mangle]
pub unsafe extern "C" fn indexer_add_topic2log(
    handle: *mut ArchiveIndex,
    hash48: u64,
    height: u32,
    indices: *const u32,
    index_count: usize,
) {
    let indices = slice_or_empty(indices, index_count);
    let _ = (*handle).add_topic2log(hash48, height, indices);
}

/// # Safety
/// `handle` must be a live pointer from [`indexer_create`].
#[no_mangle]
pub unsafe extern "C" fn indexer_erase_topic2log(
    handle: *mut ArchiveIndex,
    hash48: u64,
    height: u32,
) {
    (*handle).erase_topic2log(hash48, height);
}

/// # Safety
/// `handle` must be a live pointer from [`indexer_create`];
/// `query.topic_hashes` must point to `query.topic_count` readable u64
/// values (or be null with a count of 0).
#[no_mangle]
pub unsafe extern "C" fn indexer_query_tx_offsets(
    handle: *mut ArchiveIndex,
    query: TxOffsetsQueryC,
) -> I64List {
    let topics = slice_or_empty(query.topic_hashes, query.topic_count as usize);
    let query = TxOffsetsQuery {
        addr_hash: query.addr_hash,
        topic_hashes: topics.to_vec(),
        start_height: query.start_height,
        end_height: query.end_height,
    };
    if query.addr_hash == 0 && query.topic_hashes.is_empty() {
        return I64List::empty();
    }
    I64List::from_vec((*handle).query_tx_offsets(&query))
}

/// # Safety
/// `list` must come from [`indexer_query_tx_offsets`] and must not be
/// used again after this call.
#[no_mangle]
pub unsafe extern "C" fn i64_list_destroy(list: I64List) {
    if !list.vec_ptr.is_null() {
        drop(Box::from_raw(list.vec_ptr as *mut Vec<i64>));
    }
}

unsafe fn slice_or_empty<'a, T>(data: *const T, len: usize) -> &'a [T] {
    if data.is_null() || len == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(data, len)
    }
}
