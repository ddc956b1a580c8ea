//! Fallible allocation of fixed-size backing arrays.
//!
//! All pool storage is reserved once, up front, through this helper so that an
//! out-of-memory condition surfaces as [`NetBufError::AllocationFailed`]
//! instead of aborting the process.

use crate::error::{NetBufError, Result};

/// Allocate a boxed slice of `len` copies of `fill`.
///
/// `what` names the structure in the returned error.
pub(crate) fn try_alloc_slice<T: Clone>(
    what: &'static str,
    len: usize,
    fill: T,
) -> Result<Box<[T]>> {
    let mut storage = Vec::new();
    storage
        .try_reserve_exact(len)
        .map_err(|_| NetBufError::AllocationFailed {
            what,
            requested: len,
        })?;
    storage.resize(len, fill);
    Ok(storage.into_boxed_slice())
}
