//! Indexed views over contiguous runs of elements in foreign memory.
//!
//! [`Array`] starts at a fixed address; [`Ptr`] starts wherever a pointer
//! slot currently points and re-reads that slot on every access. Both are
//! either sized (known element count) or unsized.
//!
//! Unlike the field descriptors, overlays never substitute defaults: a null
//! base fails with [`Error::NullPointer`] and read failures are returned.
//!
//! [`Container`] covers the begin/end pointer pair used by dynamic arrays.

mod array;
mod container;

pub use array::{Array, Ptr};
pub use container::Container;

use std::ops::{Bound, Range, RangeBounds};

use crate::error::{Error, Result};
use crate::memory::{Address, Primitive, ReadMemory, WriteMemory};

/// Shared behaviour of [`Array`] and [`Ptr`].
///
/// Implementors supply the memory, the current base and the optional count;
/// indexing, slicing and iteration are provided.
pub trait Overlay {
    type Memory: ReadMemory + ?Sized;
    type Element: Primitive;

    fn memory(&self) -> &Self::Memory;

    /// Current base address, never null
    fn base(&self) -> Result<Address>;

    /// Declared element count; `None` when unsized
    fn count(&self) -> Option<usize>;

    /// Address of element `index` (negative counts from the end)
    fn element_address(&self, index: isize) -> Result<Address> {
        let count = self.count();
        let index = resolve_index(index, count)?;
        offset_of::<Self::Element>(self.base()?, index, count)
    }

    /// Read exactly one element
    fn get(&self, index: isize) -> Result<Self::Element> {
        let address = self.element_address(index)?;
        Self::Element::read(self.memory(), address)
    }

    /// Write exactly one element
    fn set(&self, index: isize, value: Self::Element) -> Result<()>
    where
        Self::Memory: WriteMemory,
    {
        let address = self.element_address(index)?;
        Self::Element::write(self.memory(), address, value)
    }

    /// Read a range of elements in one request.
    ///
    /// Endpoints follow the usual half-open convention, negative endpoints
    /// count from the end and sized overlays clamp to `[0, count]`. An
    /// unbounded end needs a count.
    fn slice<R: RangeBounds<isize>>(&self, range: R) -> Result<Vec<Self::Element>> {
        let range = resolve_range(range, self.count())?;
        if range.is_empty() {
            return Ok(Vec::new());
        }
        let count = self.count();
        let address = offset_of::<Self::Element>(self.base()?, range.start, count)?;
        let size = range
            .len()
            .checked_mul(Self::Element::WIDTH)
            .ok_or_else(|| out_of_range(range.end, count))?;
        let bytes = self.memory().read_bytes(address, size)?;
        if bytes.len() != size {
            return Err(Error::MemoryReadFailed { address, size });
        }
        Ok(bytes
            .chunks_exact(Self::Element::WIDTH)
            .map(bytemuck::pod_read_unaligned)
            .collect())
    }

    /// Write `values` as consecutive elements starting at `start`
    fn write_slice(&self, start: isize, values: &[Self::Element]) -> Result<()>
    where
        Self::Memory: WriteMemory,
    {
        let count = self.count();
        let first = match (start, count) {
            // writing nothing at the end is fine
            (s, Some(len)) if s >= 0 && s as usize == len && values.is_empty() => len,
            (s, _) => resolve_index(s, count)?,
        };
        if let Some(len) = count {
            let end = first
                .checked_add(values.len())
                .ok_or_else(|| out_of_range(usize::MAX, count))?;
            if end > len {
                return Err(Error::IndexOutOfRange {
                    index: end as isize - 1,
                    len,
                });
            }
        }
        if values.is_empty() {
            return Ok(());
        }
        let address = offset_of::<Self::Element>(self.base()?, first, count)?;
        self.memory()
            .write_bytes(address, bytemuck::cast_slice(values))
    }

    /// Lazy sequence of elements.
    ///
    /// The base is resolved on the first item and kept for the whole walk,
    /// so a [`Ptr`] reseated mid-iteration does not mix two buffers. A base
    /// that cannot be resolved yields one error and ends the sequence.
    ///
    /// Sized overlays yield exactly `count` items. Unsized overlays never
    /// end on their own: the caller must stop (`take`, `take_while`, ...).
    fn iter(&self) -> Elements<'_, Self>
    where
        Self: Sized,
    {
        Elements {
            overlay: self,
            base: None,
            next: 0,
            end: self.count(),
            failed: false,
        }
    }
}

/// Iterator returned by [`Overlay::iter`]
pub struct Elements<'o, O> {
    overlay: &'o O,
    base: Option<Address>,
    next: usize,
    end: Option<usize>,
    failed: bool,
}

impl<O: Overlay> Iterator for Elements<'_, O> {
    type Item = Result<O::Element>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.end.is_some_and(|end| self.next >= end) {
            return None;
        }
        let base = match self.base {
            Some(base) => base,
            None => match self.overlay.base() {
                Ok(base) => *self.base.insert(base),
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            },
        };
        let index = self.next;
        self.next += 1;
        let read = offset_of::<O::Element>(base, index, self.end)
            .and_then(|address| O::Element::read(self.overlay.memory(), address));
        Some(read)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        match self.end {
            Some(end) => {
                let left = end.saturating_sub(self.next);
                (left, Some(left))
            }
            None => (usize::MAX, None),
        }
    }
}

fn out_of_range(index: usize, count: Option<usize>) -> Error {
    Error::IndexOutOfRange {
        index: isize::try_from(index).unwrap_or(isize::MAX),
        len: count.unwrap_or(usize::MAX),
    }
}

/// Address of element `index`; an offset that leaves the address space is out of range
fn offset_of<T: Primitive>(base: Address, index: usize, count: Option<usize>) -> Result<Address> {
    index
        .checked_mul(T::WIDTH)
        .and_then(|offset| base.checked_add(offset as u64))
        .ok_or_else(|| out_of_range(index, count))
}

fn signed_len(len: usize) -> isize {
    isize::try_from(len).unwrap_or(isize::MAX)
}

/// Normalize an element index against an optional count
fn resolve_index(index: isize, count: Option<usize>) -> Result<usize> {
    match count {
        Some(len) => {
            let resolved = if index < 0 {
                index + signed_len(len)
            } else {
                index
            };
            if resolved < 0 || resolved as usize >= len {
                return Err(Error::IndexOutOfRange { index, len });
            }
            Ok(resolved as usize)
        }
        None if index < 0 => Err(Error::Unsized),
        None => Ok(index as usize),
    }
}

/// Normalize a range against an optional count, clamping sized ranges
fn resolve_range<R: RangeBounds<isize>>(range: R, count: Option<usize>) -> Result<Range<usize>> {
    let from_end = |i: isize| -> Result<isize> {
        if i >= 0 {
            return Ok(i);
        }
        count.map(|len| signed_len(len) + i).ok_or(Error::Unsized)
    };
    // one past `i`; sized ranges are clamped below, so saturating is exact there
    let after = |i: isize| -> Result<isize> {
        match (i.checked_add(1), count) {
            (Some(next), _) => Ok(next),
            (None, Some(_)) => Ok(isize::MAX),
            (None, None) => Err(Error::IndexOutOfRange {
                index: i,
                len: usize::MAX,
            }),
        }
    };

    let start = match range.start_bound() {
        Bound::Included(&s) => from_end(s)?,
        Bound::Excluded(&s) => after(from_end(s)?)?,
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&e) => after(from_end(e)?)?,
        Bound::Excluded(&e) => from_end(e)?,
        Bound::Unbounded => signed_len(count.ok_or(Error::Unsized)?),
    };

    let upper = count.map_or(isize::MAX, signed_len);
    let start = start.clamp(0, upper);
    let end = end.clamp(start, upper.max(start));
    Ok(start as usize..end as usize)
}
