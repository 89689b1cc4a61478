//! Aligned growable byte buffer backing the owning blob types.
//!
//! `Vec<u8>` only guarantees byte alignment, which is not enough to
//! reinterpret a stored image as its concrete structure type. This buffer
//! allocates in 16-byte cells so any catalogue structure (pointer-aligned or
//! wider) can legally start at offset 0, and tracks its logical length in
//! bytes separately from the cell storage.

use std::slice;

const CELL_SIZE: usize = 16;

#[repr(C, align(16))]
#[derive(Debug, Clone, Copy)]
struct Cell([u8; CELL_SIZE]);

/// A contiguous byte buffer whose base address is 16-byte aligned.
///
/// Invariant: `cells.len() * CELL_SIZE >= len` at all times.
#[derive(Debug, Clone, Default)]
pub(crate) struct AlignedBytes {
    cells: Vec<Cell>,
    len: usize,
}

impl AlignedBytes {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn as_ptr(&self) -> *const u8 {
        self.cells.as_ptr().cast()
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut u8 {
        self.cells.as_mut_ptr().cast()
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(self.as_ptr(), self.len) }
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        unsafe { slice::from_raw_parts_mut(self.as_mut_ptr(), self.len) }
    }

    /// Appends `data`, growing the cell storage as needed. Newly covered
    /// trailing bytes in the last cell stay zeroed.
    pub(crate) fn extend_from_slice(&mut self, data: &[u8]) {
        let start = self.len;
        let new_len = start + data.len();
        self.cells.resize(new_len.div_ceil(CELL_SIZE), Cell([0; CELL_SIZE]));
        self.len = new_len;
        self.as_mut_slice()[start..].copy_from_slice(data);
    }

    /// Shortens the buffer to `new_len` bytes. No-op if already shorter.
    pub(crate) fn truncate(&mut self, new_len: usize) {
        if new_len < self.len {
            self.len = new_len;
            self.cells.truncate(new_len.div_ceil(CELL_SIZE));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_empty() {
        let buf = AlignedBytes::new();
        assert_eq!(buf.len(), 0);
        assert!(buf.is_empty());
        assert!(buf.as_slice().is_empty());
    }

    #[test]
    fn base_is_sixteen_byte_aligned() {
        let mut buf = AlignedBytes::new();
        buf.extend_from_slice(&[1, 2, 3]);
        assert_eq!(buf.as_ptr() as usize % 16, 0);
    }

    #[test]
    fn extend_appends_bytes_in_order() {
        let mut buf = AlignedBytes::new();
        buf.extend_from_slice(b"hello ");
        buf.extend_from_slice(b"world");
        assert_eq!(buf.as_slice(), b"hello world");
        assert_eq!(buf.len(), 11);
    }

    #[test]
    fn extend_across_cell_boundary() {
        let mut buf = AlignedBytes::new();
        buf.extend_from_slice(&[0xAB; 24]);
        buf.extend_from_slice(&[0xCD; 24]);
        assert_eq!(&buf.as_slice()[..24], &[0xAB; 24]);
        assert_eq!(&buf.as_slice()[24..], &[0xCD; 24]);
    }

    #[test]
    fn truncate_shortens() {
        let mut buf = AlignedBytes::new();
        buf.extend_from_slice(&[7; 40]);
        buf.truncate(24);
        assert_eq!(buf.len(), 24);
        assert_eq!(buf.as_slice(), &[7; 24]);
    }

    #[test]
    fn truncate_to_larger_size_is_noop() {
        let mut buf = AlignedBytes::new();
        buf.extend_from_slice(&[7; 8]);
        buf.truncate(100);
        assert_eq!(buf.len(), 8);
    }

    #[test]
    fn clone_is_deep() {
        let mut buf = AlignedBytes::new();
        buf.extend_from_slice(&[1, 2, 3, 4]);
        let copy = buf.clone();
        buf.as_mut_slice()[0] = 9;
        assert_eq!(copy.as_slice(), &[1, 2, 3, 4]);
        assert_ne!(buf.as_ptr(), copy.as_ptr());
    }
}
