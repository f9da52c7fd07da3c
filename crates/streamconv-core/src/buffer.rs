//! Ring-addressed plane storage.
//!
//! A [`PlaneBuffer`] stores `mask + 1` most-recently-produced rows of one
//! plane; row `i` lives at slot `i & mask`. `mask` is either one less than a
//! power of two, or [`ALL_ONES`], meaning "the entire plane is resident and
//! addressed directly by row index with no wraparound".

use crate::error::{Error, Result};

/// Sentinel mask denoting a full-plane (non-wrapping) buffer.
pub const ALL_ONES: usize = usize::MAX;

/// Returns the smallest mask `m` (one less than a power of two, or
/// [`ALL_ONES`]) such that `m + 1 >= count`.
///
/// Ported from the original `select_zimg_buffer_mask` bit trick: a filter
/// declaring `max_buffering() == count` needs a ring that can hold `count`
/// simultaneous rows, and the cheapest addressable ring size is the next
/// power of two.
pub fn select_buffer_mask(count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    if count > (usize::MAX / 2 + 1) {
        // A count this large cannot be rounded up to a power of two that
        // still fits in a usize; treat it as "buffer the entire plane".
        return ALL_ONES;
    }
    count.next_power_of_two() - 1
}

/// A single plane's row-addressable storage.
///
/// Rows are stored contiguously; row `i` occupies
/// `data[(i & mask) * stride .. (i & mask) * stride + row_bytes]`.
#[derive(Debug, Clone)]
pub struct PlaneBuffer {
    data: Vec<u8>,
    /// Stride between consecutive resident rows, in bytes.
    stride: usize,
    /// Row index mask; `ALL_ONES` for full-plane buffers.
    mask: usize,
    /// Bytes actually carrying pixel data within each row (<= stride).
    row_bytes: usize,
    /// Height of the plane this buffer backs, for full-plane sizing.
    height: usize,
}

/// Platform alignment floor for row buffers and scratch, per the resource
/// model (rings and scratch are aligned to at least 64 bytes).
pub const ALIGNMENT: usize = 64;

fn aligned_stride(row_bytes: usize) -> usize {
    row_bytes.div_ceil(ALIGNMENT) * ALIGNMENT
}

impl PlaneBuffer {
    /// Allocates a buffer for `height` logical rows of `row_bytes` each,
    /// sized for a ring of `mask + 1` resident rows (or the full plane when
    /// `mask == ALL_ONES`).
    pub fn new(height: usize, row_bytes: usize, mask: usize) -> Result<Self> {
        let stride = aligned_stride(row_bytes);
        let resident_rows = if mask == ALL_ONES { height } else { mask + 1 };
        let total = stride
            .checked_mul(resident_rows)
            .ok_or_else(|| Error::NumericOverflow {
                message: "plane buffer size overflow".into(),
            })?;
        Ok(PlaneBuffer {
            data: vec![0u8; total],
            stride,
            mask,
            row_bytes,
            height,
        })
    }

    /// Row stride in bytes.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Row index mask (`ALL_ONES` for full-plane buffers).
    pub fn mask(&self) -> usize {
        self.mask
    }

    /// Number of simultaneously resident rows (`mask + 1`, or `height` when
    /// full-plane).
    pub fn resident_rows(&self) -> usize {
        if self.mask == ALL_ONES { self.height } else { self.mask + 1 }
    }

    fn slot(&self, row: usize) -> usize {
        if self.mask == ALL_ONES { row } else { row & self.mask }
    }

    /// Immutable view of logical row `row`.
    pub fn row(&self, row: usize) -> &[u8] {
        let slot = self.slot(row);
        let start = slot * self.stride;
        &self.data[start..start + self.row_bytes]
    }

    /// Mutable view of logical row `row`.
    pub fn row_mut(&mut self, row: usize) -> &mut [u8] {
        let slot = self.slot(row);
        let start = slot * self.stride;
        &mut self.data[start..start + self.row_bytes]
    }

    /// Fills every byte of the backing storage with `pattern` (used by the
    /// conformance harness to paint a guard pattern before a `process` call).
    pub fn fill(&mut self, pattern: u8) {
        self.data.fill(pattern);
    }

    /// Raw backing storage, for guard-byte auditing.
    pub fn raw(&self) -> &[u8] {
        &self.data
    }
}

/// Up to three [`PlaneBuffer`]s addressed together; color filters use all
/// three, luma-only filters use only plane 0.
#[derive(Debug, Clone, Default)]
pub struct ImageBuffer {
    pub planes: Vec<PlaneBuffer>,
}

impl ImageBuffer {
    pub fn new(planes: Vec<PlaneBuffer>) -> Self {
        ImageBuffer { planes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_selection_rounds_up_to_pow2_minus_one() {
        assert_eq!(select_buffer_mask(1), 0);
        assert_eq!(select_buffer_mask(2), 1);
        assert_eq!(select_buffer_mask(3), 3);
        assert_eq!(select_buffer_mask(4), 3);
        assert_eq!(select_buffer_mask(5), 7);
        assert_eq!(select_buffer_mask(8), 7);
        assert_eq!(select_buffer_mask(9), 15);
    }

    #[test]
    fn ring_addressing_wraps() {
        let mut buf = PlaneBuffer::new(100, 4, 3).unwrap(); // mask=3 -> 4 rows resident
        buf.row_mut(0).copy_from_slice(&[1, 2, 3, 4]);
        buf.row_mut(4).copy_from_slice(&[9, 9, 9, 9]); // overwrites slot 0
        assert_eq!(buf.row(0), &[9, 9, 9, 9]);
        assert_eq!(buf.row(4), &[9, 9, 9, 9]);
    }

    #[test]
    fn full_plane_buffer_never_wraps() {
        let mut buf = PlaneBuffer::new(4, 4, ALL_ONES).unwrap();
        for i in 0..4 {
            buf.row_mut(i).copy_from_slice(&[i as u8; 4]);
        }
        for i in 0..4 {
            assert_eq!(buf.row(i), &[i as u8; 4]);
        }
    }
}
