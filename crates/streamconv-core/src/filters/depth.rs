//! Depth widen/narrow filter: converts between pixel storage types,
//! preserving normalized range. Rounding, dithering and studio/full-range
//! remapping arithmetic are the out-of-scope "numerical kernel" the spec
//! delegates to an external specification; this filter performs the
//! simplest correct operation (linear rescale through the normalized
//! `[0, 1]` working representation) so that depth-changing chains are
//! exercisable end to end.

use crate::buffer::ImageBuffer;
use crate::filter::{Filter, FilterFlags, Range};
use crate::format::ImageAttributes;
use crate::pixel::PixelType;

use super::{depth_read as read_sample, depth_write as write_sample};

/// Converts a plane from `src_type` to `dst_type`.
#[derive(Debug, Clone, Copy)]
pub struct DepthConvertFilter {
    width: usize,
    height: usize,
    src_type: PixelType,
    dst_type: PixelType,
    color: bool,
}

impl DepthConvertFilter {
    pub fn new(
        width: usize,
        height: usize,
        src_type: PixelType,
        dst_type: PixelType,
        color: bool,
    ) -> Self {
        DepthConvertFilter { width, height, src_type, dst_type, color }
    }

    fn convert_row(&self, src: &[u8], dst: &mut [u8], left: usize, right: usize) {
        // Read through to f32, then write back out; every concrete Sample
        // impl round-trips through to_f32/from_f32 identically regardless
        // of the source/destination pairing.
        for col in left..right {
            let v = read_sample(src, col, self.src_type);
            write_sample(dst, col, self.dst_type, v);
        }
    }
}

impl Filter for DepthConvertFilter {
    fn flags(&self) -> FilterFlags {
        FilterFlags { same_row: true, color: self.color, ..Default::default() }
    }

    fn image_attributes(&self) -> ImageAttributes {
        ImageAttributes { width: self.width, height: self.height, pixel_type: self.dst_type }
    }

    fn required_row_range(&self, i: usize) -> Range {
        Range::new(i, i + 1)
    }

    fn process(
        &self,
        _ctx: &mut [u8],
        src: &ImageBuffer,
        dst: &mut ImageBuffer,
        _tmp: &mut [u8],
        i: usize,
        left: usize,
        right: usize,
    ) {
        let planes = src.planes.len();
        for p in 0..planes {
            let src_row = src.planes[p].row(i).to_vec();
            let dst_row = dst.planes[p].row_mut(i);
            self.convert_row(&src_row, dst_row, left, right);
        }
    }
}
