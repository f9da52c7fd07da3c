//! Identity copy filter: `dst[i] = src[i]`, byte for byte.
//!
//! This is the filter the graph builder emits when `src_format == dst_format`
//! exactly (the "elision" case in the builder), and it is also the filter
//! the original conformance tests (scenarios S1-S4) hash directly.

use crate::buffer::ImageBuffer;
use crate::filter::{Filter, FilterFlags, Range};
use crate::format::ImageAttributes;
use crate::pixel::PixelType;

/// Copies one plane (or three, for `color`) unchanged, row by row.
#[derive(Debug, Clone, Copy)]
pub struct CopyFilter {
    width: usize,
    height: usize,
    pixel_type: PixelType,
    color: bool,
}

impl CopyFilter {
    pub fn new(width: usize, height: usize, pixel_type: PixelType, color: bool) -> Self {
        CopyFilter { width, height, pixel_type, color }
    }
}

impl Filter for CopyFilter {
    fn flags(&self) -> FilterFlags {
        FilterFlags {
            same_row: true,
            in_place: true,
            color: self.color,
            ..Default::default()
        }
    }

    fn image_attributes(&self) -> ImageAttributes {
        ImageAttributes { width: self.width, height: self.height, pixel_type: self.pixel_type }
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
        let bpp = self.pixel_type.pixel_size();
        let byte_lo = left * bpp;
        let byte_hi = right * bpp;
        let planes = src.planes.len();
        for p in 0..planes {
            let s = &src.planes[p].row(i)[byte_lo..byte_hi];
            let d = &mut dst.planes[p].row_mut(i)[byte_lo..byte_hi];
            d.copy_from_slice(s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{PlaneBuffer, ALL_ONES};

    #[test]
    fn copies_one_row() {
        let f = CopyFilter::new(4, 1, PixelType::Byte, false);
        let mut src_plane = PlaneBuffer::new(1, 4, ALL_ONES).unwrap();
        src_plane.row_mut(0).copy_from_slice(&[1, 2, 3, 4]);
        let src = ImageBuffer::new(vec![src_plane]);

        let dst_plane = PlaneBuffer::new(1, 4, ALL_ONES).unwrap();
        let mut dst = ImageBuffer::new(vec![dst_plane]);

        f.process(&mut [], &src, &mut dst, &mut [], 0, 0, 4);
        assert_eq!(dst.planes[0].row(0), &[1, 2, 3, 4]);
    }
}
