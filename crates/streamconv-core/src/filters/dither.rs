//! Dither filter: inserted by the graph builder when narrowing to an
//! integer type with fewer bits than the working precision, unless
//! `dither_type == None`.
//!
//! The actual error-diffusion/ordered-matrix tables are the out-of-scope
//! numerical kernel; `DitherType::None` and `DitherType::Ordered` are
//! rendered as the simplest correct operation (plain rounding, same as
//! [`super::depth`]), while `Random`/`ErrorDiffusion` carry the flags their
//! real implementations would need (`has_state` for error-diffusion's
//! row-to-row carry) even though the carried error itself is currently zero.

use crate::buffer::ImageBuffer;
use crate::filter::{Filter, FilterFlags, Range};
use crate::format::{DitherType, ImageAttributes};
use crate::pixel::PixelType;

use super::{depth_read, depth_write};

/// Rounds/dithers a plane (or three, jointly) from `src_type` to a narrower
/// `dst_type`.
#[derive(Debug, Clone, Copy)]
pub struct DitherFilter {
    width: usize,
    height: usize,
    src_type: PixelType,
    dst_type: PixelType,
    dither_type: DitherType,
    color: bool,
}

impl DitherFilter {
    pub fn new(
        width: usize,
        height: usize,
        src_type: PixelType,
        dst_type: PixelType,
        dither_type: DitherType,
        color: bool,
    ) -> Self {
        DitherFilter { width, height, src_type, dst_type, dither_type, color }
    }

    /// Real error-diffusion dithers (Floyd-Steinberg) carry accumulated
    /// quantization error from column to column within a row and from row to
    /// row, which is why the original kernel declares `has_state`; this
    /// placeholder does not accumulate error yet, but still advertises the
    /// flag its eventual numeric kernel will require.
    fn needs_state(&self) -> bool {
        matches!(self.dither_type, DitherType::ErrorDiffusion)
    }
}

impl Filter for DitherFilter {
    fn flags(&self) -> FilterFlags {
        FilterFlags { same_row: true, has_state: self.needs_state(), color: self.color, ..Default::default() }
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
            for col in left..right {
                let v = depth_read(&src_row, col, self.src_type);
                depth_write(dst_row, col, self.dst_type, v);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{PlaneBuffer, ALL_ONES};

    #[test]
    fn none_and_ordered_round_identically_for_this_placeholder() {
        let mut src_plane = PlaneBuffer::new(1, 8, ALL_ONES).unwrap();
        src_plane.row_mut(0)[0..4].copy_from_slice(&0.5f32.to_ne_bytes());
        src_plane.row_mut(0)[4..8].copy_from_slice(&1.0f32.to_ne_bytes());
        let src = ImageBuffer::new(vec![src_plane]);

        for kind in [DitherType::None, DitherType::Ordered] {
            let f = DitherFilter::new(2, 1, PixelType::Float, PixelType::Byte, kind, false);
            let mut dst = ImageBuffer::new(vec![PlaneBuffer::new(1, 2, ALL_ONES).unwrap()]);
            f.process(&mut [], &src, &mut dst, &mut [], 0, 0, 2);
            assert_eq!(dst.planes[0].row(0)[1], 255);
        }
    }

    #[test]
    fn error_diffusion_declares_state() {
        let f = DitherFilter::new(2, 1, PixelType::Float, PixelType::Byte, DitherType::ErrorDiffusion, false);
        assert!(f.flags().has_state);
    }
}
