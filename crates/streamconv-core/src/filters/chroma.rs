//! Chroma up/downsample filter: resamples the two chroma planes between a
//! subsampled grid and 4:4:4, honoring chroma siting.
//!
//! Shares its kernel shapes with [`super::resize`] (the graph builder's
//! `resample_filter_uv` parameter selects the same six kernels), but is
//! scoped to exactly the chroma pair (never luma) and folds the horizontal
//! and vertical resample into one filter instance, since both axes of a
//! 4:2:0 plane typically change together.

use crate::buffer::ImageBuffer;
use crate::filter::{Filter, FilterFlags, Range};
use crate::format::{ChromaLocation, ImageAttributes, ResampleFilter as ResampleKind};
use crate::pixel::PixelType;

use super::resize::Kernel;
use super::{depth_read, depth_write};

/// Siting-derived sub-pixel offset, in source-grid units, applied to the
/// destination sample center before resampling. Convention: `Left`-family
/// sitings align chroma with an even-numbered luma/source sample
/// horizontally; `Center`/mid sitings split the difference. Vertically,
/// `Top`-family sitings align with the first row of the pair being merged;
/// the MPEG-2 default (`Left`/`Center`) sites vertically at the midpoint.
fn siting_offset(loc: ChromaLocation) -> (f32, f32) {
    match loc {
        ChromaLocation::Left => (0.0, 0.5),
        ChromaLocation::Center => (0.5, 0.5),
        ChromaLocation::TopLeft => (0.0, 0.0),
        ChromaLocation::Top => (0.5, 0.0),
        ChromaLocation::BottomLeft => (0.0, 1.0),
        ChromaLocation::Bottom => (0.5, 1.0),
    }
}

/// Resamples a chroma plane pair from `(src_width, src_height)` to
/// `(dst_width, dst_height)`. Used for both upsampling (toward 4:4:4) and
/// downsampling (toward the destination's subsampling), distinguished only
/// by which of src/dst is the subsampled side.
#[derive(Debug, Clone)]
pub struct ChromaResampleFilter {
    src_width: usize,
    src_height: usize,
    dst_width: usize,
    dst_height: usize,
    pixel_type: PixelType,
    kernel: Kernel,
    h_offset: f32,
    v_offset: f32,
}

impl ChromaResampleFilter {
    pub fn new(
        src_width: usize,
        src_height: usize,
        dst_width: usize,
        dst_height: usize,
        pixel_type: PixelType,
        kernel_kind: ResampleKind,
        param_a: f32,
        param_b: f32,
        siting: ChromaLocation,
    ) -> Self {
        let (h_offset, v_offset) = siting_offset(siting);
        ChromaResampleFilter {
            src_width,
            src_height,
            dst_width,
            dst_height,
            pixel_type,
            kernel: Kernel::new(kernel_kind, param_a, param_b),
            h_offset,
            v_offset,
        }
    }

    fn center_h(&self, dst_col: usize) -> f32 {
        let scale = self.src_width as f32 / self.dst_width as f32;
        (dst_col as f32 + 0.5) * scale - 0.5 + self.h_offset * (scale - 1.0)
    }

    fn center_v(&self, dst_row: usize) -> f32 {
        let scale = self.src_height as f32 / self.dst_height as f32;
        (dst_row as f32 + 0.5) * scale - 0.5 + self.v_offset * (scale - 1.0)
    }

    fn window_v(&self, i: usize) -> Range {
        let support = self.kernel.support();
        let center = self.center_v(i);
        let lo = ((center - support).floor() as isize).max(0) as usize;
        let hi = (((center + support).ceil() as isize) + 1)
            .clamp(0, self.src_height as isize) as usize;
        Range::new(lo, hi.max(lo + 1).min(self.src_height))
    }

    /// Horizontally resamples one source row into a `dst_width`-wide buffer
    /// of normalized `f32` samples.
    fn resample_row_h(&self, row: &[u8]) -> Vec<f32> {
        let support = self.kernel.support();
        (0..self.dst_width)
            .map(|dc| {
                let center = self.center_h(dc);
                let lo = ((center - support).floor() as isize).max(0) as usize;
                let hi = (((center + support).ceil() as isize) + 1)
                    .clamp(0, self.src_width as isize) as usize;
                let mut acc = 0.0f32;
                let mut wsum = 0.0f32;
                for sc in lo..hi {
                    let w = self.kernel.weight(sc as f32 - center);
                    acc += w * depth_read(row, sc, self.pixel_type);
                    wsum += w;
                }
                if wsum > 0.0 { acc / wsum } else { 0.0 }
            })
            .collect()
    }
}

impl Filter for ChromaResampleFilter {
    fn flags(&self) -> FilterFlags {
        FilterFlags { entire_row: true, color: true, ..Default::default() }
    }

    fn image_attributes(&self) -> ImageAttributes {
        ImageAttributes { width: self.dst_width, height: self.dst_height, pixel_type: self.pixel_type }
    }

    fn max_buffering(&self) -> usize {
        (self.kernel.support().ceil() as usize) * 2 + 2
    }

    fn required_row_range(&self, i: usize) -> Range {
        self.window_v(i)
    }

    fn required_col_range(&self, _left: usize, _right: usize) -> Range {
        Range::new(0, self.src_width)
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
        let center = self.center_v(i);
        let window = self.window_v(i);
        for p in 0..2 {
            let h_resampled: Vec<Vec<f32>> =
                (window.lo..window.hi).map(|r| self.resample_row_h(src.planes[p].row(r))).collect();
            let dst_row = dst.planes[p].row_mut(i);
            for c in left..right {
                let mut acc = 0.0f32;
                let mut wsum = 0.0f32;
                for (k, r) in (window.lo..window.hi).enumerate() {
                    let w = self.kernel.weight(r as f32 - center);
                    acc += w * h_resampled[k][c];
                    wsum += w;
                }
                let v = if wsum > 0.0 { acc / wsum } else { 0.0 };
                depth_write(dst_row, c, self.pixel_type, v);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{PlaneBuffer, ALL_ONES};

    #[test]
    fn upsamples_chroma_pair_to_requested_dims() {
        let f = ChromaResampleFilter::new(
            2,
            2,
            4,
            4,
            PixelType::Float,
            ResampleKind::Bilinear,
            f32::NAN,
            f32::NAN,
            ChromaLocation::Left,
        );
        assert_eq!(f.image_attributes().width, 4);
        assert_eq!(f.image_attributes().height, 4);
        assert!(f.flags().entire_row);
        assert!(f.flags().color);

        let mut u = PlaneBuffer::new(2, 8, ALL_ONES).unwrap();
        let mut v = PlaneBuffer::new(2, 8, ALL_ONES).unwrap();
        for r in 0..2 {
            for c in 0..2 {
                let val = (r * 2 + c) as f32 * 0.1;
                u.row_mut(r)[c * 4..c * 4 + 4].copy_from_slice(&val.to_ne_bytes());
                v.row_mut(r)[c * 4..c * 4 + 4].copy_from_slice(&val.to_ne_bytes());
            }
        }
        let src = ImageBuffer::new(vec![u, v]);
        let mut dst = ImageBuffer::new(vec![
            PlaneBuffer::new(4, 16, ALL_ONES).unwrap(),
            PlaneBuffer::new(4, 16, ALL_ONES).unwrap(),
        ]);
        for i in 0..4 {
            f.process(&mut [], &src, &mut dst, &mut [], i, 0, 4);
        }
        // No NaNs, every destination row was written.
        for r in 0..4 {
            let row = dst.planes[0].row(r);
            for c in 0..4 {
                let bytes = [row[c * 4], row[c * 4 + 1], row[c * 4 + 2], row[c * 4 + 3]];
                assert!(f32::from_ne_bytes(bytes).is_finite());
            }
        }
    }
}
