//! Color-matrix filter: applies a fixed 3x3 transform jointly across three
//! planes (YUV<->RGB, or an identity placeholder when matrix coefficients
//! agree on both sides of the graph).
//!
//! Real coefficient tables (BT.709/BT.601/BT.2020 row-vector matrices, studio-
//! range offsets) are the out-of-scope "numerical kernel"; this filter always
//! carries a concrete `[[f32; 3]; 3]` plus a per-channel offset so the graph
//! builder can still wire a working, hashable transform end to end, and the
//! ITU coefficient math can be dropped in without touching flags or windows.

use crate::buffer::ImageBuffer;
use crate::filter::{Filter, FilterFlags, Range};
use crate::format::ImageAttributes;
use crate::pixel::PixelType;

use super::{depth_read, depth_write};

/// A 3x3 matrix plus additive offset, applied per pixel as `m * (r,g,b) + o`.
#[derive(Debug, Clone, Copy)]
pub struct Matrix3 {
    pub rows: [[f32; 3]; 3],
    pub offset: [f32; 3],
}

impl Matrix3 {
    /// The identity transform (no-op placeholder for matrix-agreeing paths).
    pub fn identity() -> Self {
        Matrix3 {
            rows: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            offset: [0.0, 0.0, 0.0],
        }
    }

    fn apply(&self, v: [f32; 3]) -> [f32; 3] {
        let mut out = [0.0f32; 3];
        for (r, row) in self.rows.iter().enumerate() {
            out[r] = row[0] * v[0] + row[1] * v[1] + row[2] * v[2] + self.offset[r];
        }
        out
    }
}

/// Joint three-plane color-matrix transform. Always `same_row` (per-pixel),
/// never `entire_row` (no column neighborhood needed).
#[derive(Debug, Clone, Copy)]
pub struct ColorMatrixFilter {
    width: usize,
    height: usize,
    pixel_type: PixelType,
    matrix: Matrix3,
}

impl ColorMatrixFilter {
    pub fn new(width: usize, height: usize, pixel_type: PixelType, matrix: Matrix3) -> Self {
        ColorMatrixFilter { width, height, pixel_type, matrix }
    }
}

impl Filter for ColorMatrixFilter {
    fn flags(&self) -> FilterFlags {
        FilterFlags { same_row: true, color: true, ..Default::default() }
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
        let rows: [Vec<u8>; 3] = [
            src.planes[0].row(i).to_vec(),
            src.planes[1].row(i).to_vec(),
            src.planes[2].row(i).to_vec(),
        ];
        let (dst0, rest) = dst.planes.split_at_mut(1);
        let (dst1, dst2) = rest.split_at_mut(1);
        let dst_rows = [dst0[0].row_mut(i), dst1[0].row_mut(i), dst2[0].row_mut(i)];
        let mut dst_rows = dst_rows;
        for c in left..right {
            let v = [
                depth_read(&rows[0], c, self.pixel_type),
                depth_read(&rows[1], c, self.pixel_type),
                depth_read(&rows[2], c, self.pixel_type),
            ];
            let out = self.matrix.apply(v);
            for p in 0..3 {
                depth_write(dst_rows[p], c, self.pixel_type, out[p]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{PlaneBuffer, ALL_ONES};

    fn plane_with(values: &[f32]) -> PlaneBuffer {
        let mut p = PlaneBuffer::new(1, values.len() * 4, ALL_ONES).unwrap();
        let row = p.row_mut(0);
        for (i, v) in values.iter().enumerate() {
            row[i * 4..i * 4 + 4].copy_from_slice(&v.to_ne_bytes());
        }
        p
    }

    #[test]
    fn identity_matrix_passes_through() {
        let f = ColorMatrixFilter::new(2, 1, PixelType::Float, Matrix3::identity());
        let src = ImageBuffer::new(vec![
            plane_with(&[0.1, 0.2]),
            plane_with(&[0.3, 0.4]),
            plane_with(&[0.5, 0.6]),
        ]);
        let mut dst = ImageBuffer::new(vec![
            PlaneBuffer::new(1, 8, ALL_ONES).unwrap(),
            PlaneBuffer::new(1, 8, ALL_ONES).unwrap(),
            PlaneBuffer::new(1, 8, ALL_ONES).unwrap(),
        ]);
        f.process(&mut [], &src, &mut dst, &mut [], 0, 0, 2);
        let row = dst.planes[0].row(0);
        let v0 = f32::from_ne_bytes([row[0], row[1], row[2], row[3]]);
        assert!((v0 - 0.1).abs() < 1e-6);
    }
}
