//! Horizontal and vertical resample filters.
//!
//! Kernel shapes follow the same `support()`/`weight()` split as
//! `vfx_ops::resize::Filter`, generalized from that crate's four kernels
//! (Nearest/Bilinear/Bicubic/Lanczos3) to the six the graph builder's
//! parameters name (point/bilinear/bicubic/spline16/spline36/lanczos), and
//! from a single-pass random-access resize to the two streaming,
//! row-windowed filters the scheduler drives.
//!
//! `filter_param_a`/`filter_param_b` shape the kernel (Bicubic's B/C,
//! Lanczos's lobe count); a `NaN` parameter means "use this kernel's
//! default", resolved independently per parameter (the spec's Open
//! Question, decided in DESIGN.md).

use crate::buffer::ImageBuffer;
use crate::filter::{Filter, FilterFlags, Range};
use crate::format::{ImageAttributes, ResampleFilter as ResampleKind};
use crate::pixel::PixelType;

/// Resolved kernel: shape plus its two (possibly defaulted) shape parameters.
#[derive(Debug, Clone, Copy)]
pub struct Kernel {
    pub kind: ResampleKind,
    pub param_a: f32,
    pub param_b: f32,
}

impl Kernel {
    pub fn new(kind: ResampleKind, param_a: f32, param_b: f32) -> Self {
        let (default_a, default_b) = match kind {
            ResampleKind::Bicubic => (1.0 / 3.0, 1.0 / 3.0), // Mitchell-Netravali
            ResampleKind::Lanczos => (3.0, 0.0),
            _ => (0.0, 0.0),
        };
        Kernel {
            kind,
            param_a: if param_a.is_nan() { default_a } else { param_a },
            param_b: if param_b.is_nan() { default_b } else { param_b },
        }
    }

    /// Filter support radius: the kernel is nonzero only within `[-support, support]`.
    pub fn support(&self) -> f32 {
        match self.kind {
            ResampleKind::Point => 0.5,
            ResampleKind::Bilinear => 1.0,
            ResampleKind::Bicubic => 2.0,
            ResampleKind::Spline16 => 2.0,
            ResampleKind::Spline36 => 3.0,
            ResampleKind::Lanczos => self.param_a.max(1.0),
        }
    }

    /// Kernel weight at distance `x` from the sample center.
    pub fn weight(&self, x: f32) -> f32 {
        let x = x.abs();
        match self.kind {
            ResampleKind::Point => {
                if x < 0.5 { 1.0 } else { 0.0 }
            }
            ResampleKind::Bilinear => (1.0 - x).max(0.0),
            ResampleKind::Bicubic => bicubic_weight(x, self.param_a, self.param_b),
            ResampleKind::Spline16 => spline16_weight(x),
            ResampleKind::Spline36 => spline36_weight(x),
            ResampleKind::Lanczos => lanczos_weight(x, self.param_a),
        }
    }
}

fn bicubic_weight(x: f32, b: f32, c: f32) -> f32 {
    if x < 1.0 {
        ((12.0 - 9.0 * b - 6.0 * c) * x.powi(3)
            + (-18.0 + 12.0 * b + 6.0 * c) * x.powi(2)
            + (6.0 - 2.0 * b))
            / 6.0
    } else if x < 2.0 {
        ((-b - 6.0 * c) * x.powi(3)
            + (6.0 * b + 30.0 * c) * x.powi(2)
            + (-12.0 * b - 48.0 * c) * x
            + (8.0 * b + 24.0 * c))
            / 6.0
    } else {
        0.0
    }
}

fn spline16_weight(x: f32) -> f32 {
    if x < 1.0 {
        ((x - 9.0 / 5.0) * x - 1.0 / 5.0) * x + 1.0
    } else if x < 2.0 {
        ((-1.0 / 3.0 * (x - 1.0) + 4.0 / 5.0) * (x - 1.0) - 7.0 / 15.0) * (x - 1.0)
    } else {
        0.0
    }
}

fn spline36_weight(x: f32) -> f32 {
    if x < 1.0 {
        ((13.0 / 11.0 * x - 453.0 / 209.0) * x - 3.0 / 209.0) * x + 1.0
    } else if x < 2.0 {
        ((-6.0 / 11.0 * (x - 1.0) + 270.0 / 209.0) * (x - 1.0) - 156.0 / 209.0) * (x - 1.0)
    } else if x < 3.0 {
        ((1.0 / 11.0 * (x - 2.0) - 45.0 / 209.0) * (x - 2.0) + 26.0 / 209.0) * (x - 2.0)
    } else {
        0.0
    }
}

fn sinc(x: f32) -> f32 {
    if x.abs() < 1e-8 {
        1.0
    } else {
        (std::f32::consts::PI * x).sin() / (std::f32::consts::PI * x)
    }
}

fn lanczos_weight(x: f32, lobes: f32) -> f32 {
    if x < lobes { sinc(x) * sinc(x / lobes) } else { 0.0 }
}

/// Horizontal resample: changes width, leaves height and plane count alone.
/// Sets `entire_row` since every output column may depend on any input
/// column; `same_row` since it never reaches into neighboring rows.
#[derive(Debug, Clone)]
pub struct ResizeHorizontal {
    src_width: usize,
    height: usize,
    dst_width: usize,
    pixel_type: PixelType,
    kernel: Kernel,
    color: bool,
}

impl ResizeHorizontal {
    pub fn new(
        src_width: usize,
        height: usize,
        dst_width: usize,
        pixel_type: PixelType,
        kernel: Kernel,
        color: bool,
    ) -> Self {
        ResizeHorizontal { src_width, height, dst_width, pixel_type, kernel, color }
    }

    fn sample_center(&self, dst_col: usize) -> f32 {
        let scale = self.src_width as f32 / self.dst_width as f32;
        (dst_col as f32 + 0.5) * scale - 0.5
    }
}

impl Filter for ResizeHorizontal {
    fn flags(&self) -> FilterFlags {
        FilterFlags { same_row: true, entire_row: true, color: self.color, ..Default::default() }
    }

    fn image_attributes(&self) -> ImageAttributes {
        ImageAttributes { width: self.dst_width, height: self.height, pixel_type: self.pixel_type }
    }

    fn required_row_range(&self, i: usize) -> Range {
        Range::new(i, i + 1)
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
        let support = self.kernel.support();
        let planes = src.planes.len();
        for p in 0..planes {
            let src_row = src.planes[p].row(i).to_vec();
            let dst_row = dst.planes[p].row_mut(i);
            for dc in left..right {
                let center = self.sample_center(dc);
                let lo = ((center - support).floor() as isize).max(0) as usize;
                let hi = (((center + support).ceil() as isize) + 1)
                    .clamp(0, self.src_width as isize) as usize;
                let mut acc = 0.0f32;
                let mut wsum = 0.0f32;
                for sc in lo..hi {
                    let w = self.kernel.weight(sc as f32 - center);
                    let v = super::depth_read(&src_row, sc, self.pixel_type);
                    acc += w * v;
                    wsum += w;
                }
                let v = if wsum > 0.0 { acc / wsum } else { 0.0 };
                super::depth_write(dst_row, dc, self.pixel_type, v);
            }
        }
    }
}

/// Vertical resample: changes height, leaves width and plane count alone.
/// `max_buffering` is the kernel support window; the scheduler therefore
/// needs that many source rows resident to produce any output row.
#[derive(Debug, Clone)]
pub struct ResizeVertical {
    width: usize,
    src_height: usize,
    dst_height: usize,
    pixel_type: PixelType,
    kernel: Kernel,
    color: bool,
}

impl ResizeVertical {
    pub fn new(
        width: usize,
        src_height: usize,
        dst_height: usize,
        pixel_type: PixelType,
        kernel: Kernel,
        color: bool,
    ) -> Self {
        ResizeVertical { width, src_height, dst_height, pixel_type, kernel, color }
    }

    fn sample_center(&self, dst_row: usize) -> f32 {
        let scale = self.src_height as f32 / self.dst_height as f32;
        (dst_row as f32 + 0.5) * scale - 0.5
    }

    fn row_window(&self, i: usize) -> Range {
        let support = self.kernel.support();
        let center = self.sample_center(i);
        let lo = ((center - support).floor() as isize).max(0) as usize;
        let hi = (((center + support).ceil() as isize) + 1)
            .clamp(0, self.src_height as isize) as usize;
        Range::new(lo, hi.max(lo + 1).min(self.src_height))
    }
}

impl Filter for ResizeVertical {
    fn flags(&self) -> FilterFlags {
        FilterFlags { color: self.color, ..Default::default() }
    }

    fn image_attributes(&self) -> ImageAttributes {
        ImageAttributes { width: self.width, height: self.dst_height, pixel_type: self.pixel_type }
    }

    fn max_buffering(&self) -> usize {
        // Support window plus one for rounding slack; at least 2 so
        // consecutive output rows can overlap their read windows.
        (self.kernel.support().ceil() as usize) * 2 + 2
    }

    fn required_row_range(&self, i: usize) -> Range {
        self.row_window(i)
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
        let center = self.sample_center(i);
        let window = self.row_window(i);
        let planes = src.planes.len();
        for p in 0..planes {
            let rows: Vec<Vec<u8>> =
                (window.lo..window.hi).map(|r| src.planes[p].row(r).to_vec()).collect();
            let dst_row = dst.planes[p].row_mut(i);
            for c in left..right {
                let mut acc = 0.0f32;
                let mut wsum = 0.0f32;
                for (k, r) in (window.lo..window.hi).enumerate() {
                    let w = self.kernel.weight(r as f32 - center);
                    let v = super::depth_read(&rows[k], c, self.pixel_type);
                    acc += w * v;
                    wsum += w;
                }
                let v = if wsum > 0.0 { acc / wsum } else { 0.0 };
                super::depth_write(dst_row, c, self.pixel_type, v);
            }
        }
    }
}
