//! Built-in filter kinds and the closed tagged-variant dispatch over them.
//!
//! The source expresses filters via a class hierarchy; this crate encodes
//! the same abstraction as a tagged enum over the known filter kinds, the
//! direct generalization of `vfx_color::pipeline::TransformOp` (a tagged
//! enum over single-pixel color operations dispatched through
//! `Pipeline::apply`) to row-window streaming `process`. The conformance
//! harness and the scheduler both consume only the [`Filter`] capability
//! interface, never a concrete variant.

pub mod chroma;
pub mod copy;
pub mod depth;
pub mod dither;
pub mod matrix;
pub mod resize;

use half::f16;

use crate::buffer::ImageBuffer;
use crate::filter::{Filter, FilterFlags, Range};
use crate::format::ImageAttributes;
use crate::pixel::{PixelType, Sample};

pub(crate) fn depth_read(row: &[u8], col: usize, ty: PixelType) -> f32 {
    match ty {
        PixelType::Byte => row[col].to_f32(),
        PixelType::Word => {
            let bytes = [row[col * 2], row[col * 2 + 1]];
            u16::from_ne_bytes(bytes).to_f32()
        }
        PixelType::Half => {
            let bytes = [row[col * 2], row[col * 2 + 1]];
            f16::from_ne_bytes(bytes).to_f32()
        }
        PixelType::Float => {
            let bytes = [row[col * 4], row[col * 4 + 1], row[col * 4 + 2], row[col * 4 + 3]];
            f32::from_ne_bytes(bytes)
        }
    }
}

pub(crate) fn depth_write(row: &mut [u8], col: usize, ty: PixelType, v: f32) {
    match ty {
        PixelType::Byte => row[col] = u8::from_f32(v),
        PixelType::Word => {
            let s = u16::from_f32(v);
            row[col * 2..col * 2 + 2].copy_from_slice(&s.to_ne_bytes());
        }
        PixelType::Half => {
            let s = f16::from_f32(v);
            row[col * 2..col * 2 + 2].copy_from_slice(&s.to_ne_bytes());
        }
        PixelType::Float => {
            row[col * 4..col * 4 + 4].copy_from_slice(&v.to_ne_bytes());
        }
    }
}

/// The closed set of filter kinds the graph builder can instantiate.
#[derive(Debug, Clone)]
pub enum FilterKind {
    Copy(copy::CopyFilter),
    DepthConvert(depth::DepthConvertFilter),
    ResizeHorizontal(resize::ResizeHorizontal),
    ResizeVertical(resize::ResizeVertical),
    ColorMatrix(matrix::ColorMatrixFilter),
    ChromaUpsample(chroma::ChromaResampleFilter),
    ChromaDownsample(chroma::ChromaResampleFilter),
    Dither(dither::DitherFilter),
}

impl Filter for FilterKind {
    fn flags(&self) -> FilterFlags {
        match self {
            FilterKind::Copy(f) => f.flags(),
            FilterKind::DepthConvert(f) => f.flags(),
            FilterKind::ResizeHorizontal(f) => f.flags(),
            FilterKind::ResizeVertical(f) => f.flags(),
            FilterKind::ColorMatrix(f) => f.flags(),
            FilterKind::ChromaUpsample(f) => f.flags(),
            FilterKind::ChromaDownsample(f) => f.flags(),
            FilterKind::Dither(f) => f.flags(),
        }
    }

    fn image_attributes(&self) -> ImageAttributes {
        match self {
            FilterKind::Copy(f) => f.image_attributes(),
            FilterKind::DepthConvert(f) => f.image_attributes(),
            FilterKind::ResizeHorizontal(f) => f.image_attributes(),
            FilterKind::ResizeVertical(f) => f.image_attributes(),
            FilterKind::ColorMatrix(f) => f.image_attributes(),
            FilterKind::ChromaUpsample(f) => f.image_attributes(),
            FilterKind::ChromaDownsample(f) => f.image_attributes(),
            FilterKind::Dither(f) => f.image_attributes(),
        }
    }

    fn simultaneous_lines(&self) -> usize {
        match self {
            FilterKind::Copy(f) => f.simultaneous_lines(),
            FilterKind::DepthConvert(f) => f.simultaneous_lines(),
            FilterKind::ResizeHorizontal(f) => f.simultaneous_lines(),
            FilterKind::ResizeVertical(f) => f.simultaneous_lines(),
            FilterKind::ColorMatrix(f) => f.simultaneous_lines(),
            FilterKind::ChromaUpsample(f) => f.simultaneous_lines(),
            FilterKind::ChromaDownsample(f) => f.simultaneous_lines(),
            FilterKind::Dither(f) => f.simultaneous_lines(),
        }
    }

    fn max_buffering(&self) -> usize {
        match self {
            FilterKind::Copy(f) => f.max_buffering(),
            FilterKind::DepthConvert(f) => f.max_buffering(),
            FilterKind::ResizeHorizontal(f) => f.max_buffering(),
            FilterKind::ResizeVertical(f) => f.max_buffering(),
            FilterKind::ColorMatrix(f) => f.max_buffering(),
            FilterKind::ChromaUpsample(f) => f.max_buffering(),
            FilterKind::ChromaDownsample(f) => f.max_buffering(),
            FilterKind::Dither(f) => f.max_buffering(),
        }
    }

    fn required_row_range(&self, i: usize) -> Range {
        match self {
            FilterKind::Copy(f) => f.required_row_range(i),
            FilterKind::DepthConvert(f) => f.required_row_range(i),
            FilterKind::ResizeHorizontal(f) => f.required_row_range(i),
            FilterKind::ResizeVertical(f) => f.required_row_range(i),
            FilterKind::ColorMatrix(f) => f.required_row_range(i),
            FilterKind::ChromaUpsample(f) => f.required_row_range(i),
            FilterKind::ChromaDownsample(f) => f.required_row_range(i),
            FilterKind::Dither(f) => f.required_row_range(i),
        }
    }

    fn required_col_range(&self, left: usize, right: usize) -> Range {
        match self {
            FilterKind::Copy(f) => f.required_col_range(left, right),
            FilterKind::DepthConvert(f) => f.required_col_range(left, right),
            FilterKind::ResizeHorizontal(f) => f.required_col_range(left, right),
            FilterKind::ResizeVertical(f) => f.required_col_range(left, right),
            FilterKind::ColorMatrix(f) => f.required_col_range(left, right),
            FilterKind::ChromaUpsample(f) => f.required_col_range(left, right),
            FilterKind::ChromaDownsample(f) => f.required_col_range(left, right),
            FilterKind::Dither(f) => f.required_col_range(left, right),
        }
    }

    fn context_size(&self) -> usize {
        match self {
            FilterKind::Copy(f) => f.context_size(),
            FilterKind::DepthConvert(f) => f.context_size(),
            FilterKind::ResizeHorizontal(f) => f.context_size(),
            FilterKind::ResizeVertical(f) => f.context_size(),
            FilterKind::ColorMatrix(f) => f.context_size(),
            FilterKind::ChromaUpsample(f) => f.context_size(),
            FilterKind::ChromaDownsample(f) => f.context_size(),
            FilterKind::Dither(f) => f.context_size(),
        }
    }

    fn tmp_size(&self, left: usize, right: usize) -> usize {
        match self {
            FilterKind::Copy(f) => f.tmp_size(left, right),
            FilterKind::DepthConvert(f) => f.tmp_size(left, right),
            FilterKind::ResizeHorizontal(f) => f.tmp_size(left, right),
            FilterKind::ResizeVertical(f) => f.tmp_size(left, right),
            FilterKind::ColorMatrix(f) => f.tmp_size(left, right),
            FilterKind::ChromaUpsample(f) => f.tmp_size(left, right),
            FilterKind::ChromaDownsample(f) => f.tmp_size(left, right),
            FilterKind::Dither(f) => f.tmp_size(left, right),
        }
    }

    fn init_context(&self, ctx: &mut [u8]) {
        match self {
            FilterKind::Copy(f) => f.init_context(ctx),
            FilterKind::DepthConvert(f) => f.init_context(ctx),
            FilterKind::ResizeHorizontal(f) => f.init_context(ctx),
            FilterKind::ResizeVertical(f) => f.init_context(ctx),
            FilterKind::ColorMatrix(f) => f.init_context(ctx),
            FilterKind::ChromaUpsample(f) => f.init_context(ctx),
            FilterKind::ChromaDownsample(f) => f.init_context(ctx),
            FilterKind::Dither(f) => f.init_context(ctx),
        }
    }

    fn process(
        &self,
        ctx: &mut [u8],
        src: &ImageBuffer,
        dst: &mut ImageBuffer,
        tmp: &mut [u8],
        i: usize,
        left: usize,
        right: usize,
    ) {
        match self {
            FilterKind::Copy(f) => f.process(ctx, src, dst, tmp, i, left, right),
            FilterKind::DepthConvert(f) => f.process(ctx, src, dst, tmp, i, left, right),
            FilterKind::ResizeHorizontal(f) => f.process(ctx, src, dst, tmp, i, left, right),
            FilterKind::ResizeVertical(f) => f.process(ctx, src, dst, tmp, i, left, right),
            FilterKind::ColorMatrix(f) => f.process(ctx, src, dst, tmp, i, left, right),
            FilterKind::ChromaUpsample(f) => f.process(ctx, src, dst, tmp, i, left, right),
            FilterKind::ChromaDownsample(f) => f.process(ctx, src, dst, tmp, i, left, right),
            FilterKind::Dither(f) => f.process(ctx, src, dst, tmp, i, left, right),
        }
    }
}
