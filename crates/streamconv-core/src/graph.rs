//! Graph builder and runtime API surface.
//!
//! From a `(src_format, dst_format, params)` triple, [`FilterGraph::build`]
//! plans and assembles the filter chain(s) that perform the conversion, the
//! Rust counterpart of `original_source/API/zimg3++.hpp`'s `FilterGraph`
//! RAII wrapper and the builder logic spec.md §4.4 describes. Modeled on
//! `vfx_color::ColorProcessor::optimize()` (`crates/vfx-color/src/processor.rs`)
//! for the elision/merge shape of the pass.
//!
//! A subsampled YUV format cannot be addressed by a single [`Filter`] chain,
//! since a filter's `ImageAttributes` carries only one `(width, height)`
//! pair but luma and chroma planes differ in size. The builder therefore
//! plans a small number of plane-arity-homogeneous [`Segment`]s (one 1-plane
//! chain for luma, one 2-plane chain for the chroma pair, or one 3-plane
//! chain once luma and chroma have been unified to 4:4:4), each driven by
//! its own [`Scheduler`], with plane merge/split performed directly between
//! segments rather than inside a filter. This is a deliberate generalization
//! beyond a single linear chain, recorded in DESIGN.md.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::buffer::{ImageBuffer, PlaneBuffer, ALL_ONES};
use crate::error::{Error, Result};
use crate::filter::Filter;
use crate::filters::chroma::ChromaResampleFilter;
use crate::filters::copy::CopyFilter;
use crate::filters::depth::DepthConvertFilter;
use crate::filters::dither::DitherFilter;
use crate::filters::matrix::{ColorMatrixFilter, Matrix3};
use crate::filters::resize::{Kernel, ResizeHorizontal, ResizeVertical};
use crate::filters::FilterKind;
use crate::format::{ChromaLocation, ColorFamily, CpuType, DitherType, ImageAttributes, ImageFormat, ResampleFilter};
use crate::pixel::PixelType;
use crate::scheduler::Scheduler;

/// Graph-construction parameters, the counterpart of `zfilter_graph_params`.
/// `Default` mirrors `filter_graph_params_default`.
#[derive(Debug, Clone, Copy)]
pub struct FilterGraphParams {
    pub resample_filter: ResampleFilter,
    pub filter_param_a: f32,
    pub filter_param_b: f32,
    pub resample_filter_uv: ResampleFilter,
    pub filter_param_a_uv: f32,
    pub filter_param_b_uv: f32,
    pub dither_type: DitherType,
    pub cpu_type: CpuType,
}

impl Default for FilterGraphParams {
    fn default() -> Self {
        FilterGraphParams {
            resample_filter: ResampleFilter::Point,
            filter_param_a: f32::NAN,
            filter_param_b: f32::NAN,
            resample_filter_uv: ResampleFilter::Point,
            filter_param_a_uv: f32::NAN,
            filter_param_b_uv: f32::NAN,
            dither_type: DitherType::None,
            cpu_type: CpuType::Auto,
        }
    }
}

/// One plane-arity-homogeneous chain: `planes` buffers of `(src_width,
/// src_height, src_pixel_type)` flow through `chain` to whatever
/// `ImageAttributes` its last filter declares.
struct Segment {
    planes: usize,
    src_width: usize,
    src_height: usize,
    src_pixel_type: PixelType,
    chain: Vec<FilterKind>,
}

impl Segment {
    fn dst_attrs(&self) -> ImageAttributes {
        self.chain.last().expect("segment chain is never empty").image_attributes()
    }

    fn run(&self, src: &ImageBuffer) -> Result<ImageBuffer> {
        let mut sched = Scheduler::new(&self.chain, self.planes)?;
        let attrs = self.dst_attrs();
        let row_bytes = attrs.width * attrs.pixel_type.pixel_size();
        let mut planes = Vec::with_capacity(self.planes);
        for _ in 0..self.planes {
            planes.push(PlaneBuffer::new(attrs.height, row_bytes, ALL_ONES)?);
        }
        let mut dst = ImageBuffer::new(planes);
        sched.run(src, &mut dst, 0, attrs.width);
        Ok(dst)
    }
}

/// The shape of chain(s) the builder produced for one `(src, dst)` pair.
enum Plan {
    /// GRAY (1 plane) or RGB/4:4:4-YUV (3 planes, no color-family change).
    Single(Segment),
    /// Both sides YUV with no color-space transform: luma and chroma are
    /// resized/depth-converted independently at their own (possibly
    /// differently-subsampled) resolutions.
    IndependentPlanes { luma: Segment, chroma: Segment },
    /// A color-family or matrix/transfer/primaries transform is required.
    /// `luma_pre`/`chroma_pre` widen (and, for a subsampled source, upsample
    /// chroma to 4:4:4) before the planes are merged into `joint`'s 3-plane
    /// input; `luma_post`/`chroma_post` split the joint output back apart
    /// and downsample chroma when the destination is itself subsampled YUV.
    ColorTransform {
        luma_pre: Option<Segment>,
        chroma_pre: Option<Segment>,
        joint: Segment,
        luma_post: Option<Segment>,
        chroma_post: Option<Segment>,
    },
}

impl Plan {
    fn segments(&self) -> Vec<&Segment> {
        match self {
            Plan::Single(s) => vec![s],
            Plan::IndependentPlanes { luma, chroma } => vec![luma, chroma],
            Plan::ColorTransform { luma_pre, chroma_pre, joint, luma_post, chroma_post } => {
                let mut v = vec![joint];
                v.extend(luma_pre.iter());
                v.extend(chroma_pre.iter());
                v.extend(luma_post.iter());
                v.extend(chroma_post.iter());
                v
            }
        }
    }
}

struct GraphInner {
    src_format: ImageFormat,
    dst_format: ImageFormat,
    plan: Plan,
}

/// An immutable, built conversion graph. Cheaply cloneable (`Arc`-backed);
/// the last clone dropped frees the chain, matching the reference-counted
/// ownership model of §5.
#[derive(Clone)]
pub struct FilterGraph {
    inner: Arc<GraphInner>,
}

fn choose_working(a: PixelType, b: PixelType) -> PixelType {
    if a == b {
        return a;
    }
    if a.is_float() || b.is_float() {
        return PixelType::Float;
    }
    if a.container_bits() >= b.container_bits() { a } else { b }
}

/// Appends a depth-narrow or dither filter to go from `from` to `to`, or
/// nothing if they already match.
fn narrow_tail(
    width: usize,
    height: usize,
    from: PixelType,
    to: PixelType,
    color: bool,
    params: &FilterGraphParams,
) -> Vec<FilterKind> {
    if from == to {
        return Vec::new();
    }
    if !to.is_float() && params.dither_type != DitherType::None {
        vec![FilterKind::Dither(DitherFilter::new(width, height, from, to, params.dither_type, color))]
    } else {
        vec![FilterKind::DepthConvert(DepthConvertFilter::new(width, height, from, to, color))]
    }
}

/// Builds the chain for a plane group that needs no color-space work: an
/// optional widen, an optional horizontal/vertical resize, and an optional
/// narrow/dither, eliding to a single copy when nothing changes.
fn build_linear_chain(
    src_w: usize,
    src_h: usize,
    src_type: PixelType,
    dst_w: usize,
    dst_h: usize,
    dst_type: PixelType,
    color: bool,
    params: &FilterGraphParams,
) -> Vec<FilterKind> {
    let mut chain = Vec::new();
    let mut cur_w = src_w;
    let mut cur_h = src_h;
    let mut cur_type = src_type;

    let working = choose_working(src_type, dst_type);
    if cur_type != working {
        chain.push(FilterKind::DepthConvert(DepthConvertFilter::new(cur_w, cur_h, cur_type, working, color)));
        cur_type = working;
    }

    if cur_w != dst_w {
        let kernel = Kernel::new(params.resample_filter, params.filter_param_a, params.filter_param_b);
        chain.push(FilterKind::ResizeHorizontal(ResizeHorizontal::new(cur_w, cur_h, dst_w, cur_type, kernel, color)));
        cur_w = dst_w;
    }
    if cur_h != dst_h {
        let kernel = Kernel::new(params.resample_filter, params.filter_param_a, params.filter_param_b);
        chain.push(FilterKind::ResizeVertical(ResizeVertical::new(cur_w, cur_h, dst_h, cur_type, kernel, color)));
        cur_h = dst_h;
    }

    chain.extend(narrow_tail(cur_w, cur_h, cur_type, dst_type, color, params));

    if chain.is_empty() {
        chain.push(FilterKind::Copy(CopyFilter::new(dst_w, dst_h, dst_type, color)));
    }
    chain
}

fn merge_planes(mut luma: ImageBuffer, mut chroma: ImageBuffer) -> ImageBuffer {
    let mut planes = Vec::with_capacity(3);
    planes.push(luma.planes.remove(0));
    planes.append(&mut chroma.planes);
    ImageBuffer::new(planes)
}

fn split_planes(mut joint: ImageBuffer) -> (ImageBuffer, ImageBuffer) {
    let v = joint.planes.pop().expect("joint buffer has 3 planes");
    let u = joint.planes.pop().expect("joint buffer has 3 planes");
    let y = joint.planes.pop().expect("joint buffer has 3 planes");
    (ImageBuffer::new(vec![y]), ImageBuffer::new(vec![u, v]))
}

fn copy_plane_into(src: &PlaneBuffer, dst: &mut PlaneBuffer) {
    for r in 0..src.resident_rows() {
        dst.row_mut(r).copy_from_slice(src.row(r));
    }
}

fn copy_buffer_into(src: &ImageBuffer, dst: &mut ImageBuffer) {
    for (s, d) in src.planes.iter().zip(dst.planes.iter_mut()) {
        copy_plane_into(s, d);
    }
}

impl FilterGraph {
    /// Plans and assembles a conversion graph for `src_format -> dst_format`.
    /// On failure, sets the thread-wide last-error slot (spec §7) in addition
    /// to returning the error, mirroring `zimg_filter_graph_build`.
    #[instrument(skip(params), fields(src = ?src_format.color_family, dst = ?dst_format.color_family))]
    pub fn build(src_format: ImageFormat, dst_format: ImageFormat, params: FilterGraphParams) -> Result<Self> {
        Self::build_inner(src_format, dst_format, params).map_err(|e| {
            crate::last_error::set_last_error(&e);
            e
        })
    }

    fn build_inner(src_format: ImageFormat, dst_format: ImageFormat, params: FilterGraphParams) -> Result<Self> {
        src_format.validate()?;
        dst_format.validate()?;

        if src_format.width == 0 || src_format.height == 0 || dst_format.width == 0 || dst_format.height == 0 {
            return Err(Error::illegal_argument("image dimensions must be non-zero"));
        }
        if !src_format.is_subsampled() && src_format.chroma_location != ChromaLocation::Left {
            return Err(Error::illegal_argument("chroma_location is only meaningful for a subsampled source"));
        }
        if !dst_format.is_subsampled() && dst_format.chroma_location != ChromaLocation::Left {
            return Err(Error::illegal_argument("chroma_location is only meaningful for a subsampled destination"));
        }

        if src_format == dst_format {
            if src_format.color_family == ColorFamily::Yuv && src_format.is_subsampled() {
                info!("identical subsampled src/dst format, eliding to independent luma/chroma copy filters");
                let (cw, ch) = src_format.plane_dims(1);
                let plan = Plan::IndependentPlanes {
                    luma: Segment {
                        planes: 1,
                        src_width: src_format.width,
                        src_height: src_format.height,
                        src_pixel_type: src_format.pixel_type,
                        chain: vec![FilterKind::Copy(CopyFilter::new(
                            src_format.width, src_format.height, src_format.pixel_type, false,
                        ))],
                    },
                    chroma: Segment {
                        planes: 2,
                        src_width: cw,
                        src_height: ch,
                        src_pixel_type: src_format.pixel_type,
                        chain: vec![FilterKind::Copy(CopyFilter::new(cw, ch, src_format.pixel_type, true))],
                    },
                };
                return Ok(FilterGraph { inner: Arc::new(GraphInner { src_format, dst_format, plan }) });
            }

            info!("identical src/dst format, eliding to a single copy filter");
            let chain = vec![FilterKind::Copy(CopyFilter::new(
                src_format.width,
                src_format.height,
                src_format.pixel_type,
                src_format.color_family != ColorFamily::Gray,
            ))];
            let seg = Segment {
                planes: src_format.plane_count(),
                src_width: src_format.width,
                src_height: src_format.height,
                src_pixel_type: src_format.pixel_type,
                chain,
            };
            return Ok(FilterGraph { inner: Arc::new(GraphInner { src_format, dst_format, plan: Plan::Single(seg) }) });
        }

        let needs_color_transform = src_format.color_family != dst_format.color_family
            || src_format.matrix != dst_format.matrix
            || src_format.transfer != dst_format.transfer
            || src_format.primaries != dst_format.primaries;

        let plan = if !needs_color_transform {
            match src_format.color_family {
                ColorFamily::Gray => {
                    debug!("GRAY->GRAY, single 1-plane chain");
                    let chain = build_linear_chain(
                        src_format.width, src_format.height, src_format.pixel_type,
                        dst_format.width, dst_format.height, dst_format.pixel_type,
                        false, &params,
                    );
                    Plan::Single(Segment {
                        planes: 1,
                        src_width: src_format.width,
                        src_height: src_format.height,
                        src_pixel_type: src_format.pixel_type,
                        chain,
                    })
                }
                ColorFamily::Rgb => {
                    debug!("RGB->RGB, single 3-plane chain");
                    let chain = build_linear_chain(
                        src_format.width, src_format.height, src_format.pixel_type,
                        dst_format.width, dst_format.height, dst_format.pixel_type,
                        true, &params,
                    );
                    Plan::Single(Segment {
                        planes: 3,
                        src_width: src_format.width,
                        src_height: src_format.height,
                        src_pixel_type: src_format.pixel_type,
                        chain,
                    })
                }
                ColorFamily::Yuv => {
                    debug!("YUV->YUV with no color transform, independent luma/chroma chains");
                    let luma_chain = build_linear_chain(
                        src_format.width, src_format.height, src_format.pixel_type,
                        dst_format.width, dst_format.height, dst_format.pixel_type,
                        false, &params,
                    );
                    let (scw, sch) = src_format.plane_dims(1);
                    let (dcw, dch) = dst_format.plane_dims(1);
                    let chroma_chain = build_linear_chain(
                        scw, sch, src_format.pixel_type,
                        dcw, dch, dst_format.pixel_type,
                        true, &params,
                    );
                    Plan::IndependentPlanes {
                        luma: Segment {
                            planes: 1,
                            src_width: src_format.width,
                            src_height: src_format.height,
                            src_pixel_type: src_format.pixel_type,
                            chain: luma_chain,
                        },
                        chroma: Segment {
                            planes: 2,
                            src_width: scw,
                            src_height: sch,
                            src_pixel_type: src_format.pixel_type,
                            chain: chroma_chain,
                        },
                    }
                }
            }
        } else {
            if src_format.color_family == ColorFamily::Gray || dst_format.color_family == ColorFamily::Gray {
                return Err(Error::unsupported(
                    "GRAY color-family transitions are not supported by this builder",
                ));
            }
            debug!("color-family/matrix/transfer/primaries transform required");

            let working = PixelType::Float;
            let src_needs_split = src_format.color_family == ColorFamily::Yuv && src_format.is_subsampled();
            let dst_needs_split = dst_format.color_family == ColorFamily::Yuv && dst_format.is_subsampled();

            let (luma_pre, chroma_pre) = if src_needs_split {
                let mut lchain = Vec::new();
                if src_format.pixel_type != working {
                    lchain.push(FilterKind::DepthConvert(DepthConvertFilter::new(
                        src_format.width, src_format.height, src_format.pixel_type, working, false,
                    )));
                }
                let luma_seg = if lchain.is_empty() {
                    None
                } else {
                    Some(Segment {
                        planes: 1,
                        src_width: src_format.width,
                        src_height: src_format.height,
                        src_pixel_type: src_format.pixel_type,
                        chain: lchain,
                    })
                };

                let (scw, sch) = src_format.plane_dims(1);
                let mut cchain = Vec::new();
                let mut cur_type = src_format.pixel_type;
                if cur_type != working {
                    cchain.push(FilterKind::DepthConvert(DepthConvertFilter::new(scw, sch, cur_type, working, true)));
                    cur_type = working;
                }
                cchain.push(FilterKind::ChromaUpsample(ChromaResampleFilter::new(
                    scw, sch, src_format.width, src_format.height, working,
                    params.resample_filter_uv, params.filter_param_a_uv, params.filter_param_b_uv,
                    src_format.chroma_location,
                )));
                let chroma_seg = Segment {
                    planes: 2,
                    src_width: scw,
                    src_height: sch,
                    src_pixel_type: src_format.pixel_type,
                    chain: cchain,
                };
                (luma_seg, Some(chroma_seg))
            } else {
                (None, None)
            };

            let joint_src_type = if src_needs_split { working } else { src_format.pixel_type };
            let mut jchain = Vec::new();
            let mut cur_type = joint_src_type;
            if cur_type != working {
                jchain.push(FilterKind::DepthConvert(DepthConvertFilter::new(
                    src_format.width, src_format.height, cur_type, working, true,
                )));
                cur_type = working;
            }

            // The ITU coefficient tables are the out-of-scope numerical
            // kernel (see filters::matrix); this inserts the transform at
            // the correct point in the chain with an identity placeholder.
            jchain.push(FilterKind::ColorMatrix(ColorMatrixFilter::new(
                src_format.width, src_format.height, working, Matrix3::identity(),
            )));

            let mut cur_w = src_format.width;
            let mut cur_h = src_format.height;
            if cur_w != dst_format.width {
                let kernel = Kernel::new(params.resample_filter, params.filter_param_a, params.filter_param_b);
                jchain.push(FilterKind::ResizeHorizontal(ResizeHorizontal::new(cur_w, cur_h, dst_format.width, working, kernel, true)));
                cur_w = dst_format.width;
            }
            if cur_h != dst_format.height {
                let kernel = Kernel::new(params.resample_filter, params.filter_param_a, params.filter_param_b);
                jchain.push(FilterKind::ResizeVertical(ResizeVertical::new(cur_w, cur_h, dst_format.height, working, kernel, true)));
                cur_h = dst_format.height;
            }

            if !dst_needs_split {
                jchain.extend(narrow_tail(cur_w, cur_h, working, dst_format.pixel_type, true, &params));
            }
            if jchain.is_empty() {
                jchain.push(FilterKind::Copy(CopyFilter::new(cur_w, cur_h, working, true)));
            }

            let joint = Segment {
                planes: 3,
                src_width: src_format.width,
                src_height: src_format.height,
                src_pixel_type: joint_src_type,
                chain: jchain,
            };

            let (luma_post, chroma_post) = if dst_needs_split {
                let (dcw, dch) = dst_format.plane_dims(1);

                let mut luma_chain = narrow_tail(dst_format.width, dst_format.height, working, dst_format.pixel_type, false, &params);
                if luma_chain.is_empty() {
                    luma_chain.push(FilterKind::Copy(CopyFilter::new(dst_format.width, dst_format.height, dst_format.pixel_type, false)));
                }

                let mut cchain = vec![FilterKind::ChromaDownsample(ChromaResampleFilter::new(
                    dst_format.width, dst_format.height, dcw, dch, working,
                    params.resample_filter_uv, params.filter_param_a_uv, params.filter_param_b_uv,
                    dst_format.chroma_location,
                ))];
                cchain.extend(narrow_tail(dcw, dch, working, dst_format.pixel_type, true, &params));

                (
                    Some(Segment { planes: 1, src_width: dst_format.width, src_height: dst_format.height, src_pixel_type: working, chain: luma_chain }),
                    Some(Segment { planes: 2, src_width: dst_format.width, src_height: dst_format.height, src_pixel_type: working, chain: cchain }),
                )
            } else {
                (None, None)
            };

            Plan::ColorTransform { luma_pre, chroma_pre, joint, luma_post, chroma_post }
        };

        Ok(FilterGraph { inner: Arc::new(GraphInner { src_format, dst_format, plan }) })
    }

    /// Largest per-call scratch requirement across every filter in every
    /// segment, at that filter's full output width.
    pub fn tmp_size(&self) -> usize {
        self.inner
            .plan
            .segments()
            .iter()
            .flat_map(|s| s.chain.iter())
            .map(|f| f.tmp_size(0, f.image_attributes().width))
            .max()
            .unwrap_or(0)
    }

    /// Largest `max_buffering` declared by any filter in any segment — the
    /// most input rows the source edge must keep resident.
    pub fn input_buffering(&self) -> usize {
        self.inner
            .plan
            .segments()
            .iter()
            .flat_map(|s| s.chain.iter())
            .map(|f| f.max_buffering())
            .max()
            .unwrap_or(1)
    }

    /// Largest `simultaneous_lines` declared by any segment's last filter.
    pub fn output_buffering(&self) -> usize {
        self.inner
            .plan
            .segments()
            .iter()
            .map(|s| s.chain.last().map(|f| f.simultaneous_lines()).unwrap_or(1))
            .max()
            .unwrap_or(1)
    }

    /// Runs one frame: `src` and `dst` must already carry the plane count
    /// and dimensions of the format the graph was built from/to. On failure,
    /// sets the thread-wide last-error slot (spec §7), mirroring
    /// `zimg_filter_graph_process`.
    pub fn process(&self, src: &ImageBuffer, dst: &mut ImageBuffer) -> Result<()> {
        self.process_inner(src, dst).map_err(|e| {
            crate::last_error::set_last_error(&e);
            e
        })
    }

    #[instrument(skip(self, src, dst))]
    fn process_inner(&self, src: &ImageBuffer, dst: &mut ImageBuffer) -> Result<()> {
        match &self.inner.plan {
            Plan::Single(seg) => {
                let out = seg.run(src)?;
                copy_buffer_into(&out, dst);
            }
            Plan::IndependentPlanes { luma, chroma } => {
                let out_luma = luma.run(&ImageBuffer::new(vec![src.planes[0].clone()]))?;
                copy_plane_into(&out_luma.planes[0], &mut dst.planes[0]);

                let out_chroma = chroma.run(&ImageBuffer::new(vec![src.planes[1].clone(), src.planes[2].clone()]))?;
                copy_plane_into(&out_chroma.planes[0], &mut dst.planes[1]);
                copy_plane_into(&out_chroma.planes[1], &mut dst.planes[2]);
            }
            Plan::ColorTransform { luma_pre, chroma_pre, joint, luma_post, chroma_post } => {
                let joint_src = if luma_pre.is_some() || chroma_pre.is_some() {
                    let luma_buf = match luma_pre {
                        Some(seg) => seg.run(&ImageBuffer::new(vec![src.planes[0].clone()]))?,
                        None => ImageBuffer::new(vec![src.planes[0].clone()]),
                    };
                    let chroma_buf = match chroma_pre {
                        Some(seg) => seg.run(&ImageBuffer::new(vec![src.planes[1].clone(), src.planes[2].clone()]))?,
                        None => ImageBuffer::new(vec![src.planes[1].clone(), src.planes[2].clone()]),
                    };
                    merge_planes(luma_buf, chroma_buf)
                } else {
                    src.clone()
                };

                let joint_out = joint.run(&joint_src)?;

                match (luma_post, chroma_post) {
                    (Some(lseg), Some(cseg)) => {
                        let (luma_buf, chroma_buf) = split_planes(joint_out);
                        let out_luma = lseg.run(&luma_buf)?;
                        copy_plane_into(&out_luma.planes[0], &mut dst.planes[0]);
                        let out_chroma = cseg.run(&chroma_buf)?;
                        copy_plane_into(&out_chroma.planes[0], &mut dst.planes[1]);
                        copy_plane_into(&out_chroma.planes[1], &mut dst.planes[2]);
                    }
                    _ => copy_buffer_into(&joint_out, dst),
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{FieldParity, MatrixCoefficients, PixelRange, TransferCharacteristics};

    fn gray(width: usize, height: usize, pixel_type: PixelType) -> ImageFormat {
        ImageFormat::default_for(width, height, pixel_type)
    }

    fn alloc(format: &ImageFormat) -> ImageBuffer {
        let mut planes = Vec::with_capacity(format.plane_count());
        for p in 0..format.plane_count() {
            let (w, h) = format.plane_dims(p);
            planes.push(PlaneBuffer::new(h, w * format.pixel_type.pixel_size(), ALL_ONES).unwrap());
        }
        ImageBuffer::new(planes)
    }

    #[test]
    fn identical_formats_elide_to_copy() {
        let fmt = gray(8, 4, PixelType::Byte);
        let g = FilterGraph::build(fmt, fmt, FilterGraphParams::default()).unwrap();
        assert!(matches!(g.inner.plan, Plan::Single(_)));
    }

    #[test]
    fn identical_subsampled_yuv_elides_to_independent_plane_copies() {
        let fmt = yuv420(8, 4);
        let g = FilterGraph::build(fmt, fmt, FilterGraphParams::default()).unwrap();
        assert!(matches!(g.inner.plan, Plan::IndependentPlanes { .. }));

        let src_buf = alloc(&fmt);
        let mut dst_buf = alloc(&fmt);
        g.process(&src_buf, &mut dst_buf).unwrap();
    }

    #[test]
    fn pure_resize_emits_horizontal_then_vertical_only() {
        let src = gray(8, 6, PixelType::Float);
        let dst = gray(4, 3, PixelType::Float);
        let params = FilterGraphParams { resample_filter: ResampleFilter::Bilinear, ..Default::default() };
        let g = FilterGraph::build(src, dst, params).unwrap();
        let Plan::Single(seg) = &g.inner.plan else { panic!("expected Single plan") };
        assert_eq!(seg.chain.len(), 2);
        assert!(matches!(seg.chain[0], FilterKind::ResizeHorizontal(_)));
        assert!(matches!(seg.chain[1], FilterKind::ResizeVertical(_)));
        assert!(g.tmp_size() > 0 || g.output_buffering() >= 1);
        assert!(g.input_buffering() >= 1);
    }

    fn yuv420(width: usize, height: usize) -> ImageFormat {
        ImageFormat {
            width,
            height,
            pixel_type: PixelType::Word,
            subsample_w: 1,
            subsample_h: 1,
            color_family: ColorFamily::Yuv,
            depth: 10,
            pixel_range: PixelRange::Limited,
            matrix: MatrixCoefficients::Bt709,
            transfer: TransferCharacteristics::Bt709,
            primaries: crate::format::ColorPrimaries::Bt709,
            chroma_location: ChromaLocation::Left,
            field_parity: FieldParity::Progressive,
        }
    }

    fn rgb(width: usize, height: usize) -> ImageFormat {
        ImageFormat {
            width,
            height,
            pixel_type: PixelType::Byte,
            subsample_w: 0,
            subsample_h: 0,
            color_family: ColorFamily::Rgb,
            depth: 8,
            pixel_range: PixelRange::Full,
            matrix: MatrixCoefficients::Rgb,
            transfer: TransferCharacteristics::Bt709,
            primaries: crate::format::ColorPrimaries::Bt709,
            chroma_location: ChromaLocation::Left,
            field_parity: FieldParity::Progressive,
        }
    }

    #[test]
    fn yuv420_to_rgb_builds_and_processes() {
        let src = yuv420(8, 4);
        let dst = rgb(8, 4);
        let g = FilterGraph::build(src, dst, FilterGraphParams::default()).unwrap();
        assert!(matches!(g.inner.plan, Plan::ColorTransform { .. }));

        let src_buf = alloc(&src);
        let mut dst_buf = alloc(&dst);
        g.process(&src_buf, &mut dst_buf).unwrap();
    }

    #[test]
    fn gray_color_family_transition_is_unsupported() {
        let src = gray(4, 4, PixelType::Byte);
        let mut dst = rgb(4, 4);
        dst.width = 4;
        dst.height = 4;
        let err = FilterGraph::build(src, dst, FilterGraphParams::default()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperation { .. }));
    }

    #[test]
    fn chroma_location_on_unsubsampled_format_is_rejected() {
        let mut src = rgb(4, 4);
        src.chroma_location = ChromaLocation::Center;
        let dst = rgb(4, 4);
        assert!(FilterGraph::build(src, dst, FilterGraphParams::default()).is_err());
    }

    #[test]
    fn build_failure_populates_last_error() {
        crate::last_error::clear_last_error();
        let src = gray(4, 4, PixelType::Byte);
        let mut dst = rgb(4, 4);
        dst.width = 4;
        dst.height = 4;
        assert!(FilterGraph::build(src, dst, FilterGraphParams::default()).is_err());
        let (code, _) = crate::last_error::last_error().expect("build failure should set last_error");
        assert_eq!(code, crate::error::ErrorCode::UnsupportedOperation);
    }
}
