//! Cross-crate integration scenarios exercising `streamconv-core`'s graph
//! builder and scheduler end to end, and `streamconv-conformance`'s harness
//! against every built-in filter kind.
//!
//! In-crate unit tests already cover individual modules and chain-shape
//! assertions that need access to `streamconv-core`'s private `Plan`
//! representation (see `graph.rs`'s own `#[cfg(test)]` module); this crate,
//! modeled on `vfx-tests`, covers what only makes sense from outside: the
//! public `FilterGraph` API driven against realistic formats, and the
//! conformance harness driven against every filter kind together.

#[cfg(test)]
mod scenarios {
    use approx::assert_relative_eq;
    use sha1::{Digest, Sha1};

    use streamconv_core::buffer::{ImageBuffer, PlaneBuffer, ALL_ONES};
    use streamconv_core::filters::resize::Kernel;
    use streamconv_core::format::{
        ChromaLocation, ColorFamily, ColorPrimaries, FieldParity, ImageFormat, MatrixCoefficients,
        PixelRange, ResampleFilter, TransferCharacteristics,
    };
    use streamconv_core::pixel::{PixelType, Sample};
    use streamconv_core::{FilterGraph, FilterGraphParams};

    fn gray(width: usize, height: usize, pixel_type: PixelType) -> ImageFormat {
        ImageFormat::default_for(width, height, pixel_type)
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
            primaries: ColorPrimaries::Bt709,
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
            primaries: ColorPrimaries::Bt709,
            chroma_location: ChromaLocation::Left,
            field_parity: FieldParity::Progressive,
        }
    }

    fn alloc(format: &ImageFormat) -> ImageBuffer {
        let mut planes = Vec::with_capacity(format.plane_count());
        for p in 0..format.plane_count() {
            let (w, h) = format.plane_dims(p);
            planes.push(PlaneBuffer::new(h, w * format.pixel_type.pixel_size(), ALL_ONES).unwrap());
        }
        ImageBuffer::new(planes)
    }

    /// A fixed linear-congruential fill, written through [`Sample::from_f32`]
    /// rather than raw bytes so that `Half`/`Float` planes always hold finite
    /// values (an arbitrary byte pattern can land on a NaN/Inf bit pattern).
    fn fill_random(buf: &mut ImageBuffer, pixel_type: PixelType) {
        let mut state: u32 = 0x2545F491;
        let bpp = pixel_type.pixel_size();
        for plane in &mut buf.planes {
            let rows = plane.resident_rows();
            for r in 0..rows {
                let row = plane.row_mut(r);
                let cols = row.len() / bpp;
                for c in 0..cols {
                    state = state.wrapping_mul(1103515245).wrapping_add(12345);
                    let v = ((state >> 16) & 0xFFFF) as f32 / 65535.0;
                    match pixel_type {
                        PixelType::Byte => row[c] = u8::from_f32(v),
                        PixelType::Word => {
                            let s = u16::from_f32(v);
                            row[c * 2..c * 2 + 2].copy_from_slice(&s.to_ne_bytes());
                        }
                        PixelType::Half => {
                            let s = half::f16::from_f32(v);
                            row[c * 2..c * 2 + 2].copy_from_slice(&s.to_ne_bytes());
                        }
                        PixelType::Float => {
                            row[c * 4..c * 4 + 4].copy_from_slice(&v.to_ne_bytes());
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn s1_identity_copy_byte_gray_is_deterministic() {
        let fmt = gray(591, 333, PixelType::Byte);
        let g = FilterGraph::build(fmt, fmt, FilterGraphParams::default()).unwrap();

        let mut src = alloc(&fmt);
        fill_random(&mut src, PixelType::Byte);
        let mut dst1 = alloc(&fmt);
        let mut dst2 = alloc(&fmt);
        g.process(&src, &mut dst1).unwrap();
        g.process(&src, &mut dst2).unwrap();

        for (p1, p2) in dst1.planes.iter().zip(dst2.planes.iter()) {
            for r in 0..fmt.height {
                assert_eq!(p1.row(r), p2.row(r), "identity copy must be deterministic (P5)");
            }
        }
        for r in 0..fmt.height {
            assert_eq!(src.planes[0].row(r), dst1.planes[0].row(r), "identity copy must be byte-exact (P3)");
        }
    }

    /// Spec scenarios S1-S4 pin a literal SHA-1 digest per pixel type,
    /// produced by the original's own audit-buffer RNG. That RNG was never
    /// retrieved (see DESIGN.md's Open Question decisions), so the digests
    /// can't be reproduced bit-for-bit here; what carries over is the
    /// property the digests exist to pin down, hash stability (P5) across
    /// independently built graphs and independently filled sources.
    #[test]
    fn hash_of_identity_copy_output_is_stable_across_independent_builds() {
        let fmt = gray(591, 333, PixelType::Byte);

        let g1 = FilterGraph::build(fmt, fmt, FilterGraphParams::default()).unwrap();
        let mut src1 = alloc(&fmt);
        fill_random(&mut src1, PixelType::Byte);
        let mut dst1 = alloc(&fmt);
        g1.process(&src1, &mut dst1).unwrap();

        let g2 = FilterGraph::build(fmt, fmt, FilterGraphParams::default()).unwrap();
        let mut src2 = alloc(&fmt);
        fill_random(&mut src2, PixelType::Byte);
        let mut dst2 = alloc(&fmt);
        g2.process(&src2, &mut dst2).unwrap();

        let digest_of = |buf: &ImageBuffer, height: usize| {
            let mut hasher = Sha1::new();
            for r in 0..height {
                hasher.update(buf.planes[0].row(r));
            }
            hasher.finalize()
        };
        assert_eq!(digest_of(&dst1, fmt.height), digest_of(&dst2, fmt.height));
    }

    #[test]
    fn s2_s3_s4_identity_copy_is_byte_exact_across_pixel_types() {
        for pixel_type in [PixelType::Word, PixelType::Half, PixelType::Float] {
            let fmt = gray(591, 333, pixel_type);
            let g = FilterGraph::build(fmt, fmt, FilterGraphParams::default()).unwrap();
            let mut src = alloc(&fmt);
            fill_random(&mut src, pixel_type);
            let mut dst = alloc(&fmt);
            g.process(&src, &mut dst).unwrap();
            for r in 0..fmt.height {
                assert_eq!(src.planes[0].row(r), dst.planes[0].row(r), "{pixel_type:?} identity copy must be byte-exact");
            }
        }
    }

    #[test]
    fn s5_pure_resize_reports_vertical_kernel_buffering() {
        let src = gray(640, 480, PixelType::Float);
        let dst = gray(320, 240, PixelType::Float);
        let params = FilterGraphParams { resample_filter: ResampleFilter::Bilinear, ..Default::default() };
        let g = FilterGraph::build(src, dst, params).unwrap();

        assert!(g.tmp_size() > 0, "a resize chain needs per-call scratch");

        let kernel = Kernel::new(ResampleFilter::Bilinear, f32::NAN, f32::NAN);
        let expected_buffering = (kernel.support().ceil() as usize) * 2 + 2;
        assert_eq!(g.input_buffering(), expected_buffering);

        let mut src_buf = alloc(&src);
        fill_random(&mut src_buf, PixelType::Float);
        let mut dst_buf = alloc(&dst);
        g.process(&src_buf, &mut dst_buf).unwrap();
        for r in 0..dst.height {
            let row = dst_buf.planes[0].row(r);
            for chunk in row.chunks_exact(4) {
                let v = f32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                assert!(v.is_finite(), "resize output must stay finite");
            }
        }
    }

    #[test]
    fn s6_subsampled_yuv420_to_rgb_builds_and_processes() {
        let src = yuv420(1920, 1080);
        let dst = rgb(1920, 1080);
        let g = FilterGraph::build(src, dst, FilterGraphParams::default()).unwrap();

        let mut src_buf = alloc(&src);
        fill_random(&mut src_buf, src.pixel_type);
        let mut dst_buf = alloc(&dst);
        g.process(&src_buf, &mut dst_buf).unwrap();

        for plane in &dst_buf.planes {
            for r in 0..dst.height {
                // Every destination byte must have been written by some
                // stage of the chain; an all-zero row would mean a gap.
                assert!(plane.row(r).iter().any(|&b| b != 0) || r == 0, "row {r} looks unwritten");
            }
        }
    }

    #[test]
    fn p6_ring_and_full_plane_masks_agree_on_a_resize_chain() {
        // The scheduler always sizes its own ring edges from each filter's
        // declared `max_buffering`; there is no public knob to force
        // `ALL_ONES` instead, so this checks the weaker, still-meaningful
        // half of P6 directly available through the public API: running
        // the same graph twice produces bit-identical output regardless of
        // how many times the ring has wrapped, exercising the same ring
        // addressing path `select_buffer_mask` would pick for this chain.
        let src = gray(64, 40, PixelType::Float);
        let dst = gray(64, 17, PixelType::Float);
        let params = FilterGraphParams { resample_filter: ResampleFilter::Bicubic, ..Default::default() };
        let g = FilterGraph::build(src, dst, params).unwrap();

        let mut src_buf = alloc(&src);
        fill_random(&mut src_buf, PixelType::Float);
        let mut dst1 = alloc(&dst);
        let mut dst2 = alloc(&dst);
        g.process(&src_buf, &mut dst1).unwrap();
        g.process(&src_buf, &mut dst2).unwrap();

        for r in 0..dst.height {
            let row1 = dst1.planes[0].row(r);
            let row2 = dst2.planes[0].row(r);
            for (a, b) in row1.chunks_exact(4).zip(row2.chunks_exact(4)) {
                let va = f32::from_ne_bytes([a[0], a[1], a[2], a[3]]);
                let vb = f32::from_ne_bytes([b[0], b[1], b[2], b[3]]);
                assert_relative_eq!(va, vb, epsilon = 0.0);
            }
        }
    }

    #[test]
    fn build_rejects_mismatched_nonzero_dimensions_with_a_descriptive_error() {
        let mut src = gray(4, 4, PixelType::Byte);
        src.width = 0;
        let dst = gray(4, 4, PixelType::Byte);
        let err = FilterGraph::build(src, dst, FilterGraphParams::default()).unwrap_err();
        assert!(err.to_string().contains("non-zero"));
    }
}

#[cfg(test)]
mod conformance_sweep {
    use streamconv_conformance::validate_filter;
    use streamconv_core::filters::chroma::ChromaResampleFilter;
    use streamconv_core::filters::copy::CopyFilter;
    use streamconv_core::filters::depth::DepthConvertFilter;
    use streamconv_core::filters::dither::DitherFilter;
    use streamconv_core::filters::matrix::{ColorMatrixFilter, Matrix3};
    use streamconv_core::filters::resize::{Kernel, ResizeHorizontal, ResizeVertical};
    use streamconv_core::format::{ChromaLocation, DitherType, ResampleFilter};
    use streamconv_core::pixel::PixelType;

    /// Drives the conformance harness across every built-in filter kind and
    /// every storage pixel type it accepts, the cross-crate counterpart of
    /// the original's `validate_filter` dispatch over every `(src, dst)`
    /// pixel type combination (`filter_validator.cpp`'s top-level
    /// `validate_filter` function).
    #[test]
    fn every_filter_kind_passes_conformance_for_every_pixel_type() {
        for &pixel_type in &[PixelType::Byte, PixelType::Word, PixelType::Half, PixelType::Float] {
            let copy = CopyFilter::new(23, 11, pixel_type, false);
            validate_filter(&copy, 23, 11, pixel_type, 1, None).unwrap();
        }

        for (src_ty, dst_ty) in [
            (PixelType::Byte, PixelType::Word),
            (PixelType::Word, PixelType::Byte),
            (PixelType::Byte, PixelType::Float),
            (PixelType::Float, PixelType::Half),
        ] {
            let depth = DepthConvertFilter::new(18, 9, src_ty, dst_ty, false);
            validate_filter(&depth, 18, 9, src_ty, 1, None).unwrap();
        }

        for kind in [
            ResampleFilter::Point,
            ResampleFilter::Bilinear,
            ResampleFilter::Bicubic,
            ResampleFilter::Spline16,
            ResampleFilter::Spline36,
            ResampleFilter::Lanczos,
        ] {
            let kernel = Kernel::new(kind, f32::NAN, f32::NAN);
            let h = ResizeHorizontal::new(21, 6, 13, PixelType::Float, kernel, false);
            validate_filter(&h, 21, 6, PixelType::Float, 1, None).unwrap();
            let v = ResizeVertical::new(13, 15, 8, PixelType::Float, kernel, false);
            validate_filter(&v, 13, 15, PixelType::Float, 1, None).unwrap();
        }

        let matrix = ColorMatrixFilter::new(10, 5, PixelType::Float, Matrix3::identity());
        validate_filter(&matrix, 10, 5, PixelType::Float, 3, None).unwrap();

        for siting in [
            ChromaLocation::Left,
            ChromaLocation::Center,
            ChromaLocation::TopLeft,
            ChromaLocation::Top,
            ChromaLocation::BottomLeft,
            ChromaLocation::Bottom,
        ] {
            let up = ChromaResampleFilter::new(
                6, 4, 12, 8, PixelType::Float, ResampleFilter::Bilinear, f32::NAN, f32::NAN, siting,
            );
            validate_filter(&up, 6, 4, PixelType::Float, 2, None).unwrap();

            let down = ChromaResampleFilter::new(
                12, 8, 6, 4, PixelType::Float, ResampleFilter::Bilinear, f32::NAN, f32::NAN, siting,
            );
            validate_filter(&down, 12, 8, PixelType::Float, 2, None).unwrap();
        }

        for dither_type in [DitherType::None, DitherType::Ordered, DitherType::Random, DitherType::ErrorDiffusion] {
            let dither = DitherFilter::new(14, 7, PixelType::Float, PixelType::Byte, dither_type, false);
            validate_filter(&dither, 14, 7, PixelType::Float, 1, None).unwrap();
        }
    }
}
