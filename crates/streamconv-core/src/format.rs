//! Image format descriptor and the supplemental enumerations it is built from.
//!
//! The enumeration value sets below are not invented: they are the same
//! names the original C host-plugin adapter exposes through its
//! string-to-enum lookup tables (`g_matrix_table`, `g_transfer_table`,
//! `g_primaries_table`, `g_chromaloc_table`, `g_dither_type_table`,
//! `g_resample_filter_table`), since the distilled spec only names the
//! enumeration *categories*, not their members.

use crate::error::{Error, Result};
use crate::pixel::PixelType;

/// Color family of an [`ImageFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorFamily {
    /// Single luma/grey plane.
    Gray,
    /// Three non-subsampled color planes, additive RGB.
    Rgb,
    /// Luma plus two (possibly subsampled) chroma planes.
    Yuv,
}

/// Whether integer samples use the full or "studio"/limited numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelRange {
    /// Studio/limited range (e.g. 16-235 for 8-bit luma).
    Limited,
    /// Full range (0-255 for 8-bit).
    Full,
}

/// Sub-pixel siting of chroma samples relative to luma, significant only
/// when a format is subsampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChromaLocation {
    Left,
    Center,
    TopLeft,
    Top,
    BottomLeft,
    Bottom,
}

/// Matrix coefficients relating YUV and RGB (or `Rgb`, meaning "no matrix").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixCoefficients {
    Rgb,
    Bt709,
    Unspecified,
    Bt470Bg,
    Smpte170M,
    Bt2020Ncl,
    Bt2020Cl,
}

/// Transfer characteristics (opto-electronic / electro-optical transfer
/// function identity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferCharacteristics {
    Bt709,
    Unspecified,
    Bt601,
    Linear,
    Bt2020Ten,
    Bt2020Twelve,
}

/// Color primaries (chromaticity of the RGB basis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorPrimaries {
    Bt709,
    Unspecified,
    Smpte170M,
    Smpte240M,
    Bt2020,
}

/// Dithering strategy applied when narrowing to an integer type with fewer
/// bits than the working precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DitherType {
    None,
    Ordered,
    Random,
    ErrorDiffusion,
}

/// Kernel used by horizontal/vertical resample filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResampleFilter {
    Point,
    Bilinear,
    Bicubic,
    Spline16,
    Spline36,
    Lanczos,
}

/// CPU capability hint. This crate has no SIMD kernel selection of its own
/// (the spec places kernel numerics out of scope), so only the two
/// non-committal hints are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CpuType {
    /// Disable any CPU-specific kernel selection.
    None,
    /// Auto-detect the best available kernel (the default).
    Auto,
}

/// Field parity for interlaced sources; the conversion engine does not
/// interpret this beyond carrying it through for the (out-of-scope) host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldParity {
    Progressive,
    Top,
    Bottom,
}

/// Full description of an image: geometry, sample type, subsampling, and
/// color metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageFormat {
    pub width: usize,
    pub height: usize,
    pub pixel_type: PixelType,
    /// Horizontal chroma subsampling shift, 0/1/2 (4:4:4 / 4:2:2 / 4:2:0-style).
    pub subsample_w: u32,
    /// Vertical chroma subsampling shift, 0/1/2.
    pub subsample_h: u32,
    pub color_family: ColorFamily,
    pub depth: u32,
    pub pixel_range: PixelRange,
    pub matrix: MatrixCoefficients,
    pub transfer: TransferCharacteristics,
    pub primaries: ColorPrimaries,
    pub chroma_location: ChromaLocation,
    pub field_parity: FieldParity,
}

impl ImageFormat {
    /// Zero-initialized format with every enumerated field set to a
    /// sentinel "unspecified"/neutral value, mirroring
    /// `image_format_default`.
    pub fn default_for(width: usize, height: usize, pixel_type: PixelType) -> Self {
        ImageFormat {
            width,
            height,
            pixel_type,
            subsample_w: 0,
            subsample_h: 0,
            color_family: ColorFamily::Gray,
            depth: pixel_type.container_bits(),
            pixel_range: PixelRange::Limited,
            matrix: MatrixCoefficients::Unspecified,
            transfer: TransferCharacteristics::Unspecified,
            primaries: ColorPrimaries::Unspecified,
            chroma_location: ChromaLocation::Left,
            field_parity: FieldParity::Progressive,
        }
    }

    /// Validates the invariants from the data model: GRAY/RGB formats must
    /// not be subsampled, RGB formats must use the RGB matrix and full
    /// range, and both dimensions must be evenly divisible by the
    /// subsampling factor.
    pub fn validate(&self) -> Result<()> {
        match self.color_family {
            ColorFamily::Gray | ColorFamily::Rgb => {
                if self.subsample_w != 0 || self.subsample_h != 0 {
                    return Err(Error::GreyscaleSubsampling {
                        message: format!(
                            "{:?} format cannot have non-zero subsampling ({}, {})",
                            self.color_family, self.subsample_w, self.subsample_h
                        ),
                    });
                }
            }
            ColorFamily::Yuv => {}
        }

        if self.color_family == ColorFamily::Rgb {
            if self.matrix != MatrixCoefficients::Rgb {
                return Err(Error::ColorFamilyMismatch {
                    message: "RGB format must use MatrixCoefficients::Rgb".into(),
                });
            }
            if self.pixel_range != PixelRange::Full {
                return Err(Error::IllegalArgument {
                    message: "RGB format must use full pixel range".into(),
                });
            }
        }

        if self.subsample_w > 0 {
            let factor = 1usize << self.subsample_w;
            if self.width % factor != 0 {
                return Err(Error::ImageNotDivisible { dimension: self.width, factor });
            }
        }
        if self.subsample_h > 0 {
            let factor = 1usize << self.subsample_h;
            if self.height % factor != 0 {
                return Err(Error::ImageNotDivisible { dimension: self.height, factor });
            }
        }

        Ok(())
    }

    /// True if this format is chroma-subsampled in either axis.
    pub fn is_subsampled(&self) -> bool {
        self.subsample_w > 0 || self.subsample_h > 0
    }

    /// Number of planes this format carries: 1 for GRAY, 3 for RGB/YUV.
    pub fn plane_count(&self) -> usize {
        match self.color_family {
            ColorFamily::Gray => 1,
            ColorFamily::Rgb | ColorFamily::Yuv => 3,
        }
    }

    /// Dimensions of plane `p` (0 = luma/green, 1/2 = chroma), accounting
    /// for subsampling.
    pub fn plane_dims(&self, p: usize) -> (usize, usize) {
        if p == 0 || self.color_family != ColorFamily::Yuv {
            (self.width, self.height)
        } else {
            (
                self.width >> self.subsample_w,
                self.height >> self.subsample_h,
            )
        }
    }
}

/// The `(width, height, pixel_type)` triple a filter advertises about its
/// own output; a subset of [`ImageFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageAttributes {
    pub width: usize,
    pub height: usize,
    pub pixel_type: PixelType,
}

impl From<ImageFormat> for ImageAttributes {
    fn from(f: ImageFormat) -> Self {
        ImageAttributes { width: f.width, height: f.height, pixel_type: f.pixel_type }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yuv420() -> ImageFormat {
        ImageFormat {
            width: 1920,
            height: 1080,
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

    #[test]
    fn yuv420_validates() {
        assert!(yuv420().validate().is_ok());
    }

    #[test]
    fn gray_with_subsampling_rejected() {
        let mut f = yuv420();
        f.color_family = ColorFamily::Gray;
        assert!(f.validate().is_err());
    }

    #[test]
    fn rgb_requires_rgb_matrix_and_full_range() {
        let mut f = yuv420();
        f.color_family = ColorFamily::Rgb;
        f.subsample_w = 0;
        f.subsample_h = 0;
        assert!(f.validate().is_err());
        f.matrix = MatrixCoefficients::Rgb;
        assert!(f.validate().is_err());
        f.pixel_range = PixelRange::Full;
        assert!(f.validate().is_ok());
    }

    #[test]
    fn odd_dimension_rejected_when_subsampled() {
        let mut f = yuv420();
        f.width = 1921;
        assert!(f.validate().is_err());
    }

    #[test]
    fn plane_dims_account_for_subsampling() {
        let f = yuv420();
        assert_eq!(f.plane_dims(0), (1920, 1080));
        assert_eq!(f.plane_dims(1), (960, 540));
    }
}
