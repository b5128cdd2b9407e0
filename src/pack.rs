// ============================================================================
// CHANNEL PACKING — merge grayscale maps into RGB / RGBA composites
// ============================================================================

use image::{DynamicImage, GrayImage, ImageError, RgbImage, RgbaImage};
use rayon::prelude::*;
use std::path::PathBuf;

/// Error type for loading, packing and writing texture maps.
#[derive(Debug)]
pub enum PackError {
    /// Maps fed into one composite differ in size.
    DimensionMismatch {
        what: &'static str,
        sizes: Vec<(&'static str, (u32, u32))>,
    },
    /// File exists but could not be decoded.
    Decode { path: PathBuf, source: ImageError },
    /// Encoding or writing an output failed.
    Encode { path: PathBuf, source: ImageError },
    Io { path: PathBuf, source: std::io::Error },
    UnsupportedFormat(PathBuf),
    /// Output would overwrite the input it is copied from.
    SameFile(PathBuf),
}

impl std::fmt::Display for PackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackError::DimensionMismatch { what, sizes } => {
                write!(f, "{} dimensions do not match", what)?;
                let list: Vec<String> = sizes
                    .iter()
                    .map(|(name, (w, h))| format!("{} {}x{}", name, w, h))
                    .collect();
                write!(f, " ({}).", list.join(", "))
            }
            PackError::Decode { path, source } => {
                write!(f, "could not read {}: {}", path.display(), source)
            }
            PackError::Encode { path, source } => {
                write!(f, "error saving {}: {}", file_label(path), source)
            }
            PackError::Io { path, source } => {
                write!(f, "error writing {}: {}", file_label(path), source)
            }
            PackError::UnsupportedFormat(path) => {
                write!(f, "unsupported image format: {}", path.display())
            }
            PackError::SameFile(path) => {
                write!(f, "{} is both the source and the output", path.display())
            }
        }
    }
}

impl std::error::Error for PackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PackError::Decode { source, .. } | PackError::Encode { source, .. } => Some(source),
            PackError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn file_label(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn check_same_size(
    what: &'static str,
    sizes: &[(&'static str, (u32, u32))],
) -> Result<(u32, u32), PackError> {
    let first = sizes.first().map(|(_, d)| *d).unwrap_or((0, 0));
    if sizes.iter().all(|(_, d)| *d == first) {
        Ok(first)
    } else {
        Err(PackError::DimensionMismatch {
            what,
            sizes: sizes.to_vec(),
        })
    }
}

// ============================================================================
// RECIPES
// ============================================================================

/// `_BR`: RGB = base color, A = roughness.
pub fn pack_br(base: &RgbImage, roughness: &GrayImage) -> Result<RgbaImage, PackError> {
    check_same_size(
        "Base Color and Roughness",
        &[
            ("Base Color", base.dimensions()),
            ("Roughness", roughness.dimensions()),
        ],
    )?;
    Ok(put_alpha(base, roughness))
}

/// `_BA`: RGB = base color, A = alpha.
pub fn pack_ba(base: &RgbImage, alpha: &GrayImage) -> Result<RgbaImage, PackError> {
    check_same_size(
        "Base Color and Alpha",
        &[("Base Color", base.dimensions()), ("Alpha", alpha.dimensions())],
    )?;
    Ok(put_alpha(base, alpha))
}

/// `_MEO`: R = metallic, G = emission, B = occlusion. No alpha channel.
pub fn pack_meo(
    metallic: &GrayImage,
    emission: &GrayImage,
    occlusion: &GrayImage,
) -> Result<RgbImage, PackError> {
    check_same_size(
        "MEO map",
        &[
            ("Metallic", metallic.dimensions()),
            ("Emission", emission.dimensions()),
            ("Occlusion", occlusion.dimensions()),
        ],
    )?;
    Ok(merge_rgb(metallic, emission, occlusion))
}

/// `_MESA`: R = metallic, G = emission, B = smoothness, A = alpha.
pub fn pack_mesa(
    metallic: &GrayImage,
    emission: &GrayImage,
    smoothness: &GrayImage,
    alpha: &GrayImage,
) -> Result<RgbaImage, PackError> {
    check_same_size(
        "MESA map",
        &[
            ("Metallic", metallic.dimensions()),
            ("Emission", emission.dimensions()),
            ("Smoothness", smoothness.dimensions()),
            ("Alpha", alpha.dimensions()),
        ],
    )?;
    let rgb = merge_rgb(metallic, emission, smoothness);
    Ok(put_alpha(&rgb, alpha))
}

// ============================================================================
// CHANNEL PRIMITIVES
// ============================================================================
//
// Callers have already checked that all inputs share one size.

/// Attach `alpha` as the fourth channel of `rgb`.
fn put_alpha(rgb: &RgbImage, alpha: &GrayImage) -> RgbaImage {
    let (w, h) = rgb.dimensions();
    let mut out = RgbaImage::new(w, h);
    let buf: &mut [u8] = &mut out;
    buf.par_chunks_mut(4)
        .zip(rgb.as_raw().par_chunks(3))
        .zip(alpha.as_raw().par_iter())
        .for_each(|((dst, src), &a)| {
            dst[..3].copy_from_slice(src);
            dst[3] = a;
        });
    out
}

/// Interleave three single-channel maps into one RGB image.
fn merge_rgb(r: &GrayImage, g: &GrayImage, b: &GrayImage) -> RgbImage {
    let (w, h) = r.dimensions();
    let mut out = RgbImage::new(w, h);
    let buf: &mut [u8] = &mut out;
    buf.par_chunks_mut(3)
        .zip(r.as_raw().par_iter())
        .zip(g.as_raw().par_iter())
        .zip(b.as_raw().par_iter())
        .for_each(|(((dst, &r), &g), &b)| {
            dst[0] = r;
            dst[1] = g;
            dst[2] = b;
        });
    out
}

/// Reduce any decoded map to one 8-bit channel.
///
/// Gray sources pass through (alpha dropped, 16-bit scaled down). Colour
/// sources use ITU-R 601-2 luma in 16.16 fixed point, so a colour map dropped
/// into a channel slot gives the same values as common paint tools.
pub fn to_luma(img: &DynamicImage) -> GrayImage {
    match img {
        DynamicImage::ImageLuma8(gray) => gray.clone(),
        DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_) => img.to_luma8(),
        _ => luma_601(&img.to_rgb8()),
    }
}

fn luma_601(rgb: &RgbImage) -> GrayImage {
    let (w, h) = rgb.dimensions();
    let mut out = GrayImage::new(w, h);
    let buf: &mut [u8] = &mut out;
    buf.par_iter_mut()
        .zip(rgb.as_raw().par_chunks(3))
        .for_each(|(dst, px)| {
            let l = px[0] as u32 * 19595 + px[1] as u32 * 38470 + px[2] as u32 * 7471 + 0x8000;
            *dst = (l >> 16) as u8;
        });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, Rgba};

    fn gray(w: u32, h: u32, v: u8) -> GrayImage {
        GrayImage::from_pixel(w, h, Luma([v]))
    }

    #[test]
    fn br_copies_rgb_and_roughness_into_alpha() {
        let base = RgbImage::from_fn(2, 2, |x, y| Rgb([x as u8 * 10, y as u8 * 20, 7]));
        let rough = GrayImage::from_fn(2, 2, |x, y| Luma([100 + (x + 2 * y) as u8]));
        let out = pack_br(&base, &rough).unwrap();
        assert_eq!(out.dimensions(), (2, 2));
        assert_eq!(*out.get_pixel(0, 0), Rgba([0, 0, 7, 100]));
        assert_eq!(*out.get_pixel(1, 0), Rgba([10, 0, 7, 101]));
        assert_eq!(*out.get_pixel(0, 1), Rgba([0, 20, 7, 102]));
        assert_eq!(*out.get_pixel(1, 1), Rgba([10, 20, 7, 103]));
    }

    #[test]
    fn br_rejects_mismatched_sizes() {
        let base = RgbImage::new(4, 4);
        let rough = gray(4, 2, 0);
        let err = pack_br(&base, &rough).unwrap_err();
        match &err {
            PackError::DimensionMismatch { sizes, .. } => {
                assert_eq!(sizes[0], ("Base Color", (4, 4)));
                assert_eq!(sizes[1], ("Roughness", (4, 2)));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().starts_with("Base Color and Roughness dimensions do not match"));
    }

    #[test]
    fn ba_uses_alpha_map() {
        let base = RgbImage::from_pixel(3, 1, Rgb([1, 2, 3]));
        let alpha = GrayImage::from_fn(3, 1, |x, _| Luma([x as u8 * 127]));
        let out = pack_ba(&base, &alpha).unwrap();
        assert_eq!(*out.get_pixel(2, 0), Rgba([1, 2, 3, 254]));
    }

    #[test]
    fn meo_orders_channels_metallic_emission_occlusion() {
        let out = pack_meo(&gray(2, 3, 11), &gray(2, 3, 22), &gray(2, 3, 33)).unwrap();
        assert_eq!(out.dimensions(), (2, 3));
        assert!(out.pixels().all(|p| *p == Rgb([11, 22, 33])));
    }

    #[test]
    fn meo_mismatch_lists_all_maps() {
        let err = pack_meo(&gray(2, 2, 0), &gray(2, 2, 0), &gray(3, 2, 0)).unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("MEO map dimensions do not match"));
        assert!(msg.contains("Occlusion 3x2"));
    }

    #[test]
    fn mesa_packs_four_channels() {
        let out = pack_mesa(&gray(1, 1, 1), &gray(1, 1, 2), &gray(1, 1, 3), &gray(1, 1, 4)).unwrap();
        assert_eq!(*out.get_pixel(0, 0), Rgba([1, 2, 3, 4]));
    }

    #[test]
    fn mesa_rejects_alpha_of_other_size() {
        let err = pack_mesa(&gray(2, 2, 0), &gray(2, 2, 0), &gray(2, 2, 0), &gray(1, 1, 0));
        assert!(matches!(err, Err(PackError::DimensionMismatch { what: "MESA map", .. })));
    }

    #[test]
    fn empty_maps_of_equal_size_pack_to_empty_image() {
        let out = pack_ba(&RgbImage::new(0, 0), &GrayImage::new(0, 0)).unwrap();
        assert_eq!(out.dimensions(), (0, 0));
    }

    #[test]
    fn luma_of_primaries_matches_rec601_fixed_point() {
        let rgb = RgbImage::from_fn(4, 1, |x, _| match x {
            0 => Rgb([255, 0, 0]),
            1 => Rgb([0, 255, 0]),
            2 => Rgb([0, 0, 255]),
            _ => Rgb([255, 255, 255]),
        });
        let l = to_luma(&DynamicImage::ImageRgb8(rgb));
        assert_eq!(l.as_raw(), &vec![76, 150, 29, 255]);
    }

    #[test]
    fn luma_passes_gray_through_and_drops_gray_alpha() {
        let g = GrayImage::from_fn(2, 1, |x, _| Luma([x as u8 + 40]));
        assert_eq!(to_luma(&DynamicImage::ImageLuma8(g.clone())), g);

        let la = image::GrayAlphaImage::from_pixel(1, 1, image::LumaA([90, 3]));
        assert_eq!(to_luma(&DynamicImage::ImageLumaA8(la)).as_raw(), &vec![90]);
    }

    #[test]
    fn luma_ignores_rgba_alpha() {
        let rgba = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 0]));
        assert_eq!(to_luma(&DynamicImage::ImageRgba8(rgba)).as_raw(), &vec![255]);
    }
}
