use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, GrayImage, ImageEncoder, RgbImage, RgbaImage};
use rfd::FileDialog;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::pack::{PackError, to_luma};

/// Extensions accepted for input maps (lowercase).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tga"];

/// Check if a path has one of the [`SUPPORTED_EXTENSIONS`], ignoring case.
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// A map can be assigned to a slot only if it exists and looks like an image.
pub fn is_supported_image(path: &Path) -> bool {
    path.is_file() && has_supported_extension(path)
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

// ============================================================================
// DECODE
// ============================================================================

fn open_map(path: &Path) -> Result<DynamicImage, PackError> {
    if !has_supported_extension(path) {
        return Err(PackError::UnsupportedFormat(path.to_path_buf()));
    }
    image::open(path).map_err(|source| PackError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a colour map as 8-bit RGB. Any alpha channel is discarded.
pub fn load_rgb(path: &Path) -> Result<RgbImage, PackError> {
    Ok(open_map(path)?.to_rgb8())
}

/// Load a map as a single 8-bit channel (see [`to_luma`]).
pub fn load_gray(path: &Path) -> Result<GrayImage, PackError> {
    Ok(to_luma(&open_map(path)?))
}

/// Read only the header to get `(width, height)`.
pub fn probe_dimensions(path: &Path) -> Result<(u32, u32), PackError> {
    image::image_dimensions(path).map_err(|source| PackError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode a downscaled RGBA preview no larger than `max` on either side.
pub fn load_thumbnail(path: &Path, max: u32) -> Result<RgbaImage, PackError> {
    let img = open_map(path)?;
    Ok(img.thumbnail(max, max).to_rgba8())
}

// ============================================================================
// ENCODE
// ============================================================================

/// Encode an 8-bit image buffer as PNG at `path`.
fn write_png(raw: &[u8], width: u32, height: u32, color: ColorType, path: &Path) -> Result<(), PackError> {
    let file = File::create(path).map_err(|source| PackError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let writer = BufWriter::new(file);
    PngEncoder::new(writer)
        .write_image(raw, width, height, color)
        .map_err(|source| PackError::Encode {
            path: path.to_path_buf(),
            source,
        })
}

pub fn save_png_rgba(image: &RgbaImage, path: &Path) -> Result<(), PackError> {
    write_png(image.as_raw(), image.width(), image.height(), ColorType::Rgba8, path)
}

pub fn save_png_rgb(image: &RgbImage, path: &Path) -> Result<(), PackError> {
    write_png(image.as_raw(), image.width(), image.height(), ColorType::Rgb8, path)
}

/// Produce the `_B` output from the base colour file.
///
/// PNG sources are copied byte-for-byte. JPEG/TGA sources are decoded and
/// re-encoded so the written file really is a PNG. Refuses to write over
/// the source itself.
pub fn write_base_copy(src: &Path, dst: &Path) -> Result<(), PackError> {
    if same_file(src, dst) {
        return Err(PackError::SameFile(dst.to_path_buf()));
    }
    if is_png(src) {
        std::fs::copy(src, dst).map_err(|source| PackError::Io {
            path: dst.to_path_buf(),
            source,
        })?;
        return Ok(());
    }
    let img = open_map(src)?;
    let rgba = img.to_rgba8();
    save_png_rgba(&rgba, dst)
}

/// Both paths resolve to one existing file.
fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

// ============================================================================
// NATIVE DIALOGS
// ============================================================================

/// Show a native picker for one input map.
pub fn pick_map_file(title: &str, start_dir: Option<&Path>) -> Option<PathBuf> {
    let mut dialog = FileDialog::new()
        .set_title(title)
        .add_filter("Images", SUPPORTED_EXTENSIONS)
        .add_filter("All Files", &["*"]);
    if let Some(dir) = start_dir {
        dialog = dialog.set_directory(dir);
    }
    dialog.pick_file()
}

/// Show a native folder picker for the output directory.
pub fn pick_output_dir(title: &str, start_dir: Option<&Path>) -> Option<PathBuf> {
    let mut dialog = FileDialog::new().set_title(title);
    if let Some(dir) = start_dir.filter(|d| d.is_dir()) {
        dialog = dialog.set_directory(dir);
    }
    dialog.pick_folder()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, Rgba};

    #[test]
    fn extension_check_ignores_case() {
        assert!(has_supported_extension(Path::new("a/b/Brick_Rough.PNG")));
        assert!(has_supported_extension(Path::new("x.Jpeg")));
        assert!(has_supported_extension(Path::new("x.tga")));
        assert!(!has_supported_extension(Path::new("x.webp")));
        assert!(!has_supported_extension(Path::new("noext")));
    }

    #[test]
    fn missing_file_is_not_supported_image() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_supported_image(&dir.path().join("ghost.png")));
        let real = dir.path().join("real.png");
        save_png_rgb(&RgbImage::new(1, 1), &real).unwrap();
        assert!(is_supported_image(&real));
    }

    #[test]
    fn gray_load_converts_colour_maps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metal.png");
        save_png_rgb(&RgbImage::from_pixel(2, 2, Rgb([255, 0, 0])), &path).unwrap();
        let g = load_gray(&path).unwrap();
        assert_eq!(g.dimensions(), (2, 2));
        assert!(g.pixels().all(|p| *p == Luma([76])));
    }

    #[test]
    fn rgb_load_drops_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("base.png");
        save_png_rgba(&RgbaImage::from_pixel(1, 1, Rgba([9, 8, 7, 0])), &path).unwrap();
        assert_eq!(*load_rgb(&path).unwrap().get_pixel(0, 0), Rgb([9, 8, 7]));
        assert_eq!(probe_dimensions(&path).unwrap(), (1, 1));
    }

    #[test]
    fn corrupt_file_reports_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();
        assert!(matches!(load_rgb(&path), Err(PackError::Decode { .. })));
    }

    #[test]
    fn base_copy_keeps_png_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.png");
        let dst = dir.path().join("Sky_B.png");
        save_png_rgba(&RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 4])), &src).unwrap();
        write_base_copy(&src, &dst).unwrap();
        assert_eq!(std::fs::read(&src).unwrap(), std::fs::read(&dst).unwrap());
    }

    #[test]
    fn base_copy_onto_its_own_source_fails_and_keeps_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("Sky_B.png");
        save_png_rgba(&RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 4])), &src).unwrap();
        let before = std::fs::read(&src).unwrap();

        let err = write_base_copy(&src, &src).unwrap_err();
        assert!(matches!(err, PackError::SameFile(_)));

        // Same file reached through a different spelling of the path
        let dotted = dir.path().join(".").join("Sky_B.png");
        assert!(matches!(write_base_copy(&src, &dotted), Err(PackError::SameFile(_))));

        assert_eq!(std::fs::read(&src).unwrap(), before);
    }

    #[test]
    fn base_copy_reencodes_tga_as_png() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.tga");
        let dst = dir.path().join("Sky_B.png");
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255])))
            .save(&src)
            .unwrap();
        write_base_copy(&src, &dst).unwrap();
        let bytes = std::fs::read(&dst).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        let back = image::open(&dst).unwrap().to_rgba8();
        assert_eq!(*back.get_pixel(1, 1), Rgba([10, 20, 30, 255]));
    }
}
