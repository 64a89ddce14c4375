//! Supported input formats, keyed by file extension.
//!
//! One static table backs both the CLI's file-acceptance filter and
//! `imgnorm --formats`. Entries the built-in decoder cannot read are still
//! listed so they are recognised as images and reported as such, rather
//! than being silently ignored when a directory is scanned.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// Image container families accepted at the upload boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SourceFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
    Bmp,
    Tiff,
    Ico,
    Pnm,
    Tga,
    Hdr,
    Qoi,
    Jpeg2000,
    CameraRaw,
    Vector,
    Heif,
    Avif,
    Photoshop,
    Pcx,
    Sgi,
    SunRaster,
    Wbmp,
    Fits,
    Dicom,
    OpenExr,
    Dds,
    Flif,
    Mng,
    Legacy,
}

static EXTENSIONS: &[(&str, SourceFormat)] = &[
    ("jpg", SourceFormat::Jpeg),
    ("jpeg", SourceFormat::Jpeg),
    ("jpe", SourceFormat::Jpeg),
    ("jfif", SourceFormat::Jpeg),
    ("jfi", SourceFormat::Jpeg),
    ("png", SourceFormat::Png),
    ("gif", SourceFormat::Gif),
    ("webp", SourceFormat::WebP),
    ("bmp", SourceFormat::Bmp),
    ("dib", SourceFormat::Bmp),
    ("tif", SourceFormat::Tiff),
    ("tiff", SourceFormat::Tiff),
    ("ico", SourceFormat::Ico),
    ("ppm", SourceFormat::Pnm),
    ("pgm", SourceFormat::Pnm),
    ("pbm", SourceFormat::Pnm),
    ("pnm", SourceFormat::Pnm),
    ("tga", SourceFormat::Tga),
    ("icb", SourceFormat::Tga),
    ("vda", SourceFormat::Tga),
    ("vst", SourceFormat::Tga),
    ("hdr", SourceFormat::Hdr),
    ("pic", SourceFormat::Hdr),
    ("qoi", SourceFormat::Qoi),
    ("jp2", SourceFormat::Jpeg2000),
    ("j2k", SourceFormat::Jpeg2000),
    ("jpf", SourceFormat::Jpeg2000),
    ("jpx", SourceFormat::Jpeg2000),
    ("jpm", SourceFormat::Jpeg2000),
    ("raw", SourceFormat::CameraRaw),
    ("dng", SourceFormat::CameraRaw),
    ("cr2", SourceFormat::CameraRaw),
    ("nef", SourceFormat::CameraRaw),
    ("arw", SourceFormat::CameraRaw),
    ("orf", SourceFormat::CameraRaw),
    ("rw2", SourceFormat::CameraRaw),
    ("pef", SourceFormat::CameraRaw),
    ("srw", SourceFormat::CameraRaw),
    ("svg", SourceFormat::Vector),
    ("svgz", SourceFormat::Vector),
    ("eps", SourceFormat::Vector),
    ("ps", SourceFormat::Vector),
    ("pdf", SourceFormat::Vector),
    ("wmf", SourceFormat::Vector),
    ("emf", SourceFormat::Vector),
    ("heif", SourceFormat::Heif),
    ("heic", SourceFormat::Heif),
    ("heics", SourceFormat::Heif),
    ("avif", SourceFormat::Avif),
    ("avifs", SourceFormat::Avif),
    ("psd", SourceFormat::Photoshop),
    ("psb", SourceFormat::Photoshop),
    ("pcx", SourceFormat::Pcx),
    ("sgi", SourceFormat::Sgi),
    ("rgb", SourceFormat::Sgi),
    ("bw", SourceFormat::Sgi),
    ("ras", SourceFormat::SunRaster),
    ("wbmp", SourceFormat::Wbmp),
    ("fits", SourceFormat::Fits),
    ("fit", SourceFormat::Fits),
    ("fts", SourceFormat::Fits),
    ("dcm", SourceFormat::Dicom),
    ("dicom", SourceFormat::Dicom),
    ("exr", SourceFormat::OpenExr),
    ("dds", SourceFormat::Dds),
    ("flif", SourceFormat::Flif),
    ("mng", SourceFormat::Mng),
    ("cur", SourceFormat::Legacy),
    ("xbm", SourceFormat::Legacy),
    ("xpm", SourceFormat::Legacy),
    ("im", SourceFormat::Legacy),
    ("msp", SourceFormat::Legacy),
    ("palm", SourceFormat::Legacy),
    ("pcd", SourceFormat::Legacy),
    ("pixar", SourceFormat::Legacy),
    ("spider", SourceFormat::Legacy),
    ("wal", SourceFormat::Legacy),
];

static BY_EXTENSION: Lazy<HashMap<&'static str, SourceFormat>> =
    Lazy::new(|| EXTENSIONS.iter().copied().collect());

impl SourceFormat {
    /// Look up a bare extension, case-insensitively, without the dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        BY_EXTENSION.get(ext.to_ascii_lowercase().as_str()).copied()
    }

    /// Look up the extension of a file name or path.
    pub fn from_filename(name: &str) -> Option<Self> {
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// The `image` crate format used when content sniffing is inconclusive
    /// (TGA, for example, has no magic bytes).
    pub fn image_format(self) -> Option<image::ImageFormat> {
        use image::ImageFormat as F;
        match self {
            SourceFormat::Jpeg => Some(F::Jpeg),
            SourceFormat::Png => Some(F::Png),
            SourceFormat::Gif => Some(F::Gif),
            SourceFormat::WebP => Some(F::WebP),
            SourceFormat::Bmp => Some(F::Bmp),
            SourceFormat::Tiff => Some(F::Tiff),
            SourceFormat::Ico => Some(F::Ico),
            SourceFormat::Pnm => Some(F::Pnm),
            SourceFormat::Tga => Some(F::Tga),
            SourceFormat::Hdr => Some(F::Hdr),
            SourceFormat::Qoi => Some(F::Qoi),
            _ => None,
        }
    }

    /// Whether the built-in codec can decode this family.
    pub fn is_decodable(self) -> bool {
        self.image_format().is_some()
    }

    /// All extensions registered for this family, in table order.
    pub fn extensions(self) -> Vec<&'static str> {
        EXTENSIONS
            .iter()
            .filter(|(_, f)| *f == self)
            .map(|(e, _)| *e)
            .collect()
    }

    /// Every family, each listed once, in table order.
    pub fn all() -> Vec<SourceFormat> {
        let mut seen = Vec::new();
        for (_, f) in EXTENSIONS {
            if !seen.contains(f) {
                seen.push(*f);
            }
        }
        seen
    }
}
