//! Raster decode/encode at the pipeline boundary.
//!
//! Decoding keeps grayscale sources as one plane and turns everything with
//! colour into BGR planes. Alpha is dropped and deeper samples are reduced
//! to 8 bits. Encoding writes the planes back in the requested format.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use ndarray::Array2;
use serde::Deserialize;

use crate::error::{EnhanceError, Result};
use crate::plane::{ColorImage, BLUE, GREEN, RED};

/// Raster formats the pipeline can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Jpeg,
    Bmp,
    Tiff,
}

impl OutputFormat {
    /// Matching writable format for a decoded source format.
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(OutputFormat::Png),
            ImageFormat::Jpeg => Some(OutputFormat::Jpeg),
            ImageFormat::Bmp => Some(OutputFormat::Bmp),
            ImageFormat::Tiff => Some(OutputFormat::Tiff),
            _ => None,
        }
    }

    /// Pick a format from a file extension (case-insensitive, no dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(OutputFormat::Png),
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "bmp" => Some(OutputFormat::Bmp),
            "tif" | "tiff" => Some(OutputFormat::Tiff),
            _ => None,
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Bmp => ImageFormat::Bmp,
            OutputFormat::Tiff => ImageFormat::Tiff,
        }
    }
}

/// A decoded image plus the format it came in.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub image: ColorImage,
    /// Source format, or PNG when the source cannot be written back
    pub format: OutputFormat,
}

/// Decode encoded raster bytes.
///
/// # Errors
/// [`EnhanceError::Decode`] for empty, unrecognized or corrupt input
pub fn decode(bytes: &[u8]) -> Result<Decoded> {
    if bytes.is_empty() {
        return Err(EnhanceError::Decode("no image supplied".to_string()));
    }

    let source_format = image::guess_format(bytes)?;
    let dynamic = image::load_from_memory_with_format(bytes, source_format)?;
    let image = from_dynamic(&dynamic)?;

    Ok(Decoded {
        image,
        format: OutputFormat::from_image_format(source_format).unwrap_or(OutputFormat::Png),
    })
}

/// Convert an `image` crate buffer into planes.
pub fn from_dynamic(dynamic: &DynamicImage) -> Result<ColorImage> {
    let (width, height) = (dynamic.width() as usize, dynamic.height() as usize);

    if !dynamic.color().has_color() {
        let gray = dynamic.to_luma8();
        let plane = Array2::from_shape_vec((height, width), gray.into_raw())
            .map_err(|e| EnhanceError::Decode(e.to_string()))?;
        return ColorImage::gray(plane);
    }

    let rgb = dynamic.to_rgb8();
    let mut blue = Array2::<u8>::zeros((height, width));
    let mut green = Array2::<u8>::zeros((height, width));
    let mut red = Array2::<u8>::zeros((height, width));
    for (x, y, px) in rgb.enumerate_pixels() {
        let (y, x) = (y as usize, x as usize);
        red[[y, x]] = px[0];
        green[[y, x]] = px[1];
        blue[[y, x]] = px[2];
    }

    ColorImage::bgr(blue, green, red)
}

/// Convert planes into an `image` crate buffer.
pub fn to_dynamic(image: &ColorImage) -> Result<DynamicImage> {
    let (height, width) = image.dim();
    let planes = image.planes();

    if image.is_grayscale() {
        let raw: Vec<u8> = planes[0].iter().copied().collect();
        let gray = GrayImage::from_raw(width as u32, height as u32, raw)
            .ok_or_else(|| EnhanceError::Encode("gray buffer size mismatch".to_string()))?;
        return Ok(DynamicImage::ImageLuma8(gray));
    }

    let rgb = RgbImage::from_fn(width as u32, height as u32, |x, y| {
        let (y, x) = (y as usize, x as usize);
        image::Rgb([planes[RED][[y, x]], planes[GREEN][[y, x]], planes[BLUE][[y, x]]])
    });
    Ok(DynamicImage::ImageRgb8(rgb))
}

/// Encode planes in `format`.
pub fn encode(image: &ColorImage, format: OutputFormat) -> Result<Vec<u8>> {
    let dynamic = to_dynamic(image)?;
    let mut buf = Cursor::new(Vec::new());
    dynamic
        .write_to(&mut buf, format.image_format())
        .map_err(|e| EnhanceError::Encode(e.to_string()))?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample_bgr() -> ColorImage {
        ColorImage::bgr(
            array![[10u8, 20, 30], [40, 50, 60]],
            array![[0u8, 100, 200], [1, 2, 3]],
            array![[255u8, 128, 7], [9, 99, 199]],
        )
        .unwrap()
    }

    #[test]
    fn test_png_roundtrip_keeps_bgr_order() {
        let original = sample_bgr();
        let bytes = encode(&original, OutputFormat::Png).unwrap();

        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.format, OutputFormat::Png);
        assert_eq!(decoded.image, original);
    }

    #[test]
    fn test_red_pixel_lands_in_red_plane() {
        let rgb = RgbImage::from_pixel(2, 1, image::Rgb([200, 10, 20]));
        let planes = from_dynamic(&DynamicImage::ImageRgb8(rgb)).unwrap();

        assert_eq!(planes.planes()[RED][[0, 1]], 200);
        assert_eq!(planes.planes()[GREEN][[0, 1]], 10);
        assert_eq!(planes.planes()[BLUE][[0, 1]], 20);
    }

    #[test]
    fn test_grayscale_stays_single_plane() {
        let gray = ColorImage::gray(array![[0u8, 64], [128, 255]]).unwrap();
        let bytes = encode(&gray, OutputFormat::Png).unwrap();

        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.format, OutputFormat::Png);
        assert!(decoded.image.is_grayscale());
        assert_eq!(decoded.image, gray);
    }

    #[test]
    fn test_alpha_is_dropped() {
        let rgba = image::RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 4]));
        let planes = from_dynamic(&DynamicImage::ImageRgba8(rgba)).unwrap();
        assert_eq!(planes.channels(), 3);
        assert_eq!(planes.dim(), (2, 3));
    }

    #[test]
    fn test_decode_rejects_empty_and_garbage() {
        assert!(matches!(decode(&[]), Err(EnhanceError::Decode(_))));
        assert!(matches!(decode(b"definitely not an image"), Err(EnhanceError::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_truncated_png() {
        let bytes = encode(&sample_bgr(), OutputFormat::Png).unwrap();
        let truncated = &bytes[..bytes.len() / 2];
        assert!(matches!(decode(truncated), Err(EnhanceError::Decode(_))));
    }

    #[test]
    fn test_jpeg_keeps_dimensions() {
        let image = ColorImage::filled(16, 24, 3, 90).unwrap();
        let bytes = encode(&image, OutputFormat::Jpeg).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.format, OutputFormat::Jpeg);
        assert_eq!(decoded.image.dim(), (16, 24));
        assert_eq!(decoded.image.channels(), 3);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(OutputFormat::from_extension("JPG"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_extension("tif"), Some(OutputFormat::Tiff));
        assert_eq!(OutputFormat::from_extension("gif"), None);
    }
}
