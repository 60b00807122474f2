//! Luma/chroma (YUV) decomposition of BGR images.
//!
//! Uses the analog YUV weights (BT.601 luma):
//!
//! ```text
//! Y = 0.299 R + 0.587 G + 0.114 B
//! U = 0.492 (B - Y) + 128
//! V = 0.877 (R - Y) + 128
//! ```
//!
//! and the matching inverse. All results are rounded and saturated to u8.
//! Gray pixels (R = G = B) map to U = V = 128 and back to the same gray.

use ndarray::Array2;

use crate::error::{EnhanceError, Result};
use crate::plane::{ChannelPlane, ColorImage, BLUE, GREEN, RED};

const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

const U_SCALE: f32 = 0.492;
const V_SCALE: f32 = 0.877;

const V_TO_R: f32 = 1.140;
const U_TO_G: f32 = -0.395;
const V_TO_G: f32 = -0.581;
const U_TO_B: f32 = 2.032;

const CHROMA_OFFSET: f32 = 128.0;

#[inline]
fn saturate(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Convert one BGR pixel to (Y, U, V).
#[inline]
pub fn bgr_to_yuv(b: u8, g: u8, r: u8) -> (u8, u8, u8) {
    let (bf, gf, rf) = (b as f32, g as f32, r as f32);
    let y = LUMA_R * rf + LUMA_G * gf + LUMA_B * bf;
    let u = U_SCALE * (bf - y) + CHROMA_OFFSET;
    let v = V_SCALE * (rf - y) + CHROMA_OFFSET;
    (saturate(y), saturate(u), saturate(v))
}

/// Convert one (Y, U, V) triple back to BGR.
#[inline]
pub fn yuv_to_bgr(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let yf = y as f32;
    let uf = u as f32 - CHROMA_OFFSET;
    let vf = v as f32 - CHROMA_OFFSET;
    let r = yf + V_TO_R * vf;
    let g = yf + U_TO_G * uf + V_TO_G * vf;
    let b = yf + U_TO_B * uf;
    (saturate(b), saturate(g), saturate(r))
}

/// Luma plane plus two chroma planes of one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumaChroma {
    pub luma: ChannelPlane,
    pub u: ChannelPlane,
    pub v: ChannelPlane,
}

impl LumaChroma {
    /// Decompose a 3-plane BGR image.
    ///
    /// # Errors
    /// [`EnhanceError::InvalidChannelCount`] for grayscale input
    pub fn from_bgr(image: &ColorImage) -> Result<Self> {
        if image.channels() != 3 {
            return Err(EnhanceError::InvalidChannelCount(image.channels()));
        }
        let planes = image.planes();
        let (blue, green, red) = (&planes[BLUE], &planes[GREEN], &planes[RED]);

        let dim = image.dim();
        let mut luma = Array2::<u8>::zeros(dim);
        let mut u = Array2::<u8>::zeros(dim);
        let mut v = Array2::<u8>::zeros(dim);

        for ((y, x), out) in luma.indexed_iter_mut() {
            let (ly, lu, lv) = bgr_to_yuv(blue[[y, x]], green[[y, x]], red[[y, x]]);
            *out = ly;
            u[[y, x]] = lu;
            v[[y, x]] = lv;
        }

        Ok(LumaChroma { luma, u, v })
    }

    /// Recombine into a BGR image.
    pub fn to_bgr(&self) -> Result<ColorImage> {
        let dim = self.luma.dim();
        for plane in [&self.u, &self.v] {
            if plane.dim() != dim {
                return Err(EnhanceError::DimensionMismatch {
                    expected: dim,
                    actual: plane.dim(),
                });
            }
        }

        let mut blue = Array2::<u8>::zeros(dim);
        let mut green = Array2::<u8>::zeros(dim);
        let mut red = Array2::<u8>::zeros(dim);

        for ((y, x), &ly) in self.luma.indexed_iter() {
            let (b, g, r) = yuv_to_bgr(ly, self.u[[y, x]], self.v[[y, x]]);
            blue[[y, x]] = b;
            green[[y, x]] = g;
            red[[y, x]] = r;
        }

        ColorImage::bgr(blue, green, red)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_has_neutral_chroma() {
        for v in [0u8, 1, 64, 128, 200, 255] {
            assert_eq!(bgr_to_yuv(v, v, v), (v, 128, 128));
            assert_eq!(yuv_to_bgr(v, 128, 128), (v, v, v));
        }
    }

    #[test]
    fn test_primary_luma_weights() {
        // Pure red: Y = 0.299 * 255 = 76.2
        let (y, _, v) = bgr_to_yuv(0, 0, 255);
        assert_eq!(y, 76);
        assert!(v > 128);

        // Pure blue: Y = 0.114 * 255 = 29.1
        let (y, u, _) = bgr_to_yuv(255, 0, 0);
        assert_eq!(y, 29);
        assert!(u > 128);
    }

    #[test]
    fn test_roundtrip_close() {
        let colors = [(30u8, 60u8, 90u8), (128, 64, 32), (10, 200, 100), (90, 90, 180)];
        for (b, g, r) in colors {
            let (y, u, v) = bgr_to_yuv(b, g, r);
            let (rb, rg, rr) = yuv_to_bgr(y, u, v);
            assert!(
                (rb as i32 - b as i32).abs() <= 3
                    && (rg as i32 - g as i32).abs() <= 3
                    && (rr as i32 - r as i32).abs() <= 3,
                "roundtrip failed for ({b},{g},{r}): got ({rb},{rg},{rr})"
            );
        }
    }

    #[test]
    fn test_from_bgr_rejects_grayscale() {
        let image = ColorImage::filled(2, 2, 1, 50).unwrap();
        assert!(matches!(
            LumaChroma::from_bgr(&image),
            Err(EnhanceError::InvalidChannelCount(1))
        ));
    }

    #[test]
    fn test_planes_roundtrip_gray_image() {
        let image = ColorImage::filled(3, 4, 3, 77).unwrap();
        let yuv = LumaChroma::from_bgr(&image).unwrap();
        assert!(yuv.u.iter().all(|&c| c == 128));
        assert!(yuv.v.iter().all(|&c| c == 128));
        assert_eq!(yuv.to_bgr().unwrap(), image);
    }
}
