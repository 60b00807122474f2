//! Histogram line charts.
//!
//! Charts are assembled as an SVG document and rasterized with resvg.
//! The SVG text is a pure function of the histogram data and the
//! [`ChartStyle`], so golden comparisons can be done on [`HistogramRenderer::to_svg`].
//! Raster output additionally depends on the fonts available for the labels.
//!
//! Series colours are assigned by position for display only: first series
//! red, second green, third blue. A single series (grayscale) is drawn black.

use std::fmt::Write as _;
use std::io::Cursor;
use std::sync::Arc;

use base64::Engine;
use image::{ExtendedColorType, ImageEncoder};
use resvg::tiny_skia::{Color, Pixmap};
use resvg::usvg::{self, fontdb, Transform};
use serde::Deserialize;

use super::compute::{Histogram, BINS};
use crate::error::{EnhanceError, Result};

const SERIES_COLORS: [&str; 3] = ["red", "green", "blue"];
const GRAY_COLOR: &str = "black";

const MARGIN_LEFT: f32 = 80.0;
const MARGIN_RIGHT: f32 = 20.0;
const MARGIN_TOP: f32 = 40.0;
const MARGIN_BOTTOM: f32 = 55.0;

const X_TICKS: [usize; 6] = [0, 50, 100, 150, 200, 250];
const MAX_Y_TICKS: u64 = 6;

/// Size and labels of a rendered chart.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Load system fonts for label text
    pub system_fonts: bool,
}

impl Default for ChartStyle {
    fn default() -> Self {
        ChartStyle {
            width: 700,
            height: 500,
            title: "Histogram".to_string(),
            x_label: "Nilai Pixel".to_string(),
            y_label: "Frekuensi".to_string(),
            system_fonts: true,
        }
    }
}

impl ChartStyle {
    /// Smallest canvas that still leaves room for the plot area.
    pub const MIN_SIZE: u32 = 64;

    pub fn validate(&self) -> Result<()> {
        if self.width < Self::MIN_SIZE || self.height < Self::MIN_SIZE {
            return Err(EnhanceError::Config(format!(
                "chart size {}x{} below minimum {}x{}",
                self.width,
                self.height,
                Self::MIN_SIZE,
                Self::MIN_SIZE
            )));
        }
        Ok(())
    }
}

/// Renders histograms to PNG charts.
pub struct HistogramRenderer {
    style: ChartStyle,
    fontdb: Arc<fontdb::Database>,
}

impl HistogramRenderer {
    /// Create a renderer, loading system fonts if the style asks for them.
    pub fn new(style: ChartStyle) -> Self {
        Self::with_fonts(style, Vec::new())
    }

    /// Create a renderer with extra font files (TTF/OTF bytes).
    pub fn with_fonts(style: ChartStyle, fonts: Vec<Vec<u8>>) -> Self {
        let mut db = fontdb::Database::new();
        for data in fonts {
            db.load_font_data(data);
        }
        if style.system_fonts {
            db.load_system_fonts();
        }
        tracing::debug!(font_count = db.len(), "Loaded fonts for histogram labels");

        HistogramRenderer {
            style,
            fontdb: Arc::new(db),
        }
    }

    pub fn style(&self) -> &ChartStyle {
        &self.style
    }

    /// Build the SVG chart document.
    pub fn to_svg(&self, histograms: &[Histogram]) -> String {
        let width = self.style.width as f32;
        let height = self.style.height as f32;
        let plot_w = width - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = height - MARGIN_TOP - MARGIN_BOTTOM;
        let bottom = MARGIN_TOP + plot_h;

        let max_count = histograms.iter().map(Histogram::max_count).max().unwrap_or(0);
        let y_step = tick_step(max_count);
        let y_max = (max_count.div_ceil(y_step) * y_step).max(y_step);

        let x_of = |v: usize| MARGIN_LEFT + v as f32 * plot_w / (BINS - 1) as f32;
        let y_of = |c: u64| bottom - c as f32 * plot_h / y_max as f32;

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.style.width,
            h = self.style.height
        );
        let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);

        // Axes and ticks
        let _ = writeln!(
            svg,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="none" stroke="black" stroke-width="1"/>"#,
            MARGIN_LEFT, MARGIN_TOP, plot_w, plot_h
        );
        for v in X_TICKS {
            let x = x_of(v);
            let _ = writeln!(
                svg,
                r#"<line x1="{x:.2}" y1="{bottom:.2}" x2="{x:.2}" y2="{:.2}" stroke="black" stroke-width="1"/>"#,
                bottom + 5.0
            );
            let _ = writeln!(
                svg,
                r#"<text x="{x:.2}" y="{:.2}" font-family="sans-serif" font-size="12" text-anchor="middle">{v}</text>"#,
                bottom + 19.0
            );
        }
        let mut c = 0;
        while c <= y_max {
            let y = y_of(c);
            let _ = writeln!(
                svg,
                r#"<line x1="{:.2}" y1="{y:.2}" x2="{:.2}" y2="{y:.2}" stroke="black" stroke-width="1"/>"#,
                MARGIN_LEFT - 5.0,
                MARGIN_LEFT
            );
            let _ = writeln!(
                svg,
                r#"<text x="{:.2}" y="{:.2}" font-family="sans-serif" font-size="12" text-anchor="end">{c}</text>"#,
                MARGIN_LEFT - 8.0,
                y + 4.0
            );
            c += y_step;
        }

        // Series
        for (i, hist) in histograms.iter().enumerate() {
            let color = series_color(i, histograms.len());
            let mut points = String::new();
            for (v, &count) in hist.bins().iter().enumerate() {
                if v > 0 {
                    points.push(' ');
                }
                let _ = write!(points, "{:.2},{:.2}", x_of(v), y_of(count));
            }
            let _ = writeln!(
                svg,
                r#"<polyline points="{points}" fill="none" stroke="{color}" stroke-width="1.5"/>"#
            );
        }

        // Labels
        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" font-family="sans-serif" font-size="16" text-anchor="middle">{}</text>"#,
            MARGIN_LEFT + plot_w / 2.0,
            MARGIN_TOP - 14.0,
            escape_xml(&self.style.title)
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" font-family="sans-serif" font-size="13" text-anchor="middle">{}</text>"#,
            MARGIN_LEFT + plot_w / 2.0,
            height - 12.0,
            escape_xml(&self.style.x_label)
        );
        let (lx, ly) = (18.0f32, MARGIN_TOP + plot_h / 2.0);
        let _ = writeln!(
            svg,
            r#"<text x="{lx:.2}" y="{ly:.2}" font-family="sans-serif" font-size="13" text-anchor="middle" transform="rotate(-90 {lx:.2} {ly:.2})">{}</text>"#,
            escape_xml(&self.style.y_label)
        );

        svg.push_str("</svg>\n");
        svg
    }

    /// Rasterize the chart and encode it as PNG.
    pub fn render_png(&self, histograms: &[Histogram]) -> Result<Vec<u8>> {
        let svg = self.to_svg(histograms);

        let options = usvg::Options {
            fontdb: self.fontdb.clone(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(&svg, &options)
            .map_err(|e| EnhanceError::Render(e.to_string()))?;

        let (width, height) = (self.style.width, self.style.height);
        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| EnhanceError::Render(format!("cannot allocate {width}x{height} pixmap")))?;
        pixmap.fill(Color::WHITE);
        resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

        // Background is opaque, so premultiplied RGBA equals straight RGB
        let rgb: Vec<u8> = pixmap
            .data()
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();

        let mut buf = Cursor::new(Vec::new());
        image::codecs::png::PngEncoder::new(&mut buf)
            .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
            .map_err(|e| EnhanceError::Render(e.to_string()))?;
        Ok(buf.into_inner())
    }

    /// PNG chart as a standard base64 string, for embedding in HTML.
    pub fn render_base64(&self, histograms: &[Histogram]) -> Result<String> {
        self.render_png(histograms).map(|png| to_base64(&png))
    }
}

/// Standard base64 of arbitrary bytes.
pub fn to_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Display colour for series `index` of `count`.
pub fn series_color(index: usize, count: usize) -> &'static str {
    if count == 1 {
        GRAY_COLOR
    } else {
        SERIES_COLORS[index % SERIES_COLORS.len()]
    }
}

/// 1, 2 or 5 times a power of ten, giving at most `MAX_Y_TICKS` intervals.
fn tick_step(max: u64) -> u64 {
    let mut magnitude = 1u64;
    loop {
        for m in [1, 2, 5] {
            let step = m * magnitude;
            if max.div_ceil(step) <= MAX_Y_TICKS {
                return step;
            }
        }
        magnitude *= 10;
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::{channel_histogram, histograms};
    use crate::plane::ColorImage;
    use ndarray::Array2;

    fn offline_style() -> ChartStyle {
        ChartStyle {
            width: 200,
            height: 150,
            system_fonts: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_series_colors() {
        assert_eq!(series_color(0, 1), "black");
        assert_eq!(series_color(0, 3), "red");
        assert_eq!(series_color(1, 3), "green");
        assert_eq!(series_color(2, 3), "blue");
    }

    #[test]
    fn test_tick_step() {
        assert_eq!(tick_step(0), 1);
        assert_eq!(tick_step(6), 1);
        assert_eq!(tick_step(7), 2);
        assert_eq!(tick_step(100), 20);
        assert_eq!(tick_step(12_000), 2_000);
    }

    #[test]
    fn test_svg_is_deterministic() {
        let image = ColorImage::filled(10, 10, 3, 128).unwrap();
        let renderer = HistogramRenderer::new(offline_style());

        let first = renderer.to_svg(&histograms(&image));
        let second = renderer.to_svg(&histograms(&image));
        assert_eq!(first, second);
        assert_eq!(first.matches("<polyline").count(), 3);
        assert!(first.contains(r#"stroke="red""#));
        assert!(first.contains(r#"stroke="blue""#));
        assert!(first.contains(">Histogram</text>"));
    }

    #[test]
    fn test_grayscale_single_black_series() {
        let plane = Array2::from_shape_fn((8, 8), |(y, x)| (y * 8 + x) as u8);
        let renderer = HistogramRenderer::new(offline_style());

        let svg = renderer.to_svg(&[channel_histogram(plane.view())]);

        assert_eq!(svg.matches("<polyline").count(), 1);
        assert!(svg.contains(r#"stroke="black" stroke-width="1.5""#));
    }

    #[test]
    fn test_labels_escaped() {
        let style = ChartStyle {
            title: "a<b & c".to_string(),
            ..offline_style()
        };
        let svg = HistogramRenderer::new(style).to_svg(&[Histogram::empty()]);
        assert!(svg.contains("a&lt;b &amp; c"));
    }

    #[test]
    fn test_render_png_signature_and_determinism() {
        let img = ColorImage::filled(4, 4, 3, 10).unwrap();
        let renderer = HistogramRenderer::new(offline_style());

        let first = renderer.render_png(&histograms(&img)).unwrap();
        let second = renderer.render_png(&histograms(&img)).unwrap();

        assert_eq!(&first[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(first, second);

        let decoded = image::load_from_memory(&first).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 150));
    }

    #[test]
    fn test_render_base64_roundtrip() {
        let renderer = HistogramRenderer::new(offline_style());
        let hist = [Histogram::empty()];

        let png = renderer.render_png(&hist).unwrap();
        let b64 = renderer.render_base64(&hist).unwrap();

        let decoded = base64::engine::general_purpose::STANDARD.decode(b64).unwrap();
        assert_eq!(decoded, png);
    }

    #[test]
    fn test_style_validation() {
        assert!(ChartStyle::default().validate().is_ok());
        let tiny = ChartStyle {
            width: 10,
            ..Default::default()
        };
        assert!(matches!(tiny.validate(), Err(EnhanceError::Config(_))));
    }
}
