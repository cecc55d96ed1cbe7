//! Branding image placed over the chart.

use image::imageops::FilterType;
use image::RgbaImage;
use plotters::style::RGBColor;
use std::path::Path;
use tracing::debug;

use crate::error::{ChartError, Result};

pub struct Logo {
    image: RgbaImage,
}

impl Logo {
    /// Reads and decodes a logo file. The file is closed before this returns.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| ChartError::io(path, e))?;
        let image = image::load_from_memory(&bytes)?.to_rgba8();
        debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "Logo loaded"
        );
        Ok(Self { image })
    }

    pub fn from_rgba(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Pixel size after applying `zoom` at `dpi_scale` (dpi / 72). Never below 1x1.
    pub fn scaled_size(&self, zoom: f64, dpi_scale: f64) -> (u32, u32) {
        let (w, h) = self.dimensions();
        let factor = zoom * dpi_scale;
        (
            ((w as f64 * factor).round() as u32).max(1),
            ((h as f64 * factor).round() as u32).max(1),
        )
    }

    /// Resizes to `size` and flattens alpha onto `background`, giving packed RGB bytes.
    pub fn to_rgb(&self, size: (u32, u32), background: RGBColor) -> Vec<u8> {
        let resized = if size == self.dimensions() {
            self.image.clone()
        } else {
            image::imageops::resize(&self.image, size.0, size.1, FilterType::Lanczos3)
        };

        let RGBColor(br, bg, bb) = background;
        resized
            .pixels()
            .flat_map(|px| {
                let [r, g, b, a] = px.0;
                let alpha = a as f64 / 255.0;
                let blend = |fg: u8, back: u8| {
                    (fg as f64 * alpha + back as f64 * (1.0 - alpha)).round() as u8
                };
                [blend(r, br), blend(g, bg), blend(b, bb)]
            })
            .collect()
    }
}
