//! Immutable rendering configuration.

use plotters::style::RGBColor;
use std::path::PathBuf;

use super::theme::Theme;

/// Points per inch; font sizes and line widths are given in points.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Columns bound to each axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Date,
    CaseCount,
}

#[derive(Clone, Debug)]
pub struct Figure {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
    /// Plot area as fractions of the figure: left, right, bottom, top.
    pub axes: (f64, f64, f64, f64),
    /// Extra canvas around the figure, as a fraction of each dimension, so
    /// overlays outside the axes are never clipped before cropping.
    pub overscan: f64,
    /// Padding kept around drawn content when the bounding box is tightened.
    pub pad_in: f64,
}

impl Figure {
    pub fn scale(&self) -> f64 {
        self.dpi as f64 / POINTS_PER_INCH
    }

    /// Converts points to device pixels.
    pub fn px(&self, points: f64) -> f64 {
        points * self.scale()
    }

    pub fn size_px(&self) -> (u32, u32) {
        (
            (self.width_in * self.dpi as f64).round() as u32,
            (self.height_in * self.dpi as f64).round() as u32,
        )
    }

    pub fn overscan_px(&self) -> (u32, u32) {
        let (w, h) = self.size_px();
        (
            (w as f64 * self.overscan).round() as u32,
            (h as f64 * self.overscan).round() as u32,
        )
    }

    pub fn canvas_px(&self) -> (u32, u32) {
        let (w, h) = self.size_px();
        let (ox, oy) = self.overscan_px();
        (w + 2 * ox, h + 2 * oy)
    }
}

#[derive(Clone, Debug)]
pub struct TickSpec {
    pub step_months: u32,
    /// `chrono` format string; `\n` splits the label into lines.
    pub label_format: &'static str,
    pub font_size: f64,
}

#[derive(Clone, Debug)]
pub struct SeriesStyle {
    pub color: RGBColor,
    /// Marker diameter in points.
    pub marker_size: f64,
    pub line_width: f64,
}

#[derive(Clone, Debug)]
pub struct AxisLabel {
    pub text: String,
    pub font_size: f64,
    /// Extra gap between the tick labels and the axis title, in points.
    pub pad: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Text positioned in axes-fraction coordinates: (0, 0) is the bottom-left
/// corner of the plot area, (1, 1) the top-right.
#[derive(Clone, Debug)]
pub struct TextOverlay {
    pub text: String,
    pub at: (f64, f64),
    pub align: Align,
    pub font_size: f64,
    pub bold: bool,
}

#[derive(Clone, Debug)]
pub struct LogoOverlay {
    pub path: PathBuf,
    pub zoom: f64,
    pub anchor: (f64, f64),
    /// Which point of the logo box sits on the anchor, as fractions of the box
    /// (x from the left, y from the bottom).
    pub box_alignment: (f64, f64),
}

#[derive(Clone, Debug)]
pub struct ChartSpec {
    pub x: Field,
    pub y: Field,
    pub figure: Figure,
    pub ticks: TickSpec,
    pub series: SeriesStyle,
    /// The x axis carries tick labels only.
    pub y_label: Option<AxisLabel>,
    pub y_tick_font_size: f64,
    pub grid_width: f64,
    pub overlays: Vec<TextOverlay>,
    pub logo: Option<LogoOverlay>,
    pub theme: Theme,
}

impl ChartSpec {
    /// Monthly UK measles cases, branded with `logo` when one is given.
    pub fn measles_uk(logo: Option<PathBuf>) -> Self {
        Self {
            x: Field::Date,
            y: Field::CaseCount,
            figure: Figure {
                width_in: 9.0,
                height_in: 6.0,
                dpi: 300,
                axes: (0.125, 0.9, 0.11, 0.88),
                overscan: 0.25,
                pad_in: 0.1,
            },
            ticks: TickSpec {
                step_months: 12,
                label_format: "%b\n%Y",
                font_size: 11.0,
            },
            series: SeriesStyle {
                color: RGBColor(0xE2, 0x4A, 0x33),
                marker_size: 5.0,
                line_width: 1.5,
            },
            y_label: Some(AxisLabel {
                text: "Cases".to_string(),
                font_size: 12.0,
                pad: 10.0,
            }),
            y_tick_font_size: 11.0,
            grid_width: 1.0,
            overlays: vec![
                TextOverlay {
                    text: "Total Measles Cases 2015–2025".to_string(),
                    at: (0.0, 1.10),
                    align: Align::Left,
                    font_size: 15.0,
                    bold: true,
                },
                TextOverlay {
                    text: "United Kingdom".to_string(),
                    at: (0.0, 1.03),
                    align: Align::Left,
                    font_size: 13.0,
                    bold: false,
                },
                TextOverlay {
                    text: "Source: World Health Organisation".to_string(),
                    at: (0.0, -0.20),
                    align: Align::Left,
                    font_size: 8.0,
                    bold: false,
                },
                TextOverlay {
                    text: "Note: Provisional monthly data obtained on 2025-06-12".to_string(),
                    at: (1.0, -0.20),
                    align: Align::Right,
                    font_size: 8.0,
                    bold: false,
                },
            ],
            logo: logo.map(|path| LogoOverlay {
                path,
                zoom: 0.02,
                anchor: (0.99, 0.99),
                box_alignment: (1.0, -0.3),
            }),
            theme: Theme::darkgrid(),
        }
    }
}
