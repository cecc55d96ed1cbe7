//! Rasterises a [`ChartPlan`] with plotters' bitmap backend.

use plotters::coord::Shift;
use plotters::element::BitMapElement;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;
use tracing::debug;

use super::logo::Logo;
use super::plan::ChartPlan;
use super::spec::{Align, ChartSpec};
use crate::error::{ChartError, Result};

/// Width reserved left of the plot area for y tick labels and the axis title.
const Y_LABEL_AREA_PT: f64 = 64.0;
/// Gap between the bottom of the plot area and the first x label line.
const X_LABEL_GAP_PT: f64 = 3.5;
const LINE_SPACING: f64 = 1.2;

/// An RGB raster of the full canvas, before cropping.
#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub width: u32,
    pub height: u32,
    pub dpi: u32,
    pub background: RGBColor,
    /// Padding to keep around the content when cropping.
    pub pad_px: u32,
    /// Packed RGB, row-major.
    pub pixels: Vec<u8>,
}

/// Maps axes-fraction coordinates to canvas pixels.
struct AxesFrame {
    x: Range<i32>,
    y: Range<i32>,
}

impl AxesFrame {
    fn to_pixel(&self, (fx, fy): (f64, f64)) -> (i32, i32) {
        let w = (self.x.end - self.x.start) as f64;
        let h = (self.y.end - self.y.start) as f64;
        (
            self.x.start + (fx * w).round() as i32,
            self.y.end - (fy * h).round() as i32,
        )
    }
}

/// Draws `plan` styled by `spec`. `logo` is only drawn when `spec.logo` places it.
///
/// # Errors
///
/// [`ChartError::Render`] if no font can be loaded or the backend fails.
#[tracing::instrument(skip_all, fields(points = plan.points.len(), ticks = plan.ticks.len()))]
pub fn render(plan: &ChartPlan, spec: &ChartSpec, logo: Option<&Logo>) -> Result<RenderedChart> {
    let family = spec.theme.font_family().ok_or_else(|| {
        ChartError::Render(format!(
            "no usable font: tried {} and sans-serif",
            spec.theme.font_family
        ))
    })?;

    let (width, height) = spec.figure.canvas_px();
    let mut pixels = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
        root.fill(&spec.theme.figure_background)
            .map_err(ChartError::render)?;
        draw(&root, plan, spec, family, logo)?;
        root.present().map_err(ChartError::render)?;
    }
    debug!(width, height, "Chart rasterised");

    Ok(RenderedChart {
        width,
        height,
        dpi: spec.figure.dpi,
        background: spec.theme.figure_background,
        pad_px: (spec.figure.pad_in * spec.figure.dpi as f64).round() as u32,
        pixels,
    })
}

/// Width left of the axes for y tick labels plus the padded axis title.
fn y_label_area_px(spec: &ChartSpec) -> u32 {
    let title_pad = spec.y_label.as_ref().map_or(0.0, |label| label.pad);
    spec.figure.px(Y_LABEL_AREA_PT + title_pad).round() as u32
}

fn draw(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    plan: &ChartPlan,
    spec: &ChartSpec,
    family: FontFamily<'static>,
    logo: Option<&Logo>,
) -> Result<()> {
    let fig = &spec.figure;
    let theme = &spec.theme;
    let px = |pt: f64| fig.px(pt);

    let (canvas_w, canvas_h) = fig.canvas_px();
    let (w, h) = fig.size_px();
    let (ox, oy) = fig.overscan_px();
    let (left, right, bottom, top) = fig.axes;
    let axes_left = ox + (left * w as f64).round() as u32;
    let axes_right = ox + (right * w as f64).round() as u32;
    let axes_top = oy + ((1.0 - top) * h as f64).round() as u32;
    let axes_bottom = oy + ((1.0 - bottom) * h as f64).round() as u32;
    let y_area = y_label_area_px(spec);

    let mut chart = ChartBuilder::on(root)
        .margin_left(axes_left.saturating_sub(y_area))
        .margin_right(canvas_w - axes_right)
        .margin_top(axes_top)
        .margin_bottom(canvas_h - axes_bottom)
        .y_label_area_size(y_area)
        .build_cartesian_2d(plan.x_range.clone(), plan.y_range.clone())
        .map_err(ChartError::render)?;

    chart
        .plotting_area()
        .fill(&theme.axes_background)
        .map_err(ChartError::render)?;

    let grid = theme.grid.stroke_width(px(spec.grid_width).round() as u32);
    let tick_font = FontDesc::new(family, px(spec.y_tick_font_size), FontStyle::Normal).color(&theme.text);
    let y_formatter = |v: &f64| format!("{:.0}", v);

    let mut mesh = chart.configure_mesh();
    mesh.disable_x_mesh()
        .disable_x_axis()
        .y_label_formatter(&y_formatter)
        .y_label_style(tick_font)
        .bold_line_style(grid)
        .light_line_style(TRANSPARENT)
        .axis_style(TRANSPARENT)
        .set_all_tick_mark_size(0);
    if let Some(label) = &spec.y_label {
        mesh.y_desc(label.text.as_str())
            .axis_desc_style(FontDesc::new(family, px(label.font_size), FontStyle::Normal).color(&theme.text));
    }
    mesh.draw().map_err(ChartError::render)?;

    // Vertical grid lines sit on the custom ticks, not on plotters' own key points.
    let (y_lo, y_hi) = (plan.y_range.start, plan.y_range.end);
    chart
        .draw_series(
            plan.ticks
                .iter()
                .map(|t| PathElement::new(vec![(t.x, y_lo), (t.x, y_hi)], grid)),
        )
        .map_err(ChartError::render)?;

    let series_color = spec.series.color;
    chart
        .draw_series(LineSeries::new(
            plan.points.iter().map(|p| (p.x, p.y)),
            series_color.stroke_width(px(spec.series.line_width).round() as u32),
        ))
        .map_err(ChartError::render)?;
    let radius = (px(spec.series.marker_size) / 2.0).round() as i32;
    chart
        .draw_series(
            plan.points
                .iter()
                .map(|p| Circle::new((p.x, p.y), radius, series_color.filled())),
        )
        .map_err(ChartError::render)?;

    let label_style = FontDesc::new(family, px(spec.ticks.font_size), FontStyle::Normal)
        .color(&theme.text)
        .pos(Pos::new(HPos::Center, VPos::Top));
    let line_height = px(spec.ticks.font_size * LINE_SPACING).round() as i32;
    let gap = px(X_LABEL_GAP_PT).round() as i32;
    for tick in &plan.ticks {
        let (x, y) = chart.backend_coord(&(tick.x, y_lo));
        for (i, line) in tick.label.iter().enumerate() {
            root.draw(&Text::new(
                line.as_str(),
                (x, y + gap + i as i32 * line_height),
                label_style.clone(),
            ))
            .map_err(ChartError::render)?;
        }
    }

    let (x_px, y_px) = chart.plotting_area().get_pixel_range();
    let frame = AxesFrame { x: x_px, y: y_px };

    for overlay in &spec.overlays {
        let weight = if overlay.bold {
            FontStyle::Bold
        } else {
            FontStyle::Normal
        };
        let hpos = match overlay.align {
            Align::Left => HPos::Left,
            Align::Right => HPos::Right,
        };
        let style = FontDesc::new(family, px(overlay.font_size), weight)
            .color(&theme.text)
            .pos(Pos::new(hpos, VPos::Bottom));
        root.draw(&Text::new(
            overlay.text.as_str(),
            frame.to_pixel(overlay.at),
            style,
        ))
        .map_err(ChartError::render)?;
    }

    if let (Some(place), Some(logo)) = (&spec.logo, logo) {
        let (lw, lh) = logo.scaled_size(place.zoom, fig.scale());
        let (ax, ay) = frame.to_pixel(place.anchor);
        let (bx, by) = place.box_alignment;
        let logo_left = ax - (bx * lw as f64).round() as i32;
        let logo_bottom = ay + (by * lh as f64).round() as i32;
        let logo_top = logo_bottom - lh as i32;

        let element: BitMapElement<(i32, i32)> = BitMapElement::with_owned_buffer(
            (logo_left, logo_top),
            (lw, lh),
            logo.to_rgb((lw, lh), theme.figure_background),
        )
        .ok_or_else(|| ChartError::Render("logo buffer does not match its size".to_string()))?;
        root.draw(&element).map_err(ChartError::render)?;
        debug!(logo_left, logo_top, lw, lh, "Logo placed");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_y_title_pad_widens_label_area() {
        let mut spec = ChartSpec::measles_uk(None);
        assert_eq!(y_label_area_px(&spec), 308);
        spec.y_label = None;
        assert_eq!(y_label_area_px(&spec), 267);
    }

    #[test]
    fn test_axes_frame_maps_corners() {
        let frame = AxesFrame {
            x: 100..300,
            y: 50..150,
        };
        assert_eq!(frame.to_pixel((0.0, 0.0)), (100, 150));
        assert_eq!(frame.to_pixel((1.0, 1.0)), (300, 50));
        assert_eq!(frame.to_pixel((0.0, 1.10)), (100, 40));
        assert_eq!(frame.to_pixel((1.0, -0.20)), (300, 170));
    }
}
