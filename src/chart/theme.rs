//! Colours and fonts applied to every chart element.

use plotters::style::{FontDesc, FontFamily, FontStyle, RGBColor};

#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub figure_background: RGBColor,
    pub axes_background: RGBColor,
    pub grid: RGBColor,
    pub text: RGBColor,
    /// Preferred font family name; see [`Theme::font_family`].
    pub font_family: &'static str,
}

impl Theme {
    /// Grey plot area with white grid lines and no spines.
    pub fn darkgrid() -> Self {
        Self {
            figure_background: RGBColor(255, 255, 255),
            axes_background: RGBColor(234, 234, 242),
            grid: RGBColor(255, 255, 255),
            text: RGBColor(38, 38, 38),
            font_family: "Verdana",
        }
    }

    /// The preferred family if the system can load it, otherwise generic sans-serif.
    /// `None` means no usable font is installed at all.
    pub fn font_family(&self) -> Option<FontFamily<'static>> {
        [FontFamily::Name(self.font_family), FontFamily::SansSerif]
            .into_iter()
            .find(|family| font_loads(*family))
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::darkgrid()
    }
}

fn font_loads(family: FontFamily<'static>) -> bool {
    FontDesc::new(family, 12.0, FontStyle::Normal)
        .box_size("Ag")
        .is_ok()
}

/// True when text can be rasterised on this machine.
pub fn fonts_available() -> bool {
    Theme::default().font_family().is_some()
}
