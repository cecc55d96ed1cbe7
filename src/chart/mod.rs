//! Chart configuration, layout and rasterisation.

pub mod logo;
pub mod plan;
pub mod render;
pub mod spec;
pub mod theme;
pub mod ticks;

pub use logo::Logo;
pub use plan::ChartPlan;
pub use render::{render, RenderedChart};
pub use spec::ChartSpec;
pub use theme::Theme;

use crate::error::Result;

/// Loads the logo placed by `spec`, if any.
pub fn load_logo(spec: &ChartSpec) -> Result<Option<Logo>> {
    spec.logo
        .as_ref()
        .map(|place| Logo::load(&place.path))
        .transpose()
}
