//! PNG rendering of hole grids as card faces.

mod paint;

pub use paint::{CardRenderOptions, CardStyle, PageLayout, render_card_image};
