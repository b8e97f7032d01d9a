use image::imageops::overlay;
use image::{DynamicImage, ImageBuffer, Rgba};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut,
};
use imageproc::rect::Rect;

use crate::core::grid::HoleGrid;

const CARD_WIDTH_IN: f32 = 7.375;
const CARD_HEIGHT_IN: f32 = 3.25;
const A4_WIDTH_IN: f32 = 8.27;
const A4_HEIGHT_IN: f32 = 11.69;

/// Visual styles for PNG rendering.
#[derive(Debug, Clone, Copy)]
pub enum CardStyle {
    Plain,
    Interpreter,
    Keypunch,
}

/// Target layout for the generated image.
#[derive(Debug, Clone, Copy)]
pub enum PageLayout {
    Card,
    A4,
}

/// Options controlling PNG generation.
#[derive(Debug, Clone, Copy)]
pub struct CardRenderOptions {
    pub style: CardStyle,
    pub dpi: u32,
    pub layout: PageLayout,
}

struct Palette {
    card_bg: Rgba<u8>,
    page_bg: Rgba<u8>,
    grid: Rgba<u8>,
    hole: Rgba<u8>,
    border: Rgba<u8>,
    header: Option<Rgba<u8>>,
}

/// Render a hole grid (classic or line mode) as a card-face PNG.
pub fn render_card_image(grid: &HoleGrid, options: &CardRenderOptions) -> DynamicImage {
    let dpi = options.dpi.clamp(72, 1200);
    let dpi_f = dpi as f32;
    let palette = palette(options.style, matches!(options.layout, PageLayout::Card));

    let card_width = inches_to_px(CARD_WIDTH_IN, dpi);
    let card_height = inches_to_px(CARD_HEIGHT_IN, dpi);
    let margin_x = (0.18 * dpi_f).round() as i32;
    let margin_top = (0.35 * dpi_f).round() as i32;
    let margin_bottom = (0.35 * dpi_f).round() as i32;

    let mut card = ImageBuffer::from_pixel(card_width, card_height, palette.card_bg);

    if let Some(header_color) = palette.header {
        let header_height = ((0.25 * dpi_f).round() as u32).min(card_height);
        draw_filled_rect_mut(
            &mut card,
            Rect::at(0, 0).of_size(card_width, header_height),
            header_color,
        );
    }
    draw_hollow_rect_mut(
        &mut card,
        Rect::at(0, 0).of_size(card_width, card_height),
        palette.border,
    );

    let cols = grid.cols();
    let rows = grid.rows();
    let col_spacing = (card_width as f32 - 2.0 * margin_x as f32).max(1.0) / (cols as f32 - 1.0);
    let row_spacing = (card_height as f32 - (margin_top + margin_bottom) as f32).max(1.0)
        / (rows as f32 - 1.0);
    let hole_radius = ((col_spacing.min(row_spacing) * 0.2).round() as i32).max(2);

    // Light guide lines every tenth column, as printed card stock has.
    for col in (0..=cols).step_by(10) {
        let x = margin_x as f32 + col.min(cols - 1) as f32 * col_spacing;
        draw_line_segment_mut(
            &mut card,
            (x, margin_top as f32),
            (x, (card_height as i32 - margin_bottom) as f32),
            palette.grid,
        );
    }

    for col in 0..cols {
        let center_x = (margin_x as f32 + col as f32 * col_spacing).round() as i32;
        for row in 0..rows {
            if grid.is_punched(row, col) {
                let center_y = (margin_top as f32 + row as f32 * row_spacing).round() as i32;
                draw_filled_circle_mut(&mut card, (center_x, center_y), hole_radius, palette.hole);
            }
        }
    }

    match options.layout {
        PageLayout::Card => DynamicImage::ImageRgba8(card),
        PageLayout::A4 => {
            let page_width = inches_to_px(A4_WIDTH_IN, dpi);
            let page_height = inches_to_px(A4_HEIGHT_IN, dpi);
            let mut page = ImageBuffer::from_pixel(page_width, page_height, palette.page_bg);
            let offset_x = ((page_width as i32 - card_width as i32) / 2).max(0);
            let offset_y = ((page_height as i32 - card_height as i32) / 2).max(0);
            overlay(&mut page, &card, offset_x as i64, offset_y as i64);
            DynamicImage::ImageRgba8(page)
        }
    }
}

fn inches_to_px(inches: f32, dpi: u32) -> u32 {
    (inches * dpi as f32).round() as u32
}

fn palette(style: CardStyle, card_only: bool) -> Palette {
    match style {
        CardStyle::Plain => Palette {
            card_bg: rgba(0xf4, 0xe8, 0xcc),
            page_bg: if card_only {
                rgba(0xf4, 0xe8, 0xcc)
            } else {
                rgba(0xfd, 0xfa, 0xf3)
            },
            grid: rgba(0xd7, 0xc9, 0xa8),
            hole: rgba(0x28, 0x24, 0x1f),
            border: rgba(0x7d, 0x6b, 0x54),
            header: None,
        },
        CardStyle::Interpreter => Palette {
            card_bg: rgba(0xf6, 0xe3, 0xc6),
            page_bg: if card_only {
                rgba(0xf6, 0xe3, 0xc6)
            } else {
                rgba(0xfc, 0xf7, 0xef)
            },
            grid: rgba(0xd1, 0xba, 0x9b),
            hole: rgba(0x24, 0x22, 0x1d),
            border: rgba(0x86, 0x74, 0x5d),
            header: Some(rgba(0xe6, 0xcb, 0xa6)),
        },
        CardStyle::Keypunch => Palette {
            card_bg: rgba(0xf5, 0xd7, 0xb5),
            page_bg: if card_only {
                rgba(0xf5, 0xd7, 0xb5)
            } else {
                rgba(0xfa, 0xf2, 0xe7)
            },
            grid: rgba(0xca, 0xa0, 0x79),
            hole: rgba(0x2b, 0x21, 0x1d),
            border: rgba(0x82, 0x63, 0x4d),
            header: Some(rgba(0xe6, 0xb8, 0x8f)),
        },
    }
}

fn rgba(r: u8, g: u8, b: u8) -> Rgba<u8> {
    Rgba([r, g, b, 0xff])
}
