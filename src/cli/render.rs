//! Rendering command (`cardlift render`).

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use cardlift::{CardRenderOptions, render_card_image};
use clap::Args;

use crate::cli::common::{CardStyleArg, PageLayoutArg, RenderStyleArg};
use crate::cli::utils::{card_png_path, load_deck, write_output};

/// Arguments for `cardlift render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Deck file to render.
    pub deck: PathBuf,
    /// Output directory (or single .png for one-card decks); with
    /// --ascii, an output file (`-` for stdout).
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Emit an ASCII listing instead of PNG images.
    #[arg(long)]
    pub ascii: bool,
    /// Text style used for ASCII listings.
    #[arg(long = "ascii-style", default_value_t = RenderStyleArg::AsciiX, value_enum)]
    pub ascii_style: RenderStyleArg,
    /// Visual style applied to the card face.
    #[arg(long, default_value_t = CardStyleArg::Interpreter, value_enum)]
    pub style: CardStyleArg,
    /// Output page layout.
    #[arg(long = "pagesize", default_value_t = PageLayoutArg::Card, value_enum)]
    pub pagesize: PageLayoutArg,
    /// Dots per inch used when rasterising.
    #[arg(long, default_value_t = 300)]
    pub dpi: u32,
}

pub fn handle(args: RenderArgs) -> Result<()> {
    if args.ascii { listing(args) } else { images(args) }
}

fn listing(args: RenderArgs) -> Result<()> {
    let deck = load_deck(&args.deck)?;
    let mut out = String::new();
    for (idx, card) in deck.cards.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(&format!("card {:>4} | line {}\n", idx + 1, card.column));
        if let Some(preview) = card.preview.as_deref() {
            out.push_str(&format!("preview: {preview}\n"));
        }
        out.push_str(&card.to_grid().render(args.ascii_style.into()));
    }
    match args.output {
        Some(path) => write_output(&path, &out)?,
        None => print!("{out}"),
    }
    Ok(())
}

fn images(args: RenderArgs) -> Result<()> {
    let deck = load_deck(&args.deck)?;
    let Some(output) = args.output else {
        bail!("PNG rendering needs --output (a directory, or a .png for one card)");
    };
    let single_file = output
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("png"))
        .unwrap_or(false);
    if single_file && deck.cards.len() > 1 {
        bail!("output path must be a directory when rendering multiple cards");
    }
    if !single_file {
        fs::create_dir_all(&output)
            .with_context(|| format!("failed to create output directory {}", output.display()))?;
    }

    let options = CardRenderOptions {
        style: args.style.into(),
        dpi: args.dpi,
        layout: args.pagesize.into(),
    };
    for (idx, card) in deck.cards.iter().enumerate() {
        let target = if single_file {
            output.clone()
        } else {
            card_png_path(&output, idx)
        };
        let image = render_card_image(&card.to_grid(), &options);
        image
            .save(&target)
            .with_context(|| format!("failed to write {}", target.display()))?;
    }
    println!(
        "Rendered {} card image(s) at {} DPI",
        deck.cards.len(),
        args.dpi.clamp(72, 1200)
    );
    Ok(())
}
