//! Vision commands (`cardlift scan`, `cardlift read`).

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use cardlift::{
    DecodedCard, PunchPattern, RenderStyle, Standard, auto_detect_encoding, decode_scanned,
    detect_holes, is_confidence_acceptable,
};
use clap::Args;

use crate::cli::common::StandardArg;
use crate::cli::utils::{ensure_parent_dir, write_output};

/// Arguments for `cardlift scan`.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Photograph or export of a single card.
    pub image: PathBuf,
    /// Keypunch standard to decode with.
    #[arg(long, default_value_t = StandardArg::Auto, value_enum)]
    pub standard: StandardArg,
    /// Treat the image as a rendered virtual card (exact detection required).
    #[arg(long = "virtual")]
    pub virtual_card: bool,
    /// Decode even when confidence is below the acceptance bar.
    #[arg(long)]
    pub force: bool,
    /// Print the extracted grid as an ASCII card view.
    #[arg(long)]
    pub ascii: bool,
    /// Write the extracted pattern as JSON for later `cardlift read`.
    #[arg(long = "dump-pattern")]
    pub dump_pattern: Option<PathBuf>,
}

/// Arguments for `cardlift read`.
#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Pattern JSON produced by `cardlift scan --dump-pattern`.
    pub pattern: PathBuf,
    /// Keypunch standard to decode with.
    #[arg(long, default_value_t = StandardArg::Auto, value_enum)]
    pub standard: StandardArg,
    /// Print the grid as an ASCII card view.
    #[arg(long)]
    pub ascii: bool,
}

pub fn scan(args: ScanArgs) -> Result<()> {
    let bytes = fs::read(&args.image)
        .with_context(|| format!("failed to read {}", args.image.display()))?;
    let pattern = detect_holes(&bytes)
        .with_context(|| format!("failed to scan {}", args.image.display()))?;

    if !is_confidence_acceptable(pattern.confidence, args.virtual_card) && !args.force {
        bail!(
            "detection confidence {:.3} is below the acceptance bar; \
             re-shoot the card or pass --force",
            pattern.confidence
        );
    }

    if let Some(path) = &args.dump_pattern {
        ensure_parent_dir(path)?;
        let json = serde_json::to_string_pretty(&pattern).context("failed to serialize pattern")?;
        write_output(path, &json)?;
    }

    let card = decode_pattern(&pattern, args.standard.resolve())?;
    print_card(&pattern, &card, args.ascii);
    Ok(())
}

pub fn read(args: ReadArgs) -> Result<()> {
    let raw = fs::read_to_string(&args.pattern)
        .with_context(|| format!("failed to read {}", args.pattern.display()))?;
    let pattern: PunchPattern = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse pattern {}", args.pattern.display()))?;
    let card = decode_pattern(&pattern, args.standard.resolve())?;
    print_card(&pattern, &card, args.ascii);
    Ok(())
}

fn decode_pattern(pattern: &PunchPattern, standard: Option<Standard>) -> Result<DecodedCard> {
    let standard = match standard {
        Some(standard) => standard,
        None => auto_detect_encoding(&pattern.grid)?,
    };
    Ok(decode_scanned(&pattern.grid, standard, pattern.confidence)?)
}

fn print_card(pattern: &PunchPattern, card: &DecodedCard, ascii: bool) {
    if ascii {
        println!("{}", pattern.grid.render(RenderStyle::AsciiX));
    }
    println!("standard   {}", card.standard);
    println!("dialect    {}", card.dialect.name());
    println!("confidence {:.3}", card.confidence);
    println!("columns    {}", pattern.metadata.detected_columns);
    println!();
    println!("{}", card.source_code);
}
