//! Deck workflow commands (`cardlift encode/decode/stats/verify`).

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use cardlift::{DeckMeta, deck_path_for, deck_stats, decode_source, encode_source};
use clap::Args;

use crate::cli::utils::{input_filename, load_deck, read_text_input, write_output};

/// Arguments for `cardlift encode`.
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Source file to encode (`-` or omitted for stdin).
    pub file: Option<PathBuf>,
    /// Language tag stored in deck metadata.
    #[arg(long)]
    pub language: Option<String>,
    /// Deck file to write (`-` for stdout; defaults to FILE.deck.json).
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

/// Arguments for `cardlift decode`.
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Deck file to decode.
    pub deck: PathBuf,
    /// Where to write the recovered source (`-` for stdout).
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

/// Arguments for `cardlift stats`.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Deck file to inspect.
    pub deck: PathBuf,
}

/// Arguments for `cardlift verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Deck file to verify.
    pub deck: PathBuf,
}

pub fn encode(args: EncodeArgs) -> Result<()> {
    let file = args.file.as_deref().filter(|p| p.as_os_str() != "-");
    let text = read_text_input(file)?;
    let metadata = DeckMeta {
        language: args.language,
        filename: input_filename(file),
        ..DeckMeta::default()
    };
    let mut deck = encode_source(&text, metadata);
    deck.seal();

    let target = match (args.output, file) {
        (Some(path), _) => path,
        (None, Some(file)) => deck_path_for(file),
        (None, None) => PathBuf::from("-"),
    };
    if target.as_os_str() == "-" {
        let json = serde_json::to_string_pretty(&deck).context("failed to serialize deck")?;
        println!("{json}");
    } else {
        deck.save(&target)?;
        println!("Encoded {} cards to {}", deck.cards.len(), target.display());
    }
    Ok(())
}

pub fn decode(args: DecodeArgs) -> Result<()> {
    let deck = load_deck(&args.deck)?;
    if deck.verify_checksum() == Some(false) {
        eprintln!(
            "warning: {} does not match its stored checksum",
            args.deck.display()
        );
    }
    let decoded = decode_source(&deck)
        .with_context(|| format!("failed to decode {}", args.deck.display()))?;
    match args.output {
        Some(path) if path.as_os_str() != "-" => {
            write_output(&path, &decoded.source_code)?;
            println!(
                "Decoded {} cards ({}) to {}",
                decoded.total_lines,
                decoded.language.name(),
                path.display()
            );
        }
        _ => println!("{}", decoded.source_code),
    }
    Ok(())
}

pub fn stats(args: StatsArgs) -> Result<()> {
    let deck = load_deck(&args.deck)?;
    let stats =
        deck_stats(&deck).with_context(|| format!("failed to read {}", args.deck.display()))?;
    println!("cards           {}", stats.total_cards);
    println!("bits            {}", stats.total_bits);
    println!("bytes           {}", stats.total_bytes);
    println!("characters      {}", stats.total_characters);
    println!("avg line length {:.1}", stats.average_line_length);
    if let Some(language) = deck.metadata.language.as_deref() {
        println!("language        {language}");
    }
    Ok(())
}

pub fn verify(args: VerifyArgs) -> Result<()> {
    let deck = load_deck(&args.deck)?;
    match deck.verify_checksum() {
        Some(true) => {
            println!("{}: checksum OK", args.deck.display());
            Ok(())
        }
        Some(false) => bail!("{}: checksum mismatch", args.deck.display()),
        None => {
            println!(
                "{}: no stored checksum; re-encode to seal the deck",
                args.deck.display()
            );
            Ok(())
        }
    }
}
