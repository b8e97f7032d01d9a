//! Command-line interface wiring for the `cardlift` binary.
//!
//! This module owns the clap definitions and delegates execution to
//! submodules that encapsulate each command family.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod common;
pub mod deck;
pub mod render;
pub mod scan;
pub mod utils;

/// Parsed CLI entrypoint for the `cardlift` binary.
#[derive(Parser, Debug)]
#[command(name = "cardlift", version, about = "Punch card recovery toolkit")]
pub struct Cli {
    /// Top-level command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Commands made available to end users.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract and decode a card photograph.
    Scan(scan::ScanArgs),
    /// Decode a previously dumped punch pattern.
    Read(scan::ReadArgs),
    /// Encode source text into a bit-card deck file.
    Encode(deck::EncodeArgs),
    /// Decode a deck file back to source text.
    Decode(deck::DecodeArgs),
    /// Show derived measurements for a deck.
    Stats(deck::StatsArgs),
    /// Check a deck file against its stored checksum.
    Verify(deck::VerifyArgs),
    /// Render deck cards as PNG images or ASCII listings.
    Render(render::RenderArgs),
}

/// Execute the requested command.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Scan(args) => scan::scan(args),
        Command::Read(args) => scan::read(args),
        Command::Encode(args) => deck::encode(args),
        Command::Decode(args) => deck::decode(args),
        Command::Stats(args) => deck::stats(args),
        Command::Verify(args) => deck::verify(args),
        Command::Render(args) => render::handle(args),
    }
}
