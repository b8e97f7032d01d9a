//! Shared clap helper types for CLI commands.

use cardlift::{CardStyle, PageLayout, RenderStyle, Standard};
use clap::ValueEnum;

/// Keypunch standard selector; `auto` runs coherence-based detection.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum StandardArg {
    Auto,
    Ibm029,
    Ibm026,
}

impl StandardArg {
    pub fn resolve(self) -> Option<Standard> {
        match self {
            StandardArg::Auto => None,
            StandardArg::Ibm029 => Some(Standard::Ibm029),
            StandardArg::Ibm026 => Some(Standard::Ibm026),
        }
    }
}

/// Render styles available for ASCII card views.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum RenderStyleArg {
    #[value(name = "ascii-x")]
    AsciiX,
    #[value(name = "ascii-01")]
    Ascii01,
}

impl From<RenderStyleArg> for RenderStyle {
    fn from(value: RenderStyleArg) -> Self {
        match value {
            RenderStyleArg::AsciiX => RenderStyle::AsciiX,
            RenderStyleArg::Ascii01 => RenderStyle::Ascii01,
        }
    }
}

/// Styles available for PNG rendering.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum CardStyleArg {
    Plain,
    Interpreter,
    Keypunch,
}

impl From<CardStyleArg> for CardStyle {
    fn from(value: CardStyleArg) -> CardStyle {
        match value {
            CardStyleArg::Plain => CardStyle::Plain,
            CardStyleArg::Interpreter => CardStyle::Interpreter,
            CardStyleArg::Keypunch => CardStyle::Keypunch,
        }
    }
}

/// Output page layout options for image rendering.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum PageLayoutArg {
    Card,
    A4,
}

impl From<PageLayoutArg> for PageLayout {
    fn from(value: PageLayoutArg) -> PageLayout {
        match value {
            PageLayoutArg::Card => PageLayout::Card,
            PageLayoutArg::A4 => PageLayout::A4,
        }
    }
}
