//! Core library for recovering source text from 80-column punch cards.
//!
//! Three independent components: the keypunch column codec
//! ([`decode`], [`auto_detect_encoding`]), the lossless line-bit codec
//! ([`encode_line`], [`decode_source`]), and the vision hole detector
//! ([`detect_holes`]). They share the [`HoleGrid`] data model and never
//! call each other.

mod core;
mod render;
mod vision;

pub use crate::core::{
    BITS_PER_CARD, BITS_PER_CHAR, BitCard, BitDeck, BitError, CLASSIC_ROW_LABELS, COLS,
    DeckMeta, DeckStats, DecodedCard, DecodedSource, Dialect, GridMode, HoleGrid, LINE_LEN,
    Language, REPLACEMENT, RenderStyle, ShapeError, Standard, auto_detect_encoding, deck_path_for,
    deck_stats, decode, decode_line, decode_scanned, decode_source, detect_dialect,
    detect_language, encode_line, encode_source, punch_code, validate_bit_string,
};
pub use crate::render::{CardRenderOptions, CardStyle, PageLayout, render_card_image};
pub use crate::vision::{
    DARKNESS_THRESHOLD, ImageDecodeError, PatternMeta, PunchPattern, REAL_CONFIDENCE_FLOOR,
    calculate_confidence, detect_holes, detect_holes_in, is_confidence_acceptable,
    preprocess_image,
};
