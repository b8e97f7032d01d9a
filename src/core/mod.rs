//! Core domain primitives: hole grids, keypunch tables, and bit decks.

pub mod deck;
pub mod dialect;
pub mod grid;
pub mod hollerith;
pub mod linebits;

pub use deck::{BitCard, BitDeck, DeckMeta, deck_path_for};
pub use dialect::{Dialect, detect_dialect};
pub use grid::{CLASSIC_ROW_LABELS, COLS, GridMode, HoleGrid, RenderStyle, ShapeError};
pub use hollerith::{
    DecodedCard, REPLACEMENT, Standard, auto_detect_encoding, decode, decode_scanned, punch_code,
};
pub use linebits::{
    BITS_PER_CARD, BITS_PER_CHAR, BitError, DeckStats, DecodedSource, LINE_LEN, Language,
    deck_stats, decode_line, decode_source, detect_language, encode_line, encode_source,
    validate_bit_string,
};
