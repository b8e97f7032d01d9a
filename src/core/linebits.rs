//! Lossless line-to-bits transcoding.
//!
//! Unlike the keypunch tables, this codec has no character set of its
//! own: each of the 80 columns carries the 8-bit code of one character,
//! most significant bit first, giving a fixed 640-bit card per line.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::core::deck::{BitCard, BitDeck, DeckMeta};

/// Visible characters per card.
pub const LINE_LEN: usize = 80;
/// Bits per character column.
pub const BITS_PER_CHAR: usize = 8;
/// Total payload of one card.
pub const BITS_PER_CARD: usize = LINE_LEN * BITS_PER_CHAR;

const PREVIEW_LEN: usize = 40;

/// Structural failures while decoding bit strings. Bit-length corruption
/// cannot be recovered heuristically, so these are hard errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BitError {
    #[error("bit string must be exactly {} bits, got {0}", BITS_PER_CARD)]
    InvalidLength(usize),
    #[error("bit string may only contain '0' and '1', found {0:?}")]
    InvalidBit(char),
}

/// Coarse language tag for decoded modern source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    Java,
    C,
    Unknown,
}

impl Language {
    pub fn name(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::Java => "java",
            Language::C => "c",
            Language::Unknown => "unknown",
        }
    }
}

/// Text reconstructed from a deck.
#[derive(Debug, Clone, Serialize)]
pub struct DecodedSource {
    pub source_code: String,
    pub lines: Vec<String>,
    pub total_lines: usize,
    pub language: Language,
}

/// Derived deck measurements, recomputed on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckStats {
    pub total_cards: usize,
    pub total_bits: usize,
    pub total_bytes: usize,
    pub total_characters: usize,
    pub average_line_length: f64,
}

/// Encode one line into exactly [`BITS_PER_CARD`] bits.
///
/// Input longer than 80 characters is silently truncated; callers that
/// care must compare lengths themselves. Characters outside the 8-bit
/// range cannot be represented and encode as `?`.
pub fn encode_line(line: &str) -> String {
    let mut bits = String::with_capacity(BITS_PER_CARD);
    let mut columns = 0;
    for ch in line.chars().take(LINE_LEN) {
        let code = u8::try_from(ch as u32).unwrap_or(b'?');
        bits.push_str(&format!("{code:08b}"));
        columns += 1;
    }
    while columns < LINE_LEN {
        bits.push_str(&format!("{:08b}", b' '));
        columns += 1;
    }
    bits
}

/// Decode exactly 640 bits back into a right-trimmed line.
pub fn decode_line(bits: &str) -> Result<String, BitError> {
    let chars: Vec<char> = bits.chars().collect();
    if chars.len() != BITS_PER_CARD {
        return Err(BitError::InvalidLength(chars.len()));
    }
    let mut line = String::with_capacity(LINE_LEN);
    for chunk in chars.chunks(BITS_PER_CHAR) {
        let mut code = 0u8;
        for &bit in chunk {
            code = (code << 1)
                | match bit {
                    '0' => 0,
                    '1' => 1,
                    other => return Err(BitError::InvalidBit(other)),
                };
        }
        line.push(char::from(code));
    }
    Ok(line.trim_end().to_string())
}

/// Split source text into lines and encode each as one card.
pub fn encode_source(text: &str, mut metadata: DeckMeta) -> BitDeck {
    let mut cards = Vec::new();
    for (index, line) in text.lines().enumerate() {
        cards.push(BitCard {
            column: index as u32 + 1,
            bits: encode_line(line),
            preview: Some(preview(line)),
        });
    }
    metadata.total_lines = Some(cards.len());
    BitDeck { cards, metadata }
}

/// Reconstruct source text from a deck, sorting by `column` first so
/// decks persisted or transmitted out of order decode identically.
pub fn decode_source(deck: &BitDeck) -> Result<DecodedSource, BitError> {
    let mut ordered: Vec<&BitCard> = deck.cards.iter().collect();
    ordered.sort_by_key(|card| card.column);
    let mut lines = Vec::with_capacity(ordered.len());
    for card in ordered {
        lines.push(decode_line(&card.bits)?);
    }
    let source_code = lines.join("\n");
    let language = detect_language(&source_code);
    Ok(DecodedSource {
        total_lines: lines.len(),
        source_code,
        lines,
        language,
    })
}

static BIT_STRING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[01]+$").unwrap());

/// Pre-decode guard: true iff `bits` is exactly 640 binary digits.
pub fn validate_bit_string(bits: &str) -> bool {
    bits.chars().count() == BITS_PER_CARD && BIT_STRING.is_match(bits)
}

/// First-match-wins substring sniffing; far coarser than the keypunch
/// dialect scorer, and deliberately so.
pub fn detect_language(text: &str) -> Language {
    if text.contains("def ") || text.contains("import ") || text.contains("print(") {
        Language::Python
    } else if text.contains("function ") || text.contains("const ") || text.contains("let ") {
        Language::JavaScript
    } else if text.contains("public class") || text.contains("System.out") {
        Language::Java
    } else if text.contains("#include") || text.contains("printf(") {
        Language::C
    } else {
        Language::Unknown
    }
}

/// Derived measurements over a whole deck.
pub fn deck_stats(deck: &BitDeck) -> Result<DeckStats, BitError> {
    let total_cards = deck.cards.len();
    let total_bits = total_cards * BITS_PER_CARD;
    let total_bytes = total_bits / BITS_PER_CHAR;
    let mut total_characters = 0;
    for card in &deck.cards {
        total_characters += decode_line(&card.bits)?.chars().count();
    }
    let average_line_length = if total_cards > 0 {
        round_one_decimal(total_characters as f64 / total_cards as f64)
    } else {
        0.0
    };
    Ok(DeckStats {
        total_cards,
        total_bits,
        total_bytes,
        total_characters,
        average_line_length,
    })
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn preview(line: &str) -> String {
    if line.chars().count() > PREVIEW_LEN {
        let truncated: String = line.chars().take(PREVIEW_LEN).collect();
        format!("{truncated}...")
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn round_trips_printable_ascii() {
        for line in ["", "HELLO, WORLD", "x = (a + b) * 2", "  indented  "] {
            assert_eq!(decode_line(&encode_line(line)).unwrap(), line.trim_end());
        }
    }

    #[test]
    fn encoded_length_is_always_640() {
        assert_eq!(encode_line("").chars().count(), BITS_PER_CARD);
        assert_eq!(encode_line("short").chars().count(), BITS_PER_CARD);
        let long = "x".repeat(200);
        assert_eq!(encode_line(&long).chars().count(), BITS_PER_CARD);
    }

    #[test]
    fn overlong_lines_truncate_silently() {
        let long: String = ('a'..='z').cycle().take(120).collect();
        let decoded = decode_line(&encode_line(&long)).unwrap();
        assert_eq!(decoded.chars().count(), LINE_LEN);
        assert_eq!(decoded, long.chars().take(LINE_LEN).collect::<String>());
    }

    #[test]
    fn decode_rejects_wrong_lengths() {
        assert_eq!(
            decode_line(&"0".repeat(639)).unwrap_err(),
            BitError::InvalidLength(639)
        );
        assert_eq!(
            decode_line(&"0".repeat(641)).unwrap_err(),
            BitError::InvalidLength(641)
        );
    }

    #[test]
    fn decode_rejects_non_binary_digits() {
        let mut bits = "0".repeat(BITS_PER_CARD);
        bits.replace_range(10..11, "a");
        assert_eq!(decode_line(&bits).unwrap_err(), BitError::InvalidBit('a'));
    }

    #[test]
    fn validate_bit_string_is_strict() {
        assert!(validate_bit_string(&"10".repeat(320)));
        assert!(!validate_bit_string(&"0".repeat(639)));
        assert!(!validate_bit_string(&"0".repeat(641)));
        assert!(!validate_bit_string(&format!("2{}", "0".repeat(639))));
        assert!(!validate_bit_string(""));
    }

    #[test]
    fn deck_decodes_independently_of_card_order() {
        let text = "def main():\n    print(1)\n    print(2)";
        let deck = encode_source(text, DeckMeta::default());
        let mut shuffled = deck.clone();
        shuffled.cards.swap(0, 2);
        shuffled.cards.swap(1, 2);
        let straight = decode_source(&deck).unwrap();
        let permuted = decode_source(&shuffled).unwrap();
        assert_eq!(permuted.source_code, straight.source_code);
        assert_eq!(straight.source_code, text);
        assert_eq!(straight.language, Language::Python);
    }

    #[test]
    fn encode_source_numbers_cards_and_records_totals() {
        let deck = encode_source("one\ntwo\nthree", DeckMeta::default());
        assert_eq!(
            deck.cards.iter().map(|c| c.column).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(deck.metadata.total_lines, Some(3));
    }

    #[test]
    fn preview_truncates_with_ellipsis() {
        let long = "A".repeat(60);
        let deck = encode_source(&long, DeckMeta::default());
        let preview = deck.cards[0].preview.as_deref().unwrap();
        assert_eq!(preview, format!("{}...", "A".repeat(40)));

        let deck = encode_source("short line", DeckMeta::default());
        assert_eq!(deck.cards[0].preview.as_deref(), Some("short line"));
    }

    #[test]
    fn stats_are_pure_derivations() {
        let deck = encode_source("abcd\nefghij", DeckMeta::default());
        let stats = deck_stats(&deck).unwrap();
        assert_eq!(stats.total_cards, 2);
        assert_eq!(stats.total_bits, 1280);
        assert_eq!(stats.total_bytes, 160);
        assert_eq!(stats.total_characters, 10);
        assert_eq!(stats.average_line_length, 5.0);

        let empty = BitDeck {
            cards: Vec::new(),
            metadata: DeckMeta::default(),
        };
        assert_eq!(deck_stats(&empty).unwrap().average_line_length, 0.0);
    }

    #[test]
    fn language_priority_is_fixed() {
        assert_eq!(detect_language("import os\nconst x = 1"), Language::Python);
        assert_eq!(detect_language("const x = 1"), Language::JavaScript);
        assert_eq!(detect_language("#include <stdio.h>"), Language::C);
        assert_eq!(detect_language("MOVE A TO B"), Language::Unknown);
    }
}
