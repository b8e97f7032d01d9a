//! On-disk deck format for bit-packed cards.
//!
//! A deck file is a single JSON document:
//! `{"cards":[{"column":1,"bits":"0100...","preview":"..."}],"metadata":{...}}`.
//! Card order inside the file is not trusted; consumers sort by `column`.

use std::fs::{self, OpenOptions};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::core::grid::{GridMode, HoleGrid};
use crate::core::linebits::BITS_PER_CHAR;

/// One encoded line: a 1-based line number and its 640-bit payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitCard {
    pub column: u32,
    pub bits: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

impl BitCard {
    /// Project the bits onto an 8x80 grid for display: bit `r` of the
    /// character in column `c` lands at cell (r, c).
    pub fn to_grid(&self) -> HoleGrid {
        let bits: Vec<char> = self.bits.chars().collect();
        HoleGrid::from_fn(GridMode::Line, |row, col| {
            bits.get(col * BITS_PER_CHAR + row).copied() == Some('1')
        })
    }
}

/// Optional deck-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_lines: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

/// Ordered collection of bit cards plus metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitDeck {
    pub cards: Vec<BitCard>,
    #[serde(default)]
    pub metadata: DeckMeta,
}

impl BitDeck {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to open deck file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse deck file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("failed to write deck file {}", path.display()))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self).context("failed to serialize deck")?;
        Ok(())
    }

    /// SHA-256 over the cards in column order, independent of the order
    /// they were inserted or stored in.
    pub fn checksum(&self) -> String {
        let mut ordered: Vec<&BitCard> = self.cards.iter().collect();
        ordered.sort_by_key(|card| card.column);
        let mut hasher = Sha256::new();
        for card in ordered {
            hasher.update(card.column.to_be_bytes());
            hasher.update(card.bits.as_bytes());
        }
        let digest = hasher.finalize();
        digest.iter().map(|byte| format!("{byte:02x}")).collect()
    }

    /// Stamp creation time and content checksum into the metadata.
    pub fn seal(&mut self) {
        self.metadata.created_at = Some(Utc::now());
        self.metadata.checksum = Some(self.checksum());
    }

    /// Compare the stored checksum against the current contents.
    /// `None` when the deck was never sealed.
    pub fn verify_checksum(&self) -> Option<bool> {
        self.metadata
            .checksum
            .as_ref()
            .map(|stored| *stored == self.checksum())
    }
}

/// Default deck path derived from a source file: `foo.bas` -> `foo.deck.json`.
pub fn deck_path_for(source: &Path) -> PathBuf {
    let mut path = source.to_path_buf();
    path.set_extension("deck.json");
    path
}
