//! Convenience helpers shared across command handlers.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cardlift::BitDeck;

/// Resolve plain-text input from an optional path (`-` or absent = stdin).
pub fn read_text_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        }
        _ => read_stdin(),
    }
}

/// Read the entire stdin stream into memory.
pub fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read from stdin")?;
    Ok(buffer)
}

/// Persist a string either to a file or stdout when `-` is provided.
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    if path.as_os_str() == "-" {
        io::stdout().write_all(content.as_bytes())?;
        return Ok(());
    }
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

/// Load a deck file, attaching path context to any error.
pub fn load_deck(path: &Path) -> Result<BitDeck> {
    BitDeck::load(path).with_context(|| format!("failed to read deck {}", path.display()))
}

/// Name recorded in deck metadata for a given input path.
pub fn input_filename(path: Option<&Path>) -> Option<String> {
    path.and_then(|p| p.file_name())
        .map(|name| name.to_string_lossy().into_owned())
}

/// Ensure the parent directory of a target file exists.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Output path for one rendered card PNG inside a directory.
pub fn card_png_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("card_{:04}.png", index + 1))
}
