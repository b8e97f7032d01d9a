//! Keyword-scoring heuristics for the legacy dialects that actually
//! shipped on 80-column cards.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Legacy source dialect of a decoded card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Fortran,
    Cobol,
    Assembler,
    Basic,
    Unknown,
}

impl Dialect {
    pub fn name(self) -> &'static str {
        match self {
            Dialect::Fortran => "FORTRAN",
            Dialect::Cobol => "COBOL",
            Dialect::Assembler => "ASSEMBLER",
            Dialect::Basic => "BASIC",
            Dialect::Unknown => "unknown",
        }
    }
}

/// A single incidental keyword is not evidence; scores below this are
/// reported as [`Dialect::Unknown`].
const MIN_SCORE: u32 = 2;

static FORTRAN_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    word_set(&[
        "PROGRAM",
        "SUBROUTINE",
        "FUNCTION",
        "DIMENSION",
        "CONTINUE",
        "GOTO",
        "FORMAT",
        "WRITE",
        "READ",
        "INTEGER",
        "REAL",
        "DOUBLE",
        "CALL",
        "RETURN",
        "STOP",
        "END",
        "DO",
    ])
});

static COBOL_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    word_set(&[
        "IDENTIFICATION",
        "ENVIRONMENT",
        "PROCEDURE",
        "DIVISION",
        "SECTION",
        "WORKING-STORAGE",
        "PERFORM",
        "MOVE",
        "COMPUTE",
        "DISPLAY",
        "ACCEPT",
        "PICTURE",
        "PIC",
        "FILLER",
    ])
});

static ASSEMBLER_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    word_set(&[
        "CSECT", "DSECT", "USING", "BALR", "MVC", "MVI", "CLC", "CLI", "EQU", "LTORG", "ORG",
        "STM", "BCR", "LM", "DC", "DS",
    ])
});

static BASIC_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    word_set(&[
        "PRINT", "INPUT", "LET", "GOSUB", "REM", "THEN", "NEXT", "FOR", "STEP", "DIM", "RND",
    ])
});

// Labeled statement in the first six columns, e.g. "  100 FORMAT".
static FORTRAN_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s{0,5}\d{1,5}\s+[A-Z]").unwrap());

// Numbered line starting at column one, e.g. "10 PRINT".
static BASIC_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\d+\s+[A-Z]").unwrap());

static ASSEMBLER_REGISTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bR(?:1[0-5]|[0-9])\b").unwrap());

fn word_set(keywords: &[&str]) -> Regex {
    Regex::new(&format!(r"\b(?:{})\b", keywords.join("|"))).unwrap()
}

/// Pick the dialect with the strictly highest keyword score.
///
/// Ties fall through to [`Dialect::Unknown`], as does any winner scoring
/// below [`MIN_SCORE`].
pub fn detect_dialect(text: &str) -> Dialect {
    let upper = text.to_uppercase();
    let scored = [
        (Dialect::Fortran, score_fortran(&upper)),
        (Dialect::Cobol, score_cobol(&upper)),
        (Dialect::Assembler, score_assembler(&upper)),
        (Dialect::Basic, score_basic(&upper)),
    ];

    let mut winner = Dialect::Unknown;
    let mut best = 0u32;
    let mut tied = false;
    for (dialect, score) in scored {
        if score > best {
            winner = dialect;
            best = score;
            tied = false;
        } else if score == best && score > 0 {
            tied = true;
        }
    }
    if tied || best < MIN_SCORE {
        Dialect::Unknown
    } else {
        winner
    }
}

fn score_fortran(upper: &str) -> u32 {
    let mut score = FORTRAN_KEYWORDS.find_iter(upper).count() as u32;
    if FORTRAN_LABEL.is_match(upper) {
        score += 5;
    }
    score
}

fn score_cobol(upper: &str) -> u32 {
    let mut score = COBOL_KEYWORDS.find_iter(upper).count() as u32;
    if upper.contains("DIVISION") {
        score += 10;
    }
    score
}

fn score_assembler(upper: &str) -> u32 {
    let mut score = ASSEMBLER_KEYWORDS.find_iter(upper).count() as u32;
    if ASSEMBLER_REGISTERS.is_match(upper) {
        score += 5;
    }
    score
}

fn score_basic(upper: &str) -> u32 {
    let mut score = BASIC_KEYWORDS.find_iter(upper).count() as u32;
    if BASIC_LINE.is_match(upper) {
        score += 5;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_keyword_is_below_threshold() {
        assert_eq!(detect_dialect("END"), Dialect::Unknown);
        assert_eq!(detect_dialect("THE END OF THE STORY"), Dialect::Unknown);
    }

    #[test]
    fn fortran_with_labels_and_keywords() {
        let source = "      PROGRAM MAIN\n      WRITE (6,100)\n  100 FORMAT (1H0)\n      END";
        assert_eq!(detect_dialect(source), Dialect::Fortran);
    }

    #[test]
    fn division_plus_keyword_detects_cobol() {
        assert_eq!(detect_dialect("IDENTIFICATION DIVISION."), Dialect::Cobol);
        assert_eq!(detect_dialect("PROCEDURE DIVISION.\nMOVE A TO B."), Dialect::Cobol);
    }

    #[test]
    fn numbered_basic_lines() {
        let source = "10 LET A=1\n20 PRINT A\n30 GOSUB 100";
        assert_eq!(detect_dialect(source), Dialect::Basic);
    }

    #[test]
    fn assembler_registers_and_opcodes() {
        let source = "MAIN     CSECT\n         USING *,R12\n         MVC   OUT,IN";
        assert_eq!(detect_dialect(source), Dialect::Assembler);
    }

    #[test]
    fn keyword_matching_is_whole_word() {
        // ENDING and FORMATTED must not count as END / FORMAT.
        assert_eq!(detect_dialect("ENDING FORMATTED GOTOX"), Dialect::Unknown);
    }

    #[test]
    fn lowercase_input_is_uppercased_first() {
        let source = "      program main\n      continue\n      end";
        assert_eq!(detect_dialect(source), Dialect::Fortran);
    }
}
