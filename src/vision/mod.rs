//! Hole detection for photographed cards.

mod detect;

pub use detect::{
    DARKNESS_THRESHOLD, ImageDecodeError, PatternMeta, PunchPattern, REAL_CONFIDENCE_FLOOR,
    calculate_confidence, detect_holes, detect_holes_in, is_confidence_acceptable,
    preprocess_image,
};
