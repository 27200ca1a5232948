//! Network score to encoder quality.
//!
//! The lookup is exact-key only: a score that is not one of the breakpoints
//! gets [`DEFAULT_QUALITY`]. Most scores the estimator produces between
//! breakpoints therefore encode at 80, which is the long-standing behaviour.

/// Quality used whenever no better information is available.
pub const DEFAULT_QUALITY: u8 = 80;

/// `(network score, encoder quality)` pairs.
const BREAKPOINTS: [(u8, u8); 14] = [
    (0, 35),
    (25, 40),
    (30, 40),
    (35, 45),
    (40, 45),
    (45, 50),
    (50, 50),
    (55, 55),
    (60, 60),
    (65, 65),
    (70, 70),
    (75, 75),
    (80, 80),
    (100, 80),
];

/// Encoder quality for a network score.
pub fn encode_quality(score: u8) -> u8 {
    BREAKPOINTS
        .iter()
        .find(|(key, _)| *key == score)
        .map(|(_, quality)| *quality)
        .unwrap_or(DEFAULT_QUALITY)
}
