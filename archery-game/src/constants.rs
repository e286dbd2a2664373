//! Fixed parameters of the supported archery game formats.
//!
//! The league ruleset and the course layout are not user-tunable, so the
//! numbers live in code rather than in external data files.

// Liga 15/20/25m -----------------------------------------------------------
pub const LIGA_END_COUNT: u16 = 10;
pub const LIGA_ARROWS_PER_END: u32 = 6;
pub const LIGA_MAX_SCORING_PER_ARROW: u32 = 5;

// Ścieżka łucznicza --------------------------------------------------------
/// One end per target along the course.
pub const SCIEZKA_END_COUNT: u16 = 14;

// Scoring limits -----------------------------------------------------------
/// Highest end total a game may offer; bounds the legal score list.
pub const MAX_SCORE_PER_END: u32 = 10_000;

// Display labels -----------------------------------------------------------
pub const LIGA_DISPLAY_NAME: &str = "Liga 15/20/25m";
pub const SCIEZKA_DISPLAY_NAME: &str = "ścieżka łucznicza";
pub const MARKER_SEPARATOR: &str = ", ";

// Log targets --------------------------------------------------------------
pub(crate) const LOG_TARGET_SESSION: &str = "archery_game::session";
pub(crate) const LOG_TARGET_ENGINE: &str = "archery_game::engine";
