//! Archery games as ordered sequences of ends.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{LIGA_DISPLAY_NAME, MAX_SCORE_PER_END, SCIEZKA_DISPLAY_NAME};
use crate::end::{EndKind, GameEnd};

/// Supported game formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    /// Fixed 10-end league game
    Liga,
    /// 14-end course with user-chosen markers and scoring
    Sciezka,
}

impl GameKind {
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Liga => LIGA_DISPLAY_NAME,
            Self::Sciezka => SCIEZKA_DISPLAY_NAME,
        }
    }
}

impl std::fmt::Display for GameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Liga => write!(f, "liga"),
            Self::Sciezka => write!(f, "sciezka"),
        }
    }
}

/// Errors raised when a list of ends does not form a playable game.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameDefinitionError {
    #[error("a game needs at least one end")]
    NoEnds,
    #[error("end at position {position} is numbered {found} (expected {expected})")]
    NonContiguous {
        position: usize,
        expected: u16,
        found: u16,
    },
    #[error("game has {count} ends, more than an end number can address")]
    TooManyEnds { count: usize },
    #[error("end {end_number} is shot from no markers")]
    NoMarkers { end_number: u16 },
    #[error("end {end_number} allows more than {} points", MAX_SCORE_PER_END)]
    ScoreTooHigh { end_number: u16 },
}

/// One full game instance. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawArcheryGame")]
pub struct ArcheryGame {
    kind: GameKind,
    ends: Vec<GameEnd>,
}

/// Stored form of a game, checked by [`ArcheryGame::new`] on load.
#[derive(Deserialize)]
struct RawArcheryGame {
    kind: GameKind,
    ends: Vec<GameEnd>,
}

impl TryFrom<RawArcheryGame> for ArcheryGame {
    type Error = GameDefinitionError;

    fn try_from(raw: RawArcheryGame) -> Result<Self, Self::Error> {
        Self::new(raw.kind, raw.ends)
    }
}

impl ArcheryGame {
    /// Assemble a game, checking that ends are numbered 1..N without gaps
    /// and that every end has a bounded, non-empty scoring range.
    ///
    /// # Errors
    ///
    /// Returns `GameDefinitionError` when `ends` is empty, misnumbered, has a
    /// marker-less multi-distance end, or an end worth more than
    /// [`MAX_SCORE_PER_END`].
    pub fn new(kind: GameKind, ends: Vec<GameEnd>) -> Result<Self, GameDefinitionError> {
        if ends.is_empty() {
            return Err(GameDefinitionError::NoEnds);
        }
        if u16::try_from(ends.len()).is_err() {
            return Err(GameDefinitionError::TooManyEnds { count: ends.len() });
        }
        for (position, (end, expected)) in ends.iter().zip(1_u16..).enumerate() {
            if end.end_number != expected {
                return Err(GameDefinitionError::NonContiguous {
                    position,
                    expected,
                    found: end.end_number,
                });
            }
            if let EndKind::MultiDistance { markers } = &end.kind
                && markers.is_empty()
            {
                return Err(GameDefinitionError::NoMarkers { end_number: expected });
            }
            if end
                .max_score_per_end()
                .is_none_or(|max| max > MAX_SCORE_PER_END)
            {
                return Err(GameDefinitionError::ScoreTooHigh { end_number: expected });
            }
        }
        Ok(Self { kind, ends })
    }

    /// Build from ends generated in order by this crate.
    pub(crate) fn from_numbered(kind: GameKind, ends: Vec<GameEnd>) -> Self {
        debug_assert!(
            ends.iter()
                .zip(1_u16..)
                .all(|(end, expected)| end.end_number == expected)
        );
        Self { kind, ends }
    }

    #[must_use]
    pub const fn kind(&self) -> GameKind {
        self.kind
    }

    #[must_use]
    pub fn ends(&self) -> &[GameEnd] {
        &self.ends
    }

    /// Total number of ends (N).
    #[must_use]
    pub fn end_count(&self) -> u16 {
        u16::try_from(self.ends.len()).unwrap_or(u16::MAX)
    }

    /// End by its 1-based number; `None` outside 1..=N.
    #[must_use]
    pub fn end(&self, end_number: u16) -> Option<&GameEnd> {
        let index = usize::from(end_number).checked_sub(1)?;
        self.ends.get(index)
    }

    /// Sum of every end's maximum.
    ///
    /// Saturates for unchecked games whose ends overflow.
    #[must_use]
    pub fn max_total_score(&self) -> u32 {
        self.ends
            .iter()
            .map(|end| end.max_score_per_end().unwrap_or(u32::MAX))
            .fold(0, u32::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_ends(count: u16) -> Vec<GameEnd> {
        (1..=count)
            .map(|n| GameEnd::standard(n, "15 m", 3, 10))
            .collect()
    }

    #[test]
    fn ends_are_addressed_one_based() {
        let game = ArcheryGame::new(GameKind::Liga, plain_ends(3)).unwrap();
        assert_eq!(game.end_count(), 3);
        assert_eq!(game.end(1).map(|e| e.end_number), Some(1));
        assert_eq!(game.end(3).map(|e| e.end_number), Some(3));
        assert!(game.end(0).is_none());
        assert!(game.end(4).is_none());
        assert_eq!(game.max_total_score(), 90);
    }

    #[test]
    fn rejects_empty_and_gapped_definitions() {
        assert_eq!(
            ArcheryGame::new(GameKind::Sciezka, Vec::new()),
            Err(GameDefinitionError::NoEnds)
        );

        let mut ends = plain_ends(3);
        ends[2].end_number = 5;
        let err = ArcheryGame::new(GameKind::Liga, ends).unwrap_err();
        assert_eq!(
            err,
            GameDefinitionError::NonContiguous {
                position: 2,
                expected: 3,
                found: 5
            }
        );
        assert!(err.to_string().contains("numbered 5"));
    }

    #[test]
    fn rejects_unbounded_and_markerless_ends() {
        let ends = vec![GameEnd::standard(1, "x", 1, MAX_SCORE_PER_END + 1)];
        assert_eq!(
            ArcheryGame::new(GameKind::Sciezka, ends),
            Err(GameDefinitionError::ScoreTooHigh { end_number: 1 })
        );

        let ends = vec![GameEnd::standard(1, "x", 65_536, 65_536)];
        assert_eq!(
            ArcheryGame::new(GameKind::Sciezka, ends),
            Err(GameDefinitionError::ScoreTooHigh { end_number: 1 })
        );

        let mut ends = plain_ends(2);
        ends.push(GameEnd::multi_distance(3, Vec::<String>::new(), 2, 10));
        assert_eq!(
            ArcheryGame::new(GameKind::Sciezka, ends),
            Err(GameDefinitionError::NoMarkers { end_number: 3 })
        );
    }

    #[test]
    fn loading_checks_the_definition() {
        let game = ArcheryGame::new(GameKind::Liga, plain_ends(2)).unwrap();
        let json = serde_json::to_string(&game).unwrap();
        assert_eq!(serde_json::from_str::<ArcheryGame>(&json).unwrap(), game);

        let empty = r#"{"kind":"sciezka","ends":[]}"#;
        let err = serde_json::from_str::<ArcheryGame>(empty).unwrap_err();
        assert!(err.to_string().contains("at least one end"));

        let gapped = r#"{"kind":"sciezka","ends":[
            {"end_number":7,"arrows_number":2,"max_scoring_per_arrow":10,
             "kind":"multi_distance","markers":["a"]}]}"#;
        let err = serde_json::from_str::<ArcheryGame>(gapped).unwrap_err();
        assert!(err.to_string().contains("numbered 7"));

        let markerless = r#"{"kind":"sciezka","ends":[
            {"end_number":1,"arrows_number":2,"max_scoring_per_arrow":10,
             "kind":"multi_distance","markers":[]}]}"#;
        let err = serde_json::from_str::<ArcheryGame>(markerless).unwrap_err();
        assert!(err.to_string().contains("no markers"));
    }

    #[test]
    fn kind_labels() {
        assert_eq!(GameKind::Liga.to_string(), "liga");
        assert_eq!(GameKind::Sciezka.display_name(), "ścieżka łucznicza");
    }
}
