//! Fixed game definitions and the listing of playable formats.
use std::sync::OnceLock;

use serde::Serialize;

use crate::constants::{
    LIGA_ARROWS_PER_END, LIGA_END_COUNT, LIGA_MAX_SCORING_PER_ARROW, SCIEZKA_END_COUNT,
};
use crate::end::{ArcherPosition, GameEnd, TargetPosition};
use crate::game::{ArcheryGame, GameKind};

use crate::end::ArcherPosition::{Backwards, Kneeling, Traditional};
use crate::end::TargetPosition::{Lower, Upper};

/// League ruleset: distance, archer position and target face per end.
const LIGA_TABLE: [(&str, ArcherPosition, TargetPosition); LIGA_END_COUNT as usize] = [
    ("15 m", Traditional, Upper),
    ("20 m", Traditional, Upper),
    ("25 m", Traditional, Upper),
    ("15 m", Kneeling, Upper),
    ("20 m", Traditional, Lower),
    ("25 m", Traditional, Lower),
    ("15 m", Backwards, Upper),
    ("20 m", Backwards, Upper),
    ("15 m", Traditional, Lower),
    ("20 m", Kneeling, Upper),
];

/// Liga end with the league's fixed arrow count and scoring.
#[must_use]
pub fn liga_end(
    end_number: u16,
    distance: &str,
    archer_position: ArcherPosition,
    target: TargetPosition,
) -> GameEnd {
    GameEnd::standard(
        end_number,
        distance,
        LIGA_ARROWS_PER_END,
        LIGA_MAX_SCORING_PER_ARROW,
    )
    .with_placement(archer_position, target)
}

fn build_liga() -> ArcheryGame {
    let ends = LIGA_TABLE
        .iter()
        .zip(1_u16..)
        .map(|(&(distance, position, target), number)| {
            liga_end(number, distance, position, target)
        })
        .collect();
    ArcheryGame::from_numbered(GameKind::Liga, ends)
}

/// The shared Liga game, built on first use and never mutated.
#[must_use]
pub fn liga() -> &'static ArcheryGame {
    static LIGA: OnceLock<ArcheryGame> = OnceLock::new();
    LIGA.get_or_init(build_liga)
}

/// Catalog row shown on the game selection screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub kind: GameKind,
    pub name: &'static str,
    pub end_count: u16,
    pub configurable: bool,
    pub description: &'static str,
}

pub struct GameCatalog;

impl GameCatalog {
    /// All prepared games.
    #[must_use]
    pub fn entries() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry {
                kind: GameKind::Liga,
                name: GameKind::Liga.display_name(),
                end_count: LIGA_END_COUNT,
                configurable: false,
                description: "6 arrows per end at 15, 20 and 25 m, 5-zone target",
            },
            CatalogEntry {
                kind: GameKind::Sciezka,
                name: GameKind::Sciezka.display_name(),
                end_count: SCIEZKA_END_COUNT,
                configurable: true,
                description: "14 targets along the course, markers and scoring chosen before start",
            },
        ]
    }

    #[must_use]
    pub fn entry(kind: GameKind) -> Option<CatalogEntry> {
        Self::entries().into_iter().find(|entry| entry.kind == kind)
    }
}
