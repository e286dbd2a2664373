//! Game ends (rounds) and their legal score ranges.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::MARKER_SEPARATOR;

/// Marker labels stored inline without additional allocations.
pub const INLINE_MARKERS: usize = 4;

/// Shooting markers (pegs) an archer shoots from during one ścieżka end.
pub type Markers = SmallVec<[String; INLINE_MARKERS]>;

/// Body position the archer takes while shooting a Liga end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArcherPosition {
    /// Standing, facing the target
    Traditional,
    /// Kneeling
    Kneeling,
    /// Standing with the back to the target
    Backwards,
}

impl ArcherPosition {
    /// Label used by the league ruleset.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Traditional => "tradycyjna",
            Self::Kneeling => "klęcząc",
            Self::Backwards => "tyłem",
        }
    }
}

impl std::fmt::Display for ArcherPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Which of the two stacked target faces is shot at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetPosition {
    Upper,
    Lower,
}

impl TargetPosition {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Upper => "górna",
            Self::Lower => "dolna",
        }
    }
}

impl std::fmt::Display for TargetPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Descriptive archer/target layout of a Liga end. Has no effect on scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub archer_position: ArcherPosition,
    pub target: TargetPosition,
}

/// Distance representation of an end, selecting its scoring formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EndKind {
    /// One distance per end (Liga and plain ends).
    Standard {
        distance: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placement: Option<Placement>,
    },
    /// Every arrow set is shot once from each marker at the same target.
    MultiDistance { markers: Markers },
}

/// One end (round) of an archery game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEnd {
    pub end_number: u16,
    pub arrows_number: u32,
    pub max_scoring_per_arrow: u32,
    #[serde(flatten)]
    pub kind: EndKind,
}

impl GameEnd {
    /// Plain end shot from a single distance.
    #[must_use]
    pub fn standard(
        end_number: u16,
        distance: impl Into<String>,
        arrows_number: u32,
        max_scoring_per_arrow: u32,
    ) -> Self {
        Self {
            end_number,
            arrows_number,
            max_scoring_per_arrow,
            kind: EndKind::Standard {
                distance: distance.into(),
                placement: None,
            },
        }
    }

    /// End shot from every listed marker.
    #[must_use]
    pub fn multi_distance<I, S>(
        end_number: u16,
        markers: I,
        arrows_number: u32,
        max_scoring_per_arrow: u32,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            end_number,
            arrows_number,
            max_scoring_per_arrow,
            kind: EndKind::MultiDistance {
                markers: markers.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// Attach an archer/target layout. Only standard ends carry one.
    #[must_use]
    pub fn with_placement(
        mut self,
        archer_position: ArcherPosition,
        target: TargetPosition,
    ) -> Self {
        if let EndKind::Standard { placement, .. } = &mut self.kind {
            *placement = Some(Placement {
                archer_position,
                target,
            });
        }
        self
    }

    /// Number of distances shot in this end.
    #[must_use]
    pub fn distance_count(&self) -> usize {
        match &self.kind {
            EndKind::Standard { .. } => 1,
            EndKind::MultiDistance { markers } => markers.len(),
        }
    }

    /// Highest total achievable in this end, or `None` if it overflows `u32`.
    #[must_use]
    pub fn max_score_per_end(&self) -> Option<u32> {
        let per_distance = self.arrows_number.checked_mul(self.max_scoring_per_arrow)?;
        match &self.kind {
            EndKind::Standard { .. } => Some(per_distance),
            EndKind::MultiDistance { markers } => {
                per_distance.checked_mul(u32::try_from(markers.len()).ok()?)
            }
        }
    }

    /// All achievable end totals, from the maximum down to zero.
    ///
    /// Empty when the maximum is not representable.
    #[must_use]
    pub fn end_scoring_list(&self) -> Vec<u32> {
        self.max_score_per_end()
            .map_or_else(Vec::new, |max| (0..=max).rev().collect())
    }

    #[must_use]
    pub fn is_legal_score(&self, score: u32) -> bool {
        self.max_score_per_end().is_some_and(|max| score <= max)
    }

    #[must_use]
    pub const fn placement(&self) -> Option<&Placement> {
        match &self.kind {
            EndKind::Standard { placement, .. } => placement.as_ref(),
            EndKind::MultiDistance { .. } => None,
        }
    }

    /// Distance or markers as shown to the archer.
    #[must_use]
    pub fn distance_label(&self) -> String {
        match &self.kind {
            EndKind::Standard { distance, .. } => distance.clone(),
            EndKind::MultiDistance { markers } => markers.join(MARKER_SEPARATOR),
        }
    }
}
