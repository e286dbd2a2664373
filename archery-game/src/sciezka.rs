//! Ścieżka łucznicza: a 14-target course configured before the start.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{MAX_SCORE_PER_END, SCIEZKA_END_COUNT};
use crate::end::{GameEnd, Markers};
use crate::game::{ArcheryGame, GameKind};

/// Build a ścieżka game of identical ends, one per target.
///
/// Performs no validation; callers reject an empty marker selection first
/// (see [`SciezkaParams::build`]).
#[must_use]
pub fn create_sciezka<I, S>(
    distances: I,
    arrows_number: u32,
    max_scoring_per_arrow: u32,
) -> ArcheryGame
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let markers: Markers = distances.into_iter().map(Into::into).collect();
    let ends = (1..=SCIEZKA_END_COUNT)
        .map(|number| {
            GameEnd::multi_distance(
                number,
                markers.iter().cloned(),
                arrows_number,
                max_scoring_per_arrow,
            )
        })
        .collect();
    ArcheryGame::from_numbered(GameKind::Sciezka, ends)
}

/// Recoverable problems with a submitted ścieżka setup form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("Nie wybrałeś/-aś żadnego palika")]
    NoMarkersSelected,
    #[error("{field} must be a positive number")]
    NonPositive { field: &'static str },
    #[error("an end would be worth more than {} points", MAX_SCORE_PER_END)]
    ScoreTooHigh,
}

/// Parameters chosen on the ścieżka setup form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SciezkaParams {
    pub markers: Markers,
    pub arrows_number: u32,
    pub max_scoring_per_arrow: u32,
}

impl SciezkaParams {
    #[must_use]
    pub fn new<I, S>(markers: I, arrows_number: u32, max_scoring_per_arrow: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
            arrows_number,
            max_scoring_per_arrow,
        }
    }

    /// # Errors
    ///
    /// Returns `SetupError` when no marker is selected, a count is zero, or
    /// an end would exceed [`MAX_SCORE_PER_END`].
    pub fn validate(&self) -> Result<(), SetupError> {
        let selected = self
            .markers
            .iter()
            .filter(|marker| !marker.trim().is_empty())
            .count();
        if selected == 0 {
            return Err(SetupError::NoMarkersSelected);
        }
        if self.arrows_number == 0 {
            return Err(SetupError::NonPositive {
                field: "arrows_number",
            });
        }
        if self.max_scoring_per_arrow == 0 {
            return Err(SetupError::NonPositive {
                field: "max_scoring_per_arrow",
            });
        }
        let max_per_end = u32::try_from(selected)
            .ok()
            .and_then(|count| count.checked_mul(self.arrows_number))
            .and_then(|per_arrow| per_arrow.checked_mul(self.max_scoring_per_arrow));
        if max_per_end.is_none_or(|max| max > MAX_SCORE_PER_END) {
            return Err(SetupError::ScoreTooHigh);
        }
        Ok(())
    }

    /// Validate, then build the game.
    ///
    /// # Errors
    ///
    /// Returns `SetupError` when the parameters fail [`Self::validate`].
    pub fn build(&self) -> Result<ArcheryGame, SetupError> {
        self.validate()?;
        let markers = self
            .markers
            .iter()
            .map(|marker| marker.trim())
            .filter(|marker| !marker.is_empty());
        Ok(create_sciezka(
            markers,
            self.arrows_number,
            self.max_scoring_per_arrow,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_builds_fourteen_identical_ends() {
        let game = create_sciezka(["żółty", "czerwony"], 3, 10);
        assert_eq!(game.kind(), GameKind::Sciezka);
        assert_eq!(game.end_count(), 14);
        let first = game.end(1).unwrap();
        for (end, expected) in game.ends().iter().zip(1_u16..) {
            assert_eq!(end.end_number, expected);
            assert_eq!(end.kind, first.kind);
            assert_eq!(end.arrows_number, 3);
            assert_eq!(end.max_scoring_per_arrow, 10);
            assert_eq!(end.max_score_per_end(), Some(60));
        }
    }

    #[test]
    fn empty_selection_is_rejected_before_building() {
        let params = SciezkaParams::new(Vec::<String>::new(), 2, 10);
        assert_eq!(params.build(), Err(SetupError::NoMarkersSelected));
        assert_eq!(
            SetupError::NoMarkersSelected.to_string(),
            "Nie wybrałeś/-aś żadnego palika"
        );

        let blank = SciezkaParams::new(["  "], 2, 10);
        assert_eq!(blank.validate(), Err(SetupError::NoMarkersSelected));
    }

    #[test]
    fn zero_counts_are_rejected() {
        let params = SciezkaParams::new(["a"], 0, 10);
        assert_eq!(
            params.validate(),
            Err(SetupError::NonPositive {
                field: "arrows_number"
            })
        );
        let params = SciezkaParams::new(["a"], 2, 0);
        assert!(params.validate().is_err());
    }

    #[test]
    fn oversized_scoring_is_rejected() {
        let params = SciezkaParams::new(["a"], 1, u32::MAX);
        assert_eq!(params.validate(), Err(SetupError::ScoreTooHigh));

        let params = SciezkaParams::new(["a", "b"], 65_536, 65_536);
        assert_eq!(params.build(), Err(SetupError::ScoreTooHigh));

        let at_limit = SciezkaParams::new(["a", "b"], 50, MAX_SCORE_PER_END / 100);
        let game = at_limit.build().unwrap();
        assert_eq!(game.end(1).unwrap().max_score_per_end(), Some(MAX_SCORE_PER_END));

        let over = SciezkaParams::new(["a", "b", " "], 50, MAX_SCORE_PER_END / 100 + 1);
        assert_eq!(over.validate(), Err(SetupError::ScoreTooHigh));
    }

    #[test]
    fn build_drops_blank_markers() {
        let params = SciezkaParams::new(["biały", " ", "niebieski "], 2, 5);
        let game = params.build().unwrap();
        assert_eq!(game.end(14).unwrap().distance_count(), 2);
        assert_eq!(game.end(1).unwrap().distance_label(), "biały, niebieski");
    }
}
