//! Per-visitor score accumulation across the ends of one game.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::liga;
use crate::constants::LOG_TARGET_SESSION;
use crate::end::GameEnd;
use crate::game::{ArcheryGame, GameKind};

/// Game played by a session.
///
/// Liga resolves to the shared catalog instance; a ścieżka game is owned by
/// the session that configured it so concurrent visitors never observe each
/// other's setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", content = "game", rename_all = "lowercase")]
pub enum SessionGame {
    Liga,
    Sciezka(ArcheryGame),
}

impl SessionGame {
    #[must_use]
    pub fn game(&self) -> &ArcheryGame {
        match self {
            Self::Liga => liga(),
            Self::Sciezka(game) => game,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> GameKind {
        match self {
            Self::Liga => GameKind::Liga,
            Self::Sciezka(_) => GameKind::Sciezka,
        }
    }
}

/// Recorded end scores plus the number of the end awaiting a score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSheet {
    cursor: u16,
    scores: BTreeMap<u16, u32>,
}

impl Default for ScoreSheet {
    fn default() -> Self {
        Self {
            cursor: 1,
            scores: BTreeMap::new(),
        }
    }
}

impl ScoreSheet {
    #[must_use]
    pub const fn cursor(&self) -> u16 {
        self.cursor
    }

    #[must_use]
    pub const fn scores(&self) -> &BTreeMap<u16, u32> {
        &self.scores
    }

    #[must_use]
    pub fn score_for(&self, end_number: u16) -> Option<u32> {
        self.scores.get(&end_number).copied()
    }

    #[must_use]
    pub fn running_total(&self) -> u32 {
        self.scores.values().copied().fold(0, u32::saturating_add)
    }

    fn record_and_advance(&mut self, score: u32) {
        self.scores.insert(self.cursor, score);
        self.cursor = self.cursor.saturating_add(1);
    }
}

/// What the view layer needs to render the end awaiting a score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndView {
    pub current_end_number: u16,
    pub end_count: u16,
    pub end: GameEnd,
    pub legal_scores: Vec<u32>,
    pub running_total: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndScore {
    pub end_number: u16,
    pub score: u32,
}

/// Outcome of a completed game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalResult {
    pub game: GameKind,
    pub result: u32,
    pub max_total: u32,
    pub per_end: Vec<EndScore>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionStatus {
    AwaitingEnd(EndView),
    Finished(FinalResult),
}

/// Result of one accepted score submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    Next(EndView),
    Finished(FinalResult),
}

/// Rejected submissions. The session is left untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error("score {score} is outside 0..={max} for end {end_number}")]
    OutOfRange {
        end_number: u16,
        score: u32,
        max: u32,
    },
    #[error("score submitted for end {submitted} while end {expected} is awaiting a score")]
    OutOfSequence { expected: u16, submitted: u16 },
    #[error("game already finished with {result} points")]
    AlreadyFinished { result: u32 },
    #[error("end {end_number} has no representable maximum score")]
    UnboundedEnd { end_number: u16 },
}

/// Saved session data that does not describe a reachable state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionDataError {
    #[error("cursor {cursor} is outside 1..={limit}")]
    CursorOutOfRange { cursor: u16, limit: u32 },
    #[error("recorded ends do not match cursor {cursor}")]
    ScoresMismatch { cursor: u16 },
    #[error("recorded score {score} is not legal for end {end_number}")]
    IllegalScore { end_number: u16, score: u32 },
}

/// A game traversal: AWAITING_END[1..=N] then FINISHED.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SavedSession")]
pub struct ScoringSession {
    game: SessionGame,
    #[serde(default)]
    sheet: ScoreSheet,
}

#[derive(Deserialize)]
struct SavedSession {
    game: SessionGame,
    #[serde(default)]
    sheet: ScoreSheet,
}

impl TryFrom<SavedSession> for ScoringSession {
    type Error = SessionDataError;

    /// Accept only sheets with ends 1..cursor scored legally and the cursor
    /// within 1..=N+1.
    fn try_from(saved: SavedSession) -> Result<Self, Self::Error> {
        let SavedSession { game, sheet } = saved;
        let limit = u32::from(game.game().end_count()) + 1;
        if sheet.cursor == 0 || u32::from(sheet.cursor) > limit {
            return Err(SessionDataError::CursorOutOfRange {
                cursor: sheet.cursor,
                limit,
            });
        }
        if !sheet.scores.keys().copied().eq(1..sheet.cursor) {
            return Err(SessionDataError::ScoresMismatch {
                cursor: sheet.cursor,
            });
        }
        for (&end_number, &score) in &sheet.scores {
            let legal = game
                .game()
                .end(end_number)
                .is_some_and(|end| end.is_legal_score(score));
            if !legal {
                return Err(SessionDataError::IllegalScore { end_number, score });
            }
        }
        Ok(Self { game, sheet })
    }
}

impl ScoringSession {
    #[must_use]
    pub fn new(game: SessionGame) -> Self {
        log::debug!(
            target: LOG_TARGET_SESSION,
            "starting {} session with {} ends",
            game.kind(),
            game.game().end_count()
        );
        Self {
            game,
            sheet: ScoreSheet::default(),
        }
    }

    #[must_use]
    pub fn liga() -> Self {
        Self::new(SessionGame::Liga)
    }

    /// Restore a session saved with [`Self::to_json`].
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a session, its game
    /// fails the checks of [`ArcheryGame::new`], or its sheet could not have
    /// been produced by [`Self::submit`].
    pub fn from_json(json: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(json)
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    #[must_use]
    pub fn sciezka(game: ArcheryGame) -> Self {
        Self::new(SessionGame::Sciezka(game))
    }

    #[must_use]
    pub fn game(&self) -> &ArcheryGame {
        self.game.game()
    }

    #[must_use]
    pub const fn kind(&self) -> GameKind {
        self.game.kind()
    }

    #[must_use]
    pub const fn sheet(&self) -> &ScoreSheet {
        &self.sheet
    }

    #[must_use]
    pub const fn current_end_number(&self) -> u16 {
        self.sheet.cursor
    }

    #[must_use]
    pub fn running_total(&self) -> u32 {
        self.sheet.running_total()
    }

    /// True once the cursor has moved past the last end.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.sheet.cursor > self.game().end_count()
    }

    /// End awaiting a score, if any.
    #[must_use]
    pub fn current_end(&self) -> Option<&GameEnd> {
        if self.is_finished() {
            return None;
        }
        self.game().end(self.sheet.cursor)
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        match self.current_view() {
            Some(view) => SessionStatus::AwaitingEnd(view),
            None => SessionStatus::Finished(self.final_result()),
        }
    }

    /// Final total once every end has a score.
    #[must_use]
    pub fn result(&self) -> Option<FinalResult> {
        self.is_finished().then(|| self.final_result())
    }

    /// Record `score` for `end_number` and move to the next end or finish.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError` when the game is finished, `end_number` is not the
    /// end awaiting a score, or `score` exceeds the end's maximum (or the
    /// maximum itself is not representable).
    pub fn submit(&mut self, end_number: u16, score: u32) -> Result<StepOutcome, ScoreError> {
        let expected = self.sheet.cursor;
        let Some(end) = self.current_end() else {
            let result = self.running_total();
            log::warn!(target: LOG_TARGET_SESSION, "submission after finish ignored");
            return Err(ScoreError::AlreadyFinished { result });
        };
        if end_number != expected {
            log::warn!(
                target: LOG_TARGET_SESSION,
                "end {end_number} submitted while awaiting end {expected}"
            );
            return Err(ScoreError::OutOfSequence {
                expected,
                submitted: end_number,
            });
        }
        let Some(max) = end.max_score_per_end() else {
            log::warn!(target: LOG_TARGET_SESSION, "end {end_number} has no representable maximum");
            return Err(ScoreError::UnboundedEnd { end_number });
        };
        if score > max {
            log::warn!(
                target: LOG_TARGET_SESSION,
                "rejected score {score} for end {end_number} (max {max})"
            );
            return Err(ScoreError::OutOfRange {
                end_number,
                score,
                max,
            });
        }

        self.sheet.record_and_advance(score);
        log::debug!(
            target: LOG_TARGET_SESSION,
            "end {end_number} scored {score}, running total {}",
            self.running_total()
        );

        Ok(match self.current_view() {
            Some(view) => StepOutcome::Next(view),
            None => {
                let result = self.final_result();
                log::info!(
                    target: LOG_TARGET_SESSION,
                    "{} finished with {} of {} points",
                    result.game,
                    result.result,
                    result.max_total
                );
                StepOutcome::Finished(result)
            }
        })
    }

    /// Discard recorded scores and return to the first end.
    pub fn restart(&mut self) {
        self.sheet = ScoreSheet::default();
    }

    fn current_view(&self) -> Option<EndView> {
        let end = self.current_end()?;
        Some(EndView {
            current_end_number: self.sheet.cursor,
            end_count: self.game().end_count(),
            end: end.clone(),
            legal_scores: end.end_scoring_list(),
            running_total: self.running_total(),
        })
    }

    fn final_result(&self) -> FinalResult {
        FinalResult {
            game: self.kind(),
            result: self.running_total(),
            max_total: self.game().max_total_score(),
            per_end: self
                .sheet
                .scores
                .iter()
                .map(|(&end_number, &score)| EndScore { end_number, score })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sciezka::create_sciezka;

    #[test]
    fn fresh_session_awaits_first_end() {
        let session = ScoringSession::liga();
        let SessionStatus::AwaitingEnd(view) = session.status() else {
            panic!("expected first end");
        };
        assert_eq!(view.current_end_number, 1);
        assert_eq!(view.end_count, 10);
        assert_eq!(view.running_total, 0);
        assert_eq!(view.legal_scores.first(), Some(&30));
        assert!(session.result().is_none());
    }

    #[test]
    fn liga_traversal_sums_recorded_scores() {
        let mut session = ScoringSession::liga();
        let scores = [10, 20, 15, 5, 25, 30, 12, 18, 22, 9];
        let mut last = None;
        for (score, end_number) in scores.into_iter().zip(1_u16..) {
            last = Some(session.submit(end_number, score).unwrap());
        }
        let Some(StepOutcome::Finished(result)) = last else {
            panic!("expected finish after last end");
        };
        assert_eq!(result.result, 166);
        assert_eq!(result.max_total, 300);
        assert_eq!(result.per_end.len(), 10);
        assert_eq!(session.current_end_number(), 11);
        assert!(session.current_end().is_none());
        assert!(matches!(session.status(), SessionStatus::Finished(_)));
    }

    #[test]
    fn running_total_is_reported_with_next_end() {
        let mut session = ScoringSession::liga();
        session.submit(1, 12).unwrap();
        let StepOutcome::Next(view) = session.submit(2, 7).unwrap() else {
            panic!("expected third end");
        };
        assert_eq!(view.current_end_number, 3);
        assert_eq!(view.running_total, 19);
        assert_eq!(view.end.distance_label(), "25 m");
    }

    #[test]
    fn rejected_submissions_leave_state_untouched() {
        let mut session = ScoringSession::liga();
        let before = session.clone();

        assert_eq!(
            session.submit(1, 31),
            Err(ScoreError::OutOfRange {
                end_number: 1,
                score: 31,
                max: 30
            })
        );
        assert_eq!(
            session.submit(2, 10),
            Err(ScoreError::OutOfSequence {
                expected: 1,
                submitted: 2
            })
        );
        assert_eq!(session, before);
    }

    #[test]
    fn submitting_past_the_last_end_is_rejected() {
        let mut session = ScoringSession::sciezka(create_sciezka(["a"], 1, 1));
        for end_number in 1..=14 {
            session.submit(end_number, 1).unwrap();
        }
        assert_eq!(session.current_end_number(), 15);
        assert_eq!(
            session.submit(15, 0),
            Err(ScoreError::AlreadyFinished { result: 14 })
        );
        assert_eq!(session.result().map(|r| r.result), Some(14));
    }

    #[test]
    fn restart_returns_to_first_end() {
        let mut session = ScoringSession::liga();
        session.submit(1, 30).unwrap();
        session.restart();
        assert_eq!(session.current_end_number(), 1);
        assert_eq!(session.running_total(), 0);
        assert!(session.sheet().scores().is_empty());
    }

    #[test]
    fn sciezka_session_owns_its_game() {
        let first = ScoringSession::sciezka(create_sciezka(["a", "b"], 3, 10));
        let second = ScoringSession::sciezka(create_sciezka(["c"], 6, 5));
        assert_eq!(first.current_end().unwrap().max_score_per_end(), Some(60));
        assert_eq!(second.current_end().unwrap().max_score_per_end(), Some(30));
    }

    #[test]
    fn session_survives_serialization() {
        let mut session = ScoringSession::sciezka(create_sciezka(["a", "b"], 2, 5));
        session.submit(1, 11).unwrap();
        let saved = session.to_json().unwrap();
        let restored = ScoringSession::from_json(&saved).unwrap();
        assert_eq!(restored, session);
        assert_eq!(restored.sheet().score_for(1), Some(11));

        let liga_saved = serde_json::to_value(ScoringSession::liga()).unwrap();
        assert_eq!(liga_saved["game"]["format"], "liga");
    }

    fn saved_with_sheet(sheet: &str) -> String {
        format!(r#"{{"game":{{"format":"liga"}},"sheet":{sheet}}}"#)
    }

    #[test]
    fn loading_rejects_unreachable_sheets() {
        let ok = saved_with_sheet(r#"{"cursor":3,"scores":{"1":30,"2":0}}"#);
        let session = ScoringSession::from_json(ok.as_bytes()).unwrap();
        assert_eq!(session.current_end_number(), 3);
        assert_eq!(session.running_total(), 30);

        let finished = saved_with_sheet(&format!(
            r#"{{"cursor":11,"scores":{{{}}}}}"#,
            (1..=10)
                .map(|n| format!(r#""{n}":1"#))
                .collect::<Vec<_>>()
                .join(",")
        ));
        assert!(ScoringSession::from_json(finished.as_bytes()).unwrap().is_finished());

        for (sheet, needle) in [
            (r#"{"cursor":0,"scores":{}}"#, "cursor 0"),
            (r#"{"cursor":12,"scores":{}}"#, "cursor 12"),
            (r#"{"cursor":2,"scores":{}}"#, "do not match"),
            (r#"{"cursor":2,"scores":{"1":5,"4":5}}"#, "do not match"),
            (r#"{"cursor":2,"scores":{"1":31}}"#, "not legal for end 1"),
        ] {
            let err = ScoringSession::from_json(saved_with_sheet(sheet).as_bytes()).unwrap_err();
            assert!(err.to_string().contains(needle), "{sheet}: {err}");
        }
    }

    #[test]
    fn loading_rejects_invalid_sciezka_games() {
        let gapped = r#"{"game":{"format":"sciezka","game":{"kind":"sciezka","ends":[
            {"end_number":7,"arrows_number":2,"max_scoring_per_arrow":10,
             "kind":"multi_distance","markers":[]}]}}}"#;
        assert!(ScoringSession::from_json(gapped.as_bytes()).is_err());

        let empty = r#"{"game":{"format":"sciezka","game":{"kind":"sciezka","ends":[]}},
            "sheet":{"cursor":0,"scores":{}}}"#;
        assert!(ScoringSession::from_json(empty.as_bytes()).is_err());
    }

    #[test]
    fn unchecked_overflowing_end_accepts_no_score() {
        let mut session = ScoringSession::sciezka(create_sciezka(["a"], 65_536, 65_536));
        assert_eq!(
            session.submit(1, 0),
            Err(ScoreError::UnboundedEnd { end_number: 1 })
        );
        assert_eq!(session.current_end_number(), 1);
    }
}
