//! Archery Game Scoring
//!
//! Platform-agnostic core for recording scores of the "Liga 15/20/25m" and
//! "ścieżka łucznicza" archery games. Rendering and routing live in the
//! calling layer; this crate supplies game definitions, legal score ranges and
//! the per-visitor score accumulation state machine.

pub mod catalog;
pub mod constants;
pub mod end;
pub mod game;
pub mod sciezka;
pub mod session;

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

// Re-export commonly used types
pub use catalog::{CatalogEntry, GameCatalog, liga, liga_end};
pub use end::{ArcherPosition, EndKind, GameEnd, Markers, Placement, TargetPosition};
pub use game::{ArcheryGame, GameDefinitionError, GameKind};
pub use sciezka::{SciezkaParams, SetupError, create_sciezka};
pub use session::{
    EndScore, EndView, FinalResult, ScoreError, ScoreSheet, ScoringSession, SessionDataError,
    SessionGame, SessionStatus, StepOutcome,
};

use constants::LOG_TARGET_ENGINE;

/// Trait for abstracting per-visitor session storage.
/// Platform-specific implementations should provide this
pub trait SessionStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save a visitor's session, replacing any previous one
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be saved.
    fn save_session(&self, session_id: &str, session: &ScoringSession) -> Result<(), Self::Error>;

    /// Load a visitor's session
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be loaded.
    fn load_session(&self, session_id: &str) -> Result<Option<ScoringSession>, Self::Error>;

    /// Forget a visitor's session
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be deleted.
    fn delete_session(&self, session_id: &str) -> Result<(), Self::Error>;
}

/// In-process session storage shared between request handlers.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, ScoringSession>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemorySessionStore {
    type Error = Infallible;

    fn save_session(&self, session_id: &str, session: &ScoringSession) -> Result<(), Self::Error> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session_id.to_string(), session.clone());
        Ok(())
    }

    fn load_session(&self, session_id: &str) -> Result<Option<ScoringSession>, Self::Error> {
        Ok(self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session_id)
            .cloned())
    }

    fn delete_session(&self, session_id: &str) -> Result<(), Self::Error> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session_id);
        Ok(())
    }
}

/// Errors surfaced to the request-handling layer.
#[derive(Debug, Error)]
pub enum EngineError<E>
where
    E: std::error::Error + 'static,
{
    #[error(transparent)]
    Setup(#[from] SetupError),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error("no game in progress for session '{0}'")]
    UnknownSession(String),
    #[error("session store failed")]
    Store(#[source] E),
}

/// Drives games for many visitors, each through their own stored session.
pub struct ScoringEngine<S>
where
    S: SessionStore,
{
    store: S,
}

impl<S> ScoringEngine<S>
where
    S: SessionStore,
{
    /// Create a new engine over the provided session storage
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Start (or restart) a Liga game for the visitor.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be saved.
    pub fn start_liga(&self, session_id: &str) -> Result<SessionStatus, EngineError<S::Error>> {
        self.start(session_id, ScoringSession::liga())
    }

    /// Start a ścieżka game built from the visitor's setup form.
    ///
    /// An invalid setup leaves any existing session untouched.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Setup` for an invalid form, or a store error.
    pub fn start_sciezka(
        &self,
        session_id: &str,
        params: &SciezkaParams,
    ) -> Result<SessionStatus, EngineError<S::Error>> {
        let game = params.build().inspect_err(|err| {
            log::warn!(target: LOG_TARGET_ENGINE, "session {session_id}: setup rejected: {err}");
        })?;
        self.start(session_id, ScoringSession::sciezka(game))
    }

    fn start(
        &self,
        session_id: &str,
        session: ScoringSession,
    ) -> Result<SessionStatus, EngineError<S::Error>> {
        log::info!(
            target: LOG_TARGET_ENGINE,
            "session {session_id}: new {} game",
            session.kind()
        );
        self.store
            .save_session(session_id, &session)
            .map_err(EngineError::Store)?;
        Ok(session.status())
    }

    /// Record one end's score for the visitor.
    ///
    /// # Errors
    ///
    /// Returns an error if no game is in progress, the submission is rejected,
    /// or the store fails. Rejected submissions are not saved.
    pub fn submit_score(
        &self,
        session_id: &str,
        end_number: u16,
        score: u32,
    ) -> Result<StepOutcome, EngineError<S::Error>> {
        let mut session = self.require(session_id)?;
        let outcome = session.submit(end_number, score)?;
        self.store
            .save_session(session_id, &session)
            .map_err(EngineError::Store)?;
        Ok(outcome)
    }

    /// Current end or final result for the visitor.
    ///
    /// # Errors
    ///
    /// Returns an error if no game is in progress or the store fails.
    pub fn status(&self, session_id: &str) -> Result<SessionStatus, EngineError<S::Error>> {
        Ok(self.require(session_id)?.status())
    }

    /// Drop the visitor's game.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn abandon(&self, session_id: &str) -> Result<(), EngineError<S::Error>> {
        log::debug!(target: LOG_TARGET_ENGINE, "session {session_id}: abandoned");
        self.store
            .delete_session(session_id)
            .map_err(EngineError::Store)
    }

    fn require(&self, session_id: &str) -> Result<ScoringSession, EngineError<S::Error>> {
        self.store
            .load_session(session_id)
            .map_err(EngineError::Store)?
            .ok_or_else(|| EngineError::UnknownSession(session_id.to_string()))
    }
}
