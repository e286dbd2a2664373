//! JSON-file session storage so a game can be scored across invocations.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use archery_game::{ScoringSession, SessionStore};
use thiserror::Error;

use crate::util::is_valid_session_id;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid session id '{0}' (use letters, digits, '-' or '_')")]
    InvalidId(String),
    #[error("session file {path} could not be accessed")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("session file {path} is not a valid session")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One `<id>.json` file per visitor under a directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, session_id: &str) -> Result<PathBuf, StoreError> {
        if !is_valid_session_id(session_id) {
            return Err(StoreError::InvalidId(session_id.to_string()));
        }
        Ok(self.dir.join(format!("{session_id}.json")))
    }
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl SessionStore for FileSessionStore {
    type Error = StoreError;

    fn save_session(&self, session_id: &str, session: &ScoringSession) -> Result<(), Self::Error> {
        let path = self.path_for(session_id)?;
        fs::create_dir_all(&self.dir).map_err(io_err(&self.dir))?;
        let body = session.to_json().map_err(|source| StoreError::Corrupt {
            path: path.clone(),
            source,
        })?;
        // Write then rename so an interrupted save never leaves half a file.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(io_err(&tmp))?;
        fs::rename(&tmp, &path).map_err(io_err(&path))?;
        log::debug!("saved session {session_id} to {}", path.display());
        Ok(())
    }

    fn load_session(&self, session_id: &str) -> Result<Option<ScoringSession>, Self::Error> {
        let path = self.path_for(session_id)?;
        let body = match fs::read(&path) {
            Ok(body) => body,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_err(&path)(err)),
        };
        ScoringSession::from_json(&body)
            .map(Some)
            .map_err(|source| StoreError::Corrupt { path, source })
    }

    fn delete_session(&self, session_id: &str) -> Result<(), Self::Error> {
        let path = self.path_for(session_id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_err(&path)(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archery_game::{ScoringEngine, SessionStatus};

    fn temp_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "archery-store-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    #[test]
    fn sessions_persist_between_engines() {
        let dir = temp_dir("persist");
        {
            let engine = ScoringEngine::new(FileSessionStore::new(&dir));
            engine.start_liga("visitor").unwrap();
            engine.submit_score("visitor", 1, 21).unwrap();
        }
        let engine = ScoringEngine::new(FileSessionStore::new(&dir));
        let SessionStatus::AwaitingEnd(view) = engine.status("visitor").unwrap() else {
            panic!("liga in progress");
        };
        assert_eq!(view.current_end_number, 2);
        assert_eq!(view.running_total, 21);

        engine.abandon("visitor").unwrap();
        engine.abandon("visitor").unwrap();
        assert!(engine.store().load_session("visitor").unwrap().is_none());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn rejects_unsafe_ids_and_corrupt_files() {
        let dir = temp_dir("corrupt");
        let store = FileSessionStore::new(&dir);
        assert!(matches!(
            store.load_session("../x"),
            Err(StoreError::InvalidId(_))
        ));

        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("broken.json"), b"{not json").unwrap();
        assert!(matches!(
            store.load_session("broken"),
            Err(StoreError::Corrupt { .. })
        ));

        let gapped = r#"{"game":{"format":"sciezka","game":{"kind":"sciezka","ends":[
            {"end_number":7,"arrows_number":2,"max_scoring_per_arrow":10,
             "kind":"multi_distance","markers":[]}]}}}"#;
        fs::write(dir.join("gapped.json"), gapped).unwrap();
        assert!(matches!(
            store.load_session("gapped"),
            Err(StoreError::Corrupt { .. })
        ));

        fs::write(
            dir.join("rewound.json"),
            r#"{"game":{"format":"liga"},"sheet":{"cursor":0,"scores":{}}}"#,
        )
        .unwrap();
        assert!(matches!(
            store.load_session("rewound"),
            Err(StoreError::Corrupt { .. })
        ));
        let _ = fs::remove_dir_all(dir);
    }
}
