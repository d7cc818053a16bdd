//! Save/load of the full application state — repo, lesson progress, badges,
//! and the remote store — as a single versioned JSON document.

use std::fs::File;
use std::io::{Read as _, Write as _};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::achievements::Badge;
use crate::error::TutorError;
use crate::lesson::LessonState;
use crate::remote::RemoteStore;
use crate::repo::Repo;

/// Bumped whenever `AppState`'s shape changes in a way older builds can't
/// read. Loading a mismatched version is a hard error rather than a
/// best-effort migration, per the engine's "not a general-purpose save
/// format" scope.
pub const STATE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub version: u32,
    pub repo: Repo,
    pub active_lesson_id: Option<String>,
    pub lesson_progress: indexmap::IndexMap<String, LessonState>,
    pub badges: indexmap::IndexMap<String, Badge>,
    pub remote_store: RemoteStore,
}

impl AppState {
    pub fn new(repo: Repo, remote_store: RemoteStore) -> Self {
        AppState {
            version: STATE_VERSION,
            repo,
            active_lesson_id: None,
            lesson_progress: indexmap::IndexMap::new(),
            badges: indexmap::IndexMap::new(),
            remote_store,
        }
    }
}

pub fn save_to_writer<W: Write>(state: &AppState, writer: W) -> Result<(), TutorError> {
    serde_json::to_writer_pretty(writer, state)?;
    Ok(())
}

pub fn load_from_reader<R: std::io::Read>(reader: R) -> Result<AppState, TutorError> {
    let state: AppState = serde_json::from_reader(reader)?;
    if state.version != STATE_VERSION {
        return Err(TutorError::VersionMismatch { expected: STATE_VERSION, found: state.version });
    }
    Ok(state)
}

pub fn save_to_file(state: &AppState, path: &Path) -> Result<(), TutorError> {
    let file = File::create(path)?;
    save_to_writer(state, file)
}

pub fn load_from_file(path: &Path) -> Result<AppState, TutorError> {
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    load_from_reader(contents.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_a_writer_and_reader() {
        let mut repo = Repo::new();
        repo.git_init();
        let state = AppState::new(repo, RemoteStore::new());

        let mut buf = Vec::new();
        save_to_writer(&state, &mut buf).unwrap();
        let loaded = load_from_reader(buf.as_slice()).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn rejects_a_future_version() {
        let mut repo = Repo::new();
        repo.git_init();
        let mut state = AppState::new(repo, RemoteStore::new());
        state.version = STATE_VERSION + 1;

        let mut buf = Vec::new();
        save_to_writer(&state, &mut buf).unwrap();
        let result = load_from_reader(buf.as_slice());
        assert!(matches!(result, Err(TutorError::VersionMismatch { .. })));
    }

    #[test]
    fn round_trips_through_real_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");

        let mut repo = Repo::new();
        repo.git_init();
        let state = AppState::new(repo, RemoteStore::new());

        save_to_file(&state, &path).unwrap();
        let loaded = load_from_file(&path).unwrap();
        assert_eq!(loaded, state);
    }
}
