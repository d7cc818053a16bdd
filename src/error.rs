//! Crate-wide error type for the non-command surface.
//!
//! Command-level git/shell operations never return `Result` — they always
//! produce a [`crate::repo::CommandResult`], per the external command
//! contract. `TutorError` only surfaces from I/O-adjacent code: persistence
//! and configuration loading.

#[derive(Debug)]
pub enum TutorError {
    Io(std::io::Error),
    Json(serde_json::Error),
    TomlDe(toml::de::Error),
    TomlSer(toml::ser::Error),
    /// The persisted state's `version` field doesn't match what this build
    /// of the engine understands how to read.
    VersionMismatch { expected: u32, found: u32 },
}

impl std::fmt::Display for TutorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TutorError::Io(err) => write!(f, "I/O error: {err}"),
            TutorError::Json(err) => write!(f, "malformed state JSON: {err}"),
            TutorError::TomlDe(err) => write!(f, "malformed config TOML: {err}"),
            TutorError::TomlSer(err) => write!(f, "failed to serialize config TOML: {err}"),
            TutorError::VersionMismatch { expected, found } => write!(
                f,
                "unsupported state version {found} (this build reads version {expected})"
            ),
        }
    }
}

impl std::error::Error for TutorError {}

impl From<std::io::Error> for TutorError {
    fn from(err: std::io::Error) -> Self {
        TutorError::Io(err)
    }
}

impl From<serde_json::Error> for TutorError {
    fn from(err: serde_json::Error) -> Self {
        TutorError::Json(err)
    }
}

impl From<toml::de::Error> for TutorError {
    fn from(err: toml::de::Error) -> Self {
        TutorError::TomlDe(err)
    }
}

impl From<toml::ser::Error> for TutorError {
    fn from(err: toml::ser::Error) -> Self {
        TutorError::TomlSer(err)
    }
}
