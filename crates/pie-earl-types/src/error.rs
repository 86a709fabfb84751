use serde::Serialize;
use thiserror::Error;

/// EARL-side error taxonomy. LMP's kinds (`ProxyNotReady`, `ResolutionMiss`)
/// live on `pie_lmp_server::error::LmpError` instead, since they only ever
/// occur server-side.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlayerError {
    /// A single tag's module/bundle could not be fetched or upgraded.
    /// Recovered locally: the record is marked failed, other tags proceed.
    #[error("failed to load `{tag}`: {message}")]
    LoadFailure { tag: String, message: String },

    /// Two items disagreed on the package reference for the same tag.
    /// Non-recoverable; halts runtime initialization.
    #[error("version conflict for tag `{tag}`: `{first}` vs `{second}`")]
    VersionConflict {
        tag: String,
        first: String,
        second: String,
    },

    /// The loader was asked to register a tag already registered against a
    /// different package reference. Handled the same as `VersionConflict`.
    #[error("tag `{tag}` is already registered against `{existing}`; refusing `{attempted}`")]
    RegistrationConflict {
        tag: String,
        existing: String,
        attempted: String,
    },

    /// `view`/`evaluate` mode required a controller after load and none was
    /// found. Surfaced as `player-error`; the element still renders under
    /// `gather` semantics.
    #[error("controller missing for tag `{tag}`")]
    ControllerMissing { tag: String },
}

impl PlayerError {
    /// `VersionConflict`/`RegistrationConflict` are structural and
    /// fail-fast; everything else is per-item and recoverable.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PlayerError::VersionConflict { .. } | PlayerError::RegistrationConflict { .. }
        )
    }

    pub fn code(&self) -> &'static str {
        match self {
            PlayerError::LoadFailure { .. } => "load_failure",
            PlayerError::VersionConflict { .. } => "version_conflict",
            PlayerError::RegistrationConflict { .. } => "registration_conflict",
            PlayerError::ControllerMissing { .. } => "controller_missing",
        }
    }

    /// Normalized shape for the `player-error` DOM event detail: an opaque
    /// code plus a human-readable message, never a stack trace.
    pub fn to_event(&self) -> PlayerErrorEvent {
        PlayerErrorEvent {
            code: self.code().to_string(),
            message: self.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerErrorEvent {
    pub code: String,
    pub message: String,
}
