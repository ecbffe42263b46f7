/// Result alias used across the crate.
pub type ShortsResult<T> = Result<T, ShortsError>;

/// Error taxonomy for the compositing core and its collaborators.
///
/// Per-page failures (missing image, failed narration, unreadable bgm) surface as one of these
/// variants and are converted into fallbacks by the caller; only configuration problems and
/// "no usable page" end a render.
#[derive(thiserror::Error, Debug)]
pub enum ShortsError {
    /// Invalid input (configuration, page record, canvas, script).
    #[error("validation error: {0}")]
    Validation(String),

    /// Media decode/encode or capability problem (ffmpeg, images, fonts).
    #[error("media error: {0}")]
    Media(String),

    /// Frame rendering failure.
    #[error("render error: {0}")]
    Render(String),

    /// External collaborator failure (image, speech, translation, upload).
    #[error("service error: {0}")]
    Service(String),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, with its source chain preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShortsError {
    /// Build a [`ShortsError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ShortsError::Media`].
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    /// Build a [`ShortsError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ShortsError::Service`].
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    /// Build a [`ShortsError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<reqwest::Error> for ShortsError {
    fn from(e: reqwest::Error) -> Self {
        Self::Service(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
