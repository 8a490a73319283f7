pub type Result<T> = std::result::Result<T, GlyphfallError>;

/// Failures the animation core can report. None of them is fatal to the page:
/// callers log and skip the affected effect.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GlyphfallError {
    #[error("missing collaborator: {0}")]
    MissingCollaborator(String),

    #[error("unknown animation kind: {0:?}")]
    UnknownAnimationKind(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GlyphfallError {
    pub fn missing(what: impl Into<String>) -> Self {
        Self::MissingCollaborator(what.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
