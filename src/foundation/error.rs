/// Convenience result alias used throughout the crate.
pub type PlugframeResult<T> = Result<T, PlugframeError>;

/// Crate-wide error type.
///
/// View-tree, draw and input operations absorb their failures and report them through plain
/// return values. This type covers construction and window-bound operations.
#[derive(thiserror::Error, Debug)]
pub enum PlugframeError {
    /// Invalid arguments such as zero-sized buffers or malformed keyframes.
    #[error("validation error: {0}")]
    Validation(String),

    /// A resource (bitmap data, font bytes) could not be produced.
    #[error("resource error: {0}")]
    Resource(String),

    /// The operation needs an open platform window.
    #[error("window error: {0}")]
    Window(String),

    /// An animation registration could not be made.
    #[error("animation error: {0}")]
    Animation(String),

    /// Configuration (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error with context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlugframeError {
    /// Build a [`PlugframeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PlugframeError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`PlugframeError::Window`] value.
    pub fn window(msg: impl Into<String>) -> Self {
        Self::Window(msg.into())
    }

    /// Build a [`PlugframeError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`PlugframeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Shorthand for the error returned by window-bound operations on a closed frame.
    pub(crate) fn window_closed() -> Self {
        Self::window("frame has no open platform window")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
