pub type SlidecastResult<T> = Result<T, SlidecastError>;

#[derive(thiserror::Error, Debug)]
pub enum SlidecastError {
    #[error("validation error: {0}")]
    Validation(String),

    /// Non-fatal: the frame renders without the image.
    #[error("image unavailable: {0}")]
    ImageUnavailable(String),

    /// Non-fatal: narration falls back to the engine's default voice.
    #[error("voice unavailable: {0}")]
    VoiceUnavailable(String),

    #[error("capture unsupported: {0}")]
    CaptureUnsupported(String),

    #[error("capture failed to start: {0}")]
    CaptureStartFailure(String),

    #[error("capture error: {0}")]
    Capture(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SlidecastError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn image_unavailable(msg: impl Into<String>) -> Self {
        Self::ImageUnavailable(msg.into())
    }

    pub fn voice_unavailable(msg: impl Into<String>) -> Self {
        Self::VoiceUnavailable(msg.into())
    }

    pub fn capture_unsupported(msg: impl Into<String>) -> Self {
        Self::CaptureUnsupported(msg.into())
    }

    pub fn capture_start(msg: impl Into<String>) -> Self {
        Self::CaptureStartFailure(msg.into())
    }

    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether this error ends an export session (the player itself keeps running).
    pub fn is_fatal_to_export(&self) -> bool {
        matches!(
            self,
            Self::CaptureUnsupported(_) | Self::CaptureStartFailure(_) | Self::Capture(_)
        )
    }

    /// Whether playback can continue in a degraded mode.
    pub fn is_degraded_mode(&self) -> bool {
        matches!(self, Self::ImageUnavailable(_) | Self::VoiceUnavailable(_))
    }

    /// Single-line message suitable for an error banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::CaptureUnsupported(msg) => {
                format!("Video export is not supported in this environment: {msg}")
            }
            Self::CaptureStartFailure(msg) | Self::Capture(msg) => {
                format!("Failed to export video: {msg}")
            }
            other => other.to_string(),
        }
    }
}
