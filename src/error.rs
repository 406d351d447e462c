use thiserror::Error;

/// Everything that can abort a build. Malformed markup and stray control
/// characters are not errors: the segmenter recovers them as literal text.
#[derive(Error, Debug)]
pub enum Error {
    /// The width callback failed or produced a non-finite / negative width.
    #[error("text measurement failed for {text:?}: width {width}")]
    Measurement { text: String, width: f32 },

    /// The snapshot to slice was missing or empty.
    #[error("snapshot capture failed: {0}")]
    Capture(String),

    #[error("document exceeds the page limit of {limit}")]
    TooManyPages { limit: usize },

    #[error("invalid document metrics: {0}")]
    InvalidMetrics(String),

    #[error("font error: {0}")]
    Font(String),

    #[error("image error: {0}")]
    Image(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn measurement(text: &str, width: f32) -> Self {
        Error::Measurement {
            text: text.to_string(),
            width,
        }
    }
}
