use thiserror::Error;

/// Data-side failures of the upload-and-summarize pipeline. All of these
/// are request-local: the boundary reports them and returns the user to
/// the upload form equivalent.
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// No file was supplied with the request.
    #[error("no file was supplied")]
    MissingInput,

    /// The upload was rejected before parsing (wrong extension, empty body).
    #[error("invalid file format: {0}")]
    InvalidFormat(String),

    /// The bytes could not be parsed as CSV with the expected row shape.
    #[error("could not parse CSV: {0}")]
    Parse(#[from] csv::Error),

    /// A required column is absent (lookup is by exact header name).
    #[error("required column '{0}' is missing")]
    Schema(String),

    /// The file parsed but contains no rows, so no mean is defined.
    #[error("the dataset contains no rows")]
    EmptyDataset,
}

/// Chart-side failures. Kept separate from [`SummarizeError`] so the
/// boundary can still show statistics when an image is missing.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to draw chart: {0}")]
    Draw(String),

    #[error("failed to encode chart image: {0}")]
    Encode(String),

    #[error("failed to write chart image: {0}")]
    Io(#[from] std::io::Error),
}
