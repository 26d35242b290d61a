use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("PDF operation failed: {0}")]
    OperationError(String),

    #[error("Font error: {0}")]
    FontError(String),
}
