use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("No value column found (expected one of: {expected}); detected columns: {headers:?}")]
    MissingValueColumn { expected: String, headers: Vec<String> },

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid rules file: {0}")]
    Rules(String),
}

pub type ReviewResult<T> = Result<T, ReviewError>;

/// Failure modes of the commentary collaborator. None of these abort a review.
#[derive(Error, Debug)]
pub enum SummarizerError {
    #[error("summarizer not configured")]
    Unavailable,

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {0}: {1}")]
    Http(u16, String),

    #[error("unexpected response: {0}")]
    Parse(String),
}
