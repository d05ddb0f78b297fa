use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

/// Errors surfaced by the strict document loader.
///
/// Rendering itself never fails: the walker degrades malformed input to empty output.
/// These errors only exist for tooling that wants to reject a bad document up front.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid document JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Document must be a JSON object mapping node ids to nodes")]
    NotAnObject,

    #[error("Document has no '{root}' node")]
    MissingRoot { root: String },

    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),
}
