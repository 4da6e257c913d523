/// Errors that can occur while configuring or running the renderer.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("terminal width must be at least 1")]
    Width,

    #[error("invalid base URL (a scheme is required): {0}")]
    BaseUrl(String),

    #[error("invalid selector: {0}")]
    Selector(String),

    #[error("element nesting exceeds the open-element limit")]
    DepthExceeded,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
