//! Render errors

use html2gmi_dom::DomError;
use thiserror::Error;

/// Errors that abort a render
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to read input: {0}")]
    Dom(#[from] DomError),

    #[error("Failed to write output: {0}")]
    Write(#[from] std::fmt::Error),
}

/// Result alias for rendering
pub type RenderResult<T> = Result<T, RenderError>;
