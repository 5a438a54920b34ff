//! Error types for scrollkeep

use scrollkeep_core::QueryError;
use thiserror::Error;

/// Errors surfaced while resolving and tracking containers.
///
/// Every variant is recoverable: the affected container is skipped and the
/// rest of the document is unaffected.
#[derive(Error, Debug)]
pub enum ScrollKeepError {
    /// No selector uniquely identifying the element could be derived.
    #[error("selector resolution failed: {0}")]
    Selector(String),

    /// The element is not part of the document.
    #[error("element is not part of the document")]
    DetachedElement,

    /// A selector string did not parse.
    #[error(transparent)]
    Query(#[from] QueryError),
}
