use thiserror::Error;

use crate::logging::LoggingError;

/// Unified result type for the gadget engine.
pub type Result<T> = std::result::Result<T, GuiError>;

/// Errors surfaced by the registry factories and the input router.
///
/// Configuration errors (`ForeignOwner`, `DuplicateId`, `EmptyRadioGroup`,
/// `KindMismatch`) mean the caller wired the object graph incorrectly; they are
/// reported at construction time and never retried.
#[derive(Debug, Error)]
pub enum GuiError {
    #[error("screen not found")]
    ScreenNotFound,
    #[error("window not found")]
    WindowNotFound,
    #[error("requester not found")]
    RequesterNotFound,
    #[error("gadget not found")]
    GadgetNotFound,
    #[error("gadget does not belong to this container: {0}")]
    ForeignOwner(String),
    #[error("gadget id {0} is already used in this window")]
    DuplicateId(i32),
    #[error("radio group needs at least one option")]
    EmptyRadioGroup,
    #[error("gadget kind mismatch: expected {expected}")]
    KindMismatch { expected: &'static str },
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
