use thiserror::Error;

/// The error taxonomy returned by every public operation.
///
/// Lock-primitive failures (a poisoned internal mutex, a double unlock)
/// are not represented here: they indicate a broken invariant and surface
/// as panics rather than as a recoverable `Error` variant.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("invalid argument")]
    InvalidArgument,
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    Exists,
    #[error("directory not empty")]
    NotEmpty,
    #[error("busy")]
    Busy,
}

pub type Result<T> = std::result::Result<T, Error>;
