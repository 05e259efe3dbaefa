use std::fmt::{self, Display};

/// Broad classification of a failed model request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The backend could not be reached or refused the request.
    Unavailable,
    /// The backend answered, but the payload could not be understood.
    InvalidResponse,
    /// Any other errors.
    Other,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Unavailable => write!(f, "model backend unavailable"),
            ErrorKind::InvalidResponse => {
                write!(f, "invalid response from model backend")
            }
            ErrorKind::Other => write!(f, "model error"),
        }
    }
}
