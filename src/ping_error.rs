use std::{error::Error, fmt, io};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PingErrorKind {
    InvalidArgument,
    SocketCreate,
    InvalidSocket,
    Bind,
    Send,
    Poll,
}

#[derive(Debug)]
pub struct PingError {
    pub kind: PingErrorKind,
    pub message: String,
    pub source: Option<io::Error>,
}

impl PingError {
    pub(crate) fn new(kind: PingErrorKind, message: impl Into<String>) -> Self {
        PingError { kind, message: message.into(), source: None }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(PingErrorKind::InvalidArgument, message)
    }

    pub(crate) fn io(kind: PingErrorKind, message: impl Into<String>, source: io::Error) -> Self {
        PingError { kind, message: message.into(), source: Some(source) }
    }
}

impl fmt::Display for PingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "PingError")?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(source) = &self.source {
            write!(f, " ({source})")?;
        }
        Ok(())
    }
}

impl Error for PingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn Error + 'static))
    }
}
