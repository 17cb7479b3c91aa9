use crate::PingError;

pub type PingResult<T> = std::result::Result<T, PingError>;
