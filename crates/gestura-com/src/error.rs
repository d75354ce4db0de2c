use std::fmt;

#[derive(Debug)]
pub enum ComError {
    Io(std::io::Error),
    MalformedRequest(String),
    RequestTooLarge(usize),
    ConnectionClosed,
}

impl fmt::Display for ComError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComError::Io(err) => write!(f, "io error: {err}"),
            ComError::MalformedRequest(msg) => write!(f, "malformed request: {msg}"),
            ComError::RequestTooLarge(limit) => {
                write!(f, "request exceeds {limit} bytes")
            }
            ComError::ConnectionClosed => write!(f, "connection closed"),
        }
    }
}

impl std::error::Error for ComError {}

impl From<std::io::Error> for ComError {
    fn from(err: std::io::Error) -> Self {
        ComError::Io(err)
    }
}

impl From<http::Error> for ComError {
    fn from(err: http::Error) -> Self {
        ComError::MalformedRequest(err.to_string())
    }
}
