use std::fmt;

/// Failure while building a route table.
#[derive(Debug)]
pub enum RouteError {
    /// Pattern does not start with `/` or has an unbalanced brace
    InvalidPattern { pattern: String, reason: String },
    /// Manifest could not be read
    Io { path: String, source: std::io::Error },
    /// Manifest could not be parsed
    Manifest { path: String, reason: String },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::InvalidPattern { pattern, reason } => {
                write!(f, "invalid route pattern '{pattern}': {reason}")
            }
            RouteError::Io { path, source } => {
                write!(f, "failed to read route manifest '{path}': {source}")
            }
            RouteError::Manifest { path, reason } => {
                write!(f, "failed to parse route manifest '{path}': {reason}")
            }
        }
    }
}

impl std::error::Error for RouteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouteError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
