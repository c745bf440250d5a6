use std::fmt;

/// A textual route reference could not be turned into a handler.
///
/// Every variant carries the original dotted path so that a typo or a
/// registration-order problem can be traced back to the route that named it.
/// Failures are never cached; the next request retries the lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The path is not of the form `<container>.<member>`
    InvalidPath {
        /// The path as registered
        path: String,
    },
    /// No container is registered under the path's container part
    ContainerNotFound {
        /// The path as registered
        path: String,
        /// The container part of the path
        container: String,
    },
    /// The container exists but does not export the member
    MemberNotFound {
        /// The path as registered
        path: String,
        /// The container part of the path
        container: String,
        /// The member part of the path
        member: String,
    },
    /// The container's initializer returned an error
    InitFailed {
        /// The path as registered
        path: String,
        /// The container part of the path
        container: String,
        /// Rendered error chain from the initializer
        reason: String,
    },
}

impl ResolutionError {
    /// The dotted path that failed to resolve.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            ResolutionError::InvalidPath { path }
            | ResolutionError::ContainerNotFound { path, .. }
            | ResolutionError::MemberNotFound { path, .. }
            | ResolutionError::InitFailed { path, .. } => path,
        }
    }
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionError::InvalidPath { path } => {
                write!(
                    f,
                    "cannot resolve '{path}': expected '<container>.<member>'"
                )
            }
            ResolutionError::ContainerNotFound { path, container } => {
                write!(
                    f,
                    "cannot resolve '{path}': no container named '{container}' is registered"
                )
            }
            ResolutionError::MemberNotFound {
                path,
                container,
                member,
            } => {
                write!(
                    f,
                    "cannot resolve '{path}': container '{container}' has no member '{member}'"
                )
            }
            ResolutionError::InitFailed {
                path,
                container,
                reason,
            } => {
                write!(
                    f,
                    "cannot resolve '{path}': initializing container '{container}' failed: {reason}"
                )
            }
        }
    }
}

impl std::error::Error for ResolutionError {}
