//! Error types.

use std::net::AddrParseError;

use http::StatusCode;

/// The error type returned by absol's fallible operations.
///
/// Application-level failures (a handler deciding on 404, 422, etc.) are
/// expressed as [`Response`](crate::Response) values, not as `Error`s. This
/// type surfaces infrastructure failures: parsing the bind address, binding
/// the port, or reading the listener's address.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid socket address `{addr}`: {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: AddrParseError,
    },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Why the router could not resolve a request to a handler.
///
/// Both kinds are terminal: there is no fallback route. The `Display` text is
/// exactly the response body the router writes, minus the trailing newline.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum RouteError {
    #[error("absol: request path not registered")]
    PathNotRegistered,

    #[error("absol: request method not registered")]
    MethodNotRegistered,
}

impl RouteError {
    pub fn status(self) -> StatusCode {
        match self {
            Self::PathNotRegistered   => StatusCode::NOT_FOUND,
            Self::MethodNotRegistered => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_errors_map_to_fixed_statuses() {
        assert_eq!(RouteError::PathNotRegistered.status(), StatusCode::NOT_FOUND);
        assert_eq!(RouteError::MethodNotRegistered.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn invalid_address_names_the_input() {
        let source = "nope".parse::<std::net::SocketAddr>().unwrap_err();
        let err = Error::InvalidAddress { addr: "nope".to_owned(), source };
        assert!(err.to_string().starts_with("invalid socket address `nope`"));
    }
}
