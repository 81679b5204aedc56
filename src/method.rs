//! The HTTP verbs a route can be registered for.
//!
//! Only five verbs are routable. Any other method string fails to parse and
//! therefore never matches a table entry, so a request using it is answered
//! with `405` on a known path and `404` otherwise.

use std::fmt;
use std::str::FromStr;

/// A routable HTTP method.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    Delete,
    Get,
    Head,
    Post,
    Put,
}

impl Method {
    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Get    => "GET",
            Self::Head   => "HEAD",
            Self::Post   => "POST",
            Self::Put    => "PUT",
        }
    }
}

/// Parses an uppercase method string. Case-sensitive per RFC 9110 §9.1.
impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DELETE" => Ok(Self::Delete),
            "GET"    => Ok(Self::Get),
            "HEAD"   => Ok(Self::Head),
            "POST"   => Ok(Self::Post),
            "PUT"    => Ok(Self::Put),
            _        => Err(()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_five_verbs() {
        for m in [Method::Delete, Method::Get, Method::Head, Method::Post, Method::Put] {
            assert_eq!(m.as_str().parse::<Method>(), Ok(m));
        }
    }

    #[test]
    fn rejects_lowercase_and_unroutable_verbs() {
        assert!("get".parse::<Method>().is_err());
        assert!("PATCH".parse::<Method>().is_err());
        assert!("OPTIONS".parse::<Method>().is_err());
        assert!("".parse::<Method>().is_err());
    }

    #[test]
    fn displays_wire_form() {
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }
}
