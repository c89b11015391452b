use actix_web::http::StatusCode;
use std::fmt;

/// The client-facing half of a Fault: a broad kind plus fixed text. Used to build HTTP
/// responses with the matching status code.
#[derive(Debug, Clone, Copy)]
pub struct Surface {
    pub kind: Kind,
    /// Text describing the problem to the client.
    pub text: &'static str,
}

impl Surface {
    /// Missing or invalid identity, including an identity with no mirrored profile.
    pub fn unauthorized() -> Self {
        Self {
            kind: Kind::Unauthorized,
            text: "not signed in",
        }
    }

    pub fn not_found(text: &'static str) -> Self {
        Self {
            kind: Kind::NotFound,
            text,
        }
    }

    /// Authenticated, but not entitled to touch this record.
    pub fn forbidden(text: &'static str) -> Self {
        Self {
            kind: Kind::Forbidden,
            text,
        }
    }

    pub fn invalid_field(text: &'static str) -> Self {
        Self {
            kind: Kind::InvalidField,
            text,
        }
    }
}

/// Client-facing error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Unauthorized,
    Forbidden,
    NotFound,
    InvalidField,
    ServerError,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        // Make fmt::Display the same as fmt::Debug, i.e. each variant's name.
        write!(f, "{:?}", self)
    }
}

impl From<Kind> for StatusCode {
    /// Kinds map onto HTTP status codes here, in one place, because other components
    /// (e.g. the datastore) shouldn't need to know about HTTP at all.
    fn from(kind: Kind) -> StatusCode {
        match kind {
            Kind::Unauthorized => StatusCode::UNAUTHORIZED,
            Kind::Forbidden => StatusCode::FORBIDDEN,
            Kind::NotFound => StatusCode::NOT_FOUND,
            Kind::InvalidField => StatusCode::BAD_REQUEST,
            Kind::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}: {}", self.kind, self.text)
    }
}

impl Default for Surface {
    // Default to ServerError and a vague generic message.
    fn default() -> Self {
        Self {
            kind: Kind::ServerError,
            text: "internal server error",
        }
    }
}
