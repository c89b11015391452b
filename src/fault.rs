//! A `Fault` pairs the real error (kept private, only ever logged) with a surface
//! (shown to API clients). This stops clients from seeing internal errors, which might
//! contain sensitive implementation details like connection strings or SQL.

mod extensions;
mod integrations;
pub mod surface;

pub use extensions::*;
pub use surface::{Kind, Surface};

use std::fmt;
use std::fmt::{Display, Formatter};

/// An error with two faces: the internal one gets logged, the surface gets served.
#[derive(Debug)]
pub struct Fault {
    /// The underlying error from some function. May contain sensitive information, so it
    /// should never be shown to clients.
    pub internal: anyhow::Error,
    /// A client-safe description of what went wrong.
    pub surface: Surface,
}

/// Displaying a Fault only displays the surface. The internal error stays private.
impl Display for Fault {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::result::Result<(), fmt::Error> {
        write!(f, "{}", self.surface)
    }
}

/// Return type of every handler and datastore operation that can fail.
pub type Fallible<T> = Result<T, Fault>;
