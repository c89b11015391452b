//! Convenience methods to turn any error (from any library) into a Fault.
use crate::fault::{Fault, Surface};

pub trait SurfaceAs {
    /// Convert an error into a Fault by choosing what the client will see.
    fn surface_as(self, surface: Surface) -> Fault;
}

impl<Internal: Into<anyhow::Error>> SurfaceAs for Internal {
    fn surface_as(self, surface: Surface) -> Fault {
        Fault {
            internal: self.into(),
            surface,
        }
    }
}

/// Any internal error can become a Fault with the default (opaque server error) surface.
/// To pick a specific surface, use `err.surface_as(surface)` instead.
impl<Internal: Into<anyhow::Error>> From<Internal> for Fault {
    fn from(internal: Internal) -> Fault {
        internal.surface_as(Default::default())
    }
}

pub trait SurfaceErr<T> {
    /// Convert a result's error into a Fault by choosing what the client will see.
    fn surface_err(self, surface: Surface) -> Result<T, Fault>;
}

impl<T, E> SurfaceErr<T> for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn surface_err(self, surface: Surface) -> Result<T, Fault> {
        self.map_err(|e| e.surface_as(surface))
    }
}
