use crate::auth::Verifier;
use crate::datastore::structs::User;
use crate::datastore::Client;
use crate::fault::{Fallible, Surface, SurfaceAs};
use crate::metrics;
use crate::revalidate::RevalidateHook;
use anyhow::anyhow;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

pub mod admin;
pub mod pages;
pub mod userfacing;

/// Everything a handler needs: the datastore, the token verifier, and the cache
/// invalidation hook. No other state is shared between requests.
pub struct State<DS> {
    pub ds: Arc<DS>,
    pub verifier: Arc<Verifier>,
    pub hook: Arc<RevalidateHook>,
}

// Manual impl because derive(Clone) would demand DS: Clone for no reason.
impl<DS> Clone for State<DS> {
    fn clone(&self) -> Self {
        Self {
            ds: Arc::clone(&self.ds),
            verifier: Arc::clone(&self.verifier),
            hook: Arc::clone(&self.hook),
        }
    }
}

impl<DS: Client> State<DS> {
    /// Authenticate the caller, yielding just the provider-issued user id.
    pub fn caller_id(&self, token: &str) -> Fallible<String> {
        self.verifier.user_id(token)
    }

    /// Authenticate the caller and resolve their full mirrored profile. A valid token
    /// whose profile was never synced is an authorization failure, not NotFound.
    pub async fn caller_profile(&self, token: &str) -> Fallible<User> {
        let user_id = self.verifier.user_id(token)?;
        guard!(let Some(user) = self.ds.get_user(user_id.clone()).await? else {
            return Err(anyhow!("user {} has no mirrored profile", user_id)
                .surface_as(Surface::unauthorized()));
        });
        Ok(user)
    }
}

/// Execute the closure, then log its operational metrics, e.g. time taken, whether it returned Ok/Err, etc.
async fn observe<F, Fut, R>(name: &'static str, f: F) -> Fallible<R>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Fallible<R>>,
{
    let start = Instant::now();
    let return_val = f().await;
    let duration = start.elapsed();
    metrics::HANDLER_SECS
        .with_label_values(&[name])
        .observe(duration.as_secs_f64());
    metrics::RESPONSES
        .with_label_values(&[name, variant_name(&return_val)])
        .inc();
    return_val
}

fn variant_name<T, E>(result: &Result<T, E>) -> &'static str {
    if result.is_ok() {
        "ok"
    } else {
        "err"
    }
}
