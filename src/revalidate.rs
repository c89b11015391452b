//! After every successful mutation, the frontend's cached listing page has to be marked
//! stale. The cache itself is external; all this module does is POST the fixed path to
//! the configured revalidation webhook. Failures are logged and never fail the mutation.
use serde::Serialize;
use tracing::{debug, warn};

/// The one route whose cached render depends on this service's data.
pub const LISTING_PATH: &str = "/learn";

pub struct RevalidateHook {
    endpoint: Option<String>,
}

#[derive(Serialize)]
struct Revalidation {
    path: &'static str,
}

impl RevalidateHook {
    pub fn new(endpoint: Option<String>) -> Self {
        Self { endpoint }
    }

    /// Mark the listing page stale. Best-effort: a mutation that already committed
    /// should never be reported as failed because the webhook was down.
    pub async fn invalidate_listing(&self) {
        guard!(let Some(endpoint) = &self.endpoint else {
            debug!("no revalidation endpoint configured, skipping");
            return;
        });
        let client = awc::Client::new();
        let result = client
            .post(endpoint.as_str())
            .send_json(&Revalidation {
                path: LISTING_PATH,
            })
            .await;
        match result {
            Ok(response) => debug!(
                status = response.status().as_u16(),
                "revalidated listing page"
            ),
            Err(e) => warn!("couldn't revalidate listing page: {}", e),
        }
    }
}
