//! Integrate Fault with other libraries, like actix-web.

use crate::fault::Fault;
use actix_web::{
    http::{header, StatusCode},
    HttpResponse,
};
use serde::Serialize;
use tracing::error;

// Faults can be used as actix-web errors. If a handler returns a Fault, the surface text
// is served in the body and the kind picks the status code. The internal error is only logged.
impl actix_web::ResponseError for Fault {
    fn status_code(&self) -> StatusCode {
        self.surface.kind.into()
    }

    fn error_response(&self) -> HttpResponse {
        error!("{:#}", self.internal);
        let resp = serde_json::to_string(&ErrBody {
            error: self.surface.text,
        })
        .unwrap_or_else(|e| {
            error!("Serde error: {}", e.to_string());
            "{\"error\": \"internal server error\"}".to_owned()
        });
        HttpResponse::build(self.surface.kind.into())
            .header(header::CONTENT_TYPE, "application/json")
            .body(resp)
    }
}

#[derive(Serialize)]
struct ErrBody {
    error: &'static str,
}
