//! Turning [`TaxiError`] into an HTTP response.

use axum::response::{Html, IntoResponse, Response};
use http::StatusCode;

use taxi_core::TaxiError;

/// A failed view. Renders a minimal error page with the error's status.
///
/// Server errors are logged at `error`; the page never shows the detail.
#[derive(Debug)]
pub struct ViewError(pub TaxiError);

impl From<TaxiError> for ViewError {
    fn from(err: TaxiError) -> Self {
        Self(err)
    }
}

impl ViewError {
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::debug!(error = %self.0, status = status.as_u16(), "request rejected");
        }
        error_page(status)
    }
}

/// A bare HTML page for `status`.
pub fn error_page(status: StatusCode) -> Response {
    let reason = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        "<!DOCTYPE html>\n<html><head><title>{code} {reason}</title></head>\
         <body><h1>{reason}</h1><p><a href=\"/\">Home</a></p></body></html>",
        code = status.as_u16()
    );
    (status, Html(body)).into_response()
}

/// The result type of every page handler.
pub type ViewResult = Result<Response, ViewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ViewError(TaxiError::DoesNotExist("Car 1".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ViewError(TaxiError::DatabaseError("locked".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_response_hides_detail() {
        use http_body_util::BodyExt;

        let resp = ViewError(TaxiError::DatabaseError("secret detail".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let body = String::from_utf8_lossy(&body);
        assert!(body.contains("Internal Server Error"));
        assert!(!body.contains("secret detail"));
    }
}
