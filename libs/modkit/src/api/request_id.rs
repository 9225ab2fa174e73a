use axum::http::HeaderName;

/// Request id assigned by the HTTP host and stored in request extensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XRequestId(pub String);

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn header() -> HeaderName {
    HeaderName::from_static(REQUEST_ID_HEADER)
}

impl XRequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
