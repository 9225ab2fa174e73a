use axum::{
    http::Uri,
    response::{Html, Json},
};
use modkit::api::problem::ProblemResponse;
use serde_json::{json, Value};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Problem response for paths no route matched.
pub async fn route_not_found(uri: Uri) -> ProblemResponse {
    let mut resp = modkit::not_found(format!("No route for {}", uri.path()));
    resp.0 = resp.0.with_code("ROUTE_NOT_FOUND").with_instance(uri.path());
    resp
}

pub async fn serve_docs() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>Subscriptions API Docs</title>
  <script src="https://unpkg.com/@stoplight/elements@latest/web-components.min.js"></script>
  <link rel="stylesheet" href="https://unpkg.com/@stoplight/elements@latest/styles.min.css">
</head>
<body>
  <elements-api apiDescriptionUrl="/openapi.json" router="hash" layout="sidebar"></elements-api>
</body>
</html>"#,
    )
}
