//! HTTP server for IMS Release.
//!
//! Exposes projects, releases, pages, thumbnails and release archive
//! downloads as a JSON REST API. Every JSON response uses the
//! [`Envelope`] shape, with `error` set to null on success.

pub mod auth;
pub mod config;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use config::{ServerConfig, ThumbnailConfig};
pub use envelope::Envelope;
pub use error::{ApiError, ApiResult, ServerError, ServerResult};
pub use router::build_router;
pub use server::{open_catalog, ImsServer};
pub use state::AppState;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use ims_db::InMemoryGateway;
    use ims_release::Catalog;
    use ims_store::InMemoryBlobStore;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn app_with(config: ServerConfig) -> Router {
        let catalog = Catalog::new(
            Arc::new(InMemoryGateway::new()),
            Arc::new(InMemoryBlobStore::new()),
            config.scanlator.clone(),
        );
        ImsServer::with_catalog(catalog, config).router()
    }

    fn app() -> Router {
        app_with(ServerConfig {
            scanlator: "scans".into(),
            ..ServerConfig::default()
        })
    }

    fn image_base64(format: ImageFormat) -> String {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(6, 9, image::Rgb([1, 2, 3])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        BASE64.encode(out.into_inner())
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Vec<u8>, axum::http::HeaderMap) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(auth::AUTH_HEADER, token);
        }
        let body = match body {
            Some(v) => Body::from(v.to_string()),
            None => Body::empty(),
        };
        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec(), headers)
    }

    async fn send_json(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, bytes, _) = send(app, method, uri, body, None).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    /// Creates project 1 ("short") and its release 1 ("v1").
    async fn seed(app: &Router) {
        let (status, _) = send_json(
            app,
            "POST",
            "/projects",
            Some(json!({ "name": "Some Manga", "shorthand": "short" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send_json(
            app,
            "POST",
            "/projects/1/releases",
            Some(json!({ "identifier": "v1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"][0]["scanlator"], "scans");
    }

    async fn upload(app: &Router, name: &str, format: ImageFormat) -> (StatusCode, Value) {
        send_json(
            app,
            "POST",
            "/projects/1/releases/1/pages",
            Some(json!({ "name": name, "data": image_base64(format) })),
        )
        .await
    }

    async fn release(app: &Router, version: u32) -> (StatusCode, Value) {
        send_json(
            app,
            "PUT",
            "/projects/1/releases/1",
            Some(json!({ "identifier": "v1", "version": version, "status": "released" })),
        )
        .await
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (status, body) = send_json(&app(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn success_envelope_has_null_error() {
        let app = app();
        seed(&app).await;
        let (status, body) = send_json(&app, "GET", "/projects/1/releases/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["error"].is_null());
        assert_eq!(body["result"][0]["identifier"], "v1");
        assert_eq!(body["result"][0]["status"], "draft");
    }

    #[tokio::test]
    async fn bad_ids_and_missing_records() {
        let app = app();
        seed(&app).await;
        let (status, body) = send_json(&app, "GET", "/projects/x/releases/1", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = send_json(&app, "GET", "/projects/1/releases/9", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn malformed_update_is_bad_request() {
        let app = app();
        seed(&app).await;
        let (status, bytes, _) = send(
            &app,
            "PUT",
            "/projects/1/releases/1",
            Some(json!({ "version": "two" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["result"], json!([]));
    }

    #[tokio::test]
    async fn draft_update_is_accepted() {
        let app = app();
        seed(&app).await;
        let (status, body) = send_json(
            &app,
            "PUT",
            "/projects/1/releases/1",
            Some(json!({ "identifier": "c1", "version": 2, "status": "released" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"][0]["identifier"], "c1");
        assert_eq!(body["result"][0]["version"], 2);
        assert_eq!(body["result"][0]["status"], "released");
    }

    #[tokio::test]
    async fn downversion_of_released_is_expectation_failed() {
        let app = app();
        seed(&app).await;
        assert_eq!(release(&app, 5).await.0, StatusCode::OK);
        let (status, body) = release(&app, 2).await;
        assert_eq!(status, StatusCode::EXPECTATION_FAILED);
        assert!(body["error"].as_str().unwrap().contains("from 5 to 2"));
        // same version is rejected too
        assert_eq!(release(&app, 5).await.0, StatusCode::EXPECTATION_FAILED);
    }

    #[tokio::test]
    async fn mismatched_upload_is_expectation_failed() {
        let app = app();
        seed(&app).await;
        let (status, body) = upload(&app, "fileName.png", ImageFormat::Jpeg).await;
        assert_eq!(status, StatusCode::EXPECTATION_FAILED);
        assert!(body["error"].is_string());
        let (_, pages) = send_json(&app, "GET", "/projects/1/releases/1/pages", None).await;
        assert_eq!(pages["result"], json!([]));
    }

    #[tokio::test]
    async fn page_roundtrip() {
        let app = app();
        seed(&app).await;
        let (status, body) = upload(&app, "p01.png", ImageFormat::Png).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"][0]["mimeType"], "image/png");

        let (status, bytes, headers) =
            send(&app, "GET", "/projects/1/releases/1/pages/p01.png", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "image/png");
        assert_eq!(BASE64.encode(bytes), image_base64(ImageFormat::Png));

        let (status, _, headers) =
            send(&app, "GET", "/projects/1/releases/1/thumbnails/p01.png", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "image/png");

        assert_eq!(upload(&app, "p01.png", ImageFormat::Png).await.0, StatusCode::CONFLICT);

        let (status, _) = send_json(&app, "DELETE", "/projects/1/releases/1/pages/1", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _, _) =
            send(&app, "GET", "/projects/1/releases/1/pages/p01.png", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deletes_are_gated() {
        let app = app();
        seed(&app).await;
        upload(&app, "p01.png", ImageFormat::Png).await;

        let (status, _) = send_json(&app, "DELETE", "/projects/1/releases/1", None).await;
        assert_eq!(status, StatusCode::EXPECTATION_FAILED);
        let (status, _) = send_json(&app, "DELETE", "/projects/1", None).await;
        assert_eq!(status, StatusCode::EXPECTATION_FAILED);

        send_json(&app, "DELETE", "/projects/1/releases/1/pages/1", None).await;
        let (status, _) = send_json(&app, "DELETE", "/projects/1/releases/1", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send_json(&app, "DELETE", "/projects/1", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn download_gate() {
        let app = app();
        seed(&app).await;
        upload(&app, "p02.png", ImageFormat::Png).await;
        upload(&app, "p01.jpg", ImageFormat::Jpeg).await;

        let uri = "/projects/1/releases/1/download/short%20-%20v1%5B1%5D%5Bscans%5D.zip";
        // still a draft
        assert_eq!(send(&app, "GET", uri, None, None).await.0, StatusCode::NOT_FOUND);

        release(&app, 1).await;
        let wrong = "/projects/1/releases/1/download/short%20-%20v1%5B0%5D%5Bscans%5D.zip";
        assert_eq!(send(&app, "GET", wrong, None, None).await.0, StatusCode::NOT_FOUND);

        let (status, first, headers) = send(&app, "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "application/zip");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"short - v1[1][scans].zip\""
        );

        let (_, second, _) = send(&app, "GET", uri, None, None).await;
        assert_eq!(first, second);

        let (_, body) = send_json(&app, "GET", "/projects/1/releases/1", None).await;
        let etag = headers[header::ETAG].to_str().unwrap().trim_matches('"').to_string();
        assert_eq!(body["result"][0]["checksum"], etag.as_str());
    }

    #[tokio::test]
    async fn auth_token_guards_mutations() {
        let app = app_with(ServerConfig {
            auth_token: Some("secret".into()),
            ..ServerConfig::default()
        });
        let create = json!({ "name": "Some Manga", "shorthand": "short" });

        let (status, bytes, _) = send(&app, "POST", "/projects", Some(create.clone()), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());

        let (status, _, _) =
            send(&app, "POST", "/projects", Some(create.clone()), Some("wrong")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _, _) = send(&app, "POST", "/projects", Some(create), Some("secret")).await;
        assert_eq!(status, StatusCode::OK);

        // reads need no token
        let (status, _, _) = send(&app, "GET", "/projects", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn releases_listed_by_ordering() {
        let app = app();
        seed(&app).await;
        let (status, _) = send_json(
            &app,
            "POST",
            "/projects/1/releases",
            Some(json!({ "identifier": "v2" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let ids = |body: &Value| -> Vec<u64> {
            body["result"]
                .as_array()
                .unwrap()
                .iter()
                .map(|r| r["id"].as_u64().unwrap())
                .collect()
        };
        let (_, newest) = send_json(&app, "GET", "/projects/1/releases", None).await;
        let (status, oldest) =
            send_json(&app, "GET", "/projects/1/releases?ordering=oldest", None).await;
        assert_eq!(status, StatusCode::OK);
        let mut reversed = ids(&oldest);
        reversed.reverse();
        assert_eq!(ids(&newest), reversed);
        assert_eq!(ids(&newest).len(), 2);

        let (status, body) =
            send_json(&app, "GET", "/projects/1/releases?ordering=random", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn projects_listed_by_ordering() {
        let app = app();
        for shorthand in ["first", "second"] {
            send_json(
                &app,
                "POST",
                "/projects",
                Some(json!({ "name": "Some Manga", "shorthand": shorthand })),
            )
            .await;
        }
        let (_, newest) = send_json(&app, "GET", "/projects?ordering=newest", None).await;
        let (_, oldest) = send_json(&app, "GET", "/projects?ordering=oldest", None).await;
        assert_eq!(newest["result"].as_array().unwrap().len(), 2);
        assert_eq!(newest["result"][0]["id"], oldest["result"][1]["id"]);
        assert_eq!(newest["result"][1]["id"], oldest["result"][0]["id"]);

        let (status, _) = send_json(&app, "GET", "/projects?ordering=", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_route_uses_envelope() {
        let (status, body) = send_json(&app(), "GET", "/nowhere/at/all", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("/nowhere/at/all"));
        assert_eq!(body["result"], json!([]));
    }

    #[tokio::test]
    async fn oversized_body_uses_envelope() {
        let app = app_with(ServerConfig {
            max_upload_bytes: 64,
            ..ServerConfig::default()
        });
        let big = json!({ "name": "Some Manga", "shorthand": "x".repeat(200) });
        let (status, body) = send_json(&app, "POST", "/projects", Some(big)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(body["error"].is_string());
    }
}
