use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    middleware::from_fn,
};
use gallery_backend::api::middleware::request_id::{REQUEST_ID_HEADER, request_id_middleware};
use gallery_backend::config::GalleryConfig;
use gallery_backend::infrastructure::{database, storage};
use gallery_backend::{AppState, create_app};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const BOUNDARY: &str = "gallery-test-boundary";

struct TestApp {
    app: Router,
    media: TempDir,
}

async fn setup_app() -> TestApp {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new("gallery_backend=debug,tower_http=debug"))
        .with(fmt::layer().with_test_writer())
        .try_init();

    let media = tempfile::tempdir().unwrap();
    let config = GalleryConfig::development(media.path());
    let db = database::setup_database(&config).await.unwrap();
    let storage_service = storage::setup_storage(&config).await.unwrap();

    // Layered like the binary does it.
    let app = create_app(AppState::new(db, storage_service, config))
        .layer(from_fn(request_id_middleware));
    TestApp { app, media }
}

fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((filename, data)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: image/jpeg\r\n\r\n",
                BOUNDARY, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn send_json(app: &Router, method: &str, uri: &str, payload: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match payload {
        Some(payload) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let (status, body) = send(app, request).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

async fn upload_image(app: &Router, fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/admin/images")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(fields, file)))
        .unwrap();

    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn replace_file(app: &Router, id: &Value, file: (&str, &[u8])) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/admin/images/{}/file", id))
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(&[], Some(file))))
        .unwrap();

    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

/// Every `src` attribute on the rendered gallery page.
fn image_sources(page: &str) -> Vec<String> {
    page.split("src=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .map(str::to_string)
        .collect()
}

fn uploaded_files(media: &TempDir) -> usize {
    std::fs::read_dir(media.path().join("images")).unwrap().count()
}

#[tokio::test]
async fn test_category_admin_flow() {
    let TestApp { app, media: _media } = setup_app().await;

    let (status, created) = send_json(
        &app,
        "POST",
        "/admin/categories",
        Some(json!({ "name": "Portraits" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = send_json(
        &app,
        "PUT",
        &format!("/admin/categories/{}", id),
        Some(json!({ "name": "People" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "People");

    let (status, list) = send_json(&app, "GET", "/admin/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = send_json(&app, "DELETE", &format!("/admin/categories/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send_json(&app, "GET", &format!("/admin/categories/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_invalid_category_name_is_bad_request() {
    let TestApp { app, media: _media } = setup_app().await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/admin/categories",
        Some(json!({ "name": "n".repeat(256) })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "name");

    let (_, list) = send_json(&app, "GET", "/admin/categories", None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_image_upload_and_gallery_page() {
    let TestApp { app, media } = setup_app().await;

    let (_, nature) = send_json(&app, "POST", "/admin/categories", Some(json!({ "name": "Nature" }))).await;
    let (_, sky) = send_json(&app, "POST", "/admin/categories", Some(json!({ "name": "Sky & Sea" }))).await;
    let categories = format!("{},{}", nature["id"], sky["id"]);

    let (status, image) = upload_image(
        &app,
        &[
            ("title", "Test Image"),
            ("age_limit", "18"),
            ("categories", categories.as_str()),
        ],
        Some(("sunset.jpg", &b"fake-jpeg-bytes"[..])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(image["title"], "Test Image");
    assert_eq!(image["age_limit"], 18);
    assert_eq!(image["categories"].as_array().unwrap().len(), 2);
    assert_eq!(
        image["created_date"],
        chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
    );

    let reference = image["image"].as_str().unwrap().to_string();
    assert!(reference.starts_with("images/"));
    assert!(reference.ends_with("-sunset.jpg"));
    assert_eq!(uploaded_files(&media), 1);

    // Uploaded content is served under the media URL.
    let (status, bytes) = send(
        &app,
        Request::builder()
            .uri(format!("/media/{}", reference))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"fake-jpeg-bytes");

    let (status, page) = send(&app, Request::builder().uri("/").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    let page = String::from_utf8(page).unwrap();
    assert!(page.contains("<h2>Test Image</h2>"));
    assert!(page.contains("<li>Nature</li>"));
    assert!(page.contains("<li>Sky &amp; Sea</li>"));
    assert!(page.contains(&format!("/media/{}", reference)));

    let (status, listing) = send_json(&app, "GET", "/api/images", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_upload_validation_happens_before_write() {
    let TestApp { app, media } = setup_app().await;

    let (status, body) = upload_image(
        &app,
        &[("title", "Bad"), ("age_limit", "-3")],
        Some(("bad.jpg", &b"data"[..])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "age_limit");

    let (status, body) = upload_image(&app, &[("title", "No file"), ("age_limit", "3")], None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "image");

    let (status, body) = upload_image(
        &app,
        &[("title", "Teen"), ("age_limit", "twelve")],
        Some(("teen.jpg", &b"data"[..])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "age_limit");

    assert_eq!(uploaded_files(&media), 0);
}

#[tokio::test]
async fn test_upload_with_unknown_category_removes_file() {
    let TestApp { app, media } = setup_app().await;

    let (status, _) = upload_image(
        &app,
        &[("title", "Orphan"), ("age_limit", "0"), ("categories", "77")],
        Some(("orphan.jpg", &b"data"[..])),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(uploaded_files(&media), 0);

    let (_, listing) = send_json(&app, "GET", "/admin/images", None).await;
    assert!(listing.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_image_category_management() {
    let TestApp { app, media: _media } = setup_app().await;

    let (_, c1) = send_json(&app, "POST", "/admin/categories", Some(json!({ "name": "One" }))).await;
    let (_, c2) = send_json(&app, "POST", "/admin/categories", Some(json!({ "name": "Two" }))).await;
    let (_, image) = upload_image(
        &app,
        &[("title", "Managed"), ("age_limit", "7")],
        Some(("managed.png", &b"png"[..])),
    )
    .await;
    let uri = format!("/admin/images/{}/categories", image["id"]);

    let (status, set) = send_json(
        &app,
        "POST",
        &uri,
        Some(json!({ "category_ids": [c1["id"], c2["id"]] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(set.as_array().unwrap().len(), 2);

    let (status, _) = send_json(&app, "DELETE", &format!("{}/{}", uri, c1["id"]), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, set) = send_json(&app, "GET", &uri, None).await;
    assert_eq!(set.as_array().unwrap().len(), 1);
    assert_eq!(set[0]["name"], "Two");

    let (status, set) = send_json(&app, "PUT", &uri, Some(json!({ "category_ids": [c1["id"]] }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(set[0]["name"], "One");

    let (status, _) = send_json(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, set) = send_json(&app, "GET", &uri, None).await;
    assert!(set.as_array().unwrap().is_empty());

    // Deleting a category leaves the image in place.
    let (status, _) = send_json(&app, "DELETE", &format!("/admin/categories/{}", c2["id"]), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send_json(&app, "GET", &format!("/admin/images/{}", image["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_image_update_and_delete() {
    let TestApp { app, media: _media } = setup_app().await;

    let (_, image) = upload_image(
        &app,
        &[("title", "Before"), ("age_limit", "12")],
        Some(("before.jpg", &b"jpg"[..])),
    )
    .await;
    let uri = format!("/admin/images/{}", image["id"]);

    let (status, updated) = send_json(&app, "PUT", &uri, Some(json!({ "title": "After" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "After");
    assert_eq!(updated["age_limit"], 12);
    assert_eq!(updated["created_date"], image["created_date"]);

    let (status, body) = send_json(&app, "PUT", &uri, Some(json!({ "age_limit": -1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "age_limit");

    let (status, _) = send_json(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send_json(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send_json(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_and_empty_gallery() {
    let TestApp { app, media: _media } = setup_app().await;

    let (status, health) = send_json(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");
    assert_eq!(health["database"], "connected");
    assert_eq!(health["storage"], "available");

    let (status, page) = send(&app, Request::builder().uri("/").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(page).unwrap().contains("No images yet."));
}

#[tokio::test]
async fn test_gallery_links_resolve_for_special_filenames() {
    let TestApp { app, media: _media } = setup_app().await;

    let files: [(&str, &[u8]); 3] = [
        ("cover#2.jpg", &b"cover"[..]),
        ("50%off.jpg", &b"sale"[..]),
        ("plain.jpg", &b"plain"[..]),
    ];
    for (name, data) in files {
        let (status, _) = upload_image(&app, &[("title", name), ("age_limit", "0")], Some((name, data))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, page) = send(&app, Request::builder().uri("/").body(Body::empty()).unwrap()).await;
    let sources = image_sources(&String::from_utf8(page).unwrap());
    assert_eq!(sources.len(), 3);
    assert!(sources[0].ends_with("-cover%232.jpg"));
    assert!(sources[1].ends_with("-50%25off.jpg"));

    for ((_, data), src) in files.iter().zip(&sources) {
        let (status, bytes) = send(&app, Request::builder().uri(src.as_str()).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK, "GET {}", src);
        assert_eq!(bytes, *data);
    }
}

#[tokio::test]
async fn test_replace_image_file() {
    let TestApp { app, media } = setup_app().await;

    let (_, image) = upload_image(
        &app,
        &[("title", "Original"), ("age_limit", "3")],
        Some(("first.jpg", &b"first"[..])),
    )
    .await;
    let old_reference = image["image"].as_str().unwrap().to_string();

    let (status, replaced) = replace_file(&app, &image["id"], ("../second.png", &b"second"[..])).await;
    assert_eq!(status, StatusCode::OK);
    let new_reference = replaced["image"].as_str().unwrap().to_string();
    assert!(new_reference.starts_with("images/"));
    assert!(new_reference.ends_with("-second.png"));
    assert_eq!(replaced["title"], "Original");
    assert_eq!(replaced["created_date"], image["created_date"]);

    // The old file is gone and the new one is served.
    assert_eq!(uploaded_files(&media), 1);
    assert!(!media.path().join(&old_reference).exists());
    let (status, bytes) = send(
        &app,
        Request::builder()
            .uri(format!("/media/{}", new_reference))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"second");

    // References cannot be set through the metadata update.
    let uri = format!("/admin/images/{}", image["id"]);
    let (status, _) = send(
        &app,
        Request::builder()
            .method("PUT")
            .uri(&uri)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({ "image": "../../etc/passwd" }).to_string()))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (_, current) = send_json(&app, "GET", &uri, None).await;
    assert_eq!(current["image"], new_reference.as_str());

    // Unknown images are rejected before anything is stored.
    let (status, _) = replace_file(&app, &json!(999), ("orphan.jpg", &b"x"[..])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(uploaded_files(&media), 1);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let TestApp { app, media: _media } = setup_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()[&REQUEST_ID_HEADER], "req-42");

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let generated = response.headers()[&REQUEST_ID_HEADER].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());
}
