use std::fs;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::components::TemplateComponent;
use crate::handlers::router;
use crate::services::PageStore;
use crate::types::AppState;

// helper building the real router over a throwaway storage directory
fn setup_app() -> (TempDir, Router) {
    let tmp = TempDir::new().unwrap();
    let state = AppState::new(PageStore::new(tmp.path().join("data")), TemplateComponent::new());
    (tmp, router(state))
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_form(app: &Router, uri: &str, form: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn post_multipart(app: &Router, uri: &str, payload: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XYZ")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    response.headers().get(header::LOCATION).unwrap().to_str().unwrap()
}

#[tokio::test]
async fn test_view_missing_page_redirects_to_edit() {
    let (_tmp, app) = setup_app();
    let response = get(&app, "/view/NewPage").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/edit/NewPage");
}

#[tokio::test]
async fn test_edit_missing_page_shows_empty_form() {
    let (_tmp, app) = setup_app();
    let response = get(&app, "/edit/NewPage").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("action=\"/save/NewPage\""));
    assert!(html.contains("cols=\"80\"></textarea>"));
}

#[tokio::test]
async fn test_save_then_view() {
    let (tmp, app) = setup_app();
    let response = post_form(&app, "/save/Greeting", "body=hello+%5BWorld%5D+bye").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/view/Greeting");

    let on_disk = fs::read_to_string(tmp.path().join("data").join("Greeting.txt")).unwrap();
    assert_eq!(on_disk, "hello [World] bye");

    let response = get(&app, "/view/Greeting").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("hello <a href=\"/view/World\">World</a> bye"));
    assert!(html.contains("Last modified:"));
}

#[tokio::test]
async fn test_view_escapes_user_markup() {
    let (_tmp, app) = setup_app();
    post_form(&app, "/save/Unsafe", "body=%3Cb%3E%5BFoo%5D%3Cscript%3Ex%3C%2Fscript%3E").await;

    let html = body_text(get(&app, "/view/Unsafe").await).await;
    assert!(html.contains("&lt;b&gt;<a href=\"/view/Foo\">Foo</a>&lt;script&gt;"));
    assert!(!html.contains("<b>"));
    assert!(!html.contains("<script>"));
}

#[tokio::test]
async fn test_edit_existing_page_escapes_body() {
    let (_tmp, app) = setup_app();
    post_form(&app, "/save/Draft", "body=a+%3C+b+%26+c").await;

    let html = body_text(get(&app, "/edit/Draft").await).await;
    assert!(html.contains(">a &lt; b &amp; c</textarea>"));
}

#[tokio::test]
async fn test_save_without_body_field_stores_empty_page() {
    let (tmp, app) = setup_app();
    let response = post_form(&app, "/save/Empty", "other=1").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(fs::read(tmp.path().join("data").join("Empty.txt")).unwrap(), b"");

    let response = app
        .clone()
        .oneshot(Request::builder().method("POST").uri("/save/Bare").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(fs::read(tmp.path().join("data").join("Bare.txt")).unwrap(), b"");
}

#[tokio::test]
async fn test_list_shows_first_saves_in_order() {
    let (_tmp, app) = setup_app();
    post_form(&app, "/save/A", "body=one").await;
    post_form(&app, "/save/B", "body=two").await;
    post_form(&app, "/save/A", "body=three").await;

    let response = get(&app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    let a = html.find("href=\"/view/A\"").unwrap();
    let b = html.find("href=\"/view/B\"").unwrap();
    assert!(a < b);
    assert_eq!(html.matches("href=\"/view/A\"").count(), 1);
    assert!(html.contains("All pages (2)"));

    let view = body_text(get(&app, "/view/A").await).await;
    assert!(view.contains("three"));
}

#[tokio::test]
async fn test_invalid_paths_are_not_found_and_touch_nothing() {
    let (tmp, app) = setup_app();
    let paths = [
        "/view/",
        "/view",
        "/view/a.b",
        "/view/a/b",
        "/view/..",
        "/view/%2E%2E",
        "/edit/%2Fetc%2Fpasswd",
        "/view/caf%C3%A9",
        "/view/has%20space",
        "/view/%FF",
        "/delete/Foo",
        "/foo/bar",
        "/View/Foo",
        "/view/Foo/",
    ];
    for path in paths {
        let response = get(&app, path).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "GET {}", path);
    }

    for path in ["/save/a.b", "/save/..", "/save/%2E%2E%2Fescape", "/save/", "/save/x/y"] {
        let response = post_form(&app, path, "body=pwned").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "POST {}", path);
    }

    assert!(!tmp.path().join("data").exists());
    assert!(!tmp.path().join("escape.txt").exists());
    let html = body_text(get(&app, "/").await).await;
    assert!(html.contains("All pages (0)"));
}

#[tokio::test]
async fn test_save_failure_is_internal_error_with_reason() {
    let tmp = TempDir::new().unwrap();
    let blocker = tmp.path().join("blocker");
    fs::write(&blocker, "a file, not a directory").unwrap();
    let state = AppState::new(PageStore::new(blocker.join("data")), TemplateComponent::new());
    let app = router(state);

    let response = post_form(&app, "/save/Lost", "body=text").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = body_text(response).await;
    assert!(text.starts_with("mkdir "), "unexpected failure detail: {}", text);
    assert!(text.contains("blocker"), "missing failure detail: {}", text);

    let html = body_text(get(&app, "/").await).await;
    assert!(html.contains("All pages (0)"));
}

#[tokio::test]
async fn test_render_failure_is_internal_error() {
    let tmp = TempDir::new().unwrap();
    let templates =
        TemplateComponent::from_sources("{{PAGES}}", "{{TITLE}}{{MISSING}}", "{{TITLE}}");
    let app = router(AppState::new(PageStore::new(tmp.path().join("data")), templates));

    post_form(&app, "/save/Home", "body=hi").await;
    let response = get(&app, "/view/Home").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(response).await.contains("MISSING"));
}

#[tokio::test]
async fn test_wrong_method_on_known_route() {
    let (_tmp, app) = setup_app();
    let response = post_form(&app, "/view/Home", "body=x").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// seeds a page that later, unusual saves must not wipe
async fn setup_app_with_doc() -> (TempDir, Router) {
    let (tmp, app) = setup_app();
    let response = post_form(&app, "/save/Doc", "body=important").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    (tmp, app)
}

fn doc_on_disk(tmp: &TempDir) -> Vec<u8> {
    fs::read(tmp.path().join("data").join("Doc.txt")).unwrap()
}

#[tokio::test]
async fn test_duplicated_body_field_keeps_first_value() {
    let (tmp, app) = setup_app_with_doc().await;
    let response = post_form(&app, "/save/Doc", "body=first&body=second").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(doc_on_disk(&tmp), b"first");
}

#[tokio::test]
async fn test_large_body_is_stored_in_full() {
    let (tmp, app) = setup_app_with_doc().await;
    let text = "a".repeat(3 * 1024 * 1024);
    let response = post_form(&app, "/save/Doc", &format!("body={}", text)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(doc_on_disk(&tmp).len(), text.len());
}

#[tokio::test]
async fn test_oversized_body_is_rejected_without_touching_page() {
    let (tmp, app) = setup_app_with_doc().await;
    let text = "a".repeat(crate::handlers::MAX_FORM_BYTES + 1);
    let response = post_form(&app, "/save/Doc", &format!("body={}", text)).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(doc_on_disk(&tmp), b"important");
}

#[tokio::test]
async fn test_multipart_body_is_saved() {
    let (tmp, app) = setup_app_with_doc().await;
    let payload = "--XYZ\r\n\
        Content-Disposition: form-data; name=\"title\"\r\n\r\nignored\r\n\
        --XYZ\r\n\
        Content-Disposition: form-data; name=\"body\"\r\n\r\nmultipart text\r\n\
        --XYZ--\r\n";
    let response = post_multipart(&app, "/save/Doc", payload).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(doc_on_disk(&tmp), b"multipart text");
}

#[tokio::test]
async fn test_truncated_multipart_is_rejected_without_touching_page() {
    let (tmp, app) = setup_app_with_doc().await;
    let payload = "--XYZ\r\nContent-Disposition: form-data; name=\"body\"\r\n\r\npartial";
    let response = post_multipart(&app, "/save/Doc", payload).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(doc_on_disk(&tmp), b"important");
}
