mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{Factory, StubRenderer, TestApp};
use prerender_shortener::models::RenderStatus;
use serde_json::json;

const BROWSER_UA: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
const CRAWLER_UA: &str = "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

fn location(response: &axum_test::TestResponse) -> String {
    response
        .header("location")
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_redirect_user() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let link = factory
        .create_link_with_status(
            "https://example.com/post",
            RenderStatus::Completed,
            "<html>rendered</html>",
        )
        .await;

    let response = app
        .server
        .get(&format!("/{}", link.short_code))
        .add_header("User-Agent", BROWSER_UA)
        .await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(location(&response), "https://example.com/post");
}

#[tokio::test]
async fn test_redirect_without_user_agent() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let link = factory.create_link("https://example.com/no-ua").await;

    let response = app.server.get(&format!("/{}", link.short_code)).await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(location(&response), "https://example.com/no-ua");
}

#[tokio::test]
async fn test_crawler_gets_rendered_html() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let link = factory
        .create_link_with_status(
            "https://example.com/post",
            RenderStatus::Completed,
            "<html><head><title>Post</title></head></html>",
        )
        .await;

    let response = app
        .server
        .get(&format!("/{}", link.short_code))
        .add_header("User-Agent", CRAWLER_UA)
        .await;

    response.assert_status_ok();
    assert!(response
        .header("content-type")
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    assert_eq!(
        response.text(),
        "<html><head><title>Post</title></head></html>"
    );
}

#[tokio::test]
async fn test_crawler_redirected_when_render_failed() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let link = factory
        .create_link_with_status("https://example.com/failed", RenderStatus::Failed, "")
        .await;

    let response = app
        .server
        .get(&format!("/{}", link.short_code))
        .add_header("User-Agent", "facebookexternalhit/1.1")
        .await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(location(&response), "https://example.com/failed");
    assert_eq!(app.renderer.calls(), 0);
}

#[tokio::test]
async fn test_crawler_redirected_when_completed_without_content() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let link = factory
        .create_link_with_status("https://example.com/empty", RenderStatus::Completed, "")
        .await;

    let response = app
        .server
        .get(&format!("/{}", link.short_code))
        .add_header("User-Agent", CRAWLER_UA)
        .await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(location(&response), "https://example.com/empty");
}

#[tokio::test]
async fn test_crawler_waits_for_pending_render() {
    let app = TestApp::with_renderer(StubRenderer::ok(Duration::from_millis(50))).await;
    let factory = Factory::new(&app.state);
    let link = factory.create_link("https://example.com/pending").await;

    let response = app
        .server
        .get(&format!("/{}", link.short_code))
        .add_header("User-Agent", CRAWLER_UA)
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.text(),
        StubRenderer::html_for("https://example.com/pending")
    );
    assert_eq!(app.renderer.calls(), 1);
}

#[tokio::test]
async fn test_crawler_redirected_when_render_too_slow() {
    let app = TestApp::with_renderer(StubRenderer::ok(Duration::from_secs(3))).await;
    let factory = Factory::new(&app.state);
    let link = factory.create_link("https://example.com/heavy").await;

    let response = app
        .server
        .get(&format!("/{}", link.short_code))
        .add_header("User-Agent", CRAWLER_UA)
        .await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(location(&response), "https://example.com/heavy");
    assert!(
        app.state
            .render_queue
            .is_in_flight("https://example.com/heavy")
            .await
    );
}

#[tokio::test]
async fn test_generate_then_crawl() {
    let app = TestApp::with_renderer(StubRenderer::ok(Duration::from_millis(100))).await;

    let generated = app
        .server
        .post("/generate")
        .json(&json!({ "url": "https://example.com/flow" }))
        .await;
    generated.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = generated.json();
    let path = format!("/{}", body["short_code"].as_str().unwrap());

    let crawler = app.server.get(&path).add_header("User-Agent", CRAWLER_UA).await;
    crawler.assert_status_ok();
    assert_eq!(
        crawler.text(),
        StubRenderer::html_for("https://example.com/flow")
    );

    let user = app.server.get(&path).add_header("User-Agent", BROWSER_UA).await;
    user.assert_status(StatusCode::FOUND);
    assert_eq!(location(&user), "https://example.com/flow");
}

#[tokio::test]
async fn test_redirect_unknown_code() {
    let app = TestApp::new().await;

    let response = app
        .server
        .get("/ZZZZZZ")
        .add_header("User-Agent", BROWSER_UA)
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert!(body["error"].is_string());
}
