use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::response::Html;
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::highlight::Highlighter;
use crate::llm::HttpGenerator;
use crate::review::Reviewer;

const INDEX_HTML: &str = include_str!("../web/index.html");
const CSS_PLACEHOLDER: &str = "{{HIGHLIGHT_CSS}}";
const DEFAULT_LANGUAGE: &str = "python";

/// Read-only state built once at startup and shared by every request.
#[derive(Clone)]
pub struct AppState {
    reviewer: Reviewer,
    highlighter: Arc<Highlighter>,
    index_html: Bytes,
}

impl AppState {
    /// Renders the theme stylesheet into the page; this is the only time it is computed.
    pub fn new(reviewer: Reviewer, highlighter: Highlighter) -> Result<Self> {
        let css = highlighter
            .stylesheet()
            .context("failed to render highlight stylesheet")?;
        Ok(Self {
            reviewer,
            highlighter: Arc::new(highlighter),
            index_html: Bytes::from(render_index(&css)),
        })
    }
}

fn render_index(css: &str) -> String {
    INDEX_HTML.replace(CSS_PLACEHOLDER, css)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/review", post(review))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(cfg: &Config, host: &str, port: u16) -> Result<()> {
    let generator = HttpGenerator::from_config(cfg)?;
    let highlighter = Highlighter::new(&cfg.theme)?;
    let state = AppState::new(Reviewer::new(Arc::new(generator)), highlighter)?;

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    let local = listener.local_addr()?;
    tracing::info!(addr = %local, model = %cfg.model, api_style = ?cfg.api_style, "server started");
    println!("codereview running at http://{local}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn index(State(state): State<AppState>) -> Html<Bytes> {
    Html(state.index_html.clone())
}

async fn review(
    State(state): State<AppState>,
    Json(req): Json<ReviewRequest>,
) -> Json<ReviewResponse> {
    let code = req.code.unwrap_or_default();
    let language = req
        .language
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    let highlighter = Arc::clone(&state.highlighter);
    let (hl_code, hl_language) = (code.clone(), language.clone());
    let (review, highlighted) = tokio::join!(
        state.reviewer.review(&code, &language),
        tokio::task::spawn_blocking(move || highlighter.highlight(&hl_code, &hl_language)),
    );
    let highlighted_code =
        highlighted.unwrap_or_else(|err| format!("Error highlighting code: {err}"));

    Json(ReviewResponse {
        review,
        highlighted_code,
    })
}

/// Absent and `null` fields both take their defaults.
#[derive(Debug, Deserialize)]
struct ReviewRequest {
    code: Option<String>,
    language: Option<String>,
}

#[derive(Debug, Serialize)]
struct ReviewResponse {
    review: String,
    highlighted_code: String,
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::review::EMPTY_CODE_MESSAGE;
    use crate::review::testing::RecordingGenerator;

    const THEME: &str = "base16-ocean.dark";

    fn app_with(generator: Arc<RecordingGenerator>) -> Router {
        let highlighter = Highlighter::new(THEME).unwrap();
        let state = AppState::new(Reviewer::new(generator), highlighter).unwrap();
        router(state)
    }

    fn post_review(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/review")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn json_body(resp: axum::response::Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn index_serves_page_with_stylesheet() {
        let app = app_with(Arc::new(RecordingGenerator::replying("OK")));
        let resp = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/html"));

        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let page = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(page.contains("AI Code Review"));
        assert!(!page.contains(CSS_PLACEHOLDER));
        assert!(page.contains(".hl-"));
    }

    #[tokio::test]
    async fn review_returns_both_fields() {
        let generator = Arc::new(RecordingGenerator::replying("OK"));
        let app = app_with(generator.clone());
        let body = json!({"code": "print(1)", "language": "python"}).to_string();
        let resp = app.oneshot(post_review(body)).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let val = json_body(resp).await;
        assert_eq!(val["review"], "OK");
        let highlighted = val["highlighted_code"].as_str().unwrap();
        assert!(highlighted.contains("print"));
        assert!(highlighted.contains("<span"));
        assert_eq!(generator.prompts().len(), 1);
    }

    // Empty code short-circuits the review but the highlighter still runs
    // with the default language.
    #[tokio::test]
    async fn empty_object_uses_defaults() {
        let generator = Arc::new(RecordingGenerator::replying("unused"));
        let app = app_with(generator.clone());
        let resp = app.oneshot(post_review("{}")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let val = json_body(resp).await;
        assert_eq!(val["review"], EMPTY_CODE_MESSAGE);
        let expected = Highlighter::new(THEME).unwrap().highlight("", "python");
        assert_eq!(val["highlighted_code"], expected.as_str());
        assert!(!expected.starts_with("Error"));
        assert!(generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn null_fields_take_defaults() {
        let generator = Arc::new(RecordingGenerator::replying("fine"));
        let app = app_with(generator.clone());
        let body = json!({"code": "x = 1", "language": null}).to_string();
        let resp = app.oneshot(post_review(body)).await.unwrap();

        let val = json_body(resp).await;
        assert_eq!(val["review"], "fine");
        assert!(generator.prompts()[0].contains("analyze this python code:"));
    }

    #[tokio::test]
    async fn backend_errors_are_still_200() {
        let app = app_with(Arc::new(RecordingGenerator::failing()));
        let body = json!({"code": "print(1)", "language": "not-a-real-language"}).to_string();
        let resp = app.oneshot(post_review(body)).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let val = json_body(resp).await;
        assert!(val["review"].as_str().unwrap().starts_with("Error analyzing code: "));
        assert!(
            val["highlighted_code"]
                .as_str()
                .unwrap()
                .starts_with("Error highlighting code: ")
        );
    }

    #[tokio::test]
    async fn malformed_json_is_a_client_error() {
        let app = app_with(Arc::new(RecordingGenerator::replying("OK")));
        let resp = app.oneshot(post_review("{not json")).await.unwrap();
        assert!(resp.status().is_client_error());
    }

    #[tokio::test]
    async fn any_origin_is_allowed() {
        let app = app_with(Arc::new(RecordingGenerator::replying("OK")));
        let req = Request::builder()
            .uri("/")
            .header(header::ORIGIN, "https://elsewhere.example")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn startup_fails_without_credential() {
        let cfg = Config {
            api_key_env: "CODEREVIEW_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            api_key: None,
            ..Config::default()
        };
        let err = run_server(&cfg, "127.0.0.1", 0).await.unwrap_err();
        assert!(err.to_string().contains("Missing API key"));
    }
}
