use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use configuration::SummarizerConfig;
use news::Article;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use summarizer::error::SummarizerError;
use summarizer::{ChatSummarizer, Summarize};

type Seen = Arc<Mutex<Vec<(Option<String>, Value)>>>;

async fn serve(status: StatusCode, reply: Value) -> (String, Seen) {
    let seen: Seen = Arc::default();
    let recorder = seen.clone();
    let app = Router::new().route(
        "/v1/chat/completions",
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let recorder = recorder.clone();
            let reply = reply.clone();
            async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                recorder.lock().unwrap().push((auth, body));
                (status, Json(reply))
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/v1", addr), seen)
}

fn config(base_url: String) -> SummarizerConfig {
    SummarizerConfig {
        api_key: "sk-test".to_string(),
        base_url,
        ..SummarizerConfig::default()
    }
}

fn articles() -> Vec<Article> {
    vec![Article {
        title: "Chipmakers surge".to_string(),
        url: "https://example.com/chips".to_string(),
        summary: "Tech shares climbed.".to_string(),
    }]
}

#[tokio::test]
async fn returns_the_first_choice() {
    let (base_url, seen) = serve(
        StatusCode::OK,
        json!({"choices": [{"message": {"role": "assistant", "content": "digest"}}]}),
    )
    .await;
    let summarizer = ChatSummarizer::new(&config(base_url)).unwrap().unwrap();

    let digest = summarizer.summarize(&articles()).await.unwrap();

    assert_eq!(digest, "digest");
    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].0.as_deref(), Some("Bearer sk-test"));
    assert_eq!(seen[0].1["model"], "gpt-4o-mini");
    assert_eq!(seen[0].1["messages"][0]["role"], "user");
    assert!(seen[0].1["messages"][0]["content"]
        .as_str()
        .unwrap()
        .contains("Chipmakers surge"));
}

#[tokio::test]
async fn error_status_is_an_api_error() {
    let (base_url, _) = serve(
        StatusCode::UNAUTHORIZED,
        json!({"error": {"message": "Incorrect API key"}}),
    )
    .await;
    let summarizer = ChatSummarizer::new(&config(base_url)).unwrap().unwrap();

    let err = summarizer.summarize(&articles()).await.unwrap_err();
    assert!(matches!(err, SummarizerError::Api { status: 401, ref message } if message.contains("Incorrect API key")));
}

#[tokio::test]
async fn no_articles_skips_the_request() {
    let (base_url, seen) = serve(StatusCode::OK, json!({"choices": []})).await;
    let summarizer = ChatSummarizer::new(&config(base_url)).unwrap().unwrap();

    let digest = summarizer.summarize(&[]).await.unwrap();
    assert!(digest.ends_with("No news articles matched the requested keywords."));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_choices_are_reported() {
    let (base_url, _) = serve(StatusCode::OK, json!({"choices": []})).await;
    let summarizer = ChatSummarizer::new(&config(base_url)).unwrap().unwrap();

    let err = summarizer.summarize(&articles()).await.unwrap_err();
    assert!(matches!(err, SummarizerError::EmptyResponse));
}

#[test]
fn missing_key_disables_the_summarizer() {
    let summarizer = ChatSummarizer::new(&SummarizerConfig::default()).unwrap();
    assert!(summarizer.is_none());
}
