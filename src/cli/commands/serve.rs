//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for search, cited answers and page lookup.

use super::{build_engine, load_knowledge};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::corpus::{DocumentInfo, Page};
use crate::error::KamerbronError;
use crate::rag::{AnswerEngine, QuestionContext};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

/// Shared application state.
struct AppState {
    engine: AnswerEngine,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Generate, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let knowledge = load_knowledge(&settings)?;
    let engine = build_engine(&settings, knowledge, None)?;
    let state = Arc::new(AppState { engine });

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Kamerbron API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Search", "POST /search");
    Output::kv("Answer", "POST /answer");
    Output::kv("Documents", "GET  /documents");
    Output::kv("Page", "GET  /pdf-page?source=&page=");
    Output::kv("Reload", "POST /reload");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/search", post(search))
        .route("/answer", post(answer))
        .route("/documents", get(list_documents))
        .route("/pdf-page", get(pdf_page))
        .route("/reload", post(reload))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default)]
    top_k: Option<usize>,
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchHit {
    source: String,
    title: String,
    page: u32,
    file_path: PathBuf,
    content: String,
    score: f32,
}

#[derive(Deserialize)]
struct AnswerRequest {
    question: String,
    #[serde(default)]
    speaker: Option<String>,
    #[serde(default)]
    party: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    top_k: Option<usize>,
}

#[derive(Serialize)]
struct DocumentListResponse {
    documents: Vec<DocumentInfo>,
    total: usize,
}

#[derive(Deserialize)]
struct PageQuery {
    source: String,
    page: u32,
}

#[derive(Serialize)]
struct ReloadResponse {
    pages: usize,
    documents: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// HTTP status for a library error.
fn status_for(error: &KamerbronError) -> StatusCode {
    match error {
        KamerbronError::PageNotFound { .. } => StatusCode::NOT_FOUND,
        KamerbronError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        KamerbronError::NoAnswerProduced => StatusCode::UNPROCESSABLE_ENTITY,
        KamerbronError::Generation(_) | KamerbronError::OpenAI(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: &KamerbronError) -> Response {
    (
        status_for(error),
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.engine.knowledge().snapshot();
    Json(serde_json::json!({
        "status": "ok",
        "pages": snapshot.pages().len(),
        "terms": snapshot.index().vocabulary_size(),
    }))
}

async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> impl IntoResponse {
    let top_k = req.top_k.unwrap_or(state.engine.top_k());
    let results = state.engine.search(&req.query, top_k);

    Json(SearchResponse {
        results: results
            .into_iter()
            .map(|r| SearchHit {
                title: r.page.title().to_string(),
                source: r.page.source,
                page: r.page.page_number,
                file_path: r.page.file_path,
                content: r.page.content,
                score: r.score,
            })
            .collect(),
    })
}

async fn answer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnswerRequest>,
) -> Response {
    let context = QuestionContext {
        question: req.question,
        speaker: req.speaker,
        party: req.party,
        category: req.category,
    };
    let top_k = req.top_k.unwrap_or(state.engine.top_k());

    match state.engine.answer_with_top_k(&context, top_k).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            warn!("Answer request failed: {}", e);
            error_response(&e)
        }
    }
}

async fn list_documents(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let documents = state.engine.knowledge().documents();
    Json(DocumentListResponse {
        total: documents.len(),
        documents,
    })
}

async fn pdf_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Response {
    match state.engine.knowledge().get_page(&query.source, query.page) {
        Some(page) => Json::<Page>(page).into_response(),
        None => error_response(&KamerbronError::PageNotFound {
            document: query.source,
            page: query.page,
        }),
    }
}

async fn reload(State(state): State<Arc<AppState>>) -> Response {
    let knowledge = Arc::clone(state.engine.knowledge());

    match tokio::task::spawn_blocking(move || knowledge.reload()).await {
        Ok(Ok(snapshot)) => Json(ReloadResponse {
            pages: snapshot.pages().len(),
            documents: snapshot.pages().documents().len(),
        })
        .into_response(),
        Ok(Err(e)) => error_response(&e),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::PageStore;
    use crate::generation::Generator;
    use crate::index::Tokenizer;
    use crate::knowledge::{KnowledgeBase, Snapshot};
    use async_trait::async_trait;

    struct ReplyGenerator(&'static str);

    #[async_trait]
    impl Generator for ReplyGenerator {
        async fn generate(&self, _system: &str, _user: &str) -> crate::error::Result<String> {
            Ok(self.0.to_string())
        }

        fn model(&self) -> &str {
            "reply"
        }
    }

    struct DownGenerator;

    #[async_trait]
    impl Generator for DownGenerator {
        async fn generate(&self, _system: &str, _user: &str) -> crate::error::Result<String> {
            Err(KamerbronError::OpenAI("connection refused".to_string()))
        }

        fn model(&self) -> &str {
            "down"
        }
    }

    fn state(generator: Arc<dyn Generator>) -> Arc<AppState> {
        let pages = PageStore::from_pages(vec![
            Page::new("Jaarverslag.pdf", 1, "De regeldruk is in 2024 gedaald.", "/kb/Jaarverslag.pdf"),
            Page::new("Jaarverslag.pdf", 2, "Het college adviseert over wetgeving.", "/kb/Jaarverslag.pdf"),
        ]);
        let knowledge = Arc::new(KnowledgeBase::new(Snapshot::build(pages, Tokenizer::default())));
        Arc::new(AppState {
            engine: AnswerEngine::new(knowledge, generator),
        })
    }

    fn answer_request(question: &str) -> AnswerRequest {
        AnswerRequest {
            question: question.to_string(),
            speaker: None,
            party: None,
            category: None,
            top_k: None,
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&KamerbronError::NoAnswerProduced), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            status_for(&KamerbronError::Generation("x".to_string())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&KamerbronError::PageNotFound {
                document: "a.pdf".to_string(),
                page: 1
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&KamerbronError::Corpus("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_pdf_page_found_and_missing() {
        let state = state(Arc::new(ReplyGenerator("unused")));

        let found = pdf_page(
            State(state.clone()),
            Query(PageQuery {
                source: "Jaarverslag.pdf".to_string(),
                page: 2,
            }),
        )
        .await;
        assert_eq!(found.status(), StatusCode::OK);

        let missing = pdf_page(
            State(state),
            Query(PageQuery {
                source: "Jaarverslag.pdf".to_string(),
                page: 9,
            }),
        )
        .await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_answer_status_codes() {
        let ok = answer(
            State(state(Arc::new(ReplyGenerator("De regeldruk daalde. [source-1]")))),
            Json(answer_request("Hoe ontwikkelt de regeldruk zich?")),
        )
        .await;
        assert_eq!(ok.status(), StatusCode::OK);

        let empty = answer(
            State(state(Arc::new(ReplyGenerator("")))),
            Json(answer_request("Hoe ontwikkelt de regeldruk zich?")),
        )
        .await;
        assert_eq!(empty.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let down = answer(
            State(state(Arc::new(DownGenerator))),
            Json(answer_request("Hoe ontwikkelt de regeldruk zich?")),
        )
        .await;
        assert_eq!(down.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_reload_without_corpus_dir_fails() {
        let response = reload(State(state(Arc::new(ReplyGenerator("unused"))))).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
