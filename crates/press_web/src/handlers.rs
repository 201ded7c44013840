use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use press_core::{ensure_identity, Article, ArticleStatus, Error};
use press_pipeline::GenerationRun;
use crate::{auth::Operator, error::ApiError, AppState};

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Default, Deserialize)]
pub struct ArticleQuery {
    pub slug: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    pub id: Option<String>,
}

/// `POST articles` takes one article or a batch.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ArticlePayload {
    Many(Vec<Article>),
    One(Box<Article>),
}

impl ArticlePayload {
    fn into_vec(self) -> Vec<Article> {
        match self {
            ArticlePayload::Many(articles) => articles,
            ArticlePayload::One(article) => vec![*article],
        }
    }
}

pub async fn generate(
    State(state): State<Arc<AppState>>,
    _operator: Operator,
) -> ApiResult<Json<GenerationRun>> {
    Ok(Json(state.pipeline.run().await?))
}

/// `?slug=` returns one article, otherwise a list optionally filtered by `?status=`.
pub async fn get_articles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ArticleQuery>,
) -> ApiResult<axum::response::Response> {
    if let Some(slug) = query.slug.filter(|s| !s.is_empty()) {
        let article = state
            .repository
            .get_by_slug(&slug)
            .await?
            .ok_or(Error::NotFound(slug))?;
        return Ok(Json(article).into_response());
    }

    let status = query
        .status
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<ArticleStatus>())
        .transpose()?;
    let articles = state.repository.list(status).await?;
    Ok(Json(articles).into_response())
}

/// Validates identity for the whole batch before the first write. A rejection
/// from the store itself (e.g. a slug conflict) still leaves earlier items written.
pub async fn upsert_articles(
    State(state): State<Arc<AppState>>,
    _operator: Operator,
    Json(payload): Json<ArticlePayload>,
) -> ApiResult<Json<Vec<Article>>> {
    let articles = payload.into_vec();
    for (index, article) in articles.iter().enumerate() {
        ensure_identity(article).map_err(|e| match e {
            Error::Validation(msg) => Error::Validation(format!("item {}: {}", index, msg)),
            other => other,
        })?;
    }
    for article in &articles {
        state.repository.upsert(article).await?;
    }
    tracing::info!("💾 Stored {} articles", articles.len());
    Ok(Json(articles))
}

pub async fn delete_article(
    State(state): State<Arc<AppState>>,
    _operator: Operator,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<StatusCode> {
    let id = query
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::Validation("the id query parameter is required".to_string()))?;
    state.repository.delete_by_id(&id).await?;
    tracing::info!("🗑️ Deleted article {}", id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_drafts(
    State(state): State<Arc<AppState>>,
    _operator: Operator,
) -> ApiResult<Json<Vec<Article>>> {
    Ok(Json(state.drafts.list().await?))
}

pub async fn publish_draft(
    State(state): State<Arc<AppState>>,
    _operator: Operator,
    Path(id): Path<String>,
) -> ApiResult<Json<Article>> {
    Ok(Json(state.workflow.publish(&id).await?))
}

pub async fn discard_draft(
    State(state): State<Arc<AppState>>,
    _operator: Operator,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let removed = state.workflow.discard(&id).await?;
    Ok(Json(json!({ "discarded": removed.id })))
}
