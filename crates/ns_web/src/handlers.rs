use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use ns_core::{Article, NewArticle};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use crate::error::ApiError;
use crate::extract::FormOrJson;
use crate::views;
use crate::AppState;

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub comment: String,
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Html<String>> {
    let articles = state.store.find_all().await?;
    Ok(Html(views::render_articles(&articles)))
}

pub async fn scrape(
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.scraper.scrape_site().await {
        Ok(report) => {
            info!(site = %state.scraper.site(), "📰 {}", report);
            Html(views::render_scrape(&report.message())).into_response()
        }
        Err(e) => {
            error!(site = %state.scraper.site(), error = %e, "❌ Scrape failed");
            let message = format!("Scrape failed: {}", e);
            (StatusCode::BAD_GATEWAY, Html(views::render_scrape(&message))).into_response()
        }
    }
}

pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Option<Article>>> {
    Ok(Json(state.store.find_by_id(&id).await?))
}

pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    FormOrJson(form): FormOrJson<CommentForm>,
) -> ApiResult<Json<Option<Article>>> {
    Ok(Json(state.store.add_comment(&id, &form.comment).await?))
}

pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    Path((article_id, comment_id)): Path<(String, String)>,
) -> ApiResult<Json<Option<Article>>> {
    Ok(Json(state.store.remove_comment(&article_id, &comment_id).await?))
}

pub async fn create_article(
    State(state): State<Arc<AppState>>,
    FormOrJson(data): FormOrJson<NewArticle>,
) -> ApiResult<Response> {
    match state.store.create(data).await {
        Ok(article) => Ok(Json(article).into_response()),
        Err(e) if e.is_duplicate_key() => {
            info!(error = %e, "Already Created");
            Ok(Json(json!({ "message": "Already Created" })).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn delete_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Option<Article>>> {
    Ok(Json(state.store.delete_by_id(&id).await?))
}
