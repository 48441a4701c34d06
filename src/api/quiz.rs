use axum::{
    extract::State,
    routing::get,
    Router,
};
use serde::Deserialize;

use super::{ApiQuery, ApiResponse, ApiResult};
use crate::services::quiz_service::{Quiz, DEFAULT_QUESTION_COUNT};
use crate::services::QuizService;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(generate_quiz))
}

#[derive(Debug, Deserialize)]
pub struct QuizQuery {
    pub count: Option<usize>,
}

async fn generate_quiz(State(state): State<AppState>, ApiQuery(query): ApiQuery<QuizQuery>) -> ApiResult<Quiz> {
    let quiz_service = QuizService::new(state.llm.clone());
    let quiz = quiz_service
        .generate(query.count.unwrap_or(DEFAULT_QUESTION_COUNT))
        .await?;

    Ok(ApiResponse::ok(quiz))
}
