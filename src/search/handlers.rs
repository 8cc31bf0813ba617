use super::engine::SearchDispatcher;
use super::types::{SearchParams, SearchRequest, Strategy, parse_limit};
use crate::error::SearchError;
use crate::store::types::ResultSet;

use axum::extract::{Path, Query};
use axum::{Extension, Json};
use std::sync::Arc;
use tracing::Instrument;

pub async fn handle_search(
    Extension(dispatcher): Extension<Arc<SearchDispatcher>>,
    Path(strategy): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ResultSet>, SearchError> {
    let strategy: Strategy = strategy.parse()?;
    let text = params
        .q
        .ok_or_else(|| SearchError::InvalidArgument("q is required".to_string()))?;
    let limit = parse_limit(params.limit.as_deref(), dispatcher.default_limit())?;
    let request = SearchRequest::new(strategy, text, limit)?;

    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("search", %request_id, strategy = %strategy);

    let rows = dispatcher.execute(&request).instrument(span).await?;
    Ok(Json(rows))
}
