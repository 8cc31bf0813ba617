use super::browse::{DEFAULT_PREVIEW_LIMIT, Entity, browsable_entities, preview_entity};
use super::types::ResultSet;
use crate::error::SearchError;
use crate::search::engine::SearchDispatcher;
use crate::search::types::parse_limit;

use axum::extract::{Path, Query};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct PreviewParams {
    pub limit: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EntitiesResponse {
    pub tables: Vec<String>,
}

pub async fn handle_list_tables(
    Extension(dispatcher): Extension<Arc<SearchDispatcher>>,
) -> Result<Json<EntitiesResponse>, SearchError> {
    let tables = dispatcher.with_connection(browsable_entities).await?;
    Ok(Json(EntitiesResponse { tables }))
}

pub async fn handle_preview_table(
    Extension(dispatcher): Extension<Arc<SearchDispatcher>>,
    Path(entity): Path<String>,
    Query(params): Query<PreviewParams>,
) -> Result<Json<ResultSet>, SearchError> {
    let entity: Entity = entity.parse()?;
    let limit = parse_limit(params.limit.as_deref(), DEFAULT_PREVIEW_LIMIT)?;

    let rows = dispatcher
        .with_connection(move |conn| preview_entity(conn, entity, limit))
        .await?;
    Ok(Json(rows))
}
