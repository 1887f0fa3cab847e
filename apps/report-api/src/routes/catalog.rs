//! Tenant master data used to populate report filters.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::routes::tenant_db;
use crate::AppState;
use posreport_core::{Account, Item, Party, PartyType};

#[derive(Debug, Default, Deserialize)]
pub struct PartyQuery {
    #[serde(rename = "type")]
    pub party_type: Option<String>,
}

/// `GET /api/accounts`
pub async fn accounts(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<Vec<Account>>> {
    let db = tenant_db(&state, &auth).await?;
    Ok(Json(db.catalog().accounts().await?))
}

/// `GET /api/parties?type=customer|supplier`
pub async fn parties(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PartyQuery>,
) -> ApiResult<Json<Vec<Party>>> {
    let party_type = query
        .party_type
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(str::parse::<PartyType>)
        .transpose()?;

    let db = tenant_db(&state, &auth).await?;
    Ok(Json(db.catalog().parties(party_type).await?))
}

/// `GET /api/items`
pub async fn items(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<Vec<Item>>> {
    let db = tenant_db(&state, &auth).await?;
    Ok(Json(db.catalog().items().await?))
}
