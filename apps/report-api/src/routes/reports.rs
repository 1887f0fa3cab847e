//! Report endpoints. Each one resolves the caller's tenant database and
//! returns the assembled report as JSON.
//!
//! Dates are `YYYY-MM-DD`. Period reports default to month-to-date; point
//! reports (`as_of`) default to today.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::routes::{optional_date, tenant_db, PeriodQuery};
use crate::AppState;
use posreport_core::report::{AgingReport, CashBook, LedgerReport, Register, StockSummary, TrialBalance};
use posreport_core::AgingKind;

#[derive(Debug, Default, Deserialize)]
pub struct AsOfQuery {
    pub as_of: Option<String>,
    #[serde(default)]
    pub include_zero: bool,
    pub kind: Option<String>,
}

impl AsOfQuery {
    fn as_of(&self) -> ApiResult<NaiveDate> {
        Ok(optional_date("as_of", self.as_of.as_deref())?.unwrap_or_else(|| Utc::now().date_naive()))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterQuery {
    #[serde(flatten)]
    pub period: PeriodQuery,
    pub party_id: Option<String>,
}

impl RegisterQuery {
    fn party_id(&self) -> Option<&str> {
        self.party_id.as_deref().filter(|p| !p.is_empty())
    }
}

/// `GET /api/reports/cash-book`
pub async fn cash_book(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Json<CashBook>> {
    let range = query.range()?;
    debug!(tenant_id = %auth.tenant.id, user_id = %auth.user.id, from = %range.from, to = %range.to, "Cash book");

    let db = tenant_db(&state, &auth).await?;
    Ok(Json(db.reports().cash_book(range).await?))
}

/// `GET /api/reports/ledger/{account_id}`
pub async fn ledger(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Json<LedgerReport>> {
    let range = query.range()?;
    debug!(tenant_id = %auth.tenant.id, user_id = %auth.user.id, account_id = %account_id, "Ledger");

    let db = tenant_db(&state, &auth).await?;
    Ok(Json(db.reports().ledger(&account_id, range).await?))
}

/// `GET /api/reports/trial-balance`
pub async fn trial_balance(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<AsOfQuery>,
) -> ApiResult<Json<TrialBalance>> {
    let as_of = query.as_of()?;
    debug!(tenant_id = %auth.tenant.id, user_id = %auth.user.id, as_of = %as_of, "Trial balance");

    let db = tenant_db(&state, &auth).await?;
    Ok(Json(db.reports().trial_balance(as_of, query.include_zero).await?))
}

/// `GET /api/reports/aging?kind=receivable|payable`
pub async fn aging(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<AsOfQuery>,
) -> ApiResult<Json<AgingReport>> {
    let as_of = query.as_of()?;
    let kind = match query.kind.as_deref().filter(|k| !k.is_empty()) {
        Some(k) => k.parse::<AgingKind>()?,
        None => AgingKind::Receivable,
    };
    debug!(tenant_id = %auth.tenant.id, user_id = %auth.user.id, kind = %kind, as_of = %as_of, "Aging");

    let db = tenant_db(&state, &auth).await?;
    Ok(Json(db.reports().aging(kind, as_of).await?))
}

/// `GET /api/reports/sales-register`
pub async fn sales_register(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<RegisterQuery>,
) -> ApiResult<Json<Register>> {
    let range = query.period.range()?;
    debug!(tenant_id = %auth.tenant.id, user_id = %auth.user.id, "Sales register");

    let db = tenant_db(&state, &auth).await?;
    Ok(Json(db.reports().sales_register(range, query.party_id()).await?))
}

/// `GET /api/reports/purchase-register`
pub async fn purchase_register(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<RegisterQuery>,
) -> ApiResult<Json<Register>> {
    let range = query.period.range()?;
    debug!(tenant_id = %auth.tenant.id, user_id = %auth.user.id, "Purchase register");

    let db = tenant_db(&state, &auth).await?;
    Ok(Json(db.reports().purchase_register(range, query.party_id()).await?))
}

/// `GET /api/reports/stock-summary`
pub async fn stock_summary(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<AsOfQuery>,
) -> ApiResult<Json<StockSummary>> {
    let as_of = query.as_of()?;
    debug!(tenant_id = %auth.tenant.id, user_id = %auth.user.id, as_of = %as_of, "Stock summary");

    let db = tenant_db(&state, &auth).await?;
    Ok(Json(db.reports().stock_summary(as_of).await?))
}
