//! HTTP handlers, grouped by route prefix.
//!
//! - [`health`] - liveness and master DB status
//! - [`auth`] - user signup, login, token refresh, logout
//! - [`admin`] - super-admin login and tenant/user provisioning
//! - [`catalog`] - chart of accounts, parties, items
//! - [`reports`] - financial and inventory reports

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod health;
pub mod reports;

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;
use posreport_core::validation::validate_date_range;
use posreport_core::{parse_date, DateRange, Tenant};
use posreport_db::TenantDb;

/// Tenant fields safe to show to tenant users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantSummary {
    pub id: String,
    pub code: String,
    pub name: String,
}

impl From<&Tenant> for TenantSummary {
    fn from(tenant: &Tenant) -> Self {
        TenantSummary {
            id: tenant.id.clone(),
            code: tenant.code.clone(),
            name: tenant.name.clone(),
        }
    }
}

/// Opens the caller's tenant database.
pub(crate) async fn tenant_db(state: &AppState, auth: &AuthUser) -> ApiResult<TenantDb> {
    Ok(state.tenants.get(&auth.tenant).await?)
}

/// Parses an optional `YYYY-MM-DD` query value.
pub(crate) fn optional_date(field: &str, value: Option<&str>) -> ApiResult<Option<NaiveDate>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => Ok(Some(parse_date(field, v)?)),
        None => Ok(None),
    }
}

/// `from`/`to` query window. `to` defaults to today and `from` to the first
/// of `to`'s month.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl PeriodQuery {
    pub fn range(&self) -> ApiResult<DateRange> {
        let to = optional_date("to", self.to.as_deref())?.unwrap_or_else(|| Utc::now().date_naive());
        let from = match optional_date("from", self.from.as_deref())? {
            Some(from) => from,
            None => to.with_day(1).unwrap_or(to),
        };
        Ok(validate_date_range(from, to)?)
    }
}
