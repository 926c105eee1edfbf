//! # HTTP Handlers
//!
//! One async fn per endpoint. Handlers stay thin: decode the DTO, call
//! into tarifa-db, encode the result. No pricing arithmetic happens
//! here.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use tarifa_db::{migrations, NewLot, NewPriceList};

use crate::dto::{
    AddMemberRequest, CreateGroupRequest, CreateLotRequest, CreatePriceListRequest,
    CustomerGroupDto, DashboardDto, HealthDto, LotDto, MarkupRuleDto, MarkupRuleUpsert,
    PriceListDto, ResolvedPriceDto, SetOverrideRequest, SimulateRequest, SimulationReportDto,
};
use crate::error::ApiResult;
use crate::AppState;

// =============================================================================
// Health
// =============================================================================

/// Liveness plus migration status.
pub async fn health(State(state): State<AppState>) -> ApiResult<Json<HealthDto>> {
    let (total, applied) = migrations::migration_status(state.db.pool()).await?;
    Ok(Json(HealthDto { status: "ok", migrations_total: total, migrations_applied: applied }))
}

// =============================================================================
// Dashboard
// =============================================================================

pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<DashboardDto>> {
    let stats = state.db.pricing().dashboard(Utc::now()).await?;
    Ok(Json(stats.into()))
}

// =============================================================================
// Markup Rules
// =============================================================================

pub async fn list_markup_rules(State(state): State<AppState>) -> ApiResult<Json<Vec<MarkupRuleDto>>> {
    let rules = state.db.markup_rules().list().await?;
    Ok(Json(rules.into_iter().map(Into::into).collect()))
}

/// Batch upsert: each entry creates or replaces its category's rule.
pub async fn put_markup_rules(
    State(state): State<AppState>,
    Json(entries): Json<Vec<MarkupRuleUpsert>>,
) -> ApiResult<Json<Vec<MarkupRuleDto>>> {
    let repo = state.db.markup_rules();
    let mut updated = Vec::with_capacity(entries.len());
    for entry in entries {
        let bps = entry.markup_bps()?;
        updated.push(repo.upsert(entry.category, bps, entry.active).await?.into());
    }
    Ok(Json(updated))
}

// =============================================================================
// Price Lists
// =============================================================================

pub async fn create_price_list(
    State(state): State<AppState>,
    Json(req): Json<CreatePriceListRequest>,
) -> ApiResult<(StatusCode, Json<PriceListDto>)> {
    let header = state
        .db
        .price_lists()
        .insert(NewPriceList {
            name: req.name,
            list_type: req.list_type,
            priority: req.priority,
            valid_from: req.valid_from,
            valid_to: req.valid_to,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(header.into())))
}

pub async fn set_price_override(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
    Json(req): Json<SetOverrideRequest>,
) -> ApiResult<StatusCode> {
    state.db.price_lists().set_override(&list_id, &req.item_id, req.price_cents).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Customer Groups
// =============================================================================

pub async fn create_customer_group(
    State(state): State<AppState>,
    Json(req): Json<CreateGroupRequest>,
) -> ApiResult<(StatusCode, Json<CustomerGroupDto>)> {
    let bps = req.discount_bps()?;
    let group = state.db.customer_groups().insert(&req.name, bps).await?;
    Ok((StatusCode::CREATED, Json(group.into())))
}

pub async fn add_group_member(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<StatusCode> {
    state.db.customer_groups().add_member(&group_id, &req.customer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Price Lookup
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuery {
    pub customer_id: Option<String>,
}

/// Direct price lookup. Items with no resolvable price get a hard
/// NO_PRICE_AVAILABLE error, never a silent zero.
pub async fn get_item_price(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Query(query): Query<PriceQuery>,
) -> ApiResult<Json<ResolvedPriceDto>> {
    let resolved = state
        .db
        .pricing()
        .resolve_item(&item_id, query.customer_id.as_deref(), Utc::now())
        .await?;
    Ok(Json(resolved.into()))
}

// =============================================================================
// Repricing
// =============================================================================

/// Ad-hoc simulation from raw parameters; touches no stored lot.
pub async fn simulate_adhoc(
    State(state): State<AppState>,
    Json(req): Json<SimulateRequest>,
) -> ApiResult<Json<SimulationReportDto>> {
    let adjustment = req.adjustment.to_domain()?;
    let report = state.db.engine().simulate(adjustment, &req.categories, Utc::now()).await?;
    Ok(Json(report.into()))
}

pub async fn create_lot(
    State(state): State<AppState>,
    Json(req): Json<CreateLotRequest>,
) -> ApiResult<(StatusCode, Json<LotDto>)> {
    let adjustment = req.adjustment.to_domain()?;
    let lot = state
        .db
        .lots()
        .insert(NewLot { label: req.label, adjustment, category_filter: req.categories })
        .await?;
    Ok((StatusCode::CREATED, Json(lot.into())))
}

pub async fn list_lots(State(state): State<AppState>) -> ApiResult<Json<Vec<LotDto>>> {
    let lots = state.db.lots().list().await?;
    Ok(Json(lots.into_iter().map(Into::into).collect()))
}

pub async fn get_lot(
    State(state): State<AppState>,
    Path(lot_id): Path<String>,
) -> ApiResult<Json<LotDto>> {
    let lot = state.db.lots().get_by_id(&lot_id).await?;
    Ok(Json(lot.into()))
}

pub async fn simulate_lot(
    State(state): State<AppState>,
    Path(lot_id): Path<String>,
) -> ApiResult<Json<SimulationReportDto>> {
    let report = state.db.engine().simulate_lot(&lot_id, Utc::now()).await?;
    Ok(Json(report.into()))
}

pub async fn apply_lot(
    State(state): State<AppState>,
    Path(lot_id): Path<String>,
) -> ApiResult<Json<LotDto>> {
    let lot = state.db.engine().apply(&lot_id, Utc::now()).await?;
    Ok(Json(lot.into()))
}

pub async fn revert_lot(
    State(state): State<AppState>,
    Path(lot_id): Path<String>,
) -> ApiResult<Json<LotDto>> {
    let lot = state.db.engine().revert(&lot_id).await?;
    Ok(Json(lot.into()))
}
