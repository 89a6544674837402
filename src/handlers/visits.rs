use axum::{
    extract::{Query, State},
    Extension,
};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::info;

use crate::auth::Actor;
use crate::database::models::{NewVisit, Visit, VisitStatus};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::handlers::{missing, present, ListQuery};
use crate::middleware::{ApiResponse, ApiResult};
use crate::ownership::{Action, Authorized};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScheduleVisitRequest {
    pub property_id: Option<i64>,
    pub scheduled_time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VisitStatusRequest {
    pub status: Option<String>,
}

/// RFC 3339, or a naive `YYYY-MM-DD[T ]HH:MM[:SS]` taken as UTC.
fn parse_schedule(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// GET /agent/visits, GET /user/visits
pub async fn visit_list(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Visit>> {
    let scope = state.resolver().scope(&actor).await?;
    let Some(filter) = scope.owned_filter() else {
        return Ok(ApiResponse::success(Vec::new()));
    };

    let visits = state
        .store()
        .list_visits(filter.recent(query.history_limit(&state.config)))
        .await?;
    Ok(ApiResponse::success(visits))
}

/// POST /user/visits - book a viewing; starts out pending
pub async fn visit_create(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(body): ApiJson<ScheduleVisitRequest>,
) -> ApiResult<Visit> {
    let raw_time = present(body.scheduled_time);
    let (Some(property_id), Some(raw_time)) = (body.property_id, raw_time.clone()) else {
        let absent = missing(&[
            ("property_id", body.property_id.is_none()),
            ("scheduled_time", raw_time.is_none()),
        ]);
        return Err(ApiError::missing_fields(&absent));
    };

    let scheduled_time = parse_schedule(&raw_time)
        .ok_or_else(|| ApiError::invalid_field("scheduled_time", "Expected an ISO 8601 date and time"))?;

    let store = state.store();
    let property = store
        .find_property(property_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;

    let visit = store
        .insert_visit(NewVisit {
            user_id: actor.subject_id,
            agent_profile_id: property.agent_profile_id,
            property_id: property.id,
            scheduled_time,
        })
        .await?;

    info!(visit_id = visit.id, property_id, user_id = actor.subject_id, "Visit scheduled");
    Ok(ApiResponse::created(visit))
}

/// PATCH /agent/visits/:id
pub async fn visit_update_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<VisitStatusRequest>,
) -> ApiResult<Visit> {
    let store = state.store();
    let Authorized { guard, .. } = state
        .resolver()
        .authorize(&actor, Action::Update, store.find_visit(id).await?)
        .await?;

    let status = present(body.status)
        .ok_or_else(|| ApiError::missing_fields(&["status"]))?
        .parse::<VisitStatus>()
        .map_err(|_| ApiError::invalid_field("status", "Status must be one of pending, completed, canceled"))?;

    let visit = store
        .update_visit_status(id, guard, status)
        .await?
        .ok_or_else(ApiError::resource_not_found)?;
    Ok(ApiResponse::success(visit))
}

/// DELETE /user/visits/:id - cancel; the record is kept with status canceled
pub async fn visit_cancel(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Visit> {
    let store = state.store();
    let Authorized { guard, .. } = state
        .resolver()
        .authorize(&actor, Action::Delete, store.find_visit(id).await?)
        .await?;

    let visit = store
        .update_visit_status(id, guard, VisitStatus::Canceled)
        .await?
        .ok_or_else(ApiError::resource_not_found)?;
    Ok(ApiResponse::success(visit))
}
