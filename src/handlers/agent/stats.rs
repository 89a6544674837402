use axum::{extract::State, Extension};
use chrono::{Datelike, TimeZone, Utc};
use serde::Serialize;

use crate::auth::Actor;
use crate::database::models::{OwnedFilter, PaymentFilter, PaymentStatus, PropertyFilter};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Serialize)]
pub struct AgentStats {
    pub listings: usize,
    pub inquiries: usize,
    pub viewings: usize,
    /// Completed payments attributed to the agent this calendar month.
    pub revenue: i64,
}

/// GET /agent/stats - dashboard counters
pub async fn stats(State(state): State<AppState>, Extension(actor): Extension<Actor>) -> ApiResult<AgentStats> {
    let scope = state.resolver().scope(&actor).await?;
    let Some(agent_profile_id) = scope.agent_profile_id() else {
        return Ok(ApiResponse::success(AgentStats::default()));
    };

    let store = state.store();
    let now = Utc::now();
    let month_start = Utc
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single();

    let listings = store
        .list_properties(PropertyFilter {
            agent_profile_id: Some(agent_profile_id),
            recent: None,
        })
        .await?
        .len();
    let inquiries = store.list_inquiries(OwnedFilter::agent(agent_profile_id)).await?.len();
    let viewings = store.list_visits(OwnedFilter::agent(agent_profile_id)).await?.len();
    let revenue = store
        .sum_payments(PaymentFilter {
            agent_profile_id: Some(agent_profile_id),
            status: Some(PaymentStatus::Complete),
            since: month_start,
            ..Default::default()
        })
        .await?;

    Ok(ApiResponse::success(AgentStats {
        listings,
        inquiries,
        viewings,
        revenue,
    }))
}
