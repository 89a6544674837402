use axum::extract::State;
use serde::Serialize;

use crate::auth::Role;
use crate::database::models::{IdentityFilter, PaymentFilter, PaymentStatus};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AdminStats {
    pub total_users: i64,
    pub active_agents: usize,
    pub total_properties: i64,
    pub total_revenue: i64,
}

/// GET /admin/stats
pub async fn stats(State(state): State<AppState>) -> ApiResult<AdminStats> {
    let store = state.store();

    let active_agents = store
        .list_identities(IdentityFilter {
            role: Some(Role::Agent),
            is_verified: Some(true),
            recent: None,
        })
        .await?
        .len();

    Ok(ApiResponse::success(AdminStats {
        total_users: store.count_identities(Some(Role::User)).await?,
        active_agents,
        total_properties: store.count_properties().await?,
        total_revenue: store
            .sum_payments(PaymentFilter {
                status: Some(PaymentStatus::Complete),
                ..Default::default()
            })
            .await?,
    }))
}
