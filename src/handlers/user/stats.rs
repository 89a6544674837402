use axum::{extract::State, Extension};
use serde::Serialize;

use crate::auth::Actor;
use crate::database::models::OwnedFilter;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UserStats {
    pub saved: usize,
    pub inquiries: usize,
    pub visits: usize,
}

/// GET /user/stats
pub async fn stats(State(state): State<AppState>, Extension(actor): Extension<Actor>) -> ApiResult<UserStats> {
    let store = state.store();
    let mine = OwnedFilter::user(actor.subject_id);

    Ok(ApiResponse::success(UserStats {
        saved: store.list_favorites(actor.subject_id).await?.len(),
        inquiries: store.list_inquiries(mine.clone()).await?.len(),
        visits: store.list_visits(mine).await?.len(),
    }))
}
