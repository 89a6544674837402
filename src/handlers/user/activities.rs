use axum::{extract::State, Extension};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::Actor;
use crate::database::models::{OwnedFilter, VisitStatus};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

const ACTIVITY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Inquiry,
    Scheduled,
    Visit,
}

#[derive(Debug, Serialize)]
pub struct Activity {
    pub kind: ActivityKind,
    pub id: i64,
    pub property_id: i64,
    pub property_title: Option<String>,
    pub status: String,
    pub at: DateTime<Utc>,
}

/// GET /user/activities - the caller's latest inquiries and visits, merged
pub async fn activity_list(State(state): State<AppState>, Extension(actor): Extension<Actor>) -> ApiResult<Vec<Activity>> {
    let store = state.store();
    let recent = OwnedFilter::user(actor.subject_id).recent(ACTIVITY_LIMIT as i64);

    let mut activities: Vec<Activity> = Vec::new();
    for inquiry in store.list_inquiries(recent.clone()).await? {
        activities.push(Activity {
            kind: ActivityKind::Inquiry,
            id: inquiry.id,
            property_id: inquiry.property_id,
            property_title: None,
            status: inquiry.status.to_string(),
            at: inquiry.created_at,
        });
    }
    for visit in store.list_visits(recent).await? {
        let kind = match visit.status {
            VisitStatus::Pending => ActivityKind::Scheduled,
            VisitStatus::Completed | VisitStatus::Canceled => ActivityKind::Visit,
        };
        activities.push(Activity {
            kind,
            id: visit.id,
            property_id: visit.property_id,
            property_title: None,
            status: visit.status.to_string(),
            at: visit.created_at,
        });
    }

    activities.sort_by(|a, b| b.at.cmp(&a.at));
    activities.truncate(ACTIVITY_LIMIT);

    for activity in &mut activities {
        activity.property_title = store.find_property(activity.property_id).await?.map(|p| p.title);
    }

    Ok(ApiResponse::success(activities))
}
