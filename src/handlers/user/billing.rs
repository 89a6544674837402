use axum::{extract::State, Extension};

use crate::auth::Actor;
use crate::database::models::{Payment, PaymentFilter, Subscription};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /user/subscriptions
pub async fn subscription_list(State(state): State<AppState>, Extension(actor): Extension<Actor>) -> ApiResult<Vec<Subscription>> {
    let subscriptions = state.store().list_subscriptions(actor.subject_id).await?;
    Ok(ApiResponse::success(subscriptions))
}

/// GET /user/payments
pub async fn payment_list(State(state): State<AppState>, Extension(actor): Extension<Actor>) -> ApiResult<Vec<Payment>> {
    let payments = state
        .store()
        .list_payments(PaymentFilter {
            user_id: Some(actor.subject_id),
            ..Default::default()
        })
        .await?;
    Ok(ApiResponse::success(payments))
}
