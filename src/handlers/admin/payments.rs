use axum::extract::State;

use crate::database::models::Payment;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /admin/payments
pub async fn payment_list(State(state): State<AppState>) -> ApiResult<Vec<Payment>> {
    let payments = state.store().list_payments(Default::default()).await?;
    Ok(ApiResponse::success(payments))
}
