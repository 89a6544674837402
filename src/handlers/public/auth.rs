use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::Role;
use crate::database::models::{Identity, NewIdentity};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::handlers::{missing, present};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email/password";

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: Identity,
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

fn respond(state: &AppState, user: Identity) -> Result<AuthResponse, ApiError> {
    let access_token = state.tokens.issue(user.id, user.role)?;
    Ok(AuthResponse {
        user,
        access_token,
        token_type: "Bearer",
        expires_in: state.tokens.ttl_seconds(),
    })
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// POST /auth/signup - create an agent or user identity and log it in
///
/// Admins cannot be created here. Users get their `UserProfile` right away;
/// agents complete theirs later through `PUT /agent/profile`.
pub async fn signup(State(state): State<AppState>, ApiJson(body): ApiJson<SignupRequest>) -> ApiResult<AuthResponse> {
    let first_name = present(body.first_name);
    let last_name = present(body.last_name);
    let phone = present(body.phone);
    let email = present(body.email);
    let password = body.password.filter(|p| !p.is_empty());
    let role = present(body.role);

    let absent = missing(&[
        ("first_name", first_name.is_none()),
        ("last_name", last_name.is_none()),
        ("phone", phone.is_none()),
        ("email", email.is_none()),
        ("password", password.is_none()),
        ("role", role.is_none()),
    ]);

    let (Some(first_name), Some(last_name), Some(phone), Some(email), Some(password), Some(role)) =
        (first_name, last_name, phone, email, password, role)
    else {
        return Err(ApiError::missing_fields(&absent));
    };

    let role = match role.parse::<Role>() {
        Ok(role @ (Role::Agent | Role::User)) => role,
        _ => return Err(ApiError::invalid_field("role", "Role must be 'agent' or 'user'")),
    };

    let password_hash = hash_password(&password)?;
    let store = state.store();

    let user = store
        .insert_identity(NewIdentity {
            first_name,
            last_name,
            email: normalize_email(&email),
            phone,
            password_hash,
            role,
            is_verified: false,
        })
        .await?;

    if role == Role::User {
        store.insert_user_profile(user.id).await?;
    }

    info!(identity_id = user.id, role = %role, "Signed up");
    Ok(ApiResponse::created(respond(&state, user)?))
}

/// POST /auth/login - exchange email and password for an access token
pub async fn login(State(state): State<AppState>, ApiJson(body): ApiJson<LoginRequest>) -> ApiResult<AuthResponse> {
    let email = present(body.email);
    let password = body.password.filter(|p| !p.is_empty());

    let (Some(email), Some(password)) = (email.as_deref(), password.as_deref()) else {
        let absent = missing(&[("email", email.is_none()), ("password", password.is_none())]);
        return Err(ApiError::missing_fields(&absent));
    };

    let Some(user) = state.store().find_identity_by_email(&normalize_email(email)).await? else {
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    let verified = verify_password(password, &user.password_hash).unwrap_or_else(|e| {
        error!(identity_id = user.id, "Stored password hash is unusable: {}", e);
        false
    });
    if !verified {
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    info!(identity_id = user.id, role = %user.role, "Logged in");
    Ok(ApiResponse::success(respond(&state, user)?))
}
