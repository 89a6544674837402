use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::auth::{Actor, RoleSet, TokenAuthority};
use crate::error::ApiError;

/// Role gate for one route group: verifies the bearer token and checks the
/// role claim before any handler code or body extraction runs.
#[derive(Clone, Debug)]
pub struct RoleGate {
    tokens: Arc<TokenAuthority>,
    allowed: RoleSet,
}

impl RoleGate {
    pub fn new(tokens: Arc<TokenAuthority>, allowed: RoleSet) -> Self {
        Self { tokens, allowed }
    }

    /// `401` for a missing or unverifiable token, `403` for a valid token
    /// whose role is outside the allowed set.
    pub fn check(&self, headers: &HeaderMap) -> Result<Actor, ApiError> {
        let token = extract_jwt_from_headers(headers).map_err(|reason| {
            debug!("Rejected request: {}", reason);
            ApiError::invalid_token()
        })?;

        let actor = self.tokens.verify(token)?;

        if !self.allowed.contains(actor.role) {
            warn!(
                subject_id = actor.subject_id,
                role = %actor.role,
                "Role gate denied request"
            );
            return Err(ApiError::forbidden(self.allowed.requirement()));
        }

        Ok(actor)
    }
}

/// Middleware entry point; the verified [`Actor`] is placed in request
/// extensions for handlers.
pub async fn require_role(State(gate): State<RoleGate>, mut request: Request, next: Next) -> Result<Response, ApiError> {
    let actor = gate.check(request.headers())?;
    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err("Empty bearer token"),
        None => Err("Authorization header must use Bearer token format"),
    }
}
