use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{Role, RoleSet};
use crate::config::AppConfig;
use crate::handlers;
use crate::middleware::{require_role, RoleGate};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .merge(public_routes())
        // Role-gated groups
        .merge(account_routes(&state))
        .merge(agent_routes(&state))
        .merge(user_routes(&state))
        .merge(admin_routes(&state))
        // Global middleware
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Wrap every route of `routes` in a role gate. Uses `route_layer` so the
/// gate only runs for matched routes and before any extractor.
fn gated(state: &AppState, allowed: RoleSet, routes: Router<AppState>) -> Router<AppState> {
    let gate = RoleGate::new(state.tokens.clone(), allowed);
    routes.route_layer(middleware::from_fn_with_state(gate, require_role))
}

fn public_routes() -> Router<AppState> {
    use handlers::public::{auth, properties, system};

    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/properties", get(properties::property_list))
        .route("/properties/:id", get(properties::property_get))
}

fn account_routes(state: &AppState) -> Router<AppState> {
    gated(state, RoleSet::ANY, Router::new().route("/me", get(handlers::account::me)))
}

fn agent_routes(state: &AppState) -> Router<AppState> {
    use handlers::agent::{profile, properties, stats};
    use handlers::{conversations, inquiries, visits};

    let routes = Router::new()
        .route("/agent/profile", get(profile::profile_get).put(profile::profile_put))
        .route("/agent/stats", get(stats::stats))
        .route(
            "/agent/properties",
            get(properties::property_list).post(properties::property_create),
        )
        .route(
            "/agent/properties/:id",
            get(properties::property_get)
                .put(properties::property_update)
                .delete(properties::property_delete),
        )
        .route("/agent/inquiries", get(inquiries::inquiry_list))
        .route(
            "/agent/inquiries/:id",
            get(inquiries::inquiry_get).patch(inquiries::inquiry_update_status),
        )
        .route("/agent/conversations", get(conversations::conversation_list))
        .route("/agent/conversations/:id", get(conversations::conversation_get))
        .route("/agent/conversations/:id/messages", post(conversations::message_create))
        .route("/agent/visits", get(visits::visit_list))
        .route("/agent/visits/:id", patch(visits::visit_update_status));

    gated(state, RoleSet::only(Role::Agent), routes)
}

fn user_routes(state: &AppState) -> Router<AppState> {
    use handlers::user::{activities, billing, favorites, profile, stats};
    use handlers::{conversations, inquiries, visits};

    let routes = Router::new()
        .route("/user/profile", get(profile::profile_get).put(profile::profile_put))
        .route("/user/stats", get(stats::stats))
        .route("/user/favorites", get(favorites::favorite_list))
        .route("/user/favorites/toggle", post(favorites::favorite_toggle))
        .route(
            "/user/inquiries",
            get(inquiries::inquiry_list).post(inquiries::inquiry_create),
        )
        .route("/user/inquiries/:id", get(inquiries::inquiry_get))
        .route(
            "/user/conversations",
            get(conversations::conversation_list).post(conversations::conversation_create),
        )
        .route("/user/conversations/:id", get(conversations::conversation_get))
        .route("/user/conversations/:id/messages", post(conversations::message_create))
        .route("/user/visits", get(visits::visit_list).post(visits::visit_create))
        .route("/user/visits/:id", delete(visits::visit_cancel))
        .route("/user/activities", get(activities::activity_list))
        .route("/user/subscriptions", get(billing::subscription_list))
        .route("/user/payments", get(billing::payment_list));

    gated(state, RoleSet::only(Role::User), routes)
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    use handlers::admin::{payments, properties, stats, users};

    let routes = Router::new()
        .route("/admin/users", get(users::user_list))
        .route("/admin/users/recent", get(users::user_recent))
        .route("/admin/stats", get(stats::stats))
        .route("/admin/agents/pending", get(users::agent_pending))
        .route("/admin/approve/:id", patch(users::agent_approve))
        .route("/admin/properties", get(properties::property_list))
        .route(
            "/admin/properties/:id",
            get(properties::property_get).delete(properties::property_delete),
        )
        .route("/admin/payments", get(payments::payment_list));

    gated(state, RoleSet::only(Role::Admin), routes)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::MemoryStore;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    fn state() -> AppState {
        AppState::new(Arc::new(MemoryStore::new()), AppConfig::development())
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut request = Request::builder().uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        request.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn public_routes_need_no_token() {
        let response = app(state()).oneshot(get("/", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app(state()).oneshot(get("/properties", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn gated_groups_check_token_then_role() {
        let state = state();
        let user_token = state.tokens.issue(1, Role::User).unwrap();

        let response = app(state.clone()).oneshot(get("/agent/stats", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app(state.clone())
            .oneshot(get("/agent/stats", Some(&user_token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app(state).oneshot(get("/user/stats", Some(&user_token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_paths_are_plain_404s() {
        let response = app(state()).oneshot(get("/nowhere", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_cors_origins_are_skipped() {
        let mut config = AppConfig::development();
        config.security.cors_origins = vec!["https://ok.test".to_string(), "bad\norigin".to_string()];
        let state = AppState::new(Arc::new(MemoryStore::new()), config);

        let preflight = Request::builder()
            .method("OPTIONS")
            .uri("/properties")
            .header(header::ORIGIN, "https://ok.test")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();
        let response = app(state.clone()).oneshot(preflight).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://ok.test"
        );

        let foreign = Request::builder()
            .uri("/properties")
            .header(header::ORIGIN, "https://elsewhere.test")
            .body(Body::empty())
            .unwrap();
        let response = app(state).oneshot(foreign).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }
}
