mod common;

use anyhow::Result;
use chrono::Duration;
use reqwest::{Method, StatusCode};
use serde_json::json;

use ags_api::auth::{Claims, Role, TokenAuthority};
use ags_api::database::Store;

const PROTECTED: &[(&str, &str)] = &[
    ("GET", "/me"),
    ("GET", "/agent/profile"),
    ("PUT", "/agent/profile"),
    ("GET", "/agent/stats"),
    ("GET", "/agent/properties"),
    ("POST", "/agent/properties"),
    ("GET", "/agent/properties/1"),
    ("PUT", "/agent/properties/1"),
    ("DELETE", "/agent/properties/1"),
    ("GET", "/agent/inquiries"),
    ("PATCH", "/agent/inquiries/1"),
    ("GET", "/agent/conversations"),
    ("POST", "/agent/conversations/1/messages"),
    ("GET", "/agent/visits"),
    ("PATCH", "/agent/visits/1"),
    ("GET", "/user/profile"),
    ("GET", "/user/stats"),
    ("GET", "/user/favorites"),
    ("POST", "/user/favorites/toggle"),
    ("POST", "/user/inquiries"),
    ("GET", "/user/inquiries/1"),
    ("POST", "/user/conversations"),
    ("POST", "/user/visits"),
    ("DELETE", "/user/visits/1"),
    ("GET", "/user/activities"),
    ("GET", "/user/subscriptions"),
    ("GET", "/user/payments"),
    ("GET", "/admin/users"),
    ("GET", "/admin/users/recent"),
    ("GET", "/admin/stats"),
    ("GET", "/admin/agents/pending"),
    ("PATCH", "/admin/approve/1"),
    ("GET", "/admin/properties"),
    ("DELETE", "/admin/properties/1"),
    ("GET", "/admin/payments"),
];

fn method(name: &str) -> Method {
    name.parse().unwrap_or(Method::GET)
}

#[tokio::test]
async fn every_protected_route_requires_a_token() -> Result<()> {
    let app = common::spawn_app().await?;

    for (verb, path) in PROTECTED {
        let (status, body) = app.call(method(verb), path, None, Some(json!({}))).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {} -> {}", verb, path, body);
        assert_eq!(body["message"], "Invalid or missing token");
    }
    Ok(())
}

#[tokio::test]
async fn forged_and_expired_tokens_are_rejected() -> Result<()> {
    let app = common::spawn_app().await?;
    let user = app.user("victim").await?;

    let forged = TokenAuthority::new("some-other-secret-that-is-32-bytes!!", 24).issue(user.id, Role::User)?;
    let (status, _) = app.get("/me", &forged).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let expired = app.tokens.sign(&Claims::new(user.id, Role::User, Duration::hours(-1)))?;
    let (status, _) = app.get("/me", &expired).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/me", "garbage").await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn wrong_role_is_forbidden_without_side_effects() -> Result<()> {
    let app = common::spawn_app().await?;
    let user = app.user("buyer").await?;
    let type_id = app.property_type("Villa").await?;

    let (status, body) = app
        .post(
            "/agent/properties",
            &user.token,
            json!({ "title": "Sneaky", "price": 1, "listing_type": "sale", "property_type_id": type_id }),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
    assert_eq!(body["message"], "Agent access required");
    assert_eq!(app.store.count_properties().await?, 0);
    Ok(())
}

#[tokio::test]
async fn each_role_is_confined_to_its_group() -> Result<()> {
    let app = common::spawn_app().await?;
    let admin = app.admin().await?;
    let agent = app.agent("lister").await?;
    let user = app.user("browser").await?;

    let cases = [
        (&agent.token, "/admin/users", "Admin access required"),
        (&user.token, "/admin/stats", "Admin access required"),
        (&user.token, "/agent/stats", "Agent access required"),
        (&admin.token, "/agent/properties", "Agent access required"),
        (&admin.token, "/user/favorites", "User access required"),
        (&agent.token, "/user/stats", "User access required"),
    ];
    for (token, path, message) in cases {
        let (status, body) = app.get(path, token).await?;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} -> {}", path, body);
        assert_eq!(body["message"], message);
    }

    for token in [&admin.token, &agent.token, &user.token] {
        let (status, _) = app.get("/me", token).await?;
        assert_eq!(status, StatusCode::OK);
    }
    Ok(())
}

#[tokio::test]
async fn token_for_a_deleted_identity_finds_nothing() -> Result<()> {
    let app = common::spawn_app().await?;
    let ghost = app.tokens.issue(4242, Role::User)?;

    let (status, body) = app.get("/me", &ghost).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Resource not found");
    Ok(())
}
