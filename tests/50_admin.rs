mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::json;

use ags_api::database::models::{NewPayment, PaymentStatus};
use ags_api::database::seed::seed;
use ags_api::database::Store;

#[tokio::test]
async fn pending_agents_can_be_approved() -> Result<()> {
    let app = common::spawn_app().await?;
    let admin = app.admin().await?;
    let agent = app.agent("applicant").await?;

    let (status, body) = app.get("/admin/agents/pending", &admin.token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["id"], agent.id);
    assert_eq!(body["data"][0]["profile"]["license_number"], "LIC-applicant");

    let path = format!("/admin/approve/{}", agent.id);
    let (status, body) = app.patch(&path, &admin.token, json!({})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"].get("is_verified").is_some());

    let (status, body) = app.patch(&path, &admin.token, json!({ "is_verified": true })).await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["is_verified"], true);

    let (_, body) = app.get("/admin/agents/pending", &admin.token).await?;
    assert_eq!(body["data"], json!([]));

    let (_, body) = app.get("/me", &agent.token).await?;
    assert_eq!(body["data"]["is_verified"], true);
    Ok(())
}

#[tokio::test]
async fn approving_a_non_agent_is_not_found() -> Result<()> {
    let app = common::spawn_app().await?;
    let admin = app.admin().await?;
    let user = app.user("not-an-agent").await?;

    for id in [9999, user.id, admin.id] {
        let (status, body) = app
            .patch(&format!("/admin/approve/{}", id), &admin.token, json!({ "is_verified": true }))
            .await?;
        assert_eq!(status, StatusCode::NOT_FOUND, "id {}", id);
        assert_eq!(body["message"], "Agent not found");
    }

    let (_, body) = app.get("/me", &user.token).await?;
    assert_eq!(body["data"]["is_verified"], false);
    Ok(())
}

#[tokio::test]
async fn missing_agent_wins_over_missing_field() -> Result<()> {
    let app = common::spawn_app().await?;
    let admin = app.admin().await?;

    let (status, body) = app.patch("/admin/approve/9999", &admin.token, json!({})).await?;
    assert_eq!(status, StatusCode::NOT_FOUND, "{}", body);
    assert_eq!(body["message"], "Agent not found");
    assert!(body.get("field_errors").is_none());
    Ok(())
}

#[tokio::test]
async fn non_numeric_ids_use_the_error_envelope() -> Result<()> {
    let app = common::spawn_app().await?;
    let admin = app.admin().await?;

    let (status, body) = app
        .patch("/admin/approve/abc", &admin.token, json!({ "is_verified": true }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, body) = app.call(Method::GET, "/properties/not-a-number", None, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn admin_bypasses_listing_ownership() -> Result<()> {
    let app = common::spawn_app().await?;
    let admin = app.admin().await?;
    let agent = app.agent("moderated").await?;
    let id = app.listing(&agent, "Questionable").await?;

    let (status, body) = app.get("/admin/properties", &admin.token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["id"], id);

    let (status, _) = app.get(&format!("/admin/properties/{}", id), &admin.token).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.delete(&format!("/admin/properties/{}", id), &admin.token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], true);

    let (status, body) = app.delete(&format!("/admin/properties/{}", id), &admin.token).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Resource not found");
    Ok(())
}

#[tokio::test]
async fn user_listings_hide_credentials() -> Result<()> {
    let app = common::spawn_app().await?;
    let admin = app.admin().await?;
    for n in 0..12 {
        app.user(&format!("member{}", n)).await?;
    }

    let (_, body) = app.get("/admin/users", &admin.token).await?;
    let everyone = body["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(everyone.len(), 13);
    assert!(everyone.iter().all(|u| u.get("password_hash").is_none()));

    let (_, body) = app.get("/admin/users/recent", &admin.token).await?;
    let recent = body["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(recent.len(), 10);
    assert_eq!(recent[0]["email"], "member11@example.com");
    Ok(())
}

#[tokio::test]
async fn stats_and_payments_cover_every_account() -> Result<()> {
    let app = common::spawn_app().await?;
    let admin = app.admin().await?;
    let agent = app.agent("earner").await?;
    app.listing(&agent, "One").await?;
    let user = app.user("spender").await?;

    for (amount, status) in [(5000, PaymentStatus::Complete), (900, PaymentStatus::Pending)] {
        app.store
            .insert_payment(NewPayment {
                user_id: user.id,
                agent_profile_id: None,
                amount,
                payment_method: "M-Pesa".to_string(),
                status,
            })
            .await?;
    }

    let (status, body) = app.get("/admin/stats", &admin.token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({ "total_users": 1, "active_agents": 0, "total_properties": 1, "total_revenue": 5000 })
    );

    let (_, body) = app.get("/admin/payments", &admin.token).await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn seeded_accounts_can_log_in() -> Result<()> {
    let app = common::spawn_app().await?;
    seed(app.store.as_ref()).await?;

    let (status, body) = app
        .call(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "admin@example.com", "password": "admin123" })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let admin = common::session_from(&body)?;

    let (_, body) = app.get("/admin/stats", &admin.token).await?;
    assert_eq!(body["data"]["total_users"], 1);
    assert_eq!(body["data"]["active_agents"], 1);
    assert_eq!(body["data"]["total_properties"], 8);
    assert_eq!(body["data"]["total_revenue"], 5000);

    let (status, body) = app.call(Method::GET, "/properties", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(8));
    Ok(())
}
