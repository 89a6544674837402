mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::json;

use ags_api::database::Store;

#[tokio::test]
async fn agent_without_profile_cannot_list() -> Result<()> {
    let app = common::spawn_app().await?;
    let fresh = app.signup("agent", "newcomer").await?;
    let type_id = app.property_type("House").await?;

    let (status, body) = app
        .post(
            "/agent/properties",
            &fresh.token,
            json!({ "title": "House", "price": 100, "listing_type": "sale", "property_type_id": type_id }),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Agent profile not found");

    let (status, body) = app.get("/agent/properties", &fresh.token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let (status, body) = app.get("/agent/stats", &fresh.token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["listings"], 0);
    Ok(())
}

#[tokio::test]
async fn profile_is_created_then_updated() -> Result<()> {
    let app = common::spawn_app().await?;
    let agent = app.signup("agent", "profiler").await?;

    let (status, body) = app.put("/agent/profile", &agent.token, json!({ "bio": "no license" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"].get("license_number").is_some());

    let (status, _) = app.put("/agent/profile", &agent.token, json!({ "license_number": "LIC-9" })).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.put("/agent/profile", &agent.token, json!({ "bio": "Updated" })).await?;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let (status, body) = app.get("/agent/profile", &agent.token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["profile"]["license_number"], "LIC-9");
    assert_eq!(body["data"]["profile"]["bio"], "Updated");

    let rival = app.signup("agent", "rival").await?;
    let (status, body) = app.put("/agent/profile", &rival.token, json!({ "license_number": "LIC-9" })).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "License number already taken");
    Ok(())
}

#[tokio::test]
async fn create_applies_defaults() -> Result<()> {
    let app = common::spawn_app().await?;
    let agent = app.agent("maker").await?;
    let id = app.listing(&agent, "Modern 2 Bedroom Apartment").await?;

    let (status, body) = app.get(&format!("/agent/properties/{}", id), &agent.token).await?;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["currency"], "Ksh");
    assert_eq!(data["status"], "onsale");
    assert_eq!(data["property_type"], "Apartment");
    assert_eq!(data["images"][0]["is_primary"], true);
    assert_eq!(data["location"]["neighborhood"], "Westlands");
    assert_eq!(data["agent"]["license_number"], "LIC-maker");
    Ok(())
}

#[tokio::test]
async fn create_validates_input() -> Result<()> {
    let app = common::spawn_app().await?;
    let agent = app.agent("validator").await?;
    let type_id = app.property_type("Villa").await?;

    let (status, body) = app.post("/agent/properties", &agent.token, json!({ "title": "Only a title" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    for field in ["price", "listing_type", "property_type_id"] {
        assert!(body["field_errors"].get(field).is_some(), "{}: {}", field, body);
    }

    let base = json!({ "title": "Villa", "price": 10, "listing_type": "sale", "property_type_id": type_id });

    let mut negative = base.clone();
    negative["price"] = json!(-1);
    let (status, body) = app.post("/agent/properties", &agent.token, negative).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"].get("price").is_some());

    let mut bad_status = base.clone();
    bad_status["status"] = json!("sold");
    let (status, _) = app.post("/agent/properties", &agent.token, bad_status).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut unknown_type = base;
    unknown_type["property_type_id"] = json!(999);
    let (status, body) = app.post("/agent/properties", &agent.token, unknown_type).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"].get("property_type_id").is_some());

    assert_eq!(app.store.count_properties().await?, 0);
    Ok(())
}

#[tokio::test]
async fn owner_can_read_update_and_delete() -> Result<()> {
    let app = common::spawn_app().await?;
    let agent = app.agent("owner").await?;
    let id = app.listing(&agent, "Bungalow").await?;
    let path = format!("/agent/properties/{}", id);

    let (status, body) = app
        .put(&path, &agent.token, json!({ "price": 9000000, "status": "lease" }))
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["price"], 9000000);
    assert_eq!(body["data"]["status"], "lease");
    assert_eq!(body["data"]["title"], "Bungalow");

    let (status, body) = app.delete(&path, &agent.token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "id": id, "deleted": true }));

    let (status, _) = app.get(&path, &agent.token).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn foreign_listing_looks_exactly_like_a_missing_one() -> Result<()> {
    let app = common::spawn_app().await?;
    let owner = app.agent("alpha").await?;
    let intruder = app.agent("beta").await?;
    let id = app.listing(&owner, "Mansion").await?;

    let foreign = format!("/agent/properties/{}", id);
    let missing = "/agent/properties/99999";

    let attempts = [
        (Method::GET, None),
        (Method::PUT, Some(json!({ "price": 1 }))),
        (Method::DELETE, None),
    ];
    for (verb, body) in attempts {
        let theirs = app
            .call(verb.clone(), &foreign, Some(&intruder.token), body.clone())
            .await?;
        let nobody = app.call(verb.clone(), missing, Some(&intruder.token), body).await?;
        assert_eq!(theirs.0, StatusCode::NOT_FOUND, "{} {}", verb, theirs.1);
        assert_eq!(theirs, nobody, "{} leaks existence", verb);
        assert_eq!(theirs.1["message"], "Resource not found");
    }

    let untouched = app.store.find_property(id).await?.expect("still there");
    assert_eq!(untouched.price, 8500000);
    Ok(())
}

#[tokio::test]
async fn owner_replaces_media_and_foreign_agent_cannot() -> Result<()> {
    let app = common::spawn_app().await?;
    let owner = app.agent("curator").await?;
    let intruder = app.agent("vandal").await?;
    let id = app.listing(&owner, "Townhouse").await?;
    let path = format!("/agent/properties/{}", id);
    let original = app.store.property_media(id).await?;

    let (status, body) = app
        .put(&path, &intruder.token, json!({ "keep_image_ids": [], "images": [{ "url": "https://example.com/x.jpg" }] }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Resource not found");
    let after = app.store.property_media(id).await?;
    assert_eq!(after.images.len(), 1);
    assert_eq!(after.images[0].url, original.images[0].url);

    let (status, body) = app
        .put(
            &path,
            &owner.token,
            json!({
                "keep_image_ids": [],
                "images": [{ "url": "https://example.com/front.jpg" }, { "url": "https://example.com/back.jpg" }],
                "videos": ["https://example.com/tour.mp4"],
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let images = body["data"]["images"].as_array().cloned().unwrap_or_default();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0]["url"], "https://example.com/front.jpg");
    assert_eq!(images[0]["is_primary"], true);
    assert_eq!(images[1]["is_primary"], false);
    assert_eq!(body["data"]["videos"][0]["url"], "https://example.com/tour.mp4");

    let back_id = images[1]["id"].as_i64().unwrap_or_default();
    let (status, body) = app
        .put(&path, &owner.token, json!({ "keep_image_ids": [back_id], "keep_video_ids": [] }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["images"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["data"]["images"][0]["url"], "https://example.com/back.jpg");
    assert_eq!(body["data"]["images"][0]["is_primary"], true);
    assert_eq!(body["data"]["videos"], json!([]));
    Ok(())
}

#[tokio::test]
async fn listing_page_is_limited_and_scoped() -> Result<()> {
    let app = common::spawn_app().await?;
    let agent = app.agent("prolific").await?;
    let other = app.agent("quiet").await?;
    for n in 0..6 {
        app.listing(&agent, &format!("Listing {}", n)).await?;
    }
    app.listing(&other, "Not mine").await?;

    let (_, body) = app.get("/agent/properties", &agent.token).await?;
    let page = body["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(page.len(), 5);
    assert_eq!(page[0]["title"], "Listing 5", "newest first");
    assert!(page.iter().all(|p| p["title"] != "Not mine"));
    assert_eq!(page[0]["views"], 0);
    assert_eq!(page[0]["primary_image"], "https://example.com/p.jpg");

    let (_, body) = app.get("/agent/properties?limit=50", &agent.token).await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(6));

    let (_, body) = app.get("/agent/stats", &agent.token).await?;
    assert_eq!(body["data"]["listings"], 6);
    Ok(())
}

#[tokio::test]
async fn public_catalogue_needs_no_token() -> Result<()> {
    let app = common::spawn_app().await?;
    let agent = app.agent("public").await?;
    let id = app.listing(&agent, "Studio").await?;

    let (status, body) = app.call(Method::GET, "/properties", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["location"], "Westlands");
    assert_eq!(body["data"][0]["property_type"], "Apartment");

    let (status, body) = app.call(Method::GET, &format!("/properties/{}", id), None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["agent"]["name"], "Test public");
    assert!(body["data"]["agent"].get("password_hash").is_none());

    let (status, body) = app.call(Method::GET, "/properties/4040", None, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Property not found");
    Ok(())
}
