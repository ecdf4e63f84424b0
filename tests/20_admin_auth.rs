mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{TestApp, TestAppBuilder, BOOTSTRAP_EMAIL};

const ROOT_UID: &str = "uid-root";
const TAILOR_UID: &str = "uid-tailor";
const TAILOR_EMAIL: &str = "tailor@example.com";
const GUEST_UID: &str = "uid-guest";
const GUEST_EMAIL: &str = "guest@example.com";

async fn spawn_app() -> Result<TestApp> {
    TestAppBuilder::new()
        .account(ROOT_UID, BOOTSTRAP_EMAIL)
        .account(TAILOR_UID, TAILOR_EMAIL)
        .account(GUEST_UID, GUEST_EMAIL)
        .spawn()
        .await
}

#[tokio::test]
async fn check_admin_requires_token() -> Result<()> {
    let app = spawn_app().await?;

    let res = app.client.get(app.url("/admin-auth/check-admin")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn check_admin_rejects_forged_token() -> Result<()> {
    let app = spawn_app().await?;

    let res = app
        .client
        .get(app.url("/admin-auth/check-admin"))
        .bearer_auth("not.a.jwt")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn bootstrap_account_is_admin_on_fresh_store() -> Result<()> {
    let app = spawn_app().await?;

    let body = app.check_admin(ROOT_UID).await?;
    assert_eq!(body, json!({ "is_admin": true, "email": BOOTSTRAP_EMAIL }));

    let body = app.check_admin(TAILOR_UID).await?;
    assert_eq!(body, json!({ "is_admin": false, "email": TAILOR_EMAIL }));
    Ok(())
}

#[tokio::test]
async fn unknown_subject_fails_soft() -> Result<()> {
    let app = spawn_app().await?;

    let body = app.check_admin("uid-nobody").await?;
    assert_eq!(body, json!({ "is_admin": false, "email": "" }));
    Ok(())
}

#[tokio::test]
async fn identity_outage_fails_soft() -> Result<()> {
    let app = spawn_app().await?;
    app.identity.set_down(true);

    let body = app.check_admin(ROOT_UID).await?;
    assert_eq!(body, json!({ "is_admin": false, "email": "" }));

    let body = app.set_admin(ROOT_UID, TAILOR_EMAIL, true).await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Unable to update admin privileges at this time");
    Ok(())
}

#[tokio::test]
async fn admin_grants_and_revokes() -> Result<()> {
    let app = spawn_app().await?;

    let body = app.set_admin(ROOT_UID, TAILOR_EMAIL, true).await?;
    assert_eq!(
        body,
        json!({ "success": true, "message": format!("Admin privileges granted to {}", TAILOR_EMAIL) })
    );
    assert_eq!(app.check_admin(TAILOR_UID).await?["is_admin"], true);

    let body = app.set_admin(ROOT_UID, TAILOR_EMAIL, false).await?;
    assert_eq!(
        body,
        json!({ "success": true, "message": format!("Admin privileges revoked from {}", TAILOR_EMAIL) })
    );
    assert_eq!(app.check_admin(TAILOR_UID).await?["is_admin"], false);
    Ok(())
}

#[tokio::test]
async fn repeated_grant_is_unchanged() -> Result<()> {
    let app = spawn_app().await?;

    app.set_admin(ROOT_UID, TAILOR_EMAIL, true).await?;
    let body = app.set_admin(ROOT_UID, TAILOR_EMAIL, true).await?;
    assert_eq!(body["success"], true);
    assert_eq!(
        body["message"],
        format!("User {} already has admin status", TAILOR_EMAIL)
    );

    let body = app.set_admin(ROOT_UID, GUEST_EMAIL, false).await?;
    assert_eq!(body["success"], true);
    assert_eq!(
        body["message"],
        format!("User {} already has non-admin status", GUEST_EMAIL)
    );
    Ok(())
}

#[tokio::test]
async fn non_admin_cannot_set_admin() -> Result<()> {
    let app = spawn_app().await?;

    let body = app.set_admin(GUEST_UID, GUEST_EMAIL, true).await?;
    assert_eq!(
        body,
        json!({ "success": false, "message": "Permission denied: only admins can set admin privileges" })
    );
    assert_eq!(app.check_admin(GUEST_UID).await?["is_admin"], false);
    Ok(())
}

#[tokio::test]
async fn grant_does_not_require_existing_account() -> Result<()> {
    let app = spawn_app().await?;

    let body = app.set_admin(ROOT_UID, "future@example.com", true).await?;
    assert_eq!(
        body,
        json!({ "success": true, "message": "Admin privileges granted to future@example.com" })
    );
    Ok(())
}

#[tokio::test]
async fn admin_may_revoke_self() -> Result<()> {
    let app = spawn_app().await?;

    let body = app.set_admin(ROOT_UID, BOOTSTRAP_EMAIL, false).await?;
    assert_eq!(body["success"], true);
    assert_eq!(app.check_admin(ROOT_UID).await?["is_admin"], false);

    // The emptied list is not re-seeded, so nobody can grant any more
    let body = app.set_admin(ROOT_UID, BOOTSTRAP_EMAIL, true).await?;
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn set_admin_validates_body() -> Result<()> {
    let app = spawn_app().await?;

    let res = app
        .client
        .post(app.url("/admin-auth/set-admin"))
        .bearer_auth(app.token_for(ROOT_UID))
        .json(&json!({ "email": "  ", "is_admin": true }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<serde_json::Value>().await?["code"], "VALIDATION_ERROR");

    let res = app
        .client
        .post(app.url("/admin-auth/set-admin"))
        .bearer_auth(app.token_for(ROOT_UID))
        .json(&json!({ "email": TAILOR_EMAIL }))
        .send()
        .await?;
    assert!(res.status().is_client_error(), "unexpected status: {}", res.status());
    Ok(())
}
