//! Invite-code lifecycle: toggles derived from cached state and bulk
//! operations that continue past failures.

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use rasenmaeher_client::ApiError;
use rasenmaeher_client::invites::{InviteError, InviteManager};
use rasenmaeher_core::InviteCodeToken;
use rasenmaeher_integration_tests::TestDeployment;

fn token(raw: &str) -> InviteCodeToken {
    InviteCodeToken::parse(raw).unwrap()
}

fn pool_entry(code: &str, active: bool) -> serde_json::Value {
    json!({
        "invitecode": code,
        "active": active,
        "owner_cs": "boss1",
        "created": "2026-08-24T10:00:00Z",
    })
}

async fn mount_pools_once(deployment: &TestDeployment, pools: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/v1/enrollment/pools"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "pools": pools })))
        .up_to_n_times(1)
        .mount(&deployment.server)
        .await;
}

#[tokio::test]
async fn test_toggle_twice_restores_original_state() {
    let deployment = TestDeployment::start().await;

    // List snapshots in order: initial refresh, after deactivate, after
    // activate.
    mount_pools_once(&deployment, json!([pool_entry("CODE123X", true)])).await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/enrollment/invitecode/deactivate"))
        .and(body_json(json!({ "invite_code": "CODE123X" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&deployment.server)
        .await;
    mount_pools_once(&deployment, json!([pool_entry("CODE123X", false)])).await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/enrollment/invitecode/activate"))
        .and(body_json(json!({ "invite_code": "CODE123X" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&deployment.server)
        .await;
    mount_pools_once(&deployment, json!([pool_entry("CODE123X", true)])).await;

    let manager = InviteManager::new(deployment.client.clone());
    manager.refresh().await.unwrap();

    // Cache says active, so the first toggle deactivates.
    assert!(!manager.toggle(&token("CODE123X")).await.unwrap());
    // Cache now says inactive, so the second toggle activates again.
    assert!(manager.toggle(&token("CODE123X")).await.unwrap());

    assert!(manager.get(&token("CODE123X")).await.unwrap().active);
}

#[tokio::test]
async fn test_bulk_delete_continues_past_failure() {
    let deployment = TestDeployment::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/enrollment/invitecode/CODE1AAA"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&deployment.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/enrollment/invitecode/CODE2BBB"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "not found" })))
        .expect(1)
        .mount(&deployment.server)
        .await;
    // Item 3 is still attempted after item 2 fails.
    Mock::given(method("DELETE"))
        .and(path("/api/v1/enrollment/invitecode/CODE3CCC"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&deployment.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/enrollment/pools"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "pools": [] })))
        .mount(&deployment.server)
        .await;

    let manager = InviteManager::new(deployment.client.clone());
    let outcome = manager
        .bulk_delete([token("CODE1AAA"), token("CODE2BBB"), token("CODE3CCC")])
        .await;

    // The outcome reports the full attempted count, not just successes.
    assert_eq!(outcome.attempted, 3);
    assert_eq!(outcome.succeeded, 2);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].0, "CODE2BBB");
    assert!(!outcome.is_full_success());
    assert_eq!(outcome.summary(), "2/3 succeeded, 1 failed");
}

#[tokio::test]
async fn test_create_refreshes_the_cache() {
    let deployment = TestDeployment::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/enrollment/invitecode/create"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "invite_code": "NEWCODE1" })),
        )
        .expect(1)
        .mount(&deployment.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/enrollment/pools"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "pools": [pool_entry("NEWCODE1", true)] })),
        )
        .mount(&deployment.server)
        .await;

    let manager = InviteManager::new(deployment.client.clone());
    let code = manager.create().await.unwrap();

    assert_eq!(code.as_str(), "NEWCODE1");
    assert!(manager.get(&token("NEWCODE1")).await.unwrap().active);
}

#[tokio::test]
async fn test_list_rejects_malformed_invite_token() {
    let deployment = TestDeployment::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/enrollment/pools"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "pools": [pool_entry("bad code!", true)] })),
        )
        .mount(&deployment.server)
        .await;

    let manager = InviteManager::new(deployment.client.clone());
    let err = manager.refresh().await.unwrap_err();

    assert!(matches!(
        err,
        InviteError::Api(ApiError::InvalidField {
            field: "invitecode",
            ..
        })
    ));
    // The cache keeps its previous (empty) contents on a failed refresh.
    assert!(manager.list().await.is_empty());
}
