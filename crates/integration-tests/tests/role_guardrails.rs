//! Role-management guardrails refuse before any network call.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use rasenmaeher_client::roles::{RoleError, RoleManager};
use rasenmaeher_core::Callsign;
use rasenmaeher_integration_tests::TestDeployment;

async fn mount_user_list(deployment: &TestDeployment, users: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/v1/people/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "callsign_list": users })))
        .mount(&deployment.server)
        .await;
}

/// Mount the mutation endpoints with zero expected calls, so the mock
/// server itself verifies the guardrails never hit the network.
async fn forbid_mutations(deployment: &TestDeployment) {
    Mock::given(method("POST"))
        .and(path("/api/v1/enrollment/demote"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&deployment.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/people/boss1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&deployment.server)
        .await;
}

#[tokio::test]
async fn test_self_demotion_is_refused_without_network() {
    let deployment = TestDeployment::start().await;
    mount_user_list(
        &deployment,
        json!([
            { "callsign": "boss1", "roles": ["admin"] },
            { "callsign": "boss2", "roles": ["admin"] },
        ]),
    )
    .await;
    forbid_mutations(&deployment).await;

    let me = Callsign::parse("boss1").unwrap();
    let manager = RoleManager::new(deployment.client.clone(), me.clone());
    manager.refresh().await.unwrap();

    assert!(matches!(
        manager.demote(&me).await,
        Err(RoleError::SelfDemotion)
    ));
    assert!(matches!(
        manager.remove(&me).await,
        Err(RoleError::SelfRemoval)
    ));
}

#[tokio::test]
async fn test_last_admin_is_protected_without_network() {
    let deployment = TestDeployment::start().await;
    mount_user_list(
        &deployment,
        json!([
            { "callsign": "boss1", "roles": ["admin"] },
            { "callsign": "eagle1", "roles": [] },
        ]),
    )
    .await;
    forbid_mutations(&deployment).await;

    let manager = RoleManager::new(
        deployment.client.clone(),
        Callsign::parse("eagle1").unwrap(),
    );
    manager.refresh().await.unwrap();

    let boss = Callsign::parse("boss1").unwrap();
    assert!(matches!(
        manager.demote(&boss).await,
        Err(RoleError::LastAdmin)
    ));
    assert!(matches!(
        manager.remove(&boss).await,
        Err(RoleError::LastAdmin)
    ));
}

#[tokio::test]
async fn test_demoting_one_of_two_admins_goes_through() {
    let deployment = TestDeployment::start().await;
    mount_user_list(
        &deployment,
        json!([
            { "callsign": "boss1", "roles": ["admin"] },
            { "callsign": "boss2", "roles": ["admin"] },
        ]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/enrollment/demote"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&deployment.server)
        .await;

    let manager = RoleManager::new(deployment.client.clone(), Callsign::parse("boss1").unwrap());
    manager.refresh().await.unwrap();

    manager
        .demote(&Callsign::parse("boss2").unwrap())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_bulk_demote_skips_guarded_items_and_continues() {
    let deployment = TestDeployment::start().await;
    mount_user_list(
        &deployment,
        json!([
            { "callsign": "boss1", "roles": ["admin"] },
            { "callsign": "boss2", "roles": ["admin"] },
            { "callsign": "boss3", "roles": ["admin"] },
        ]),
    )
    .await;
    // Only the two non-self targets reach the backend.
    Mock::given(method("POST"))
        .and(path("/api/v1/enrollment/demote"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&deployment.server)
        .await;

    let manager = RoleManager::new(deployment.client.clone(), Callsign::parse("boss1").unwrap());
    manager.refresh().await.unwrap();

    let outcome = manager
        .bulk_demote([
            Callsign::parse("boss1").unwrap(),
            Callsign::parse("boss2").unwrap(),
            Callsign::parse("boss3").unwrap(),
        ])
        .await;

    assert_eq!(outcome.attempted, 3);
    assert_eq!(outcome.succeeded, 2);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].0, "boss1");
}
