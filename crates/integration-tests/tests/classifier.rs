//! Login-code classification against the two backend validity probes.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use rasenmaeher_client::classifier::{self, ClassifierError};
use rasenmaeher_core::CodeKind;
use rasenmaeher_integration_tests::TestDeployment;

async fn mount_bootstrap_probe(deployment: &TestDeployment, code: &str, valid: bool) {
    let response = if valid {
        ResponseTemplate::new(200).set_body_json(json!({ "ok": true }))
    } else {
        ResponseTemplate::new(404)
    };
    Mock::given(method("GET"))
        .and(path("/api/v1/firstuser/check-code"))
        .and(query_param("temp_admin_code", code))
        .respond_with(response)
        .mount(&deployment.server)
        .await;
}

async fn mount_invite_probe(deployment: &TestDeployment, code: &str, active: bool) {
    let response = if active {
        ResponseTemplate::new(200).set_body_json(json!({ "invitecode_is_active": true }))
    } else {
        ResponseTemplate::new(404)
    };
    Mock::given(method("GET"))
        .and(path("/api/v1/enrollment/invitecode"))
        .and(query_param("invitecode", code))
        .respond_with(response)
        .mount(&deployment.server)
        .await;
}

#[tokio::test]
async fn test_admin_wins_when_both_probes_validate() {
    let deployment = TestDeployment::start().await;
    mount_bootstrap_probe(&deployment, "AMBIG123", true).await;
    mount_invite_probe(&deployment, "AMBIG123", true).await;

    let (_, classification) = classifier::classify(&deployment.client, "AMBIG123")
        .await
        .unwrap();

    assert!(classification.admin_code_valid);
    assert!(classification.enrollment_code_valid);
    assert_eq!(classification.kind(), CodeKind::AdminBootstrap);
}

#[tokio::test]
async fn test_invite_only_code() {
    let deployment = TestDeployment::start().await;
    mount_bootstrap_probe(&deployment, "ABCD1234", false).await;
    mount_invite_probe(&deployment, "ABCD1234", true).await;

    let (code, classification) = classifier::classify(&deployment.client, "ABCD1234")
        .await
        .unwrap();

    assert_eq!(code.as_str(), "ABCD1234");
    assert_eq!(classification.kind(), CodeKind::EnrollmentInvite);
}

#[tokio::test]
async fn test_unknown_code() {
    let deployment = TestDeployment::start().await;
    mount_bootstrap_probe(&deployment, "NOSUCH99", false).await;
    mount_invite_probe(&deployment, "NOSUCH99", false).await;

    let (_, classification) = classifier::classify(&deployment.client, "NOSUCH99")
        .await
        .unwrap();

    assert_eq!(classification.kind(), CodeKind::Unknown);
}

#[tokio::test]
async fn test_code_is_normalized_before_probing() {
    let deployment = TestDeployment::start().await;
    // Probes must see the uppercased, trimmed code.
    mount_bootstrap_probe(&deployment, "ABCD1234", false).await;
    mount_invite_probe(&deployment, "ABCD1234", true).await;

    let (code, classification) = classifier::classify(&deployment.client, "  abcd1234\n")
        .await
        .unwrap();

    assert_eq!(code.as_str(), "ABCD1234");
    assert_eq!(classification.kind(), CodeKind::EnrollmentInvite);
}

#[tokio::test]
async fn test_malformed_code_makes_no_network_call() {
    let deployment = TestDeployment::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/firstuser/check-code"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&deployment.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/enrollment/invitecode"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&deployment.server)
        .await;

    assert!(matches!(
        classifier::classify(&deployment.client, "ab!").await,
        Err(ClassifierError::InvalidCode(_))
    ));
}

#[tokio::test]
async fn test_probe_server_error_is_an_error_not_unknown() {
    let deployment = TestDeployment::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/firstuser/check-code"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&deployment.server)
        .await;
    mount_invite_probe(&deployment, "ABCD1234", false).await;

    assert!(matches!(
        classifier::classify(&deployment.client, "ABCD1234").await,
        Err(ClassifierError::Api(_))
    ));
}
