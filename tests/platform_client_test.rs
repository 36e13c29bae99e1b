use anyhow::Result;
use httpmock::prelude::*;
use serde_json::json;
use site_cdn::domain::model::{
    Environment, Plan, ServiceLevel, Site, User, Workflow, WorkflowRequest, WorkflowState,
};
use site_cdn::domain::ports::PlatformApi;
use site_cdn::{HttpPlatformClient, ProvisionError};

const TOKEN: &str = "machine-token-123";
const SESSION: &str = "session-abc";

/// 模擬授權端點，回傳固定的 session
async fn mock_auth(server: &MockServer) -> httpmock::Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/authorize/machine-token")
                .json_body(json!({ "machine_token": TOKEN, "client": "site-cdn" }));
            then.status(200)
                .json_body(json!({ "session": SESSION, "user_id": "owner-1", "expires_at": 0 }));
        })
        .await
}

fn client(server: &MockServer) -> HttpPlatformClient {
    // 故意省略結尾的 /，確認路徑仍落在 /api/ 之下
    HttpPlatformClient::new(&server.url("/api"), TOKEN).unwrap()
}

fn site() -> Site {
    Site {
        id: "site-uuid".to_string(),
        name: "example".to_string(),
        owner: "owner-1".to_string(),
        service_level: ServiceLevel::Free,
    }
}

fn env() -> Environment {
    Environment {
        id: "live".to_string(),
        domain: "live-example.pantheonsite.io".to_string(),
    }
}

#[tokio::test]
async fn test_resolves_site_and_environment() -> Result<()> {
    let server = MockServer::start_async().await;
    let auth = mock_auth(&server).await;

    let lookup = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/site-names/example")
                .header("Authorization", format!("Bearer {}", SESSION));
            then.status(200).json_body(json!({ "id": "site-uuid", "name": "example" }));
        })
        .await;
    let details = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/sites/site-uuid")
                .header("Authorization", format!("Bearer {}", SESSION));
            then.status(200).json_body(json!({
                "id": "site-uuid",
                "name": "example",
                "owner": "owner-1",
                "service_level": "business",
                "framework": "drupal8"
            }));
        })
        .await;
    let environments = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/sites/site-uuid/environments");
            then.status(200).json_body(json!({
                "dev": { "environment_created": 1 },
                "test": { "environment_created": 2 },
                "live": { "environment_created": 3 }
            }));
        })
        .await;

    let client = client(&server);
    let site = client.site("example").await?;
    assert_eq!(site.id, "site-uuid");
    assert_eq!(site.owner, "owner-1");
    assert_eq!(site.service_level, ServiceLevel::Business);

    let env = client.environment(&site, "live").await?;
    assert_eq!(env.id, "live");
    assert_eq!(env.domain, "live-example.pantheonsite.io");

    let missing = client.environment(&site, "qa").await;
    assert!(matches!(missing, Err(ProvisionError::NotFound { .. })));

    // session 只建立一次
    auth.assert_hits_async(1).await;
    lookup.assert_async().await;
    details.assert_async().await;
    environments.assert_hits_async(2).await;
    Ok(())
}

#[tokio::test]
async fn test_unknown_site_is_not_found() -> Result<()> {
    let server = MockServer::start_async().await;
    mock_auth(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/site-names/nope");
            then.status(404).body("Not Found");
        })
        .await;

    let result = client(&server).site("nope").await;
    match result {
        Err(ProvisionError::NotFound { resource, id }) => {
            assert_eq!(resource, "site");
            assert_eq!(id, "nope");
        }
        other => panic!("unexpected result: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_unlisted_service_level_is_paid() -> Result<()> {
    let server = MockServer::start_async().await;
    mock_auth(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/site-names/example");
            then.status(200).json_body(json!({ "id": "site-uuid" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/sites/site-uuid");
            then.status(200).json_body(json!({
                "id": "site-uuid",
                "name": "example",
                "owner": "owner-1",
                "service_level": "elite"
            }));
        })
        .await;

    let site = client(&server).site("example").await?;
    assert_eq!(site.service_level, ServiceLevel::Other);
    assert!(site.service_level.is_paid());
    Ok(())
}

#[tokio::test]
async fn test_site_name_stays_inside_its_path_segment() -> Result<()> {
    let server = MockServer::start_async().await;
    mock_auth(&server).await;
    let escaped = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/admin");
            then.status(200).json_body(json!({ "id": "should-not-be-reached" }));
        })
        .await;

    let result = client(&server).site("../admin").await;
    assert!(matches!(result, Err(ProvisionError::NotFound { .. })));
    escaped.assert_hits_async(0).await;
    Ok(())
}

#[tokio::test]
async fn test_rejected_machine_token() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/authorize/machine-token");
            then.status(401).body("invalid machine token");
        })
        .await;

    let result = client(&server).site("example").await;
    match result {
        Err(ProvisionError::ApiStatus { status, body, .. }) => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid machine token");
        }
        other => panic!("unexpected result: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_current_user_joins_profile_name() -> Result<()> {
    let server = MockServer::start_async().await;
    mock_auth(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/users/owner-1");
            then.status(200).json_body(json!({
                "id": "owner-1",
                "email": "owner@example.com",
                "profile": { "firstname": "Ada", "lastname": "Lovelace" }
            }));
        })
        .await;

    let user = client(&server).current_user().await?;
    assert_eq!(user.id, "owner-1");
    assert_eq!(user.email, "owner@example.com");
    assert_eq!(user.name.as_deref(), Some("Ada Lovelace"));
    Ok(())
}

#[tokio::test]
async fn test_domains_listing_and_creation() -> Result<()> {
    let server = MockServer::start_async().await;
    mock_auth(&server).await;
    let listing = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/sites/site-uuid/environments/live/domains");
            then.status(200).json_body(json!([
                { "id": "live-example.pantheonsite.io", "dns_zone_name": "pantheonsite.io" },
                { "id": "example.com", "type": "custom" }
            ]));
        })
        .await;
    let create = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/api/sites/site-uuid/environments/live/domains/www.example.com");
            then.status(200).json_body(json!({ "id": "www.example.com" }));
        })
        .await;

    let client = client(&server);
    let domains = client.domains(&site(), &env()).await?;
    assert_eq!(domains.len(), 2);
    assert!(!domains[0].is_custom());
    assert!(domains[1].is_custom());
    assert_eq!(domains[1].name, "example.com");

    client
        .create_domain(&site(), &env(), "www.example.com")
        .await?;

    // 兩次取得的結果一致
    let again = client.domains(&site(), &env()).await?;
    assert_eq!(again, domains);

    listing.assert_hits_async(2).await;
    create.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_payment_methods() -> Result<()> {
    let server = MockServer::start_async().await;
    mock_auth(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/users/owner-1/instruments");
            then.status(200).json_body(json!([
                { "id": "pm-visa", "label": "Visa - 1111" },
                { "id": "pm-amex", "label": "Amex - 0005" }
            ]));
        })
        .await;

    let user = User {
        id: "owner-1".to_string(),
        email: "owner@example.com".to_string(),
        name: None,
    };
    let methods = client(&server).payment_methods(&user).await?;
    assert_eq!(methods.len(), 2);
    assert_eq!(methods[0].id, "pm-visa");
    assert_eq!(methods[1].label, "Amex - 0005");
    Ok(())
}

#[tokio::test]
async fn test_submit_workflow_and_track_state() -> Result<()> {
    let server = MockServer::start_async().await;
    mock_auth(&server).await;
    let submit = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/sites/site-uuid/workflows")
                .json_body(json!({
                    "type": "change_site_service_level",
                    "params": { "service_level": "pro" }
                }));
            then.status(200).json_body(json!({ "id": "wf-42" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/sites/site-uuid/workflows/wf-42");
            then.status(200).json_body(json!({ "result": null }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/sites/site-uuid/workflows/wf-43");
            then.status(200)
                .json_body(json!({ "result": "failed", "reason": "card declined" }));
        })
        .await;

    let client = client(&server);
    let workflow = client
        .submit_workflow(
            &site(),
            &WorkflowRequest::ChangeSiteServiceLevel {
                service_level: Plan::Pro,
            },
        )
        .await?;
    assert_eq!(workflow.id, "wf-42");
    assert_eq!(workflow.kind, "change_site_service_level");
    submit.assert_async().await;

    assert_eq!(
        client.workflow_state(&site(), &workflow).await?,
        WorkflowState::Running
    );

    let failed = Workflow {
        id: "wf-43".to_string(),
        kind: "associate_site_instrument".to_string(),
    };
    assert_eq!(
        client.workflow_state(&site(), &failed).await?,
        WorkflowState::Failed {
            reason: "card declined".to_string()
        }
    );
    Ok(())
}

#[tokio::test]
async fn test_server_error_is_reported_with_status() -> Result<()> {
    let server = MockServer::start_async().await;
    mock_auth(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/users/owner-1/instruments");
            then.status(500).body("upstream exploded");
        })
        .await;

    let user = User {
        id: "owner-1".to_string(),
        email: "owner@example.com".to_string(),
        name: None,
    };
    let err = client(&server).payment_methods(&user).await.unwrap_err();
    assert!(matches!(err, ProvisionError::ApiStatus { status: 500, .. }));
    Ok(())
}

#[test]
fn test_invalid_base_url_is_rejected() {
    let result = HttpPlatformClient::new("not a url", TOKEN);
    assert!(matches!(
        result,
        Err(ProvisionError::InvalidConfigValueError { .. })
    ));
}
